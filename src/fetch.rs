use reqwest::StatusCode;
use url::Url;

use crate::console::Console;
use crate::error::FetchError;
use crate::record::{self, DecodeQuality, PodcastRecord};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct Fetched {
    pub record: PodcastRecord,
    pub quality: DecodeQuality,
}

pub fn episode_url(api_base: &Url, id: u64) -> Url {
    let mut url = api_base.clone();
    url.query_pairs_mut().append_pair("id", &id.to_string());
    url
}

/// Looks up one episode.
///
/// Anything but a 200 answer is an error; a 200 answer always yields a record,
/// however little of the body could be decoded.
pub async fn fetch_podcast_by_id(
    transport: &Transport,
    console: &Console,
    api_base: &Url,
    id: u64,
) -> Result<Fetched, FetchError> {
    let url = episode_url(api_base, id);

    let response = transport
        .get(url.clone())
        .await
        .map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let (record, quality) = match response.bytes().await {
        Ok(body) => record::decode(&body),
        Err(err) => {
            tracing::debug!(id, error = %err, "failed to read episode body");
            (PodcastRecord::default(), DecodeQuality::Degraded)
        }
    };
    if quality == DecodeQuality::Degraded {
        tracing::debug!(id, "episode decoded to an empty record");
    }

    console.downloading(id, &record.media.title);

    Ok(Fetched { record, quality })
}
