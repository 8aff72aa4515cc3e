use std::time::Duration;

use reqwest::{Client, Response};
use url::Url;

/// The HTTP client shared by every lookup.
///
/// Pinned to HTTP/1.1 so no connection is ever upgraded to HTTP/2; the lookup
/// server misbehaves when multiplexed connections get reused.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
}

impl Transport {
    pub fn new(request_timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = Client::builder().http1_only();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub async fn get(&self, url: Url) -> reqwest::Result<Response> {
        self.client.get(url).send().await
    }
}
