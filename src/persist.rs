use std::fmt;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Client;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use url::Url;

use crate::console::Console;
use crate::error::{AssetError, PersistError};
use crate::record::PodcastRecord;
use crate::sanitize::{sanitize, strip_hostile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Audio,
    Poster,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Audio => f.write_str("audio"),
            AssetKind::Poster => f.write_str("poster"),
        }
    }
}

/// On-disk layout for one identifier: `{root}/{id} - {title}/{id} - {title}.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastDirectory {
    pub dir: PathBuf,
    pub base_name: String,
}

impl PodcastDirectory {
    pub fn new(output_root: &Path, id: u64, title: &str) -> Self {
        let base_name = format!("{id} - {}", sanitize(title));
        Self {
            dir: output_root.join(&base_name),
            base_name,
        }
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.base_name))
    }

    /// Asset file for `url`. An asset whose extension would land on the
    /// metadata file gets its kind appended to the name instead.
    pub fn asset_path(&self, kind: AssetKind, url: &str) -> PathBuf {
        let extension = url_extension(url);
        if extension.eq_ignore_ascii_case(".json") {
            return self
                .dir
                .join(format!("{} - {kind}{extension}", self.base_name));
        }
        self.dir.join(format!("{}{extension}", self.base_name))
    }
}

/// Extension of the last path segment of `url`, dot included, or empty.
pub fn url_extension(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let Some(segment) = parsed.path_segments().and_then(|mut s| s.next_back()) else {
        return String::new();
    };
    match segment.rfind('.') {
        Some(dot) => strip_hostile(&segment[dot..]),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persisted {
    pub dir: PathBuf,
    pub missing_assets: Vec<AssetKind>,
}

/// Writes the metadata file and downloads both assets for one identifier.
///
/// Directory or metadata failures abort and are returned. Asset failures are
/// reported on the console and listed in [`Persisted::missing_assets`].
pub async fn persist_podcast(
    client: &Client,
    console: &Console,
    output_root: &Path,
    record: &PodcastRecord,
    id: u64,
) -> Result<Persisted, PersistError> {
    let layout = PodcastDirectory::new(output_root, id, &record.media.title);

    fs::create_dir_all(&layout.dir)
        .await
        .map_err(|source| PersistError::CreateDir {
            path: layout.dir.clone(),
            source,
        })?;

    let json = record.to_pretty_json()?;
    let metadata_path = layout.metadata_path();
    fs::write(&metadata_path, json)
        .await
        .map_err(|source| PersistError::WriteMetadata {
            path: metadata_path.clone(),
            source,
        })?;

    let mut missing_assets = Vec::new();
    for (kind, url) in [
        (AssetKind::Audio, &record.media.media_url),
        (AssetKind::Poster, &record.media.poster_url),
    ] {
        let path = layout.asset_path(kind, url);
        match download_file(client, url, &path).await {
            Ok(bytes) => tracing::debug!(id, %kind, bytes, path = %path.display(), "asset saved"),
            Err(err) => {
                console.asset_missing(id, &record.media.title, kind, &err);
                missing_assets.push(kind);
            }
        }
    }

    Ok(Persisted {
        dir: layout.dir,
        missing_assets,
    })
}

/// Streams `url` into a newly created file at `path`, returning the bytes written.
pub async fn download_file(client: &Client, url: &str, path: &Path) -> Result<u64, AssetError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| AssetError::network(url, source))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AssetError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let file = File::create(path)
        .await
        .map_err(|source| AssetError::io(path, source))?;

    let written = stream_to_file(file, response, url, path).await;
    if written.is_err() {
        tracing::debug!(path = %path.display(), "removing partial download");
        let _ = fs::remove_file(path).await;
    }
    written
}

async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, AssetError> {
    let mut writer = BufWriter::new(file);
    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| AssetError::network(url, source))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|source| AssetError::io(path, source))?;
        written += chunk.len() as u64;
    }
    writer
        .flush()
        .await
        .map_err(|source| AssetError::io(path, source))?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_extension_from_path() {
        assert_eq!(url_extension("https://cdn.example.com/a/b/episode.mp3"), ".mp3");
        assert_eq!(url_extension("https://cdn.example.com/poster.JPG?w=600#x"), ".JPG");
    }

    #[test]
    fn test_url_extension_missing() {
        assert_eq!(url_extension("https://cdn.example.com/stream"), "");
        assert_eq!(url_extension("https://cdn.example.com/"), "");
        assert_eq!(url_extension(""), "");
        assert_eq!(url_extension("not a url"), "");
    }

    #[test]
    fn test_podcast_directory_layout() {
        let layout = PodcastDirectory::new(Path::new("/out"), 7, "Ep/1: \"Test\"?");

        assert_eq!(layout.base_name, "7 - Ep1 Test");
        assert_eq!(layout.dir, Path::new("/out/7 - Ep1 Test"));
        assert_eq!(
            layout.metadata_path(),
            Path::new("/out/7 - Ep1 Test/7 - Ep1 Test.json")
        );
        assert_eq!(
            layout.asset_path(AssetKind::Audio, "https://cdn.example.com/ep.m4a"),
            Path::new("/out/7 - Ep1 Test/7 - Ep1 Test.m4a")
        );
    }

    #[test]
    fn test_json_asset_does_not_shadow_metadata() {
        let layout = PodcastDirectory::new(Path::new("/out"), 7, "Notes");

        let poster = layout.asset_path(AssetKind::Poster, "https://cdn.example.com/art.JSON");
        assert_eq!(poster, Path::new("/out/7 - Notes/7 - Notes - poster.JSON"));
        assert_ne!(poster, layout.metadata_path());
        assert_ne!(
            layout.asset_path(AssetKind::Audio, "https://cdn.example.com/ep.json"),
            layout.metadata_path()
        );
    }
}
