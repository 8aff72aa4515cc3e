use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("empty id range: start id {start} is greater than stop id {stop}")]
    EmptyRange { start: u64, stop: u64 },
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Why an identifier could not be resolved. Never shown on the console.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },
}

/// Failures that make an identifier unusable and abort its pipeline.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode metadata: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write metadata to {path}: {source}")]
    WriteMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single media download that went wrong. Reported, never escalated.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("network error downloading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} downloading {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("IO error writing to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssetError {
    pub(crate) fn network(url: &str, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
