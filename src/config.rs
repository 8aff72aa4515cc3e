use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE: &str = "https://podtail.com/podcast/episode/json/";

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub api_base: Url,
    pub start_id: u64,
    pub stop_id: u64,
    pub concurrency: NonZeroUsize,
    pub output_root: PathBuf,
    /// Per-request deadline. Unset means requests may hang forever.
    pub request_timeout: Option<Duration>,
}

impl CrawlConfig {
    pub fn new(
        api_base: Url,
        start_id: u64,
        stop_id: u64,
        concurrency: NonZeroUsize,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api_base,
            start_id,
            stop_id,
            concurrency,
            output_root: output_root.into(),
            request_timeout: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_id > self.stop_id {
            return Err(ConfigError::EmptyRange {
                start: self.start_id,
                stop: self.stop_id,
            });
        }
        Ok(())
    }
}
