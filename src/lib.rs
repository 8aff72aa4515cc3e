use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use url::Url;

pub mod config;
pub mod console;
pub mod error;
pub mod fetch;
pub mod persist;
pub mod record;
pub mod sanitize;
pub mod transport;

pub use config::{CrawlConfig, DEFAULT_API_BASE};
pub use console::Console;
pub use error::{AssetError, ConfigError, CrawlError, FetchError, PersistError};
pub use fetch::{Fetched, fetch_podcast_by_id};
pub use persist::{AssetKind, PodcastDirectory, Persisted, persist_podcast};
pub use record::{DecodeQuality, PodcastRecord};
pub use sanitize::sanitize;
pub use transport::Transport;

/// What happened to one identifier. Observational only: nothing here feeds
/// back into scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Lookup errored or did not answer 200. Nothing was written.
    FetchFailed,
    /// Directory or metadata could not be written. Assets were not attempted.
    Aborted,
    Persisted {
        degraded: bool,
        missing_assets: Vec<AssetKind>,
    },
    /// The pipeline task panicked.
    Crashed,
}

/// Running totals for one crawl. Per-id outcomes are only handed to the
/// observer passed to [`Crawler::crawl_with`], never retained.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub processed: u64,
    pub persisted: u64,
    /// Persisted, but at least one asset is missing.
    pub partial: u64,
    /// Persisted from an undecodable or empty body.
    pub degraded: u64,
    pub fetch_failed: u64,
    pub aborted: u64,
    pub crashed: u64,
    pub peak_in_flight: usize,
}

impl CrawlReport {
    fn record(&mut self, outcome: &PipelineOutcome) {
        self.processed += 1;
        match outcome {
            PipelineOutcome::FetchFailed => self.fetch_failed += 1,
            PipelineOutcome::Aborted => self.aborted += 1,
            PipelineOutcome::Crashed => self.crashed += 1,
            PipelineOutcome::Persisted {
                degraded,
                missing_assets,
            } => {
                self.persisted += 1;
                if *degraded {
                    self.degraded += 1;
                }
                if !missing_assets.is_empty() {
                    self.partial += 1;
                }
            }
        }
    }
}

struct Pipeline {
    transport: Transport,
    assets: reqwest::Client,
    console: Console,
    api_base: Url,
    output_root: PathBuf,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Pipeline {
    async fn run(&self, id: u64) -> PipelineOutcome {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        let outcome = self.fetch_and_persist(id).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    async fn fetch_and_persist(&self, id: u64) -> PipelineOutcome {
        let fetched =
            fetch_podcast_by_id(&self.transport, &self.console, &self.api_base, id).await;
        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::debug!(id, error = %err, "skipping unresolved id");
                return PipelineOutcome::FetchFailed;
            }
        };

        let persisted = persist_podcast(
            &self.assets,
            &self.console,
            &self.output_root,
            &fetched.record,
            id,
        )
        .await;
        match persisted {
            Ok(persisted) => PipelineOutcome::Persisted {
                degraded: fetched.quality == DecodeQuality::Degraded,
                missing_assets: persisted.missing_assets,
            },
            Err(err) => {
                self.console.failed(id, &fetched.record.media.title, &err);
                PipelineOutcome::Aborted
            }
        }
    }
}

/// Crawls an id range in fixed-size batches.
///
/// Up to `concurrency` pipelines are spawned together and all of them are
/// joined before the next batch starts, so a batch never overlaps the next.
pub struct Crawler {
    pipeline: Arc<Pipeline>,
    config: CrawlConfig,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        Self::with_console(config, Console::stdout())
    }

    /// Like [`Crawler::new`], with status lines sent to `console`.
    pub fn with_console(config: CrawlConfig, console: Console) -> Result<Self, CrawlError> {
        config.validate()?;

        let transport = Transport::new(config.request_timeout)?;
        let mut assets = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            assets = assets.timeout(timeout);
        }

        let pipeline = Pipeline {
            transport,
            assets: assets.build()?,
            console,
            api_base: config.api_base.clone(),
            output_root: config.output_root.clone(),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        };

        Ok(Self {
            pipeline: Arc::new(pipeline),
            config,
        })
    }

    pub async fn crawl(&self) -> CrawlReport {
        self.crawl_with(|_, _| {}).await
    }

    /// Crawls the range, handing every id's outcome to `observe` as its batch drains.
    pub async fn crawl_with(&self, mut observe: impl FnMut(u64, &PipelineOutcome)) -> CrawlReport {
        let mut report = CrawlReport::default();
        self.pipeline.peak_in_flight.store(0, Ordering::SeqCst);
        let mut ids = self.config.start_id..=self.config.stop_id;

        loop {
            let batch: Vec<u64> = ids.by_ref().take(self.config.concurrency.get()).collect();
            let (Some(first), Some(last)) = (batch.first(), batch.last()) else {
                break;
            };
            tracing::debug!(first, last, "starting batch");

            let handles = batch.iter().map(|&id| {
                let pipeline = self.pipeline.clone();
                tokio::spawn(async move { pipeline.run(id).await })
            });
            let results = futures::future::join_all(handles).await;

            for (&id, result) in batch.iter().zip(results) {
                let outcome = match result {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        tracing::error!(id, error = %err, "pipeline task failed");
                        PipelineOutcome::Crashed
                    }
                };
                report.record(&outcome);
                observe(id, &outcome);
            }
        }

        report.peak_in_flight = self.pipeline.peak_in_flight.load(Ordering::SeqCst);
        report
    }
}
