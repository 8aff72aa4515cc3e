use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use podtail_spider_rs::{CrawlConfig, Crawler, DEFAULT_API_BASE};
use url::Url;

#[derive(Parser, Debug)]
#[command(about, version, author)]
struct Args {
    #[arg(short, long, default_value_t = 1)]
    start_id: u64,

    #[arg(short = 'e', long)]
    stop_id: u64,

    #[arg(short, long, default_value = "16")]
    concurrency: NonZeroUsize,

    #[arg(short, long, default_value = "podcasts")]
    output: PathBuf,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: Url,

    /// Per-request timeout in seconds; requests never time out when unset
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?args, "arguments parsed");

    tokio::fs::create_dir_all(&args.output)
        .await
        .with_context(|| format!("failed to create output directory {}", args.output.display()))?;

    let mut config = CrawlConfig::new(
        args.api_base,
        args.start_id,
        args.stop_id,
        args.concurrency,
        args.output,
    );
    if let Some(secs) = args.timeout {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }

    let crawler = Crawler::new(config)?;
    let report = crawler.crawl().await;

    tracing::debug!(
        processed = report.processed,
        persisted = report.persisted,
        partial = report.partial,
        degraded = report.degraded,
        fetch_failed = report.fetch_failed,
        aborted = report.aborted,
        crashed = report.crashed,
        peak_in_flight = report.peak_in_flight,
        "crawl finished"
    );

    Ok(())
}
