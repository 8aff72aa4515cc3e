//! Human-readable status lines. Advisory only, not meant to be parsed.

use std::fmt::{self, Display};
use std::io::Write;
use std::sync::{Arc, Mutex};

pub const SUCCESS: &str = "[✓]";
pub const PARTIAL: &str = "[~]";
pub const FAILURE: &str = "[✗]";

/// Where status lines go. Stdout by default; cloned into every pipeline.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<dyn Write + Send>>,
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Console {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn downloading(&self, id: u64, title: &str) {
        self.lines(&[format!("{SUCCESS} [ Podcast #{id} ] Downloading {title}")]);
    }

    pub fn asset_missing(&self, id: u64, title: &str, asset: impl Display, err: impl Display) {
        self.lines(&[
            format!("{PARTIAL} [ Podcast #{id} ] Missing {asset} for {title}"),
            err.to_string(),
        ]);
    }

    pub fn failed(&self, id: u64, title: &str, err: impl Display) {
        self.lines(&[
            format!("{FAILURE} [ Podcast #{id} ] Error while processing {title}"),
            err.to_string(),
        ]);
    }

    // Lines of one message stay together when pipelines report concurrently.
    fn lines(&self, lines: &[String]) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        for line in lines {
            if let Err(err) = writeln!(out, "{line}") {
                tracing::debug!(error = %err, "console write failed");
                return;
            }
        }
        let _ = out.flush();
    }
}
