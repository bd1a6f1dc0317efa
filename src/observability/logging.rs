//! Structured logging configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding every other filter source.
pub const LOG_FILTER_ENV: &str = "TABLEGRID_LOG";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// The `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter directives, e.g. `info,tablegrid=debug`.
    pub filter: String,
    /// Append logs to this file instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Returns the filter directives in effect.
    ///
    /// `TABLEGRID_LOG` wins over `RUST_LOG`, which wins over `verbose`,
    /// which wins over the configured filter.
    #[must_use]
    pub fn effective_filter(&self, verbose: bool) -> String {
        [LOG_FILTER_ENV, "RUST_LOG"]
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| {
                if verbose {
                    "debug".to_string()
                } else {
                    self.filter.clone()
                }
            })
    }

    /// Builds the subscriber filter, falling back to `info` on bad
    /// directives.
    #[must_use]
    pub fn env_filter(&self, verbose: bool) -> EnvFilter {
        let directives = self.effective_filter(verbose);
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}
