//! TOML configuration files
//!
//! A config file carries the same knobs as the CLI; any field may be omitted
//! and CLI flags override whatever the file sets.
//!
//! ```toml
//! ceiling = 1_000_000_000_000
//! workers = 8
//! report_interval = 10_000_000
//! recv_timeout_secs = 86400
//! ```

use crate::config::Config;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Partial configuration as read from a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub ceiling: Option<u64>,
    pub workers: Option<usize>,
    pub report_interval: Option<u64>,
    pub recv_timeout_secs: Option<u64>,
    pub output_json: Option<PathBuf>,
}

impl FileConfig {
    /// Load a partial configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        ::toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Overlay this file's values onto `base`.
    pub fn apply(self, base: &mut Config) {
        if let Some(ceiling) = self.ceiling {
            base.ceiling = ceiling;
        }
        if let Some(workers) = self.workers {
            base.workers = workers;
        }
        if let Some(interval) = self.report_interval {
            base.report_interval = interval;
        }
        if let Some(timeout) = self.recv_timeout_secs {
            base.recv_timeout_secs = timeout;
        }
        if let Some(path) = self.output_json {
            base.output_json = Some(path);
        }
    }
}
