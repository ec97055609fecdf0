//! Run configuration
//!
//! The search ceiling and worker count are launch-time constants: they are
//! fixed before any worker starts and never renegotiated at runtime.

pub mod cli;
pub mod toml;

use crate::scanner::{DEFAULT_CEILING, DEFAULT_REPORT_INTERVAL};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default per-worker receive timeout (seconds)
///
/// Generous: a worker scanning a wide subrange with trial division is slow,
/// not hung. The timeout exists so a dead worker is reported by rank instead
/// of blocking the coordinator forever.
pub const DEFAULT_RECV_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Exclusive upper bound of the search range
    pub ceiling: u64,

    /// Number of scanning workers (the coordinator is not one of them)
    pub workers: usize,

    /// Integers between progress status lines
    pub report_interval: u64,

    /// Per-worker result receive timeout (seconds)
    pub recv_timeout_secs: u64,

    /// Optional machine-readable results file
    pub output_json: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_CEILING,
            workers: num_cpus::get(),
            report_interval: DEFAULT_REPORT_INTERVAL,
            recv_timeout_secs: DEFAULT_RECV_TIMEOUT_SECS,
            output_json: None,
        }
    }
}

impl Config {
    /// Validate the configuration before any worker is launched.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            anyhow::bail!("At least one worker is required");
        }
        if self.ceiling < 3 {
            anyhow::bail!(
                "Ceiling must be at least 3 to contain a prime gap (got {})",
                self.ceiling
            );
        }
        if self.report_interval == 0 {
            anyhow::bail!("Report interval must be positive");
        }
        if self.recv_timeout_secs == 0 {
            anyhow::bail!("Receive timeout must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = Config {
            workers: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tiny_ceiling_rejected() {
        let config = Config {
            ceiling: 2,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_report_interval_rejected() {
        let config = Config {
            report_interval: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
