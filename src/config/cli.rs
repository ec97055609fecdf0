//! CLI argument parsing using clap

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// Standalone mode (default) - coordinator and workers in one process
    Standalone,
    /// Coordinator mode - drive remote worker services
    Coordinator,
    /// Worker mode - run a worker service (accepts coordinator assignments)
    Worker,
}

/// Role resolved from the CLI, once, at startup
///
/// Everything after this point branches on the variant, never on raw flags.
#[derive(Debug, Clone)]
pub enum Role {
    /// Coordinator plus in-process localhost workers
    Standalone,
    /// Coordinator over a fixed list of worker addresses (rank = list order)
    Coordinator { worker_addresses: Vec<String> },
    /// Worker service listening for an assignment
    Worker { listen_port: u16 },
}

/// primegap - Distributed prime gap search tool
#[derive(Parser, Debug)]
#[command(name = "primegap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: standalone, coordinator, or worker
    #[arg(long, value_enum, default_value = "standalone")]
    pub mode: ExecutionMode,

    /// Port for the worker service to listen on (worker mode only)
    #[arg(long, default_value = "9999")]
    pub listen_port: u16,

    /// Comma-separated worker addresses for coordinator mode
    /// (e.g., "10.0.1.10:9999,10.0.1.11:9999"); list order fixes worker ranks
    #[arg(long)]
    pub host_list: Option<String>,

    /// File containing worker addresses (one per line, for coordinator mode)
    #[arg(long)]
    pub clients_file: Option<PathBuf>,

    /// Number of workers (standalone mode; defaults to the CPU count)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Search ceiling, exclusive (e.g., 1000000, 100M, 1T)
    #[arg(short = 'c', long)]
    pub ceiling: Option<String>,

    /// Integers between progress updates (e.g., 10M)
    #[arg(long)]
    pub report_interval: Option<String>,

    /// Per-worker result receive timeout in seconds
    #[arg(long)]
    pub recv_timeout: Option<u64>,

    /// Write results to a JSON file
    #[arg(long)]
    pub output_json: Option<PathBuf>,

    /// Load configuration from a TOML file (CLI flags override it)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Validate configuration and exit without scanning
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Cross-flag validation clap cannot express.
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            ExecutionMode::Coordinator => {
                if self.host_list.is_none() && self.clients_file.is_none() {
                    anyhow::bail!(
                        "Coordinator mode requires --host-list or --clients-file"
                    );
                }
            }
            ExecutionMode::Worker => {
                if self.host_list.is_some() || self.clients_file.is_some() {
                    anyhow::bail!("--host-list/--clients-file only apply to coordinator mode");
                }
            }
            ExecutionMode::Standalone => {}
        }
        if let Some(0) = self.workers {
            anyhow::bail!("At least one worker is required");
        }
        Ok(())
    }

    /// Resolve the process role from the parsed flags.
    pub fn role(&self) -> Result<Role> {
        match self.mode {
            ExecutionMode::Standalone => Ok(Role::Standalone),
            ExecutionMode::Worker => Ok(Role::Worker {
                listen_port: self.listen_port,
            }),
            ExecutionMode::Coordinator => {
                let worker_addresses = self.worker_addresses()?;
                if worker_addresses.is_empty() {
                    anyhow::bail!("Worker address list is empty");
                }
                Ok(Role::Coordinator { worker_addresses })
            }
        }
    }

    fn worker_addresses(&self) -> Result<Vec<String>> {
        if let Some(ref list) = self.host_list {
            return Ok(list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect());
        }
        if let Some(ref path) = self.clients_file {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read clients file {}", path.display()))?;
            return Ok(contents
                .lines()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .collect());
        }
        Ok(Vec::new())
    }
}

/// Parse a count with an optional decimal suffix (k, M, G, T).
///
/// Suffixes are powers of 1000: these are counts of integers, not bytes.
pub fn parse_count(s: &str) -> Result<u64> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty count");
    }

    let (digits, multiplier) = match s.chars().last() {
        Some('k') | Some('K') => (&s[..s.len() - 1], 1_000u64),
        Some('m') | Some('M') => (&s[..s.len() - 1], 1_000_000),
        Some('g') | Some('G') => (&s[..s.len() - 1], 1_000_000_000),
        Some('t') | Some('T') => (&s[..s.len() - 1], 1_000_000_000_000),
        _ => (s, 1),
    };

    let value: u64 = digits
        .parse()
        .with_context(|| format!("Invalid count: {}", s))?;
    value
        .checked_mul(multiplier)
        .with_context(|| format!("Count overflows u64: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_plain() {
        assert_eq!(parse_count("12345").unwrap(), 12345);
        assert_eq!(parse_count("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_count_suffixes() {
        assert_eq!(parse_count("10k").unwrap(), 10_000);
        assert_eq!(parse_count("100M").unwrap(), 100_000_000);
        assert_eq!(parse_count("2G").unwrap(), 2_000_000_000);
        assert_eq!(parse_count("1T").unwrap(), 1_000_000_000_000);
    }

    #[test]
    fn test_parse_count_rejects_garbage() {
        assert!(parse_count("").is_err());
        assert!(parse_count("abc").is_err());
        assert!(parse_count("12.5M").is_err());
        assert!(parse_count("T").is_err());
    }

    #[test]
    fn test_host_list_parsing() {
        let cli = Cli::parse_from([
            "primegap",
            "--mode",
            "coordinator",
            "--host-list",
            "10.0.1.10:9999, 10.0.1.11:9999,",
        ]);
        cli.validate().unwrap();
        match cli.role().unwrap() {
            Role::Coordinator { worker_addresses } => {
                assert_eq!(worker_addresses, vec!["10.0.1.10:9999", "10.0.1.11:9999"]);
            }
            other => panic!("Wrong role: {:?}", other),
        }
    }

    #[test]
    fn test_coordinator_requires_hosts() {
        let cli = Cli::parse_from(["primegap", "--mode", "coordinator"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_default_role_is_standalone() {
        let cli = Cli::parse_from(["primegap"]);
        cli.validate().unwrap();
        assert!(matches!(cli.role().unwrap(), Role::Standalone));
    }
}
