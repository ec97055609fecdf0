//! primegap - Distributed prime gap search tool
//!
//! primegap searches for the largest gap between consecutive prime numbers
//! below a configurable ceiling by partitioning the range across a fixed set
//! of workers and reconciling their partial results at a coordinator.
//!
//! # Architecture
//!
//! - **Range scanner**: each worker walks the primes in its assigned subrange
//!   and tracks the largest internal gap plus the subrange's edge primes
//! - **Result aggregator**: the coordinator merges worker-local maxima with
//!   gaps that straddle partition boundaries ("edge gaps")
//! - **Pluggable primality**: trial division by default, swappable oracle
//! - **Distributed mode**: coordinator and worker services over TCP, with the
//!   same wire protocol driving single-machine runs

pub mod aggregate;
pub mod config;
pub mod distributed;
pub mod output;
pub mod primality;
pub mod progress;
pub mod scanner;

// Re-export commonly used types
pub use config::Config;
pub use primality::PrimalityOracle;
pub use scanner::{PrimeGap, SubrangeResult};

/// Result type used throughout primegap
pub type Result<T> = anyhow::Result<T>;
