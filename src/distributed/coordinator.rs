//! Coordinator
//!
//! The coordinator (rank 0) owns the topology and the reduction:
//! - connects to every worker service
//! - sends each its subrange assignment
//! - collects one result record per rank, under a receive timeout so a hung
//!   worker surfaces as an error naming the rank instead of a silent hang
//! - validates, orders by rank, aggregates, and reports

use crate::aggregate::{aggregate, GlobalResult};
use crate::config::Config;
use crate::distributed::protocol::*;
use crate::output;
use crate::scanner::{subrange, SubrangeResult};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

/// Distributed coordinator
///
/// One worker rank per address, assigned in list order (1-based).
pub struct Coordinator {
    config: Arc<Config>,
    worker_addresses: Vec<String>,
}

impl Coordinator {
    /// Create a coordinator over a fixed worker topology.
    pub fn new(config: Arc<Config>, worker_addresses: Vec<String>) -> Result<Self> {
        if worker_addresses.is_empty() {
            anyhow::bail!("No workers specified");
        }

        Ok(Self {
            config,
            worker_addresses,
        })
    }

    /// Run the full search: assign, collect, aggregate, report.
    pub async fn run(self) -> Result<GlobalResult> {
        let num_workers = self.worker_addresses.len();

        println!("Coordinator");
        println!(
            "Search range: [0, {}) across {} workers",
            self.config.ceiling, num_workers
        );
        println!();
        println!("Connecting to {} workers...", num_workers);

        // Connect to all workers; any failure is fatal before partial output
        let mut connections = Vec::new();
        for (i, addr) in self.worker_addresses.iter().enumerate() {
            let rank = i + 1;
            let stream = TcpStream::connect(addr)
                .await
                .with_context(|| format!("Failed to connect to {} (rank {})", addr, rank))?;
            println!("  Connected to rank {} ({})", rank, addr);
            connections.push((rank, addr.clone(), stream));
        }

        println!();
        println!("Sending assignments...");
        for (rank, _addr, stream) in &mut connections {
            let assign = AssignMessage {
                protocol_version: PROTOCOL_VERSION,
                rank: *rank,
                num_workers,
                ceiling: self.config.ceiling,
                report_interval: self.config.report_interval,
            };
            write_message(stream, &Message::Assign(assign))
                .await
                .with_context(|| format!("Failed to send assignment to rank {}", rank))?;
        }

        println!("Waiting for results...");
        println!();
        let recv_timeout = Duration::from_secs(self.config.recv_timeout_secs);
        let mut results: Vec<SubrangeResult> = Vec::with_capacity(num_workers);
        for (rank, addr, stream) in &mut connections {
            let msg = tokio::time::timeout(recv_timeout, read_message(stream))
                .await
                .map_err(|_| {
                    anyhow::anyhow!(
                        "Timed out after {:?} waiting for result from rank {} ({})",
                        recv_timeout,
                        rank,
                        addr
                    )
                })?
                .with_context(|| format!("Failed to receive result from rank {}", rank))?;

            let reply = match msg {
                Message::Result(reply) => reply,
                Message::Error(err) => anyhow::bail!(
                    "Rank {} ({}) reported an error: {}",
                    err.rank.unwrap_or(*rank),
                    err.node_id,
                    err.error
                ),
                other => anyhow::bail!("Expected RESULT from rank {}, got {:?}", rank, other),
            };

            if reply.rank != *rank || reply.result.rank != *rank {
                anyhow::bail!(
                    "Rank mismatch: assigned {}, result tagged {}",
                    rank,
                    reply.rank
                );
            }
            reply
                .result
                .validate()
                .with_context(|| format!("Malformed result from rank {}", rank))?;

            // The record must cover exactly the subrange this rank was
            // assigned; anything else would corrupt the reduction
            let (expected_start, expected_end) =
                subrange(*rank, num_workers, self.config.ceiling);
            if reply.result.range_start != expected_start
                || reply.result.range_end != expected_end
            {
                anyhow::bail!(
                    "Rank {} scanned [{}, {}) but was assigned [{}, {})",
                    rank,
                    reply.result.range_start,
                    reply.result.range_end,
                    expected_start,
                    expected_end
                );
            }

            output::print_subrange_result(&reply.result, &reply.node_id);
            results.push(reply.result);
        }

        // Received in assignment order, but sort anyway: aggregation is
        // defined over ranks, not arrival order
        results.sort_by_key(|r| r.rank);
        let global = aggregate(&results)?;

        println!();
        output::print_global_result(&global);

        if let Some(ref path) = self.config.output_json {
            output::write_json(path, &results, &global)
                .with_context(|| format!("Failed to write JSON output to {}", path.display()))?;
            println!("Results written to {}", path.display());
        }

        Ok(global)
    }
}
