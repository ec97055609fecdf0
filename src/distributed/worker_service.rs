//! Worker service
//!
//! Runs on each worker node. The service:
//! - listens for a connection from the coordinator
//! - receives one ASSIGN message naming its rank and subrange parameters
//! - runs the range scan on a blocking thread (the scan is pure CPU)
//! - sends back exactly one RESULT (or ERROR) message

use crate::config::Config;
use crate::distributed::protocol::*;
use crate::primality::{PrimalityOracle, TrialDivision};
use crate::progress::ConsoleProgress;
use crate::scanner;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{TcpListener, TcpStream};

/// Worker service
pub struct WorkerService {
    listener: TcpListener,
    node_id: String,
    oracle: Arc<dyn PrimalityOracle>,
}

impl WorkerService {
    /// Bind the service to a port.
    ///
    /// Port 0 binds an ephemeral port; `local_port()` reports the choice.
    /// Standalone mode uses this to run services in-process without port
    /// coordination.
    pub async fn bind(listen_port: u16) -> Result<Self> {
        let addr = format!("0.0.0.0:{}", listen_port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind worker service on {}", addr))?;

        Ok(Self {
            listener,
            node_id: get_node_id(),
            oracle: Arc::new(TrialDivision),
        })
    }

    /// Replace the default trial-division oracle.
    pub fn with_oracle(mut self, oracle: Arc<dyn PrimalityOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// The port this service is listening on.
    pub fn local_port(&self) -> Result<u16> {
        Ok(self
            .listener
            .local_addr()
            .context("Failed to read local address")?
            .port())
    }

    /// Run the service: accept assignments until the process is killed.
    pub async fn run(self) -> Result<()> {
        println!("Worker service listening on port {}", self.local_port()?);
        println!("Node ID: {}", self.node_id);
        println!("Waiting for coordinator connection...");

        loop {
            let (stream, addr) = self
                .listener
                .accept()
                .await
                .context("Failed to accept connection")?;

            println!("Coordinator connected from: {}", addr);

            if let Err(e) = self.handle_assignment(stream).await {
                eprintln!("Assignment failed: {:#}", e);
            }

            println!("Assignment complete. Waiting for next connection...");
        }
    }

    /// Serve exactly one assignment, then return.
    ///
    /// Standalone mode spawns one of these per worker task.
    pub async fn run_once(self) -> Result<()> {
        let (stream, _) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        self.handle_assignment(stream).await
    }

    /// Handle a single ASSIGN/RESULT exchange.
    async fn handle_assignment(&self, mut stream: TcpStream) -> Result<()> {
        let assign = match read_message(&mut stream).await? {
            Message::Assign(assign) => assign,
            other => anyhow::bail!("Expected ASSIGN message, got {:?}", other),
        };

        if assign.protocol_version != PROTOCOL_VERSION {
            let error = ErrorMessage {
                node_id: self.node_id.clone(),
                rank: Some(assign.rank),
                error: format!(
                    "Protocol version mismatch: coordinator={}, worker={}",
                    assign.protocol_version, PROTOCOL_VERSION
                ),
            };
            write_message(&mut stream, &Message::Error(error)).await?;
            anyhow::bail!("Protocol version mismatch");
        }

        let AssignMessage {
            rank,
            num_workers,
            ceiling,
            report_interval,
            ..
        } = assign;

        println!(
            "Rank {} assigned: scanning 1/{} of [0, {})",
            rank, num_workers, ceiling
        );

        let oracle = Arc::clone(&self.oracle);
        let start = Instant::now();
        let scan = tokio::task::spawn_blocking(move || {
            scanner::scan(
                rank,
                num_workers,
                ceiling,
                oracle.as_ref(),
                &ConsoleProgress,
                report_interval,
            )
        })
        .await;

        let result = match scan {
            Ok(result) => result,
            Err(e) => {
                // Scan panicked; report before failing so the coordinator
                // does not have to wait out its receive timeout.
                let error = ErrorMessage {
                    node_id: self.node_id.clone(),
                    rank: Some(rank),
                    error: format!("Scan task failed: {}", e),
                };
                write_message(&mut stream, &Message::Error(error)).await?;
                anyhow::bail!("Scan task failed: {}", e);
            }
        };
        let duration = start.elapsed();

        println!(
            "Rank {} finished [{}, {}) in {:.2}s",
            result.rank,
            result.range_start,
            result.range_end,
            duration.as_secs_f64()
        );

        let reply = ResultMessage {
            node_id: self.node_id.clone(),
            rank: result.rank,
            result,
            duration_ns: duration.as_nanos() as u64,
        };
        write_message(&mut stream, &Message::Result(reply)).await?;

        Ok(())
    }
}

/// Node identifier for result tagging: hostname, or a fixed fallback.
fn get_node_id() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown-host".to_string())
}

/// Spawn in-process worker services on ephemeral localhost ports.
///
/// Returns the localhost addresses to hand the coordinator. Each service
/// serves exactly one assignment and exits; this is the standalone-mode
/// topology.
pub async fn spawn_local_workers(config: &Config) -> Result<Vec<String>> {
    let mut addresses = Vec::with_capacity(config.workers);
    for rank in 1..=config.workers {
        let service = WorkerService::bind(0)
            .await
            .with_context(|| format!("Failed to start local worker for rank {}", rank))?;
        let port = service.local_port()?;
        addresses.push(format!("127.0.0.1:{}", port));
        tokio::spawn(async move {
            if let Err(e) = service.run_once().await {
                eprintln!("Local worker failed: {:#}", e);
            }
        });
    }
    Ok(addresses)
}
