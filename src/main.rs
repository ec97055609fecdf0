//! primegap CLI entry point

use anyhow::{Context, Result};
use primegap::config::cli::{parse_count, Cli, Role};
use primegap::config::toml::FileConfig;
use primegap::config::Config;
use primegap::distributed::worker_service::spawn_local_workers;
use primegap::distributed::{Coordinator, WorkerService};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("primegap v{}", env!("CARGO_PKG_VERSION"));
    println!("Distributed prime gap search");
    println!();

    let cli = Cli::parse_args();
    cli.validate()?;

    // Role-based dispatch, resolved exactly once
    match cli.role()? {
        Role::Standalone => run_standalone(cli),
        Role::Coordinator { worker_addresses } => run_coordinator(cli, worker_addresses),
        Role::Worker { listen_port } => run_worker(listen_port),
    }
}

/// Build the run configuration: defaults, then TOML file, then CLI flags.
fn build_config_from_cli(cli: &Cli) -> Result<Config> {
    let mut config = Config::default();

    if let Some(ref path) = cli.config {
        FileConfig::load(path)?.apply(&mut config);
    }

    if let Some(ref ceiling) = cli.ceiling {
        config.ceiling = parse_count(ceiling).context("Invalid ceiling")?;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(ref interval) = cli.report_interval {
        config.report_interval = parse_count(interval).context("Invalid report interval")?;
    }
    if let Some(timeout) = cli.recv_timeout {
        config.recv_timeout_secs = timeout;
    }
    if let Some(ref path) = cli.output_json {
        config.output_json = Some(path.clone());
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

/// Run coordinator and workers in one process over localhost.
fn run_standalone(cli: Cli) -> Result<()> {
    let config = build_config_from_cli(&cli)?;

    println!(
        "Standalone: ceiling {} across {} workers",
        config.ceiling, config.workers
    );

    if cli.dry_run {
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(async {
        let config = Arc::new(config);
        let addresses = spawn_local_workers(&config).await?;
        let coordinator = Coordinator::new(Arc::clone(&config), addresses)
            .context("Failed to create coordinator")?;
        coordinator.run().await?;
        Ok(())
    })
}

/// Drive remote worker services.
fn run_coordinator(cli: Cli, worker_addresses: Vec<String>) -> Result<()> {
    let mut config = build_config_from_cli(&cli)?;
    // One rank per address; the address list is the topology
    config.workers = worker_addresses.len();
    config.validate()?;

    if cli.dry_run {
        println!(
            "Dry run mode - would assign {} workers over [0, {})",
            config.workers, config.ceiling
        );
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(async {
        let coordinator = Coordinator::new(Arc::new(config), worker_addresses)
            .context("Failed to create coordinator")?;
        coordinator.run().await?;
        Ok(())
    })
}

/// Run a worker service until killed.
fn run_worker(listen_port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(async {
        let service = WorkerService::bind(listen_port).await?;
        service.run().await
    })
}
