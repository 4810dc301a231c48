//! `worker`: host the pool and its control server until interrupted.

use crate::cli::WorkerArgs;
use anyhow::Context;
use simulator_actions::{MemoryStore, MongoConnector, StoreConnector};
use simulator_runner::{parse_duration, ControlServer, PoolConfig, WorkerPool};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Pool settings from the config file (if any) with CLI overrides applied.
pub fn resolve_config(args: &WorkerArgs) -> anyhow::Result<PoolConfig> {
    let mut config = match &args.config {
        Some(path) => PoolConfig::from_file(path)
            .with_context(|| format!("Failed to load worker config from {}", path.display()))?,
        None => PoolConfig::default(),
    };

    if let Some(listen) = &args.listen {
        config.listen = listen.clone();
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(grace) = &args.grace {
        config.grace = parse_duration(grace)?;
    }
    config.validate()?;
    Ok(config)
}

fn setup_shutdown_handler() -> broadcast::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install CTRL+C signal handler: {e}");
            return;
        }
        info!("Received interrupt signal (Ctrl+C)");
        let _ = shutdown_tx.send(());
    });

    shutdown_rx
}

pub async fn execute(args: WorkerArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;

    let connector: Arc<dyn StoreConnector> = if args.dry_run {
        info!("Dry run: documents are kept in memory");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(MongoConnector::new())
    };

    let pool = Arc::new(WorkerPool::start(&config, connector)?);
    let server = ControlServer::bind(&config.listen, pool.clone())
        .await
        .with_context(|| format!("Failed to bind control server to {}", config.listen))?;

    let result = server.serve(setup_shutdown_handler()).await;
    pool.shutdown().await;
    result?;
    Ok(())
}
