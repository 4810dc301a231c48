//! Command-line interface for mongo-simulator
//!
//! # Usage Examples
//!
//! ```bash
//! # Host the worker pool (in-memory store, no MongoDB needed)
//! mongo-simulator worker --workers 4 --dry-run
//!
//! # Create-only traffic on drivers, 100 actions, up to 2s apart
//! mongo-simulator simulate-run driver -c create -q 100 -t 2
//!
//! # Endless mixed traffic on vehicles and deliveries, 25% of fields per update
//! mongo-simulator simulate-run vehicle delivery -e 25
//!
//! # Inspect and cancel
//! mongo-simulator simulate-list
//! mongo-simulator simulate-revoke 0b8e5d7c-2f4b-4d0e-9c2a-1f6f4c3e9a11
//! mongo-simulator simulate-revoke --all
//! ```

use clap::Parser;
use mongo_simulator::cli::{Cli, Commands};
use mongo_simulator::{commands, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Worker(args) => commands::worker::execute(args).await,
        Commands::SimulateRun(args) => commands::run::execute(args).await,
        Commands::SimulateList(args) => commands::list::execute(args).await,
        Commands::SimulateRevoke(args) => commands::revoke::execute(args).await,
    }
}
