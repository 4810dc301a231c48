//! CLI argument definitions for mongo-simulator.

use clap::{Args, Parser, Subcommand};
use simulator_actions::{Action, EditingGrade};
use simulator_generator::{Locale, Model};
use simulator_runner::{ConfigError, RunRequest};
use std::path::PathBuf;

/// Default MongoDB address (overridden by `MONGODB_ADDRESS`).
pub const DEFAULT_DB_ADDRESS: &str = "mongodb://mongodb:27017/";

/// Default database name (overridden by `DB_NAME`).
pub const DEFAULT_DB_NAME: &str = "montogre";

/// Default control server URL (overridden by `SIMULATOR_CONTROL_URL`).
pub const DEFAULT_CONTROL_URL: &str = "http://127.0.0.1:9090";

/// Simulated CRUD traffic against MongoDB.
#[derive(Parser)]
#[command(name = "mongo-simulator")]
#[command(about = "Inject synthetic create/update/delete traffic into MongoDB")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Host the worker pool and its control server
    Worker(WorkerArgs),

    /// Start one simulation per model
    #[command(name = "simulate-run")]
    SimulateRun(RunArgs),

    /// List running simulations
    #[command(name = "simulate-list")]
    SimulateList(ControlArgs),

    /// Cancel simulations by id, or all of them
    #[command(name = "simulate-revoke")]
    SimulateRevoke(RevokeArgs),
}

/// Where the control server lives.
#[derive(Args, Debug, Clone)]
pub struct ControlArgs {
    /// Control server URL
    #[arg(long, env = "SIMULATOR_CONTROL_URL", default_value = DEFAULT_CONTROL_URL)]
    pub control_url: String,
}

/// Arguments for `worker`.
#[derive(Args, Debug, Clone)]
pub struct WorkerArgs {
    /// TOML file with `listen`, `workers` and `grace`
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Control server bind address (overrides the config file)
    #[arg(long)]
    pub listen: Option<String>,

    /// Number of concurrently executing runs (overrides the config file)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Time a forceful revoke waits before aborting a run, e.g. "5s" (overrides the config file)
    #[arg(long)]
    pub grace: Option<String>,

    /// Use an in-process store instead of MongoDB
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `simulate-run`.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Models to simulate (driver, vehicle, client, location, product, delivery)
    #[arg(required = true, value_parser = parse_model)]
    pub models: Vec<Model>,

    /// MongoDB address
    #[arg(short = 'a', long, env = "MONGODB_ADDRESS", default_value = DEFAULT_DB_ADDRESS)]
    pub db_address: String,

    /// Database name
    #[arg(short = 'n', long, env = "DB_NAME", default_value = DEFAULT_DB_NAME)]
    pub db_name: String,

    /// Upper bound, in seconds, of the random pause between actions
    #[arg(short = 't', long, allow_negative_numbers = true)]
    pub time_action: Option<f64>,

    /// Restrict the actions performed (repeatable: create, update, delete)
    #[arg(short = 'c', long = "custom-actions", value_parser = parse_action)]
    pub custom_actions: Vec<Action>,

    /// Percentage of fields an update overwrites (default 10)
    #[arg(short = 'e', long, conflicts_with = "editing_count")]
    pub editing_grade: Option<u32>,

    /// Absolute number of fields an update overwrites
    #[arg(long)]
    pub editing_count: Option<usize>,

    /// Number of actions per simulation (unbounded when omitted)
    #[arg(short = 'q', long)]
    pub quantity_interactions: Option<u64>,

    /// Locale of the generated data (pt-BR, en-US)
    #[arg(long, default_value = "pt-BR")]
    pub locale: Locale,

    /// Collection name override (defaults to the model's collection)
    #[arg(long)]
    pub collection: Option<String>,

    #[command(flatten)]
    pub control: ControlArgs,
}

/// Arguments for `simulate-revoke`.
#[derive(Args, Debug, Clone)]
pub struct RevokeArgs {
    /// Ids of the simulations to cancel
    pub ids: Vec<String>,

    /// Cancel every running simulation
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub control: ControlArgs,
}

fn parse_model(s: &str) -> Result<Model, ConfigError> {
    s.parse()
        .map_err(|_| ConfigError::UnknownModel(s.to_string()))
}

fn parse_action(s: &str) -> Result<Action, ConfigError> {
    s.parse()
        .map_err(|_| ConfigError::UnknownAction(s.to_string()))
}

impl RunArgs {
    pub fn editing_grade(&self) -> EditingGrade {
        match (self.editing_grade, self.editing_count) {
            (_, Some(count)) => EditingGrade::Count(count),
            (Some(percent), None) => EditingGrade::Percent(percent),
            (None, None) => EditingGrade::default(),
        }
    }

    /// One request per requested model, in argument order.
    pub fn to_requests(&self) -> Vec<RunRequest> {
        self.models
            .iter()
            .map(|model| RunRequest {
                model: *model,
                store_address: self.db_address.clone(),
                database: self.db_name.clone(),
                collection: self.collection.clone(),
                locale: self.locale,
                pacing: self.time_action,
                actions: self.custom_actions.clone(),
                editing_grade: self.editing_grade(),
                iterations: self.quantity_interactions,
            })
            .collect()
    }
}
