//! Mutation runs: the loop, the pool that executes them and the registry
//! that controls them.
//!
//! ```text
//!  simulate-run ──► ControlClient ──HTTP──► ControlServer ──► WorkerPool
//!                                                               │
//!                                              worker-N ◄───────┘
//!                                                 │
//!                                                 ▼
//!                                   engine::simulate ──► DocumentActions
//! ```
//!
//! [`RunRegistry`] lists and cancels runs through any [`JobQueue`]: the
//! pool itself, or a [`ControlClient`] talking to a pool in another process.

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod pool;
pub mod registry;
pub mod run;

pub use config::{parse_duration, ConfigError, PoolConfig};
pub use control::{ControlClient, ControlServer};
pub use engine::{simulate, ModelSource, PayloadSource, RunReport, SimulationConfig, SimulationError};
pub use error::ControlError;
pub use pool::WorkerPool;
pub use registry::{format_elapsed, ActiveRuns, CancelAll, CancelOutcome, JobQueue, RunRegistry, RunSummary};
pub use run::{ActiveRun, RunEntry, RunId, RunRequest, RunState, WorkerStatus, QUEUED};
