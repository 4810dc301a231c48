//! mongo-simulator: synthetic CRUD traffic for MongoDB.
//!
//! The binary has two sides:
//!
//! - `worker` hosts a [`WorkerPool`](simulator_runner::WorkerPool) and serves
//!   the control API.
//! - `simulate-run`, `simulate-list` and `simulate-revoke` talk to that API.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;
