//! Error types for the job-queue capability.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors returned by a [`JobQueue`](crate::registry::JobQueue)
/// implementation, local or remote.
#[derive(Error, Debug)]
pub enum ControlError {
    /// The local pool refused the request.
    #[error("Invalid run configuration: {0}")]
    Config(#[from] ConfigError),

    /// The remote control server refused the request.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The pool no longer accepts runs.
    #[error("Worker pool is shut down")]
    ShutDown,

    /// The control server could not be reached.
    #[error("Failed to connect to control server at {address}: {source}")]
    Unreachable {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed HTTP exchange or unexpected status.
    #[error("Protocol error: {0}")]
    Protocol(String),
}
