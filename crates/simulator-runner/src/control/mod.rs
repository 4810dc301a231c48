//! HTTP/JSON control API over the worker pool.
//!
//! The server side wraps a [`WorkerPool`](crate::pool::WorkerPool); the
//! client side implements [`JobQueue`](crate::registry::JobQueue) so a
//! [`RunRegistry`](crate::registry::RunRegistry) can drive a pool hosted in
//! another process.

pub mod client;
pub mod server;

pub use client::ControlClient;
pub use server::ControlServer;

use crate::run::RunId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct HealthBody {
    pub status: String,
    /// Grace period of forceful revokes, in milliseconds
    #[serde(default)]
    pub grace_ms: u64,
}

impl HealthBody {
    pub fn healthy(grace: Duration) -> Self {
        Self {
            status: "healthy".to_string(),
            grace_ms: u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StatusBody {
    pub status: String,
}

impl StatusBody {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SubmitResponse {
    pub id: RunId,
}

/// Value of a boolean query parameter (`true`/`false`, `1`/`0`).
pub(crate) fn parse_query_flag(query: &str, name: &str) -> Option<bool> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| match value {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        })
}
