//! Run requests, run entries and their lifecycle.

use crate::config::ConfigError;
use crate::engine::{RunReport, SimulationConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use simulator_actions::{Action, EditingGrade};
use simulator_generator::{Locale, Model};
use std::time::Duration;

/// Identifier assigned to a run on submission (UUID v4).
pub type RunId = String;

/// Worker name pending runs are listed under.
pub const QUEUED: &str = "queued";

/// Everything needed to start one run, as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub model: Model,
    pub store_address: String,
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default)]
    pub locale: Locale,
    /// Upper bound, in seconds, of the delay between iterations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacing: Option<f64>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub editing_grade: EditingGrade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u64>,
}

impl RunRequest {
    /// Request with defaults for everything but the target.
    pub fn new(model: Model, store_address: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            model,
            store_address: store_address.into(),
            database: database.into(),
            collection: None,
            locale: Locale::default(),
            pacing: None,
            actions: Vec::new(),
            editing_grade: EditingGrade::default(),
            iterations: None,
        }
    }

    /// Name the run is listed under (e.g., "simulate_driver_data").
    pub fn task_name(&self) -> String {
        self.model.task_name()
    }

    /// Check the request and turn it into loop settings.
    ///
    /// A pacing of zero means no delay. Negative, non-finite or
    /// unrepresentable pacing and a percentage outside `1..=100` are rejected.
    pub fn validate(&self) -> Result<SimulationConfig, ConfigError> {
        let pacing = match self.pacing {
            None => None,
            Some(secs) if !secs.is_finite() || secs < 0.0 => {
                return Err(ConfigError::InvalidPacing(secs))
            }
            Some(secs) if secs == 0.0 => None,
            Some(secs) => Some(
                Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidPacing(secs))?,
            ),
        };

        if let EditingGrade::Percent(percent) = self.editing_grade {
            if !(1..=100).contains(&percent) {
                return Err(ConfigError::InvalidEditingGrade(format!(
                    "{percent}% (expected 1 to 100)"
                )));
            }
        }

        Ok(SimulationConfig {
            store_address: self.store_address.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
            pacing,
            actions: self.actions.clone(),
            editing_grade: self.editing_grade,
            iterations: self.iterations,
        })
    }
}

/// Lifecycle state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum RunState {
    Pending,
    Running,
    Completed,
    Cancelled,
    Failed(String),
}

impl RunState {
    /// Pending or running.
    pub fn is_active(&self) -> bool {
        matches!(self, RunState::Pending | RunState::Running)
    }

    pub fn is_finished(&self) -> bool {
        !self.is_active()
    }
}

/// Registry entry of one run. Only the pool mutates entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    pub id: RunId,
    pub request: RunRequest,
    pub state: RunState,
    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub worker: Option<String>,
    pub report: Option<RunReport>,
}

impl RunEntry {
    pub fn pending(id: RunId, request: RunRequest) -> Self {
        Self {
            id,
            request,
            state: RunState::Pending,
            submitted_at: Utc::now(),
            started_at: None,
            finished_at: None,
            worker: None,
            report: None,
        }
    }

    pub fn to_active(&self) -> ActiveRun {
        ActiveRun {
            id: self.id.clone(),
            model: self.request.model,
            worker: self.worker.clone().unwrap_or_else(|| QUEUED.to_string()),
            submitted_at: self.submitted_at,
            started_at: self.started_at,
            request: self.request.clone(),
        }
    }
}

/// Introspection view of a pending or running run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRun {
    pub id: RunId,
    pub model: Model,
    pub worker: String,
    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub request: RunRequest,
}

impl ActiveRun {
    /// Time elapsed since the run started, or since submission while queued.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let since = self.started_at.unwrap_or(self.submitted_at);
        (now - since).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Liveness of one pool worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub name: String,
    pub alive: bool,
    pub current_run: Option<RunId>,
    pub runs_finished: u64,
    pub last_heartbeat: DateTime<Utc>,
}

impl WorkerStatus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alive: true,
            current_run: None,
            runs_finished: 0,
            last_heartbeat: Utc::now(),
        }
    }
}
