//! Discover and cancel in-flight runs through a job-queue capability.

use crate::error::ControlError;
use crate::run::{ActiveRun, RunId, RunRequest};
use chrono::Utc;
use simulator_actions::Action;
use simulator_generator::Model;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// Active runs grouped by worker name (pending runs under [`QUEUED`](crate::run::QUEUED)).
pub type ActiveRuns = BTreeMap<String, Vec<ActiveRun>>;

/// The job-queue facility runs are submitted to and controlled through.
#[async_trait::async_trait]
pub trait JobQueue: Send + Sync {
    /// Queue a run and return its identifier.
    async fn submit(&self, request: RunRequest) -> Result<RunId, ControlError>;

    /// Pending and running runs, per worker.
    async fn active(&self) -> Result<ActiveRuns, ControlError>;

    /// Ask a run to stop. Unknown identifiers are ignored.
    async fn revoke(&self, id: &str, forceful: bool) -> Result<(), ControlError>;
}

#[async_trait::async_trait]
impl<Q: JobQueue + ?Sized> JobQueue for std::sync::Arc<Q> {
    async fn submit(&self, request: RunRequest) -> Result<RunId, ControlError> {
        (**self).submit(request).await
    }

    async fn active(&self) -> Result<ActiveRuns, ControlError> {
        (**self).active().await
    }

    async fn revoke(&self, id: &str, forceful: bool) -> Result<(), ControlError> {
        (**self).revoke(id, forceful).await
    }
}

/// One row of the active-run listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub id: RunId,
    pub model: Model,
    pub task_name: String,
    pub worker: String,
    pub elapsed: Duration,
    /// Iteration budget; `None` for unbounded runs
    pub iterations: Option<u64>,
    /// Eligible actions as submitted (empty means all)
    pub actions: Vec<Action>,
}

/// Result of cancelling one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled(RunId),
    /// Not active before the call, or still active after it.
    NotFound(RunId),
}

/// Result of cancelling every active run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelAll {
    NothingToCancel,
    Attempted(Vec<CancelOutcome>),
}

/// Format a duration as `HH:MM:SS`, zero-padded. Hours are not capped.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn active_ids(active: &ActiveRuns) -> Vec<RunId> {
    active
        .values()
        .flatten()
        .map(|run| run.id.clone())
        .collect()
}

fn is_active(active: &ActiveRuns, id: &str) -> bool {
    active.values().flatten().any(|run| run.id == id)
}

/// Run registry over a [`JobQueue`].
pub struct RunRegistry<Q> {
    queue: Q,
}

impl<Q: JobQueue> RunRegistry<Q> {
    pub fn new(queue: Q) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn into_inner(self) -> Q {
        self.queue
    }

    /// Every pending or running run. An empty list is not an error.
    pub async fn list_active_runs(&self) -> Result<Vec<RunSummary>, ControlError> {
        let active = self.queue.active().await?;
        let now = Utc::now();

        Ok(active
            .into_iter()
            .flat_map(|(worker, runs)| {
                runs.into_iter().map(move |run| RunSummary {
                    elapsed: run.elapsed(now),
                    task_name: run.request.task_name(),
                    iterations: run.request.iterations,
                    actions: run.request.actions.clone(),
                    model: run.model,
                    worker: worker.clone(),
                    id: run.id,
                })
            })
            .collect())
    }

    /// Forcefully revoke one run and confirm it left the active set.
    pub async fn cancel(&self, id: &str) -> Result<CancelOutcome, ControlError> {
        let active = self.queue.active().await?;
        if !is_active(&active, id) {
            debug!("Run {id} is not active, nothing to revoke");
            return Ok(CancelOutcome::NotFound(id.to_string()));
        }
        self.revoke_and_confirm(id).await
    }

    /// Forcefully revoke every run active at call time.
    pub async fn cancel_all(&self) -> Result<CancelAll, ControlError> {
        let ids = active_ids(&self.queue.active().await?);
        if ids.is_empty() {
            return Ok(CancelAll::NothingToCancel);
        }

        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            outcomes.push(self.revoke_and_confirm(&id).await?);
        }
        Ok(CancelAll::Attempted(outcomes))
    }

    async fn revoke_and_confirm(&self, id: &str) -> Result<CancelOutcome, ControlError> {
        self.queue.revoke(id, true).await?;
        let active = self.queue.active().await?;
        if is_active(&active, id) {
            debug!("Run {id} still active after revoke");
            Ok(CancelOutcome::NotFound(id.to_string()))
        } else {
            info!("Run {id} revoked");
            Ok(CancelOutcome::Cancelled(id.to_string()))
        }
    }
}
