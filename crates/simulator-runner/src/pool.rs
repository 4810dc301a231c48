//! In-process worker pool executing mutation runs.
//!
//! Submitted runs go into a shared queue. Each of the `workers` tasks pulls
//! one run at a time, executes it as its own tokio task and records the
//! outcome in the run table, which is the single source of truth for
//! [`active`](WorkerPool::active) and [`revoke`](WorkerPool::revoke).

use crate::config::{ConfigError, PoolConfig};
use crate::engine::{simulate, ModelSource, RunReport, SimulationConfig, SimulationError};
use crate::error::ControlError;
use crate::registry::{ActiveRuns, JobQueue};
use crate::run::{RunEntry, RunId, RunRequest, RunState, WorkerStatus};
use chrono::Utc;
use simulator_actions::StoreConnector;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(20);

struct RunSlot {
    entry: RunEntry,
    cancel: watch::Sender<bool>,
    abort: Option<AbortHandle>,
}

struct PoolState {
    runs: Mutex<HashMap<RunId, RunSlot>>,
    workers: Mutex<BTreeMap<String, WorkerStatus>>,
    queue: tokio::sync::Mutex<mpsc::UnboundedReceiver<RunId>>,
    connector: Arc<dyn StoreConnector>,
}

// Map guards are never held across an await, so a poisoned lock only means
// a panic elsewhere; the data is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PoolState {
    /// Move a pending run to running on `worker`. Returns `None` if the run
    /// was cancelled while queued.
    fn claim(
        &self,
        id: &str,
        worker: &str,
    ) -> Option<(RunRequest, SimulationConfig, watch::Receiver<bool>)> {
        let mut runs = lock(&self.runs);
        let slot = runs.get_mut(id)?;
        if slot.entry.state != RunState::Pending {
            return None;
        }
        let config = match slot.entry.request.validate() {
            Ok(config) => config,
            Err(e) => {
                slot.entry.state = RunState::Failed(e.to_string());
                slot.entry.finished_at = Some(Utc::now());
                return None;
            }
        };
        slot.entry.state = RunState::Running;
        slot.entry.started_at = Some(Utc::now());
        slot.entry.worker = Some(worker.to_string());
        Some((slot.entry.request.clone(), config, slot.cancel.subscribe()))
    }

    fn attach(&self, id: &str, abort: AbortHandle) {
        if let Some(slot) = lock(&self.runs).get_mut(id) {
            slot.abort = Some(abort);
        }
    }

    fn finish(&self, id: &str, result: Result<Result<RunReport, SimulationError>, JoinError>) {
        let mut runs = lock(&self.runs);
        let Some(slot) = runs.get_mut(id) else {
            return;
        };
        slot.abort = None;
        // A forceful revoke may already have recorded the cancellation.
        if slot.entry.state.is_finished() {
            return;
        }

        slot.entry.state = match result {
            Ok(Ok(report)) => {
                let state = if report.cancelled {
                    RunState::Cancelled
                } else {
                    RunState::Completed
                };
                info!(
                    "Run {id} {:?} after {} iterations",
                    state, report.iterations
                );
                slot.entry.report = Some(report);
                state
            }
            Ok(Err(e)) => {
                error!("Run {id} failed: {e}");
                RunState::Failed(e.to_string())
            }
            Err(e) if e.is_cancelled() => RunState::Cancelled,
            Err(e) => {
                error!("Run {id} panicked: {e}");
                RunState::Failed(format!("run task panicked: {e}"))
            }
        };
        slot.entry.finished_at = Some(Utc::now());
    }

    /// Drop the oldest finished runs until at most `keep` remain.
    fn prune_finished(&self, keep: usize) {
        let mut runs = lock(&self.runs);
        let mut finished: Vec<_> = runs
            .iter()
            .filter(|(_, slot)| slot.entry.state.is_finished())
            .map(|(id, slot)| (slot.entry.finished_at, id.clone()))
            .collect();
        if finished.len() <= keep {
            return;
        }
        finished.sort();
        let excess = finished.len() - keep;
        for (_, id) in finished.into_iter().take(excess) {
            runs.remove(&id);
        }
        debug!("Pruned {excess} finished runs");
    }

    fn state_of(&self, id: &str) -> Option<RunState> {
        lock(&self.runs).get(id).map(|slot| slot.entry.state.clone())
    }

    fn heartbeat(&self, worker: &str, current_run: Option<&str>) {
        if let Some(status) = lock(&self.workers).get_mut(worker) {
            status.last_heartbeat = Utc::now();
            status.current_run = current_run.map(str::to_string);
        }
    }

    fn worker_finished_run(&self, worker: &str) {
        if let Some(status) = lock(&self.workers).get_mut(worker) {
            status.runs_finished += 1;
            status.current_run = None;
            status.last_heartbeat = Utc::now();
        }
    }

    fn worker_stopped(&self, worker: &str) {
        if let Some(status) = lock(&self.workers).get_mut(worker) {
            status.alive = false;
            status.current_run = None;
        }
    }
}

async fn execute(
    connector: Arc<dyn StoreConnector>,
    request: RunRequest,
    config: SimulationConfig,
    mut cancel: watch::Receiver<bool>,
) -> Result<RunReport, SimulationError> {
    let mut source = ModelSource::new(request.model, request.locale);
    simulate(connector.as_ref(), &mut source, &config, &mut cancel).await
}

async fn worker_loop(state: Arc<PoolState>, name: String) {
    debug!("Worker {name} started");
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);

    loop {
        let next = tokio::select! {
            next = async { state.queue.lock().await.recv().await } => next,
            _ = heartbeat.tick() => {
                state.heartbeat(&name, None);
                continue;
            }
        };
        let Some(id) = next else {
            break;
        };
        let Some((request, config, cancel)) = state.claim(&id, &name) else {
            debug!("Worker {name} skipped run {id}");
            continue;
        };

        info!("Worker {name} starting run {id} ({})", request.task_name());
        state.heartbeat(&name, Some(&id));
        let mut task: JoinHandle<Result<RunReport, SimulationError>> = tokio::spawn(execute(
            state.connector.clone(),
            request,
            config,
            cancel,
        ));
        state.attach(&id, task.abort_handle());

        let result = loop {
            tokio::select! {
                result = &mut task => break result,
                _ = heartbeat.tick() => state.heartbeat(&name, Some(&id)),
            }
        };
        state.finish(&id, result);
        state.worker_finished_run(&name);
    }

    state.worker_stopped(&name);
    debug!("Worker {name} stopped");
}

/// Bounded pool of workers executing submitted runs.
pub struct WorkerPool {
    state: Arc<PoolState>,
    sender: Mutex<Option<mpsc::UnboundedSender<RunId>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    grace: Duration,
    retain_finished: usize,
}

impl WorkerPool {
    /// Spawn `config.workers` workers. Must be called inside a tokio runtime.
    pub fn start(
        config: &PoolConfig,
        connector: Arc<dyn StoreConnector>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut workers = BTreeMap::new();
        for i in 1..=config.workers {
            let name = format!("worker-{i}");
            workers.insert(name.clone(), WorkerStatus::new(name));
        }

        let state = Arc::new(PoolState {
            runs: Mutex::new(HashMap::new()),
            workers: Mutex::new(workers),
            queue: tokio::sync::Mutex::new(receiver),
            connector,
        });

        let names: Vec<String> = lock(&state.workers).keys().cloned().collect();
        let handles = names
            .into_iter()
            .map(|name| tokio::spawn(worker_loop(state.clone(), name)))
            .collect();

        info!("Worker pool started with {} workers", config.workers);
        Ok(Self {
            state,
            sender: Mutex::new(Some(sender)),
            handles: Mutex::new(handles),
            grace: config.grace,
            retain_finished: config.retain_finished,
        })
    }

    /// How long a forceful revoke may wait before aborting.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Validate and queue a run.
    pub fn submit_run(&self, request: RunRequest) -> Result<RunId, ControlError> {
        request.validate()?;

        let sender = lock(&self.sender);
        let Some(sender) = sender.as_ref() else {
            return Err(ControlError::ShutDown);
        };

        self.state.prune_finished(self.retain_finished);
        let id = uuid::Uuid::new_v4().to_string();
        let (cancel, _) = watch::channel(false);
        lock(&self.state.runs).insert(
            id.clone(),
            RunSlot {
                entry: RunEntry::pending(id.clone(), request),
                cancel,
                abort: None,
            },
        );
        sender.send(id.clone()).map_err(|_| ControlError::ShutDown)?;
        debug!("Run {id} queued");
        Ok(id)
    }

    /// Pending and running runs per worker.
    pub fn active_runs(&self) -> ActiveRuns {
        let runs = lock(&self.state.runs);
        let mut grouped = ActiveRuns::new();
        for slot in runs.values().filter(|slot| slot.entry.state.is_active()) {
            let run = slot.entry.to_active();
            grouped.entry(run.worker.clone()).or_default().push(run);
        }
        for runs in grouped.values_mut() {
            runs.sort_by_key(|run| run.submitted_at);
        }
        grouped
    }

    /// Snapshot of one run's entry, finished runs included.
    pub fn entry(&self, id: &str) -> Option<RunEntry> {
        lock(&self.state.runs).get(id).map(|slot| slot.entry.clone())
    }

    /// Liveness of every worker.
    pub fn workers(&self) -> Vec<WorkerStatus> {
        lock(&self.state.workers).values().cloned().collect()
    }

    /// Stop a run.
    ///
    /// A pending run is cancelled immediately. A running run receives the
    /// cancellation signal; when `forceful`, the pool waits up to the grace
    /// period and then aborts the run's task. Unknown or finished runs are
    /// left alone.
    pub async fn revoke_run(&self, id: &str, forceful: bool) {
        let abort = {
            let mut runs = lock(&self.state.runs);
            let Some(slot) = runs.get_mut(id) else {
                debug!("Revoke of unknown run {id} ignored");
                return;
            };
            match slot.entry.state {
                RunState::Pending => {
                    slot.entry.state = RunState::Cancelled;
                    slot.entry.finished_at = Some(Utc::now());
                    info!("Run {id} cancelled before start");
                    return;
                }
                RunState::Running => {
                    slot.cancel.send_replace(true);
                    slot.abort.clone()
                }
                _ => return,
            }
        };

        info!("Cancellation signalled to run {id}");
        if !forceful {
            return;
        }

        let stopped = tokio::time::timeout(self.grace, async {
            while self.state.state_of(id).is_some_and(|s| s.is_active()) {
                tokio::time::sleep(STOP_POLL_INTERVAL).await;
            }
        })
        .await
        .is_ok();
        if stopped {
            return;
        }

        warn!("Run {id} did not stop within {:?}, aborting", self.grace);
        let abort = abort.or_else(|| lock(&self.state.runs).get(id).and_then(|s| s.abort.clone()));
        if let Some(handle) = abort {
            handle.abort();
        }
        let mut runs = lock(&self.state.runs);
        if let Some(slot) = runs.get_mut(id) {
            if slot.entry.state.is_active() {
                slot.entry.state = RunState::Cancelled;
                slot.entry.finished_at = Some(Utc::now());
            }
        }
    }

    /// Stop accepting runs, cancel everything and wait for the workers.
    pub async fn shutdown(&self) {
        lock(&self.sender).take();

        let ids: Vec<RunId> = self
            .active_runs()
            .into_values()
            .flatten()
            .map(|run| run.id)
            .collect();
        for id in &ids {
            self.revoke_run(id, true).await;
        }

        let handles: Vec<_> = lock(&self.handles).drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Worker task ended abnormally: {e}");
            }
        }
        info!("Worker pool shut down ({} runs cancelled)", ids.len());
    }
}

#[async_trait::async_trait]
impl JobQueue for WorkerPool {
    async fn submit(&self, request: RunRequest) -> Result<RunId, ControlError> {
        self.submit_run(request)
    }

    async fn active(&self) -> Result<ActiveRuns, ControlError> {
        Ok(self.active_runs())
    }

    async fn revoke(&self, id: &str, forceful: bool) -> Result<(), ControlError> {
        self.revoke_run(id, forceful).await;
        Ok(())
    }
}
