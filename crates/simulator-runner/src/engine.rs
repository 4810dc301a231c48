//! The randomized mutation loop.
//!
//! One call to [`simulate`] is one run: it draws an action per iteration,
//! fabricates a payload for the bound model, applies the action through
//! [`DocumentActions`] and sleeps for a random share of the pacing interval.
//! Iterations are strictly sequential.

use rand::Rng;
use serde::{Deserialize, Serialize};
use simulator_actions::{
    to_payload, Action, ActionError, ActionOutcome, DocumentActions, EditingGrade, StoreConnector,
};
use simulator_generator::{
    CollectionBatch, GeneratorError, Locale, Model, Quantity, RecordGenerator,
};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

/// Errors that end a run as failed.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Document action failed: {0}")]
    Action(#[from] ActionError),

    #[error("Record generation failed: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Payload source returned no record for collection '{0}'")]
    EmptyBatch(String),
}

/// Validated settings of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub store_address: String,
    pub database: String,
    /// Collection override; the model's default collection when `None`
    pub collection: Option<String>,
    /// Upper bound of the random delay between iterations
    pub pacing: Option<Duration>,
    /// Eligible actions; empty means all three
    pub actions: Vec<Action>,
    pub editing_grade: EditingGrade,
    /// Iterations to execute; unbounded when `None`
    pub iterations: Option<u64>,
}

impl SimulationConfig {
    /// Actions the loop draws from.
    pub fn action_set(&self) -> Vec<Action> {
        let mut actions = self.actions.clone();
        actions.sort();
        actions.dedup();
        if actions.is_empty() {
            Action::ALL.to_vec()
        } else {
            actions
        }
    }
}

/// What a run did before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub iterations: u64,
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
    /// Updates and deletes that had to create their target first
    pub fallback_creates: u64,
    /// The run stopped on a cancellation signal
    pub cancelled: bool,
}

impl RunReport {
    fn record(&mut self, outcome: &ActionOutcome) {
        self.iterations += 1;
        match outcome.action {
            Action::Create => self.created += 1,
            Action::Update => self.updated += 1,
            Action::Delete => self.deleted += 1,
        }
        if outcome.created_target {
            self.fallback_creates += 1;
        }
    }
}

/// Source of candidate payloads for the loop.
pub trait PayloadSource: Send {
    /// One batch of quantity 1 for the bound model.
    fn next_batch(&mut self, collection: Option<&str>) -> Result<CollectionBatch, GeneratorError>;
}

/// [`PayloadSource`] backed by a [`RecordGenerator`] bound to one model.
pub struct ModelSource {
    model: Model,
    generator: RecordGenerator,
}

impl ModelSource {
    pub fn new(model: Model, locale: Locale) -> Self {
        Self {
            model,
            generator: RecordGenerator::new(locale),
        }
    }

    pub fn with_generator(model: Model, generator: RecordGenerator) -> Self {
        Self { model, generator }
    }

    pub fn model(&self) -> Model {
        self.model
    }
}

impl PayloadSource for ModelSource {
    fn next_batch(&mut self, collection: Option<&str>) -> Result<CollectionBatch, GeneratorError> {
        self.generator.generate(self.model, collection, Quantity::ONE)
    }
}

/// Resolves once `cancel` reads `true`. Never resolves if the sender is
/// dropped without cancelling.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let closed = cancel.wait_for(|stop| *stop).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}

/// Per-action log label. Updates under a non-default editing grade are
/// starred.
fn log_label(action: Action, grade: EditingGrade) -> &'static str {
    match action {
        Action::Update if grade != EditingGrade::default() => "UPDATE* DOCUMENT",
        _ => action.log_label(),
    }
}

fn log_outcome(outcome: &ActionOutcome, grade: EditingGrade) {
    let label = log_label(outcome.action, grade);
    match outcome.action {
        Action::Update => info!(
            target: "simulator",
            action = %outcome.action,
            collection = %outcome.collection,
            id = %outcome.id,
            fallback_create = outcome.created_target,
            fields_updated = outcome.fields_updated,
            grade = %grade,
            "{label} [{} - ObjectID: {}]",
            outcome.collection,
            outcome.id
        ),
        _ => info!(
            target: "simulator",
            action = %outcome.action,
            collection = %outcome.collection,
            id = %outcome.id,
            fallback_create = outcome.created_target,
            "{label} [{} - ObjectID: {}]",
            outcome.collection,
            outcome.id
        ),
    }
}

/// Run the mutation loop until the iteration budget is spent or `cancel`
/// flips to `true`.
///
/// Cancellation is checked at every iteration boundary and interrupts the
/// pacing sleep. Adapter and generator failures are not retried.
pub async fn simulate(
    connector: &dyn StoreConnector,
    source: &mut dyn PayloadSource,
    config: &SimulationConfig,
    cancel: &mut watch::Receiver<bool>,
) -> Result<RunReport, SimulationError> {
    let actions = config.action_set();
    let mut report = RunReport::default();

    debug!(
        "Simulation started against {} (actions: {:?}, iterations: {:?})",
        config.database, actions, config.iterations
    );

    loop {
        if config
            .iterations
            .is_some_and(|limit| report.iterations >= limit)
        {
            break;
        }
        if *cancel.borrow() {
            report.cancelled = true;
            break;
        }

        let action = {
            let mut rng = rand::rng();
            actions[rng.random_range(0..actions.len())]
        };

        let batch = source.next_batch(config.collection.as_deref())?;
        let batch_collection = batch.collection.clone();
        let (collection, record) = batch
            .into_first()
            .ok_or(SimulationError::EmptyBatch(batch_collection))?;
        let payload = to_payload(&record)?;

        let adapter = DocumentActions::new(
            connector,
            config.store_address.as_str(),
            config.database.as_str(),
            collection,
            payload,
        );
        let outcome = adapter.perform(action, config.editing_grade).await?;
        log_outcome(&outcome, config.editing_grade);
        report.record(&outcome);

        if let Some(pacing) = config.pacing.filter(|p| !p.is_zero()) {
            let delay = {
                let mut rng = rand::rng();
                pacing.mul_f64(rng.random::<f64>())
            };
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancelled(cancel) => {}
            }
        }
    }

    debug!("Simulation stopped: {:?}", report);
    Ok(report)
}
