//! Client command handlers driven against an in-process worker pool.

use mongo_simulator::cli::{Cli, Commands, WorkerArgs};
use mongo_simulator::commands::{list, revoke, run, worker};
use mongo_simulator::output;
use simulator_actions::{Action, MemoryStore};
use simulator_generator::Model;
use simulator_runner::{PoolConfig, RunRegistry, RunRequest, WorkerPool};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

fn pool(store: &MemoryStore) -> Arc<WorkerPool> {
    let config = PoolConfig {
        workers: 2,
        grace: Duration::from_millis(500),
        ..PoolConfig::default()
    };
    Arc::new(WorkerPool::start(&config, Arc::new(store.clone())).unwrap())
}

fn endless(model: Model) -> RunRequest {
    let mut req = RunRequest::new(model, "memory://cli", "clidb");
    req.pacing = Some(0.05);
    req
}

fn worker_args(args: &[&str]) -> WorkerArgs {
    let mut full = vec!["mongo-simulator", "worker"];
    full.extend_from_slice(args);
    match Cli::try_parse_from(full).unwrap().command {
        Commands::Worker(args) => args,
        _ => panic!("expected worker"),
    }
}

#[tokio::test]
async fn test_submit_reports_each_model() {
    let store = MemoryStore::new();
    let pool = pool(&store);

    let mut bad = endless(Model::Client);
    bad.editing_grade = simulator_actions::EditingGrade::Percent(0);
    let submission = run::submit_runs(&pool, vec![endless(Model::Driver), bad])
        .await
        .unwrap();

    assert_eq!(submission.lines.len(), 2);
    assert_eq!(submission.rejected, 1);
    assert!(submission.lines[0].contains("TASK: \"simulate_driver_data\" ID: \""));
    assert!(submission.lines[1].contains("REJECTED"));
    assert_eq!(pool.active_runs().values().flatten().count(), 1);
    pool.shutdown().await;
}

#[tokio::test]
async fn test_list_and_revoke_flow() {
    let store = MemoryStore::new();
    let pool = pool(&store);
    let registry = RunRegistry::new(pool.clone());

    assert!(list::render(&registry).await.unwrap().contains(output::NO_RUNS));
    let lines = revoke::revoke(&registry, &[], true).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(output::NOTHING_TO_REVOKE));

    let mut bounded = endless(Model::Vehicle);
    bounded.actions = vec![Action::Create];
    bounded.iterations = Some(1_000_000);
    let submission = run::submit_runs(&pool, vec![endless(Model::Driver), bounded])
        .await
        .unwrap();
    assert_eq!(submission.rejected, 0);

    let table = list::render(&registry).await.unwrap();
    assert!(table.contains("simulate_driver_data"));
    assert!(table.contains("simulate_vehicle_data"));
    assert!(table.contains("WARNING TASK [∞]"));
    assert!(table.contains("QUANTITY TASK [1000000]"));

    let ids: Vec<String> = pool
        .active_runs()
        .into_values()
        .flatten()
        .map(|run| run.id)
        .collect();
    let lines = revoke::revoke(&registry, &[ids[0].clone(), "unknown".to_string()], false)
        .await
        .unwrap();
    assert!(lines[0].contains(&format!("TASK ID: {} - REVOKE", ids[0])));
    assert!(lines[1].contains("TASK ID \"unknown\" NOT FOUND OR ALREADY REVOKED."));

    let lines = revoke::revoke(&registry, &[], true).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(&format!("TASK ID: {} - REVOKE", ids[1])));
    assert!(list::render(&registry).await.unwrap().contains(output::NO_RUNS));

    pool.shutdown().await;
}

#[test]
fn test_worker_config_file_with_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worker.toml");
    std::fs::write(&path, "listen = \"0.0.0.0:7777\"\nworkers = 6\ngrace = \"2m\"\n").unwrap();
    let path_str = path.to_str().unwrap();

    let config = worker::resolve_config(&worker_args(&["--config", path_str])).unwrap();
    assert_eq!(config.listen, "0.0.0.0:7777");
    assert_eq!(config.workers, 6);
    assert_eq!(config.grace, Duration::from_secs(120));

    let config =
        worker::resolve_config(&worker_args(&["--config", path_str, "--workers", "1", "--grace", "3"]))
            .unwrap();
    assert_eq!(config.workers, 1);
    assert_eq!(config.grace, Duration::from_secs(3));
    assert_eq!(config.listen, "0.0.0.0:7777");
}

#[test]
fn test_worker_config_rejects_bad_overrides() {
    assert!(worker::resolve_config(&worker_args(&["--workers", "0"])).is_err());
    assert!(worker::resolve_config(&worker_args(&["--grace", "later"])).is_err());
    assert!(worker::resolve_config(&worker_args(&["--config", "/nonexistent/worker.toml"])).is_err());
}
