//! Terminal output for the client commands.

use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use crossterm::style::Stylize;
use simulator_actions::Action;
use simulator_runner::{format_elapsed, CancelOutcome, RunSummary};

pub const NO_RUNS: &str = "[ ! ] THERE ARE NO TASKS CURRENTLY RUNNING.";
pub const NOTHING_TO_REVOKE: &str = "[ ! ] NO ACTIVE TASKS TO REVOKE.";
pub const REVOKE_USAGE: &str =
    "[ ! ] THE \"simulate-revoke\" COMMAND NEEDS A <TASK_ID> OR --all FOR ALL TASKS.";

/// Confirmation printed for each submitted run.
pub fn run_submitted(task_name: &str, id: &str) -> String {
    format!("[ ✓ ] TASK: \"{task_name}\" ID: \"{id}\"")
        .green()
        .to_string()
}

/// Diagnostic printed when a run request is refused.
pub fn run_rejected(task_name: &str, reason: &str) -> String {
    format!("[ ✗ ] TASK: \"{task_name}\" REJECTED: {reason}")
        .red()
        .to_string()
}

pub fn notice(message: &str) -> String {
    message.yellow().to_string()
}

/// Line printed for each cancellation attempt.
pub fn cancel_outcome(outcome: &CancelOutcome) -> String {
    match outcome {
        CancelOutcome::Cancelled(id) => format!("[ ✓ ] TASK ID: {id} - REVOKE").green().to_string(),
        CancelOutcome::NotFound(id) => {
            format!("[ ✗ ] TASK ID \"{id}\" NOT FOUND OR ALREADY REVOKED.")
                .red()
                .to_string()
        }
    }
}

/// Actions as coloured initials, e.g. `C-U-D`. An empty set means all three.
pub fn format_actions(actions: &[Action]) -> String {
    let actions: &[Action] = if actions.is_empty() {
        &Action::ALL
    } else {
        actions
    };

    actions
        .iter()
        .map(|action| match action {
            Action::Create => "C".green().to_string(),
            Action::Update => "U".yellow().to_string(),
            Action::Delete => "D".red().to_string(),
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn interactions_cell(iterations: Option<u64>) -> Cell {
    match iterations {
        None => Cell::new("WARNING TASK [∞]").fg(Color::Yellow),
        Some(n) => Cell::new(format!("QUANTITY TASK [{n}]")).fg(Color::Green),
    }
}

/// Table of active runs, or the "nothing running" notice.
pub fn run_table(runs: &[RunSummary]) -> String {
    if runs.is_empty() {
        return notice(NO_RUNS);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "TASK ID",
        "TASK NAME",
        "WORKER",
        "TIME AGO",
        "INTERACTIONS",
        "ACTIONS ON",
    ]);

    for run in runs {
        table.add_row(vec![
            Cell::new(&run.id),
            Cell::new(&run.task_name),
            Cell::new(&run.worker),
            Cell::new(format_elapsed(run.elapsed)),
            interactions_cell(run.iterations),
            Cell::new(format_actions(&run.actions)),
        ]);
    }

    table.to_string()
}
