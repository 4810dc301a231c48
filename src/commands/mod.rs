//! Command handlers.
//!
//! Client commands are split in two: a function over any
//! [`JobQueue`](simulator_runner::JobQueue) that
//! returns the lines to print, and an entry point that connects a
//! [`ControlClient`] and prints them.

pub mod list;
pub mod revoke;
pub mod run;
pub mod worker;

use anyhow::Context;
use simulator_runner::ControlClient;

pub(crate) async fn connect(control_url: &str) -> anyhow::Result<ControlClient> {
    ControlClient::connect(control_url)
        .await
        .with_context(|| format!("Failed to reach the worker control server at {control_url}"))
}

pub(crate) fn print_lines(lines: &[String]) {
    for line in lines {
        println!("\n{line}");
    }
    if !lines.is_empty() {
        println!();
    }
}
