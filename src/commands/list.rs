//! `simulate-list`: show active runs.

use crate::cli::ControlArgs;
use crate::output;
use simulator_runner::{ControlError, JobQueue, RunRegistry};

/// The table of active runs, or the "nothing running" notice.
pub async fn render<Q: JobQueue>(registry: &RunRegistry<Q>) -> Result<String, ControlError> {
    let runs = registry.list_active_runs().await?;
    Ok(output::run_table(&runs))
}

pub async fn execute(args: ControlArgs) -> anyhow::Result<()> {
    let registry = RunRegistry::new(super::connect(&args.control_url).await?);
    let rendered = render(&registry).await?;
    registry.into_inner().disconnect();

    super::print_lines(&[rendered]);
    Ok(())
}
