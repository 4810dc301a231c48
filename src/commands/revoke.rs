//! `simulate-revoke`: cancel runs by id or all at once.

use crate::cli::RevokeArgs;
use crate::output;
use simulator_runner::{CancelAll, ControlError, JobQueue, RunRegistry};

/// Cancel the given ids (or everything when `all`) and return the lines to print.
pub async fn revoke<Q: JobQueue>(
    registry: &RunRegistry<Q>,
    ids: &[String],
    all: bool,
) -> Result<Vec<String>, ControlError> {
    if all {
        return Ok(match registry.cancel_all().await? {
            CancelAll::NothingToCancel => vec![output::notice(output::NOTHING_TO_REVOKE)],
            CancelAll::Attempted(outcomes) => outcomes.iter().map(output::cancel_outcome).collect(),
        });
    }

    let mut lines = Vec::with_capacity(ids.len());
    for id in ids {
        lines.push(output::cancel_outcome(&registry.cancel(id).await?));
    }
    Ok(lines)
}

pub async fn execute(args: RevokeArgs) -> anyhow::Result<()> {
    if args.ids.is_empty() && !args.all {
        super::print_lines(&[output::notice(output::REVOKE_USAGE)]);
        return Ok(());
    }

    let registry = RunRegistry::new(super::connect(&args.control.control_url).await?);
    let lines = revoke(&registry, &args.ids, args.all).await?;
    registry.into_inner().disconnect();

    super::print_lines(&lines);
    Ok(())
}
