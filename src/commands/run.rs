//! `simulate-run`: submit one run per model.

use crate::cli::RunArgs;
use crate::logging::mask_connection_password;
use crate::output;
use simulator_runner::{ControlError, JobQueue, RunRequest};
use tracing::info;

/// Submitted and refused runs, in request order.
#[derive(Debug, Default)]
pub struct Submission {
    pub lines: Vec<String>,
    pub rejected: usize,
}

/// Validate and submit every request. Configuration errors are reported per
/// run; transport failures abort the whole submission.
pub async fn submit_runs<Q: JobQueue>(
    queue: &Q,
    requests: Vec<RunRequest>,
) -> Result<Submission, ControlError> {
    let mut submission = Submission::default();

    for request in requests {
        let task_name = request.task_name();
        if let Err(e) = request.validate() {
            submission.lines.push(output::run_rejected(&task_name, &e.to_string()));
            submission.rejected += 1;
            continue;
        }

        info!(
            "Submitting {} against {} (database: {})",
            task_name,
            mask_connection_password(&request.store_address),
            request.database
        );
        match queue.submit(request).await {
            Ok(id) => submission.lines.push(output::run_submitted(&task_name, &id)),
            Err(ControlError::Rejected(reason)) => {
                submission.lines.push(output::run_rejected(&task_name, &reason));
                submission.rejected += 1;
            }
            Err(ControlError::Config(e)) => {
                submission.lines.push(output::run_rejected(&task_name, &e.to_string()));
                submission.rejected += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(submission)
}

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let client = super::connect(&args.control.control_url).await?;
    let submission = submit_runs(&client, args.to_requests()).await?;
    client.disconnect();

    super::print_lines(&submission.lines);
    if submission.rejected > 0 {
        anyhow::bail!("{} simulation(s) rejected", submission.rejected);
    }
    Ok(())
}
