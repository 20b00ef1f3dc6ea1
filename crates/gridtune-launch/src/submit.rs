//! External batch scheduler invocation.
//!
//! The scheduler is opaque to the rest of the workspace: one `sbatch`
//! call per configuration, arguments flattened to `--name=value` tokens.
//! A rejected submission is logged and skipped so one bad job does not
//! abort the remainder of a sweep.

use std::path::Path;
use std::process::Command;

use gridtune_core::{ErrorInfo, Searcher, TuneError};
use tracing::{info, warn};

fn submit_error(code: &str, message: impl Into<String>, hint: impl ToString) -> TuneError {
    TuneError::Submit(ErrorInfo::new(code, message).with_hint(hint.to_string()))
}

/// Outcome of driving a searcher to exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepSummary {
    /// Jobs the scheduler accepted.
    pub submitted: usize,
    /// Jobs the scheduler rejected (logged, not fatal).
    pub failed: usize,
}

/// Submits a single job through `sbatch`.
pub fn submit_job(sbatch: &Path, script: Option<&Path>, args: &[String]) -> Result<(), TuneError> {
    let mut command = Command::new("sbatch");
    command.arg(sbatch);
    if let Some(script) = script {
        command.arg(script);
    }
    command.args(args);
    let status = command
        .status()
        .map_err(|err| submit_error("submit.spawn", "failed to invoke sbatch", err))?;
    if !status.success() {
        return Err(submit_error(
            "submit.status",
            "sbatch rejected the job",
            status.to_string(),
        ));
    }
    Ok(())
}

/// Drives a searcher to exhaustion, submitting one job per proposed
/// configuration. `cargs` are fixed arguments prepended to every job.
pub fn submit_sweep(
    searcher: &mut dyn Searcher,
    sbatch: &Path,
    script: Option<&Path>,
    cargs: &[String],
) -> Result<SweepSummary, TuneError> {
    let mut summary = SweepSummary::default();
    loop {
        let config = match searcher.next_config() {
            Ok(config) => config,
            Err(err) if err.is_exhausted() => break,
            Err(err) => return Err(err),
        };
        let mut job_args = cargs.to_vec();
        job_args.extend(config.cli_args()?);
        match submit_job(sbatch, script, &job_args) {
            Ok(()) => {
                summary.submitted += 1;
                info!(args = %job_args.join(" "), "submitted job");
            }
            Err(err) => {
                summary.failed += 1;
                warn!(error = %err, "job submission failed, continuing sweep");
            }
        }
    }
    Ok(summary)
}
