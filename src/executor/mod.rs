mod process;

use thiserror::Error;

pub use process::AtQueue;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} rejected the job ({status}): {stderr}")]
    Rejected {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Runs an action once, some whole number of minutes from now, outside the
/// lifetime of this process.
pub trait DeferredJob {
    fn schedule_after(&self, wait_minutes: u32, action: &str) -> Result<(), ExecutorError>;
}

/// Logs the job instead of queueing it
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRun;

impl DeferredJob for DryRun {
    fn schedule_after(&self, wait_minutes: u32, action: &str) -> Result<(), ExecutorError> {
        log::info!("[dry run] would run `{}` in {} minutes", action, wait_minutes);
        Ok(())
    }
}
