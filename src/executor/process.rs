use std::{
    io::Write,
    process::{Command as StdCommand, Stdio},
};

use crate::executor::{DeferredJob, ExecutorError};

/// Queues jobs with the `at(1)` daemon
#[derive(Debug, Clone)]
pub struct AtQueue {
    program: String,
    leading_args: Vec<String>,
}

impl AtQueue {
    /// Build from a whitespace separated command line such as `at -q b`
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            leading_args: parts.collect(),
        })
    }

    fn time_spec(wait_minutes: u32) -> Vec<String> {
        if wait_minutes == 0 {
            vec!["now".to_string()]
        } else {
            vec![
                "now".to_string(),
                "+".to_string(),
                wait_minutes.to_string(),
                "minutes".to_string(),
            ]
        }
    }
}

impl DeferredJob for AtQueue {
    fn schedule_after(&self, wait_minutes: u32, action: &str) -> Result<(), ExecutorError> {
        let spawn_err = |source| ExecutorError::Spawn {
            program: self.program.clone(),
            source,
        };

        let time_spec = Self::time_spec(wait_minutes);
        log::info!(
            "Queueing `{}` with: {} {}",
            action,
            self.program,
            time_spec.join(" ")
        );

        let mut child = StdCommand::new(&self.program)
            .args(&self.leading_args)
            .args(&time_spec)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            // at may exit before reading the job; its exit status decides
            if let Err(e) = writeln!(stdin, "{}", action) {
                log::debug!("{} closed stdin early: {}", self.program, e);
            }
        }

        let output = child.wait_with_output().map_err(spawn_err)?;
        let report = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(ExecutorError::Rejected {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: report,
            });
        }

        // at reports the job id on stderr
        if !report.is_empty() {
            log::info!("{}", report);
        }
        Ok(())
    }
}
