// src/exec/process.rs

//! Running a single external program to completion.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::errors::{ChefRunnerError, Result};
use crate::types::{ExitCode, LAUNCH_FAILURE_CODE};

/// Everything a finished process left behind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: ExitCode,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes a program with arguments and waits for it to exit.
///
/// A process that ran and failed is an `Ok` with a non-zero `exit_code`;
/// an `Err` means the program could not be started (or waited on) at all.
pub trait ProcessRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + 'a>>;
}

/// Production runner backed by `tokio::process::Command`.
///
/// The child is spawned with `kill_on_drop`, so dropping the returned
/// future (e.g. on timeout) terminates the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl ProcessRunner for TokioProcessRunner {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + 'a>> {
        Box::pin(async move {
            let child = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|source| ChefRunnerError::Launch {
                    program: program.to_string(),
                    source,
                })?;

            debug!(program, pid = ?child.id(), "spawned process");

            let output = child.wait_with_output().await?;

            Ok(ProcessOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code().unwrap_or(LAUNCH_FAILURE_CODE),
            })
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn captures_both_streams_and_exit_code() {
        let runner = TokioProcessRunner;
        let args = sh("echo out; echo err >&2; exit 3");
        let output = runner.run("sh", &args).await.unwrap();

        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
    }

    #[tokio::test]
    async fn missing_binary_is_a_launch_error() {
        let runner = TokioProcessRunner;
        let err = runner
            .run("definitely-not-a-real-chef-client-binary", &[])
            .await
            .unwrap_err();

        match err {
            ChefRunnerError::Launch { program, .. } => {
                assert_eq!(program, "definitely-not-a-real-chef-client-binary");
            }
            other => panic!("expected Launch error, got {other:?}"),
        }
    }
}
