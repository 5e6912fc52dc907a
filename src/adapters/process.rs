use crate::domain::ports::{ProcessOutput, ProcessRequest, ProcessRunner};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs tools as child processes of this one.
#[derive(Debug, Clone, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput> {
        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .envs(&request.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &request.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request.stdin.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            tracing::warn!("{}", line);
        }

        Ok(ProcessOutput {
            // Killed by a signal: no exit code.
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_feeds_stdin_and_captures_stdout() {
        let request = ProcessRequest {
            program: PathBuf::from("cat"),
            stdin: "timing on\nexit\n".to_string(),
            ..Default::default()
        };

        let output = SystemProcessRunner::new().run(request).await.unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, "timing on\nexit\n");
    }

    #[tokio::test]
    async fn test_reports_exit_code() {
        let request = ProcessRequest {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), "echo partial; exit 3".to_string()],
            ..Default::default()
        };

        let output = SystemProcessRunner::new().run(request).await.unwrap();

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout.trim(), "partial");
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let request = ProcessRequest {
            program: PathBuf::from("/nonexistent/dctool"),
            ..Default::default()
        };

        assert!(SystemProcessRunner::new().run(request).await.is_err());
    }
}
