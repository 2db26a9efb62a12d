//! External tool execution.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use hls_core::domain::error::{HlsError, Result};
use hls_core::domain::outcome::ProcessOutcome;
use tokio::process::Command;

/// One invocation of the synthesis tool: `<executable> -f <script>` run in
/// `working_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub executable: PathBuf,

    /// Control script path as passed to the tool, relative to `working_dir`.
    pub script: PathBuf,

    pub working_dir: PathBuf,

    /// Kill the tool when it runs longer than this. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ToolInvocation {
    pub fn args(&self) -> Vec<std::ffi::OsString> {
        vec!["-f".into(), self.script.clone().into_os_string()]
    }
}

/// Runs the synthesis tool to completion.
///
/// Implementations capture both output streams in full. A nonzero exit is
/// reported through [`ProcessOutcome::exit_code`], not as an error; errors
/// are reserved for a process that could not be started or was killed on
/// timeout.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ProcessOutcome>;
}

/// [`ToolRunner`] backed by a real child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ProcessOutcome> {
        let started_at = Utc::now();
        let start = Instant::now();

        let child = Command::new(&invocation.executable)
            .args(invocation.args())
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HlsError::ProcessSpawn {
                executable: invocation.executable.clone(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match invocation.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| HlsError::Timeout {
                    secs: limit.as_secs(),
                })??,
            None => child.wait_with_output().await?,
        };

        Ok(ProcessOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            started_at,
        })
    }
}
