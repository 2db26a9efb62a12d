//! Synthesis job orchestration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hls_core::config::{HlsConfig, Retention};
use hls_core::domain::error::ReportParseError;
use hls_core::domain::job::SynthesisJob;
use hls_core::domain::outcome::{FailureKind, SynthesisOutcome};
use hls_core::domain::HlsError;
use hls_core::obs::{
    emit_job_finished, emit_job_started, emit_script_written, emit_tool_exited, job_span,
};
use hls_core::report::parse_report_bytes;
use hls_core::script::{ControlScript, SCRIPT_FILE_NAME};
use tracing::Instrument;

use crate::assemble::{failure_outcome, success_outcome, ReportLookup};
use crate::locator::ReportLocator;
use crate::runner::{ProcessRunner, ToolInvocation, ToolRunner};
use crate::workspace::JobWorkspace;

/// Runs synthesis jobs one at a time against a single tool executable.
///
/// Every job ends in a [`SynthesisOutcome`]; nothing in [`run`](Self::run)
/// returns an error.
#[derive(Clone)]
pub struct SynthesisPipeline {
    runner: Arc<dyn ToolRunner>,
    executable: PathBuf,
    locator: ReportLocator,
    retention: Retention,
    timeout: Option<Duration>,
}

impl SynthesisPipeline {
    pub fn new(runner: Arc<dyn ToolRunner>, executable: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            executable: executable.into(),
            locator: ReportLocator::default(),
            retention: Retention::Keep,
            timeout: None,
        }
    }

    /// Pipeline over the real tool process, configured from `config`.
    pub fn from_config(executable: impl Into<PathBuf>, config: &HlsConfig) -> Self {
        Self::new(Arc::new(ProcessRunner), executable)
            .with_locator(ReportLocator::from_config(&config.report))
            .with_retention(config.workspace.retention)
            .with_timeout(config.tool.timeout())
    }

    pub fn with_locator(mut self, locator: ReportLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run one job to completion.
    pub async fn run(&self, job: &SynthesisJob) -> SynthesisOutcome {
        let job_id = job.job_id.to_string();
        let span = job_span(&job_id, &job.top_function);
        async {
            let start = Instant::now();
            emit_job_started(
                &job_id,
                &job.top_function,
                &job.target_device,
                job.clock_period_ns,
            );
            let outcome = self.execute(job).await;
            emit_job_finished(
                &job_id,
                outcome.is_success(),
                start.elapsed().as_millis() as u64,
            );
            outcome
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, job: &SynthesisJob) -> SynthesisOutcome {
        let workspace = match JobWorkspace::acquire(&job.workspace_path, self.retention).await {
            Ok(workspace) => workspace,
            Err(e) => return execution_failure("workspace setup failed", &e),
        };

        let script = ControlScript::render(job);
        if let Err(e) = workspace.stage(job, &script).await {
            return execution_failure("workspace staging failed", &e);
        }
        emit_script_written(&workspace.script_path(), &script.digest());

        let invocation = ToolInvocation {
            executable: self.executable.clone(),
            script: PathBuf::from(SCRIPT_FILE_NAME),
            working_dir: workspace.path().to_path_buf(),
            timeout: self.timeout,
        };

        let process = match self.runner.run(&invocation).await {
            Ok(process) => process,
            Err(e) => {
                // Keep the log file contract: the error text becomes the log.
                let log_path = workspace.persist_log(&e.to_string()).await.ok();
                return runner_failure(&e, log_path);
            }
        };
        emit_tool_exited(process.exit_code, process.duration_ms);

        let log_path = match workspace.persist_log(&process.combined_log()).await {
            Ok(path) => path,
            Err(e) => {
                return SynthesisOutcome::failure(
                    FailureKind::Execution,
                    format!("failed to persist tool log: {}", e),
                    process.combined_log(),
                    None,
                );
            }
        };

        if !process.succeeded() {
            return failure_outcome(&process, log_path);
        }

        let lookup = self.lookup_report(&workspace.report_path(job)).await;
        success_outcome(&process, log_path, lookup)
    }

    async fn lookup_report(&self, expected: &Path) -> ReportLookup {
        let Some(path) = self.locator.locate(expected).await else {
            return ReportLookup::Missing {
                expected: expected.to_path_buf(),
            };
        };
        let parsed = match tokio::fs::read(&path).await {
            Ok(bytes) => parse_report_bytes(&path, &bytes),
            Err(source) => Err(ReportParseError::Unreadable {
                path: path.clone(),
                source,
            }),
        };
        match parsed {
            Ok(report) => ReportLookup::Parsed { path, report },
            Err(error) => ReportLookup::Unparsable { path, error },
        }
    }
}

// Failures before the tool ran have no log file.
fn execution_failure(context: &str, error: &HlsError) -> SynthesisOutcome {
    let message = format!("{}: {}", context, error);
    SynthesisOutcome::failure(FailureKind::Execution, message.clone(), message, None)
}

fn runner_failure(error: &HlsError, log_path: Option<PathBuf>) -> SynthesisOutcome {
    let kind = match error {
        HlsError::ProcessSpawn { .. } => FailureKind::Spawn,
        HlsError::Timeout { .. } => FailureKind::Timeout,
        _ => FailureKind::Execution,
    };
    let message = error.to_string();
    SynthesisOutcome::failure(kind, message.clone(), message, log_path)
}
