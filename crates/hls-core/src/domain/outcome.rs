//! Process and job outcomes.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::HlsError;
use super::metrics::{LatencyMetrics, TimingMetrics, UtilizationMetrics};
use crate::report::{ParseStrategy, ParsedReport};

/// Default size of the error excerpt taken from a failed run's output.
pub const FAILURE_EXCERPT_CHARS: usize = 500;

/// Delimiter between stdout and stderr in the persisted log.
pub const STDERR_DELIMITER: &str = "\n\nSTDERR:\n";

/// What the external tool process produced.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProcessOutcome {
    /// Exit code (-1 when terminated by a signal).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,

    /// When the process was spawned.
    pub started_at: DateTime<Utc>,
}

impl ProcessOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout followed by stderr (delimited) when stderr is non-empty.
    pub fn combined_log(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}{}{}", self.stdout, STDERR_DELIMITER, self.stderr)
        }
    }

    /// The stream an error message should quote: stderr, or stdout if stderr is empty.
    pub fn diagnostic_stream(&self) -> &str {
        if self.stderr.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }

    /// Last `max_chars` characters of the diagnostic stream.
    pub fn failure_excerpt(&self, max_chars: usize) -> &str {
        tail_chars(self.diagnostic_stream(), max_chars)
    }
}

/// Char-boundary-safe suffix of at most `max_chars` characters.
pub fn tail_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max_chars - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// Why a success-shaped outcome carries no metrics.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportNote {
    /// The tool exited cleanly but no report appeared within the poll budget.
    ReportMissing { expected: PathBuf },

    /// The report was found but could not be read.
    ParseError { message: String },
}

impl fmt::Display for ReportNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportNote::ReportMissing { expected } => {
                write!(f, "report not found at {}", expected.display())
            }
            ReportNote::ParseError { message } => write!(f, "report parse error: {}", message),
        }
    }
}

/// Report errors become notes; every other error is handed back.
impl TryFrom<HlsError> for ReportNote {
    type Error = HlsError;

    fn try_from(error: HlsError) -> Result<Self, Self::Error> {
        match error {
            HlsError::ReportMissing { path } => Ok(ReportNote::ReportMissing { expected: path }),
            HlsError::ReportParse(source) => Ok(ReportNote::ParseError {
                message: source.to_string(),
            }),
            other => Err(other),
        }
    }
}

/// Metrics and logs from a job whose tool process exited with code 0.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SynthesisReport {
    pub timing: Option<TimingMetrics>,
    pub latency: Option<LatencyMetrics>,
    pub utilization: Option<UtilizationMetrics>,

    /// Full captured tool output.
    pub raw_log: String,

    /// Combined log persisted in the workspace.
    pub log_path: PathBuf,

    /// Report artifact that was parsed, if one was located.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,

    /// Strategy that produced the metrics, if the report was parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ParseStrategy>,

    /// Set when the metrics are empty because of a missing or unreadable report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<ReportNote>,
}

impl SynthesisReport {
    /// Success record with no metrics.
    pub fn empty(raw_log: String, log_path: PathBuf) -> Self {
        Self {
            timing: None,
            latency: None,
            utilization: None,
            raw_log,
            log_path,
            report_path: None,
            strategy: None,
            note: None,
        }
    }

    /// Success record carrying parsed metrics.
    pub fn from_parsed(
        parsed: ParsedReport,
        report_path: PathBuf,
        raw_log: String,
        log_path: PathBuf,
    ) -> Self {
        Self {
            timing: parsed.timing,
            latency: parsed.latency,
            utilization: parsed.utilization,
            raw_log,
            log_path,
            report_path: Some(report_path),
            strategy: Some(parsed.strategy),
            note: None,
        }
    }

    pub fn with_note(mut self, note: ReportNote) -> Self {
        self.note = Some(note);
        self
    }

    pub fn has_metrics(&self) -> bool {
        self.timing.is_some() || self.latency.is_some() || self.utilization.is_some()
    }
}

/// Category of an error-status outcome.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureKind {
    /// No tool executable could be located.
    ToolNotFound,

    /// The tool ran and exited with a nonzero code.
    SynthesisFailed { exit_code: i32 },

    /// The tool process could not be started.
    Spawn,

    /// The tool exceeded the configured time limit and was killed.
    Timeout,

    /// Workspace staging or another execution step failed.
    Execution,
}

/// Final, immutable result of one synthesis job.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status")]
pub enum SynthesisOutcome {
    #[serde(rename = "success")]
    Success(SynthesisReport),

    #[serde(rename = "error")]
    Failure {
        #[serde(rename = "error")]
        message: String,
        raw_log: String,
        log_path: Option<PathBuf>,
        kind: FailureKind,
    },
}

impl SynthesisOutcome {
    pub fn failure(
        kind: FailureKind,
        message: impl Into<String>,
        raw_log: impl Into<String>,
        log_path: Option<PathBuf>,
    ) -> Self {
        SynthesisOutcome::Failure {
            message: message.into(),
            raw_log: raw_log.into(),
            log_path,
            kind,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SynthesisOutcome::Success(_))
    }

    pub fn report(&self) -> Option<&SynthesisReport> {
        match self {
            SynthesisOutcome::Success(report) => Some(report),
            SynthesisOutcome::Failure { .. } => None,
        }
    }

    pub fn timing(&self) -> Option<&TimingMetrics> {
        self.report().and_then(|r| r.timing.as_ref())
    }

    pub fn raw_log(&self) -> &str {
        match self {
            SynthesisOutcome::Success(report) => &report.raw_log,
            SynthesisOutcome::Failure { raw_log, .. } => raw_log,
        }
    }

    pub fn log_path(&self) -> Option<&Path> {
        match self {
            SynthesisOutcome::Success(report) => Some(&report.log_path),
            SynthesisOutcome::Failure { log_path, .. } => log_path.as_deref(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SynthesisOutcome::Success(_) => None,
            SynthesisOutcome::Failure { message, .. } => Some(message),
        }
    }
}
