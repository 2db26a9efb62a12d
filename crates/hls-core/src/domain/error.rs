//! Error taxonomy for HLS Bench.

use std::path::PathBuf;

/// Errors produced while reading a located report artifact.
///
/// Every variant is non-fatal to the job: the assembler folds it into a
/// success-shaped outcome with empty metrics and a diagnostic note.
#[derive(Debug, thiserror::Error)]
pub enum ReportParseError {
    #[error("report {path} could not be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report {path} is not valid UTF-8")]
    Encoding { path: PathBuf },

    #[error("section '{section}' has no summary block")]
    MissingSummary { section: String },
}

/// HLS Bench errors.
#[derive(Debug, thiserror::Error)]
pub enum HlsError {
    #[error("synthesis tool not found (searched: {})", searched.join(", "))]
    ToolNotFound { searched: Vec<String> },

    #[error("HLS synthesis failed: {excerpt}")]
    SynthesisFailure { exit_code: i32, excerpt: String },

    #[error("report not found: {}", path.display())]
    ReportMissing { path: PathBuf },

    #[error("report parse error: {0}")]
    ReportParse(#[from] ReportParseError),

    #[error("failed to start {}: {source}", executable.display())]
    ProcessSpawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("synthesis tool timed out after {secs} seconds")]
    Timeout { secs: u64 },

    #[error("invalid synthesis job: {0}")]
    InvalidJob(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for HLS Bench operations.
pub type Result<T> = std::result::Result<T, HlsError>;
