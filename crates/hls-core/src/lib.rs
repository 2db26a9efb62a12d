//! HLS Bench Core Library
//!
//! Domain types, control-script rendering, report parsing and
//! classification for HLS synthesis jobs. Process execution lives in
//! `hls-synth`; this crate does no process I/O.

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod obs;
pub mod report;
pub mod script;
pub mod telemetry;

pub use domain::{
    CellValue, FailureKind, HlsError, LatencyMetrics, PairVerdict, ProcessOutcome, ReportNote,
    ReportParseError, ResourceKind, ResourceRow, Result, SynthesisJob, SynthesisJobBuilder,
    SynthesisOutcome, SynthesisReport, TimingMetrics, UtilizationMetrics, Verdict,
};

pub use classifier::{classify, is_synthesizable, verify_pair};
pub use config::{
    HlsConfig, JobDefaults, ReportPollConfig, Retention, ToolConfig, WorkspaceConfig,
};
pub use dataset::{parse_dataset, select_range, DatasetEntry};
pub use report::{parse_report, parse_report_bytes, parse_report_file, ParseStrategy, ParsedReport};
pub use script::{ControlScript, SCRIPT_FILE_NAME};

pub use obs::{
    emit_fallback_used, emit_job_finished, emit_job_started, emit_report_located,
    emit_report_missing, emit_report_parse_failed, emit_report_waiting, emit_script_written,
    emit_tool_exited, job_span,
};
pub use telemetry::init_tracing;

/// HLS Bench version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
