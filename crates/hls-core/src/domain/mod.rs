//! Domain models for HLS Bench.
//!
//! Canonical definitions for the core entities:
//! - `SynthesisJob`: One source snippet to synthesize
//! - `ProcessOutcome`: What the external tool process produced
//! - Timing / latency / utilization metrics parsed from the report
//! - `SynthesisOutcome`: Final typed result of a job
//! - `Verdict` / `PairVerdict`: Classification results

pub mod error;
pub mod job;
pub mod metrics;
pub mod outcome;
pub mod verdict;

// Re-export main types and errors
pub use error::{HlsError, ReportParseError, Result};
pub use job::{SynthesisJob, SynthesisJobBuilder};
pub use metrics::{
    CellValue, LatencyMetrics, ResourceKind, ResourceRow, TimingMetrics, UtilizationMetrics,
};
pub use outcome::{
    FailureKind, ProcessOutcome, ReportNote, SynthesisOutcome, SynthesisReport,
};
pub use verdict::{PairVerdict, Verdict};
