//! HLS Synth - synthesis job execution for HLS Bench
//!
//! Drives the external HLS tool for one job at a time:
//! - Stages a reset workspace with the source and control script
//! - Runs the tool and persists its combined log
//! - Waits a bounded time for the report and assembles the outcome
//! - Verifies (original, fixed) dataset pairs

pub mod assemble;
pub mod locator;
pub mod pipeline;
pub mod runner;
pub mod toolchain;
pub mod verify;
pub mod workspace;

// Re-export key types
pub use assemble::{failure_outcome, success_outcome, ReportLookup};
pub use locator::ReportLocator;
pub use pipeline::SynthesisPipeline;
pub use runner::{ProcessRunner, ToolInvocation, ToolRunner};
pub use toolchain::{locate_tool, locate_tool_in};
pub use verify::{verify_entries, verify_entry, JobTemplate, VerificationSummary};
pub use workspace::{JobWorkspace, LOG_FILE_NAME};
