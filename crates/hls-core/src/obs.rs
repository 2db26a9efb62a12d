//! Structured observability hooks for the synthesis job lifecycle.
//!
//! This module provides:
//! - A job-scoped tracing span via [`job_span`]
//! - Emission functions for lifecycle events: start, script staging, tool
//!   exit, report polling, report parsing, finish
//!
//! Every event carries an `event = "..."` field so JSON logs can be filtered
//! by lifecycle step.

use std::path::Path;

use tracing::{debug, info, warn, Span};

/// Span scoping every event of one job.
///
/// Attach it to the job future with `tracing::Instrument` rather than
/// entering it, since the job awaits the tool process.
///
/// # Example
///
/// ```ignore
/// run_job(job)
///     .instrument(job_span(&job.job_id.to_string(), &job.top_function))
///     .await;
/// ```
pub fn job_span(job_id: &str, top: &str) -> Span {
    tracing::info_span!("hls.job", job_id = %job_id, top = %top)
}

/// Emit event: job started.
pub fn emit_job_started(job_id: &str, top: &str, device: &str, clock_period_ns: f64) {
    info!(
        event = "job.started",
        job_id = %job_id,
        top = %top,
        device = %device,
        clock_period_ns = clock_period_ns,
    );
}

/// Emit event: control script and sources staged in the workspace.
pub fn emit_script_written(script_path: &Path, digest: &str) {
    debug!(
        event = "job.script_written",
        path = %script_path.display(),
        digest = %digest,
    );
}

/// Emit event: the external tool exited.
pub fn emit_tool_exited(exit_code: i32, duration_ms: u64) {
    info!(event = "tool.exited", exit_code = exit_code, duration_ms = duration_ms);
}

/// Emit event: report not present yet, waiting before the next check.
pub fn emit_report_waiting(path: &Path, attempt: u32, attempts: u32) {
    debug!(
        event = "report.waiting",
        path = %path.display(),
        attempt = attempt,
        attempts = attempts,
    );
}

/// Emit event: report artifact found.
pub fn emit_report_located(path: &Path, attempt: u32) {
    debug!(event = "report.located", path = %path.display(), attempt = attempt);
}

/// Emit event: report never appeared (warning level).
pub fn emit_report_missing(path: &Path, attempts: u32) {
    warn!(event = "report.missing", path = %path.display(), attempts = attempts);
}

/// Emit event: structural matching found nothing; heuristic strategy used.
pub fn emit_fallback_used() {
    warn!(event = "report.fallback_used");
}

/// Emit event: report could not be parsed (warning level).
pub fn emit_report_parse_failed(path: &Path, error: &dyn std::fmt::Display) {
    warn!(event = "report.parse_failed", path = %path.display(), error = %error);
}

/// Emit event: job finished with its final status.
pub fn emit_job_finished(job_id: &str, success: bool, duration_ms: u64) {
    info!(
        event = "job.finished",
        job_id = %job_id,
        success = success,
        duration_ms = duration_ms,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_span_create() {
        let span = job_span("job-1", "vadd");
        let _entered = span.enter();
        emit_job_started("job-1", "vadd", "xczu7ev-ffvc1156-2-e", 5.0);
        emit_job_finished("job-1", true, 12);
    }
}
