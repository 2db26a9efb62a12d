//! Pair verification over a dataset.
//!
//! Each entry's original code is expected to fail synthesis and its fixed
//! code to pass. Entries run strictly one after another, reusing the same
//! workspace root.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use hls_core::classifier::verify_pair;
use hls_core::config::JobDefaults;
use hls_core::dataset::DatasetEntry;
use hls_core::domain::job::SynthesisJob;
use hls_core::domain::outcome::{FailureKind, SynthesisOutcome};
use hls_core::domain::verdict::PairVerdict;
use serde::Serialize;
use tracing::{info, warn};

use crate::pipeline::SynthesisPipeline;

/// Aggregate result of a verification run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VerificationSummary {
    pub verdicts: Vec<PairVerdict>,
    pub passed: usize,
    pub failed: usize,
    pub all_pass: bool,
    pub duration_ms: u64,
    pub generated_at: DateTime<Utc>,
}

impl VerificationSummary {
    pub fn from_verdicts(verdicts: Vec<PairVerdict>, duration_ms: u64) -> Self {
        let passed = verdicts.iter().filter(|v| v.overall_pass).count();
        let failed = verdicts.len() - passed;
        Self {
            all_pass: failed == 0,
            verdicts,
            passed,
            failed,
            duration_ms,
            generated_at: Utc::now(),
        }
    }
}

/// Job parameters shared by every entry of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct JobTemplate {
    pub defaults: JobDefaults,
    pub workspace: PathBuf,
}

impl JobTemplate {
    pub fn new(defaults: JobDefaults, workspace: impl Into<PathBuf>) -> Self {
        Self {
            defaults,
            workspace: workspace.into(),
        }
    }

    /// Job for `source`, or a failure outcome if the entry is not a valid job.
    pub fn job(&self, top_function: &str, source: &str) -> Result<SynthesisJob, SynthesisOutcome> {
        SynthesisJob::builder(top_function, source)
            .target_device(&self.defaults.target_device)
            .clock_period_ns(self.defaults.clock_period_ns)
            .solution(&self.defaults.solution)
            .workspace(&self.workspace)
            .build()
            .map_err(|e| {
                let message = e.to_string();
                SynthesisOutcome::failure(FailureKind::Execution, message.clone(), message, None)
            })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}

async fn synthesize(
    pipeline: &SynthesisPipeline,
    template: &JobTemplate,
    top_function: &str,
    source: &str,
) -> SynthesisOutcome {
    match template.job(top_function, source) {
        Ok(job) => pipeline.run(&job).await,
        Err(outcome) => outcome,
    }
}

/// Verify one entry: original expected not synthesizable, fix expected synthesizable.
pub async fn verify_entry(
    pipeline: &SynthesisPipeline,
    template: &JobTemplate,
    entry: &DatasetEntry,
) -> PairVerdict {
    let original = synthesize(pipeline, template, &entry.top_function, &entry.original_code).await;
    let rewritten = synthesize(pipeline, template, &entry.top_function, &entry.fixed_code).await;

    let verdict = verify_pair(
        &entry.number.to_string(),
        &entry.top_function,
        &original,
        &rewritten,
    );
    if verdict.overall_pass {
        info!(
            event = "verify.entry",
            example = entry.number,
            top = %entry.top_function,
            pass = true,
        );
    } else {
        warn!(
            event = "verify.entry",
            example = entry.number,
            top = %entry.top_function,
            original_pass = verdict.original.pass,
            rewritten_pass = verdict.rewritten.pass,
            pass = false,
        );
    }
    verdict
}

/// Verify every entry in order.
pub async fn verify_entries(
    pipeline: &SynthesisPipeline,
    template: &JobTemplate,
    entries: &[DatasetEntry],
) -> VerificationSummary {
    let start = Instant::now();
    let mut verdicts = Vec::with_capacity(entries.len());
    for entry in entries {
        verdicts.push(verify_entry(pipeline, template, entry).await);
    }
    let summary = VerificationSummary::from_verdicts(verdicts, start.elapsed().as_millis() as u64);
    info!(
        event = "verify.finished",
        passed = summary.passed,
        failed = summary.failed,
        all_pass = summary.all_pass,
        duration_ms = summary.duration_ms,
    );
    summary
}
