//! Synthesis job definition and validation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use super::error::{HlsError, Result};

/// Default target part.
pub const DEFAULT_TARGET_DEVICE: &str = "xczu7ev-ffvc1156-2-e";

/// Default clock period in nanoseconds.
pub const DEFAULT_CLOCK_PERIOD_NS: f64 = 5.0;

/// Default solution name.
pub const DEFAULT_SOLUTION: &str = "solution1";

/// A single synthesis run: one source snippet, one top function, one workspace.
///
/// Built through [`SynthesisJob::builder`], which validates the top function
/// name and clock period. Immutable once built.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SynthesisJob {
    /// Identifier used for log correlation.
    pub job_id: Uuid,

    /// Top-level function handed to the tool.
    pub top_function: String,

    /// Target device part number.
    pub target_device: String,

    /// Clock constraint in nanoseconds (> 0).
    pub clock_period_ns: f64,

    /// Raw source code.
    pub source_text: String,

    /// Per-run working directory.
    pub workspace_path: PathBuf,

    /// Solution name used in the control script and report path.
    pub solution: String,

    /// Extra files written beside the source (file name -> contents).
    pub header_files: BTreeMap<String, String>,
}

impl SynthesisJob {
    /// Start building a job for `top_function` over `source_text`.
    pub fn builder(
        top_function: impl Into<String>,
        source_text: impl Into<String>,
    ) -> SynthesisJobBuilder {
        SynthesisJobBuilder {
            top_function: top_function.into(),
            source_text: source_text.into(),
            target_device: DEFAULT_TARGET_DEVICE.to_string(),
            clock_period_ns: DEFAULT_CLOCK_PERIOD_NS,
            workspace_path: PathBuf::from("build"),
            solution: DEFAULT_SOLUTION.to_string(),
            header_files: BTreeMap::new(),
        }
    }

    /// Project name derived from the top function.
    pub fn project_name(&self) -> String {
        format!("{}_prj", self.top_function)
    }

    /// File name the source is written to inside the workspace.
    pub fn source_file_name(&self) -> String {
        format!("{}.cpp", self.top_function)
    }

    /// Where the tool writes its synthesis report, relative to `workspace`.
    pub fn report_path_in(&self, workspace: &Path) -> PathBuf {
        workspace
            .join(self.project_name())
            .join(&self.solution)
            .join("syn")
            .join("report")
            .join(format!("{}_csynth.rpt", self.top_function))
    }

    /// Report path inside this job's own workspace.
    pub fn report_path(&self) -> PathBuf {
        self.report_path_in(&self.workspace_path)
    }
}

/// Builder for [`SynthesisJob`].
#[derive(Debug, Clone)]
pub struct SynthesisJobBuilder {
    top_function: String,
    source_text: String,
    target_device: String,
    clock_period_ns: f64,
    workspace_path: PathBuf,
    solution: String,
    header_files: BTreeMap<String, String>,
}

impl SynthesisJobBuilder {
    pub fn target_device(mut self, device: impl Into<String>) -> Self {
        self.target_device = device.into();
        self
    }

    pub fn clock_period_ns(mut self, period: f64) -> Self {
        self.clock_period_ns = period;
        self
    }

    pub fn workspace(mut self, path: impl Into<PathBuf>) -> Self {
        self.workspace_path = path.into();
        self
    }

    pub fn solution(mut self, solution: impl Into<String>) -> Self {
        self.solution = solution.into();
        self
    }

    /// Add a file to be written beside the source (e.g. a header it includes).
    pub fn header_file(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.header_files.insert(name.into(), contents.into());
        self
    }

    /// Validate and build the job.
    pub fn build(self) -> Result<SynthesisJob> {
        if !is_identifier(&self.top_function) {
            return Err(HlsError::InvalidJob(format!(
                "top function '{}' is not a valid identifier",
                self.top_function
            )));
        }
        if !(self.clock_period_ns.is_finite() && self.clock_period_ns > 0.0) {
            return Err(HlsError::InvalidJob(format!(
                "clock period must be positive, got {}",
                self.clock_period_ns
            )));
        }
        if self.target_device.trim().is_empty() {
            return Err(HlsError::InvalidJob(
                "target device cannot be empty".to_string(),
            ));
        }
        if !is_identifier(&self.solution) {
            return Err(HlsError::InvalidJob(format!(
                "solution '{}' is not a valid name",
                self.solution
            )));
        }
        for name in self.header_files.keys() {
            if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
                return Err(HlsError::InvalidJob(format!(
                    "header file name '{}' must be a plain file name",
                    name
                )));
            }
        }

        Ok(SynthesisJob {
            job_id: Uuid::new_v4(),
            top_function: self.top_function,
            target_device: self.target_device,
            clock_period_ns: self.clock_period_ns,
            source_text: self.source_text,
            workspace_path: self.workspace_path,
            solution: self.solution,
            header_files: self.header_files,
        })
    }
}

/// C identifier check: `[A-Za-z_][A-Za-z0-9_]*`.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
