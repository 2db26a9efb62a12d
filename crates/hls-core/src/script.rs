//! Control-script rendering for the HLS tool.
//!
//! The script drives one synthesis: reset/open the project, register the
//! source, set the top function, reset/open the solution, select the part,
//! constrain the clock, run C synthesis and exit.

use sha2::{Digest, Sha256};

use crate::domain::job::SynthesisJob;

/// File name of the control script inside the workspace.
pub const SCRIPT_FILE_NAME: &str = "run.tcl";

/// Rendered control script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlScript {
    text: String,
}

impl ControlScript {
    /// Render the script for `job`. Pure: identical jobs give identical text.
    pub fn render(job: &SynthesisJob) -> Self {
        let mut text = String::new();
        text.push_str("# Project settings\n");
        text.push_str(&format!("open_project -reset {}\n", job.project_name()));
        text.push_str(&format!("add_files {}\n", job.source_file_name()));
        text.push_str(&format!("set_top {}\n", job.top_function));
        text.push('\n');
        text.push_str("# Create solution\n");
        text.push_str(&format!("open_solution -reset \"{}\"\n", job.solution));
        text.push_str(&format!("set_part {{{}}}\n", job.target_device));
        text.push_str(&format!(
            "create_clock -period {} -name default\n",
            job.clock_period_ns
        ));
        text.push('\n');
        text.push_str("# Synthesis process\n");
        text.push_str("csynth_design\n");
        text.push('\n');
        text.push_str("exit\n");
        Self { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// SHA-256 hex digest of the script text.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl AsRef<str> for ControlScript {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> SynthesisJob {
        SynthesisJob::builder("vadd", "void vadd() {}")
            .target_device("xc7z020clg484-1")
            .clock_period_ns(10.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_script_directive_order() {
        let script = ControlScript::render(&job());
        let directives: Vec<&str> = script
            .as_str()
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        assert_eq!(
            directives,
            vec![
                "open_project -reset vadd_prj",
                "add_files vadd.cpp",
                "set_top vadd",
                "open_solution -reset \"solution1\"",
                "set_part {xc7z020clg484-1}",
                "create_clock -period 10 -name default",
                "csynth_design",
                "exit",
            ]
        );
    }

    #[test]
    fn test_script_rendering_deterministic() {
        let a = ControlScript::render(&job());
        let b = ControlScript::render(&job());
        assert_eq!(a.as_str(), b.as_str());
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_script_digest_tracks_parameters() {
        let other = SynthesisJob::builder("vadd", "void vadd() {}")
            .target_device("xc7z020clg484-1")
            .clock_period_ns(3.3)
            .build()
            .unwrap();
        assert_ne!(
            ControlScript::render(&job()).digest(),
            ControlScript::render(&other).digest()
        );
        assert!(ControlScript::render(&other)
            .as_str()
            .contains("create_clock -period 3.3 -name default"));
    }
}
