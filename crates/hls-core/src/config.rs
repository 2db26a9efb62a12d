//! Runtime configuration.
//!
//! Loaded from an optional TOML file, then overridden by `HLS_TOOL_PATH` and
//! `HLS_TIMEOUT_SECS`. Every field has a default, so an empty file (or no
//! file) is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::{HlsError, Result};
use crate::domain::job::{DEFAULT_CLOCK_PERIOD_NS, DEFAULT_SOLUTION, DEFAULT_TARGET_DEVICE};

/// Environment variable overriding `tool.path`.
pub const ENV_TOOL_PATH: &str = "HLS_TOOL_PATH";

/// Environment variable overriding `tool.timeout_secs`.
pub const ENV_TIMEOUT_SECS: &str = "HLS_TIMEOUT_SECS";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HlsConfig {
    pub tool: ToolConfig,
    pub job: JobDefaults,
    pub report: ReportPollConfig,
    pub workspace: WorkspaceConfig,
}

/// How to find and run the synthesis tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    /// Explicit executable; skips discovery when set.
    pub path: Option<PathBuf>,

    /// Install locations probed in order.
    pub candidates: Vec<PathBuf>,

    /// Executable names searched on `PATH`.
    pub names: Vec<String>,

    /// Kill the tool after this many seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            path: None,
            candidates: vec![
                PathBuf::from(r"C:\Xilinx\Vivado\2018.3\bin\vivado_hls.bat"),
                PathBuf::from(r"C:\Xilinx\Vivado_HLS\2018.3\bin\vivado_hls.bat"),
                PathBuf::from(r"D:\Xilinx\Vivado\2018.3\bin\vivado_hls.bat"),
                PathBuf::from(r"D:\Xilinx\Vivado_HLS\2018.3\bin\vivado_hls.bat"),
                PathBuf::from("/opt/Xilinx/Vivado/2018.3/bin/vivado_hls"),
            ],
            names: vec!["vivado_hls".to_string(), "vitis_hls".to_string()],
            timeout_secs: None,
        }
    }
}

impl ToolConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Defaults applied to jobs that do not set their own parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JobDefaults {
    pub target_device: String,
    pub clock_period_ns: f64,
    pub solution: String,
}

impl Default for JobDefaults {
    fn default() -> Self {
        Self {
            target_device: DEFAULT_TARGET_DEVICE.to_string(),
            clock_period_ns: DEFAULT_CLOCK_PERIOD_NS,
            solution: DEFAULT_SOLUTION.to_string(),
        }
    }
}

/// Bounded wait for the report artifact after the tool exits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportPollConfig {
    pub poll_attempts: u32,
    pub poll_interval_ms: u64,
}

impl Default for ReportPollConfig {
    fn default() -> Self {
        Self {
            poll_attempts: 3,
            poll_interval_ms: 1000,
        }
    }
}

impl ReportPollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// What happens to a job's workspace when the job is done.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    /// Leave the directory and all artifacts in place.
    #[default]
    Keep,
    /// Remove everything but the combined log when the workspace guard is dropped.
    Discard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
    pub retention: Retention,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("build"),
            retention: Retention::Keep,
        }
    }
}

impl HlsConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| HlsError::Config(e.to_string()))
    }

    /// Load `path` if given, otherwise defaults; then apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    HlsError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup` (normally the environment).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_TOOL_PATH).filter(|v| !v.is_empty()) {
            self.tool.path = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).filter(|v| !v.is_empty()) {
            let secs = secs.parse::<u64>().map_err(|_| {
                HlsError::Config(format!(
                    "{} must be whole seconds, got '{}'",
                    ENV_TIMEOUT_SECS, secs
                ))
            })?;
            self.tool.timeout_secs = Some(secs);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.report.poll_attempts == 0 {
            return Err(HlsError::Config(
                "report.poll_attempts must be at least 1".to_string(),
            ));
        }
        if !(self.job.clock_period_ns.is_finite() && self.job.clock_period_ns > 0.0) {
            return Err(HlsError::Config(
                "job.clock_period_ns must be positive".to_string(),
            ));
        }
        if self.tool.timeout_secs == Some(0) {
            return Err(HlsError::Config(
                "tool.timeout_secs must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}
