//! Per-job staging directory.

use std::path::{Path, PathBuf};

use hls_core::config::Retention;
use hls_core::domain::error::Result;
use hls_core::domain::job::SynthesisJob;
use hls_core::script::{ControlScript, SCRIPT_FILE_NAME};
use tracing::{debug, warn};

/// File name of the combined tool log inside the workspace.
pub const LOG_FILE_NAME: &str = "vivado_hls.log";

/// A reset working directory owned by one job.
///
/// Acquiring the workspace deletes whatever was at the path and recreates it
/// empty, so stale reports from a previous run can never be parsed. With
/// [`Retention::Discard`] everything except the combined log is removed when
/// the guard is dropped, on every exit path. A workspace with no log is
/// removed entirely.
#[derive(Debug)]
pub struct JobWorkspace {
    root: PathBuf,
    retention: Retention,
}

impl JobWorkspace {
    /// Reset `root` and take ownership of it.
    pub async fn acquire(root: impl Into<PathBuf>, retention: Retention) -> Result<Self> {
        let root = root.into();
        match tokio::fs::remove_dir_all(&root).await {
            Ok(()) => debug!(path = %root.display(), "removed stale workspace"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root, retention })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn script_path(&self) -> PathBuf {
        self.root.join(SCRIPT_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILE_NAME)
    }

    pub fn source_path(&self, job: &SynthesisJob) -> PathBuf {
        self.root.join(job.source_file_name())
    }

    /// Where the tool will write the report for `job` in this workspace.
    pub fn report_path(&self, job: &SynthesisJob) -> PathBuf {
        job.report_path_in(&self.root)
    }

    /// Write the source, any header files and the control script.
    pub async fn stage(&self, job: &SynthesisJob, script: &ControlScript) -> Result<()> {
        tokio::fs::write(self.source_path(job), &job.source_text).await?;
        for (name, contents) in &job.header_files {
            tokio::fs::write(self.root.join(name), contents).await?;
        }
        tokio::fs::write(self.script_path(), script.as_str()).await?;
        Ok(())
    }

    /// Persist the combined tool log and return its path.
    pub async fn persist_log(&self, text: &str) -> Result<PathBuf> {
        let path = self.log_path();
        tokio::fs::write(&path, text).await?;
        Ok(path)
    }
}

impl JobWorkspace {
    // Outcomes point at the log, so it outlives the rest of the workspace.
    fn discard(&self) -> std::io::Result<()> {
        if !self.log_path().is_file() {
            return std::fs::remove_dir_all(&self.root);
        }
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_name() == LOG_FILE_NAME {
                continue;
            }
            if entry.file_type()?.is_dir() {
                std::fs::remove_dir_all(entry.path())?;
            } else {
                std::fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if self.retention == Retention::Discard {
            if let Err(e) = self.discard() {
                warn!(path = %self.root.display(), error = %e, "failed to discard workspace");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(root: &Path) -> SynthesisJob {
        SynthesisJob::builder("vadd", "void vadd() {}\n")
            .workspace(root)
            .header_file("vadd.h", "#pragma once\n")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_acquire_resets_stale_contents() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("build");
        std::fs::create_dir_all(root.join("vadd_prj")).unwrap();
        std::fs::write(root.join("stale.rpt"), "old").unwrap();

        let ws = JobWorkspace::acquire(&root, Retention::Keep).await.unwrap();
        assert!(ws.path().is_dir());
        assert_eq!(std::fs::read_dir(ws.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_stage_writes_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("build");
        let job = job(&root);
        let script = ControlScript::render(&job);

        let ws = JobWorkspace::acquire(&root, Retention::Keep).await.unwrap();
        ws.stage(&job, &script).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(root.join("vadd.cpp")).unwrap(),
            "void vadd() {}\n"
        );
        assert_eq!(
            std::fs::read_to_string(root.join("vadd.h")).unwrap(),
            "#pragma once\n"
        );
        assert_eq!(
            std::fs::read_to_string(root.join("run.tcl")).unwrap(),
            script.as_str()
        );
        assert_eq!(
            ws.report_path(&job),
            root.join("vadd_prj/solution1/syn/report/vadd_csynth.rpt")
        );
    }

    #[tokio::test]
    async fn test_persist_log() {
        let dir = tempfile::tempdir().unwrap();
        let ws = JobWorkspace::acquire(dir.path().join("build"), Retention::Keep)
            .await
            .unwrap();
        let path = ws.persist_log("out\n\nSTDERR:\nerr").await.unwrap();
        assert!(path.ends_with(LOG_FILE_NAME));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "out\n\nSTDERR:\nerr");
    }

    #[tokio::test]
    async fn test_retention() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept");
        let discarded = dir.path().join("discarded");

        drop(JobWorkspace::acquire(&kept, Retention::Keep).await.unwrap());
        drop(JobWorkspace::acquire(&discarded, Retention::Discard).await.unwrap());

        assert!(kept.is_dir());
        assert!(!discarded.exists());
    }

    #[tokio::test]
    async fn test_discard_keeps_only_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("build");
        let job = job(&root);

        let ws = JobWorkspace::acquire(&root, Retention::Discard).await.unwrap();
        ws.stage(&job, &ControlScript::render(&job)).await.unwrap();
        std::fs::create_dir_all(root.join("vadd_prj/solution1")).unwrap();
        let log = ws.persist_log("csynth done").await.unwrap();
        drop(ws);

        assert_eq!(std::fs::read_to_string(&log).unwrap(), "csynth done");
        let remaining: Vec<_> = std::fs::read_dir(&root)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(remaining, vec![std::ffi::OsString::from(LOG_FILE_NAME)]);
    }
}
