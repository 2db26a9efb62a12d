//! Bounded wait for the report artifact.
//!
//! The tool can exit before its report is flushed to disk, so the report
//! path is polled a fixed number of times before giving up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hls_core::config::ReportPollConfig;
use hls_core::obs::{emit_report_located, emit_report_missing, emit_report_waiting};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportLocator {
    attempts: u32,
    interval: Duration,
}

impl Default for ReportLocator {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl ReportLocator {
    /// `attempts` is clamped to at least one check.
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            interval,
        }
    }

    pub fn from_config(config: &ReportPollConfig) -> Self {
        Self::new(config.poll_attempts, config.interval())
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Check `path` up to `attempts` times, sleeping `interval` between
    /// checks. Returns the path once it is a file, or `None` when the budget
    /// is spent.
    pub async fn locate(&self, path: &Path) -> Option<PathBuf> {
        for attempt in 1..=self.attempts {
            if tokio::fs::metadata(path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false)
            {
                emit_report_located(path, attempt);
                return Some(path.to_path_buf());
            }
            if attempt < self.attempts {
                emit_report_waiting(path, attempt, self.attempts);
                tokio::time::sleep(self.interval).await;
            }
        }
        emit_report_missing(path, self.attempts);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_locates_existing_report_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("top_csynth.rpt");
        std::fs::write(&path, "report").unwrap();

        let locator = ReportLocator::new(3, Duration::from_secs(60));
        assert_eq!(locator.locate(&path).await, Some(path));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_report_spends_bounded_budget() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.rpt");

        let start = tokio::time::Instant::now();
        let located = ReportLocator::default().locate(&path).await;
        assert!(located.is_none());
        // Three checks, two sleeps in between.
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(2));
        assert!(waited < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_report_appearing_late_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.rpt");
        let writer_path = path.clone();
        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            tokio::fs::write(writer_path, "report").await.unwrap();
        });

        let locator = ReportLocator::new(20, Duration::from_millis(25));
        assert_eq!(locator.locate(&path).await, Some(path));
        writer.await.unwrap();
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(ReportLocator::new(0, Duration::ZERO).attempts(), 1);
    }

    #[test]
    fn test_from_config() {
        let locator = ReportLocator::from_config(&ReportPollConfig {
            poll_attempts: 5,
            poll_interval_ms: 200,
        });
        assert_eq!(locator, ReportLocator::new(5, Duration::from_millis(200)));
    }
}
