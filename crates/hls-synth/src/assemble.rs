//! Turns a finished process and its report lookup into a [`SynthesisOutcome`].
//!
//! | condition                                 | outcome                                 |
//! |-------------------------------------------|-----------------------------------------|
//! | exit code != 0                            | `error`, bounded stderr/stdout excerpt  |
//! | exit 0, report never located              | `success`, empty metrics, missing note  |
//! | exit 0, report parsed (any section subset) | `success`, parsed metrics              |
//! | exit 0, report unparsable                 | `success`, empty metrics, parse note    |

use std::path::PathBuf;

use hls_core::domain::error::{HlsError, ReportParseError};
use hls_core::domain::outcome::{
    FailureKind, ProcessOutcome, ReportNote, SynthesisOutcome, SynthesisReport,
    FAILURE_EXCERPT_CHARS,
};
use hls_core::obs::emit_report_parse_failed;
use hls_core::report::ParsedReport;

/// What happened when looking for and reading the report.
#[derive(Debug)]
pub enum ReportLookup {
    Parsed { path: PathBuf, report: ParsedReport },
    Missing { expected: PathBuf },
    Unparsable { path: PathBuf, error: ReportParseError },
}

/// Outcome for a process that exited nonzero.
pub fn failure_outcome(process: &ProcessOutcome, log_path: PathBuf) -> SynthesisOutcome {
    let error = HlsError::SynthesisFailure {
        exit_code: process.exit_code,
        excerpt: process.failure_excerpt(FAILURE_EXCERPT_CHARS).to_string(),
    };
    SynthesisOutcome::failure(
        FailureKind::SynthesisFailed {
            exit_code: process.exit_code,
        },
        error.to_string(),
        process.combined_log(),
        Some(log_path),
    )
}

/// Outcome for a process that exited cleanly.
pub fn success_outcome(
    process: &ProcessOutcome,
    log_path: PathBuf,
    lookup: ReportLookup,
) -> SynthesisOutcome {
    let raw_log = process.combined_log();
    let report = match lookup {
        ReportLookup::Parsed { path, report } => {
            SynthesisReport::from_parsed(report, path, raw_log, log_path)
        }
        ReportLookup::Missing { expected } => SynthesisReport::empty(raw_log, log_path)
            .with_note(report_note(HlsError::ReportMissing { path: expected })),
        ReportLookup::Unparsable { path, error } => {
            emit_report_parse_failed(&path, &error);
            let mut report = SynthesisReport::empty(raw_log, log_path)
                .with_note(report_note(HlsError::ReportParse(error)));
            report.report_path = Some(path);
            report
        }
    };
    SynthesisOutcome::Success(report)
}

fn report_note(error: HlsError) -> ReportNote {
    ReportNote::try_from(error).unwrap_or_else(|other| ReportNote::ParseError {
        message: other.to_string(),
    })
}
