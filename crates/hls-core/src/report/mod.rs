//! csynth report parsing.
//!
//! Parsing runs in two phases: [`sections`] splits the report into spans by
//! header anchor, then [`structural`] matches each span's bordered summary
//! table. If none of the three sections match structurally, [`fallback`]
//! re-reads the spans line by line.
//!
//! # Modules
//!
//! - [`sections`]: `split_sections()`, `summary_block()`
//! - [`structural`]: bordered-table matching per section
//! - [`fallback`]: heuristic line splitting for degraded reports

pub mod fallback;
pub mod sections;
pub mod structural;

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::error::ReportParseError;
use crate::domain::metrics::{LatencyMetrics, TimingMetrics, UtilizationMetrics};

pub use sections::{split_sections, SectionKind, SectionSpans};
pub use structural::SectionMatch;

/// Which strategy produced a [`ParsedReport`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    Structural,
    Heuristic,
}

/// Metrics recovered from one report. Any subset of sections may be present.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub timing: Option<TimingMetrics>,
    pub latency: Option<LatencyMetrics>,
    pub utilization: Option<UtilizationMetrics>,
    pub strategy: ParseStrategy,
}

fn settle<T>(kind: SectionKind, matched: SectionMatch<T>) -> Option<T> {
    if let SectionMatch::Malformed(reason) = &matched {
        warn!(section = kind.name(), %reason, "discarding malformed section");
    }
    matched.into_option()
}

/// Parse report text.
pub fn parse_report(content: &str) -> Result<ParsedReport, ReportParseError> {
    let spans = split_sections(content);

    let timing = structural::match_timing(spans.timing);
    let latency = structural::match_latency(spans.latency);
    let utilization = structural::match_utilization(spans.utilization);

    if timing.is_absent() && latency.is_absent() && utilization.is_absent() {
        crate::obs::emit_fallback_used();
        let recovered = fallback::parse_fallback(&spans)?;
        return Ok(ParsedReport {
            timing: recovered.timing,
            latency: recovered.latency,
            utilization: recovered.utilization,
            strategy: ParseStrategy::Heuristic,
        });
    }

    let parsed = ParsedReport {
        timing: settle(SectionKind::Timing, timing),
        latency: settle(SectionKind::Latency, latency),
        utilization: settle(SectionKind::Utilization, utilization),
        strategy: ParseStrategy::Structural,
    };
    debug!(
        timing = parsed.timing.is_some(),
        latency = parsed.latency.is_some(),
        utilization = parsed.utilization.is_some(),
        "report parsed"
    );
    Ok(parsed)
}

/// Decode and parse report bytes read from `path`.
pub fn parse_report_bytes(path: &Path, bytes: &[u8]) -> Result<ParsedReport, ReportParseError> {
    let content = std::str::from_utf8(bytes).map_err(|_| ReportParseError::Encoding {
        path: path.to_path_buf(),
    })?;
    parse_report(content)
}

/// Read and parse a report file.
pub fn parse_report_file(path: &Path) -> Result<ParsedReport, ReportParseError> {
    let bytes = std::fs::read(path).map_err(|source| ReportParseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_report_bytes(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::{CellValue, ResourceKind};

    const CSYNTH_REPORT: &str = "\
================================================================
== Vivado HLS Report for 'vadd'
================================================================
* Date:           Mon Mar  4 10:21:07 2024

* Version:        2018.3 (Build 2405991 on Thu Dec 06 23:56:15 MST 2018)
* Project:        vadd_prj
* Solution:       solution1
* Product family: zynquplus
* Target device:  xczu7ev-ffvc1156-2-e


================================================================
== Performance Estimates
================================================================
+ Timing (ns):
    * Summary:
    +--------+-------+----------+------------+
    |  Clock | Target| Estimated| Uncertainty|
    +--------+-------+----------+------------+
    |default |   5.00|     3.45|        0.62|
    +--------+-------+----------+------------+

+ Latency (clock cycles):
    * Summary:
    +-----+-----+-----+-----+---------+
    |  Latency  |  Interval | Pipeline|
    | min | max | min | max |   Type  |
    +-----+-----+-----+-----+---------+
    |  102|    ?|  103|    ?|   none  |
    +-----+-----+-----+-----+---------+

    + Detail:
        * Instance:
        N/A

        * Loop:
        +----------+-----+-----+----------+-----------+-----------+------+----------+
        |          |  Latency  | Iteration|  Initiation Interval  | Trip |          |
        | Loop Name| min | max |  Latency |  achieved |   target  | Count| Pipelined|
        +----------+-----+-----+----------+-----------+-----------+------+----------+
        |- Loop 1  |  100|  100|         2|          1|          1|   100|    yes   |
        +----------+-----+-----+----------+-----------+-----------+------+----------+



================================================================
== Utilization Estimates
================================================================
* Summary:
+-----------------+---------+-------+--------+--------+-----+
|       Name      | BRAM_18K| DSP48E|   FF   |   LUT  | URAM|
+-----------------+---------+-------+--------+--------+-----+
|DSP              |        -|      -|       -|       -|    -|
|Expression       |        -|      -|       0|      39|    -|
|FIFO             |        -|      -|       -|       -|    -|
|Instance         |        -|      -|       -|       -|    -|
|Memory           |        -|      -|       -|       -|    -|
|Multiplexer      |        -|      -|       -|      27|    -|
|Register         |        -|      -|      36|       -|    -|
+-----------------+---------+-------+--------+--------+-----+
|Total            |        0|      ?|      36|      66|    0|
+-----------------+---------+-------+--------+--------+-----+
|Available        |      624|   1728|  460800|  230400|   96|
+-----------------+---------+-------+--------+--------+-----+
|Utilization (%)  |        0|      0|   ~0   |   ~0   |    0|
+-----------------+---------+-------+--------+--------+-----+

+ Detail:
    * Instance:
    N/A
";

    #[test]
    fn test_parse_full_report_structurally() {
        let parsed = parse_report(CSYNTH_REPORT).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Structural);

        let timing = parsed.timing.unwrap();
        assert_eq!(
            timing,
            TimingMetrics {
                clock_name: "default".to_string(),
                target_period_ns: 5.0,
                estimated_period_ns: 3.45,
                uncertainty_ns: 0.62,
            }
        );

        let latency = parsed.latency.unwrap();
        assert_eq!(latency.min_cycles, CellValue::Integer(102));
        assert_eq!(latency.max_cycles, CellValue::Unresolved);
        assert_eq!(latency.interval_min_cycles, CellValue::Integer(103));
        assert_eq!(latency.interval_max_cycles, CellValue::Unresolved);
        assert_eq!(latency.pipeline_type, "none");

        let util = parsed.utilization.unwrap();
        let used = util.used.unwrap();
        assert_eq!(used[&ResourceKind::Ff], CellValue::Integer(36));
        assert_eq!(used[&ResourceKind::Lut], CellValue::Integer(66));
        assert_eq!(used[&ResourceKind::Dsp], CellValue::Unresolved);
        let available = util.available.unwrap();
        assert_eq!(available[&ResourceKind::Uram], CellValue::Integer(96));
        let pct = util.percentage.unwrap();
        assert_eq!(pct[&ResourceKind::Ff], "~0");
        assert_eq!(pct[&ResourceKind::Bram], "0");
    }

    #[test]
    fn test_dash_and_unknown_resource_cells_stay_distinct() {
        let text = CSYNTH_REPORT.replace(
            "|Total            |        0|      ?|",
            "|Total            |        -|      ?|",
        );
        let used = parse_report(&text).unwrap().utilization.unwrap().used.unwrap();
        assert_eq!(used[&ResourceKind::Bram], CellValue::NotApplicable);
        assert_eq!(used[&ResourceKind::Bram].as_f64(), Some(0.0));
        assert_eq!(used[&ResourceKind::Dsp], CellValue::Unresolved);
        assert_ne!(used[&ResourceKind::Bram], used[&ResourceKind::Dsp]);
    }

    #[test]
    fn test_utilization_row_order_independent() {
        let total = "|Total            |        0|      ?|      36|      66|    0|";
        let available = "|Available        |      624|   1728|  460800|  230400|   96|";
        let percent = "|Utilization (%)  |        0|      0|   ~0   |   ~0   |    0|";
        let permuted = CSYNTH_REPORT
            .replace(total, "@@A@@")
            .replace(available, "@@B@@")
            .replace(percent, "@@C@@")
            .replace("@@A@@", percent)
            .replace("@@B@@", total)
            .replace("@@C@@", available);
        assert_ne!(permuted, CSYNTH_REPORT);

        let canonical = parse_report(CSYNTH_REPORT).unwrap().utilization;
        let reordered = parse_report(&permuted).unwrap().utilization;
        assert_eq!(canonical, reordered);
    }

    #[test]
    fn test_repeated_summary_row_last_wins() {
        let text = CSYNTH_REPORT.replace(
            "|Register         |        -|      -|      36|       -|    -|",
            "|Register         |        -|      -|      36|       -|    -|\n\
             |Total            |        9|      9|       9|       9|    9|",
        );
        let used = parse_report(&text).unwrap().utilization.unwrap().used.unwrap();
        // The summary Total row comes after the inserted one.
        assert_eq!(used[&ResourceKind::Lut], CellValue::Integer(66));
    }

    #[test]
    fn test_bad_timing_number_empties_only_timing() {
        let text = CSYNTH_REPORT.replace("|     3.45|", "|     x.yz|");
        let parsed = parse_report(&text).unwrap();
        assert!(parsed.timing.is_none());
        assert!(parsed.latency.is_some());
        assert!(parsed.utilization.is_some());
        assert_eq!(parsed.strategy, ParseStrategy::Structural);
    }

    #[test]
    fn test_partial_structural_match_does_not_invoke_fallback() {
        // Timing table loses its borders; latency and utilization still match.
        let text = CSYNTH_REPORT
            .replace("    +--------+-------+----------+------------+\n", "");
        let parsed = parse_report(&text).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Structural);
        assert!(parsed.timing.is_none());
        assert!(parsed.latency.is_some());
    }

    #[test]
    fn test_borderless_report_uses_fallback() {
        let borderless: String = CSYNTH_REPORT
            .lines()
            .filter(|l| !l.trim_start().starts_with("+-"))
            .collect::<Vec<_>>()
            .join("\n");
        let parsed = parse_report(&borderless).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Heuristic);

        let timing = parsed.timing.unwrap();
        assert_eq!(timing.clock_name, "default");
        assert_eq!(timing.estimated_period_ns, 3.45);
        assert_eq!(parsed.latency.unwrap().max_cycles, CellValue::Unresolved);
        let util = parsed.utilization.unwrap();
        assert_eq!(util.used.unwrap()[&ResourceKind::Lut], CellValue::Integer(66));
        assert_eq!(util.available.unwrap()[&ResourceKind::Bram], CellValue::Integer(624));
    }

    #[test]
    fn test_empty_report_parses_to_nothing() {
        let parsed = parse_report("").unwrap();
        assert!(parsed.timing.is_none());
        assert!(parsed.latency.is_none());
        assert!(parsed.utilization.is_none());
    }

    #[test]
    fn test_non_utf8_report_is_parse_error() {
        let err = parse_report_bytes(Path::new("r.rpt"), &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, ReportParseError::Encoding { .. }));
    }

    #[test]
    fn test_parse_report_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_report_file(&dir.path().join("absent.rpt")).unwrap_err();
        assert!(matches!(err, ReportParseError::Unreadable { .. }));
    }
}
