//! Secondary strategy: line splitting for reports whose tables lost their
//! borders or alignment.
//!
//! Only used when the structural matcher found none of the three sections.
//! Locates each section by header text and takes the first delimited line
//! that looks like data.

use crate::domain::error::ReportParseError;
use crate::domain::metrics::{LatencyMetrics, ResourceKind, TimingMetrics, UtilizationMetrics};

use super::sections::{summary_block, SectionKind, SectionSpans};
use super::structural::{
    latency_from_cells, timing_from_cells, SectionMatch, UtilizationRole, UtilizationRows,
};

/// Sections recovered by the fallback strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackSections {
    pub timing: Option<TimingMetrics>,
    pub latency: Option<LatencyMetrics>,
    pub utilization: Option<UtilizationMetrics>,
}

fn delimited_cells(line: &str) -> Vec<&str> {
    line.trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split('|')
        .map(str::trim)
        .collect()
}

fn is_separator(line: &str) -> bool {
    line.contains("---")
}

fn summary_of<'a>(
    spans: &SectionSpans<'a>,
    kind: SectionKind,
) -> Result<Option<&'a str>, ReportParseError> {
    match spans.get(kind) {
        Some(body) => summary_block(body)
            .map(Some)
            .ok_or_else(|| ReportParseError::MissingSummary {
                section: kind.name().to_string(),
            }),
        None => Ok(None),
    }
}

/// Run the fallback over every section present in `spans`.
///
/// Fails only when a section header is present without its summary block.
pub fn parse_fallback(spans: &SectionSpans<'_>) -> Result<FallbackSections, ReportParseError> {
    Ok(FallbackSections {
        timing: summary_of(spans, SectionKind::Timing)?.and_then(fallback_timing),
        latency: summary_of(spans, SectionKind::Latency)?.and_then(fallback_latency),
        utilization: summary_of(spans, SectionKind::Utilization)?.and_then(fallback_utilization),
    })
}

fn fallback_timing(summary: &str) -> Option<TimingMetrics> {
    let cells = summary
        .lines()
        .filter(|l| l.contains('|') && !l.contains("Clock") && !is_separator(l))
        .map(delimited_cells)
        .find(|cells| cells.len() >= 4)?;
    match timing_from_cells(cells[0], cells[1], cells[2], cells[3]) {
        SectionMatch::Parsed(timing) => Some(timing),
        SectionMatch::Malformed(reason) => {
            tracing::warn!(section = "timing", %reason, "discarding fallback timing row");
            None
        }
        SectionMatch::Absent => None,
    }
}

fn fallback_latency(summary: &str) -> Option<LatencyMetrics> {
    summary
        .lines()
        .filter(|l| l.contains('|') && !l.contains("min") && !is_separator(l))
        .map(delimited_cells)
        .find(|cells| cells.len() >= 5)
        .map(|cells| latency_from_cells(&cells[..5]))
}

fn fallback_utilization(summary: &str) -> Option<UtilizationMetrics> {
    let mut total = None;
    let mut available = None;
    let mut percentage = None;

    for line in summary.lines().filter(|l| l.contains('|')) {
        let cells = delimited_cells(line);
        match UtilizationRole::classify(cells[0]) {
            Some(UtilizationRole::Total) => total = Some(cells),
            Some(UtilizationRole::Available) => available = Some(cells),
            Some(UtilizationRole::Percentage) => percentage = Some(cells),
            None => {}
        }
    }

    let (total, available, percentage) = (total?, available?, percentage?);
    if [&total, &available, &percentage].iter().any(|c| c.len() < 5) {
        return None;
    }

    let mut rows = UtilizationRows::default();
    rows.push(UtilizationRole::Total, &positional(&total, "0"));
    rows.push(UtilizationRole::Available, &positional(&available, "0"));
    rows.push(UtilizationRole::Percentage, &positional(&percentage, "0%"));
    rows.finish()
}

// Columns in report order; older tool versions omit the URAM column.
fn positional<'a>(cells: &[&'a str], missing_uram: &'a str) -> Vec<(ResourceKind, &'a str)> {
    ResourceKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let raw = cells.get(i + 1).copied().unwrap_or(missing_uram);
            (*kind, raw)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::CellValue;
    use crate::report::sections::split_sections;

    const DEGRADED: &str = "\
== Performance Estimates
+ Timing (ns):
    * Summary:
    |  Clock | Target| Estimated| Uncertainty|
    |ap_clk  |   10.00|     8.51|        1.25|

+ Latency (clock cycles):
    * Summary:
    |  Latency  |  Interval | Pipeline|
    | min | max | min | max |   Type  |
    |   12|    ?|   13|    ?|   none  |

== Utilization Estimates
* Summary:
|       Name      | BRAM_18K| DSP48E|   FF   |   LUT  |
|Total            |        2|      -|     120|     310|
|Available        |      280|    220|  106400|   53200|
|Utilization (%)  |       ~0|      0|      ~0|  ~0|
";

    #[test]
    fn test_fallback_extracts_degraded_sections() {
        let spans = split_sections(DEGRADED);
        let parsed = parse_fallback(&spans).unwrap();

        let timing = parsed.timing.unwrap();
        assert_eq!(timing.clock_name, "ap_clk");
        assert_eq!(timing.target_period_ns, 10.0);
        assert_eq!(timing.estimated_period_ns, 8.51);

        let latency = parsed.latency.unwrap();
        assert_eq!(latency.min_cycles, CellValue::Integer(12));
        assert_eq!(latency.max_cycles, CellValue::Unresolved);
        assert_eq!(latency.pipeline_type, "none");

        let util = parsed.utilization.unwrap();
        let used = util.used.unwrap();
        assert_eq!(used[&ResourceKind::Bram], CellValue::Integer(2));
        assert_eq!(used[&ResourceKind::Dsp], CellValue::NotApplicable);
        assert_eq!(used[&ResourceKind::Uram], CellValue::Integer(0));
        assert_eq!(util.percentage.unwrap()[&ResourceKind::Uram], "0%");
    }

    #[test]
    fn test_fallback_missing_summary_is_error() {
        let spans = split_sections("+ Timing (ns):\n  no summary here\n");
        let err = parse_fallback(&spans).unwrap_err();
        assert!(matches!(
            err,
            ReportParseError::MissingSummary { ref section } if section == "timing"
        ));
    }

    #[test]
    fn test_fallback_utilization_needs_all_rows() {
        let text = "== Utilization Estimates\n* Summary:\n|Total|1|2|3|4|5|\n";
        let parsed = parse_fallback(&split_sections(text)).unwrap();
        assert!(parsed.utilization.is_none());
    }
}
