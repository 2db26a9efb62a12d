//! Primary strategy: bordered-table matching.
//!
//! A summary table is a run of border lines (`+----+---+`) and row lines
//! (`|a |b |`). The border fixes the column count; cells are taken by
//! position within a row, independent of column width.

use crate::domain::metrics::{
    CellValue, LatencyMetrics, ResourceKind, ResourceRow, TimingMetrics, UtilizationMetrics,
};

use super::sections::summary_block;

/// Result of matching one section against its expected layout.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionMatch<T> {
    /// Layout matched and all fields converted.
    Parsed(T),
    /// Layout matched but the content could not be converted.
    Malformed(String),
    /// No table with the expected layout was found.
    Absent,
}

impl<T> SectionMatch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, SectionMatch::Absent)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            SectionMatch::Parsed(value) => Some(value),
            SectionMatch::Malformed(_) | SectionMatch::Absent => None,
        }
    }
}

/// A bordered table split at its first inner border.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column count implied by the border.
    pub columns: usize,
    /// Rows above the header separator.
    pub header: Vec<Vec<String>>,
    /// Rows below the header separator, borders removed.
    pub body: Vec<Vec<String>>,
}

fn is_border(line: &str) -> bool {
    line.len() > 2
        && line.starts_with('+')
        && line.ends_with('+')
        && line.contains('-')
        && line.chars().all(|c| c == '+' || c == '-')
}

fn is_row(line: &str) -> bool {
    line.len() > 1 && line.starts_with('|') && line.ends_with('|')
}

fn row_cells(line: &str) -> Vec<String> {
    let inner = &line[1..line.len() - 1];
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

/// Find the first bordered table in `block`.
pub fn first_table(block: &str) -> Option<Table> {
    let lines: Vec<&str> = block.lines().map(str::trim).collect();
    let start = lines.iter().position(|l| is_border(l))?;
    let columns = lines[start].matches('+').count() - 1;

    let mut header = Vec::new();
    let mut body = Vec::new();
    let mut past_header = false;
    let mut closed = false;

    for line in &lines[start + 1..] {
        if is_border(line) {
            past_header = true;
            closed = true;
        } else if is_row(line) {
            closed = false;
            if past_header {
                body.push(row_cells(line));
            } else {
                header.push(row_cells(line));
            }
        } else {
            break;
        }
    }

    if !past_header || !closed || header.is_empty() {
        return None;
    }
    Some(Table {
        columns,
        header,
        body,
    })
}

fn summary_table(span: Option<&str>, columns: usize) -> Option<Table> {
    let table = first_table(summary_block(span?)?)?;
    (table.columns == columns).then_some(table)
}

fn parse_f64(field: &str, raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("{} value '{}' is not a number", field, raw))
}

/// Timing: single data row of clock name + target/estimated/uncertainty.
pub fn match_timing(span: Option<&str>) -> SectionMatch<TimingMetrics> {
    let Some(table) = summary_table(span, 4) else {
        return SectionMatch::Absent;
    };
    let Some(row) = table.body.iter().find(|r| r.len() == 4) else {
        return SectionMatch::Absent;
    };
    timing_from_cells(&row[0], &row[1], &row[2], &row[3])
}

pub(crate) fn timing_from_cells(
    clock: &str,
    target: &str,
    estimated: &str,
    uncertainty: &str,
) -> SectionMatch<TimingMetrics> {
    match convert_timing(clock, target, estimated, uncertainty) {
        Ok(timing) => SectionMatch::Parsed(timing),
        Err(reason) => SectionMatch::Malformed(reason),
    }
}

// Any unparsable numeric field discards the whole row.
fn convert_timing(
    clock: &str,
    target: &str,
    estimated: &str,
    uncertainty: &str,
) -> Result<TimingMetrics, String> {
    Ok(TimingMetrics {
        clock_name: clock.trim().to_string(),
        target_period_ns: parse_f64("target", target.trim())?,
        estimated_period_ns: parse_f64("estimated", estimated.trim())?,
        uncertainty_ns: parse_f64("uncertainty", uncertainty.trim())?,
    })
}

/// Latency: single data row of four cycle counts + pipeline type.
pub fn match_latency(span: Option<&str>) -> SectionMatch<LatencyMetrics> {
    let Some(table) = summary_table(span, 5) else {
        return SectionMatch::Absent;
    };
    match table.body.iter().find(|r| r.len() == 5) {
        Some(row) => SectionMatch::Parsed(latency_from_cells(row)),
        None => SectionMatch::Absent,
    }
}

pub(crate) fn latency_from_cells<S: AsRef<str>>(cells: &[S]) -> LatencyMetrics {
    LatencyMetrics {
        min_cycles: CellValue::parse_cycles(cells[0].as_ref()),
        max_cycles: CellValue::parse_cycles(cells[1].as_ref()),
        interval_min_cycles: CellValue::parse_cycles(cells[2].as_ref()),
        interval_max_cycles: CellValue::parse_cycles(cells[3].as_ref()),
        pipeline_type: cells[4].as_ref().trim().to_string(),
    }
}

/// Role of a utilization row, decided by its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilizationRole {
    Total,
    Available,
    Percentage,
}

impl UtilizationRole {
    pub fn classify(label: &str) -> Option<Self> {
        if label.contains("Total") {
            Some(UtilizationRole::Total)
        } else if label.contains("Available") {
            Some(UtilizationRole::Available)
        } else if label.contains("Utilization") {
            Some(UtilizationRole::Percentage)
        } else {
            None
        }
    }
}

/// Collects labelled utilization rows; a later row with the same role
/// replaces an earlier one.
#[derive(Debug, Default)]
pub(crate) struct UtilizationRows {
    metrics: UtilizationMetrics,
}

impl UtilizationRows {
    pub(crate) fn push<S: AsRef<str>>(
        &mut self,
        role: UtilizationRole,
        cells: &[(ResourceKind, S)],
    ) {
        match role {
            UtilizationRole::Total => {
                self.metrics.used = Some(resource_row(cells));
            }
            UtilizationRole::Available => {
                self.metrics.available = Some(resource_row(cells));
            }
            UtilizationRole::Percentage => {
                self.metrics.percentage = Some(
                    cells
                        .iter()
                        .map(|(kind, raw)| (*kind, raw.as_ref().trim().to_string()))
                        .collect(),
                );
            }
        }
    }

    pub(crate) fn finish(self) -> Option<UtilizationMetrics> {
        (!self.metrics.is_empty()).then_some(self.metrics)
    }
}

fn resource_row<S: AsRef<str>>(cells: &[(ResourceKind, S)]) -> ResourceRow<CellValue> {
    cells
        .iter()
        .map(|(kind, raw)| (*kind, CellValue::parse_resource(raw.as_ref())))
        .collect()
}

/// Utilization: scan every row, keep `Total`, `Available` and `Utilization`.
///
/// Resource columns are identified from the header row, so column order in
/// the report does not matter; rows of other labels are ignored.
pub fn match_utilization(span: Option<&str>) -> SectionMatch<UtilizationMetrics> {
    let Some(table) = span
        .and_then(summary_block)
        .and_then(first_table)
        .filter(|t| t.columns >= 2)
    else {
        return SectionMatch::Absent;
    };
    let Some(header) = table.header.iter().find(|r| r.len() == table.columns) else {
        return SectionMatch::Absent;
    };

    let kinds: Vec<(usize, ResourceKind)> = header
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(idx, name)| ResourceKind::from_header(name).map(|k| (idx, k)))
        .collect();
    if kinds.is_empty() {
        return SectionMatch::Absent;
    }

    let mut rows = UtilizationRows::default();
    for row in table.body.iter().filter(|r| r.len() == table.columns) {
        let Some(role) = UtilizationRole::classify(&row[0]) else {
            continue;
        };
        let cells: Vec<(ResourceKind, &str)> = kinds
            .iter()
            .map(|(idx, kind)| (*kind, row[*idx].as_str()))
            .collect();
        rows.push(role, &cells);
    }

    match rows.finish() {
        Some(metrics) => SectionMatch::Parsed(metrics),
        None => SectionMatch::Malformed("no Total/Available/Utilization rows".to_string()),
    }
}
