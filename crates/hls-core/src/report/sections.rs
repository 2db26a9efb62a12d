//! Phase one of report parsing: split the report into section spans.
//!
//! Each section starts at its header anchor and runs until the next anchor
//! (or end of text). Later phases only ever look inside their own span.

use serde::Serialize;

/// Marker introducing a section's summary table.
pub const SUMMARY_MARKER: &str = "* Summary:";

/// Marker introducing per-instance/per-loop detail tables after a summary.
pub const DETAIL_MARKER: &str = "+ Detail:";

/// The three report sections HLS Bench extracts.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Timing,
    Latency,
    Utilization,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [
        SectionKind::Timing,
        SectionKind::Latency,
        SectionKind::Utilization,
    ];

    /// Header text that anchors the section.
    pub fn anchor(&self) -> &'static str {
        match self {
            SectionKind::Timing => "Timing (ns)",
            SectionKind::Latency => "Latency (clock cycles)",
            SectionKind::Utilization => "Utilization Estimates",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Timing => "timing",
            SectionKind::Latency => "latency",
            SectionKind::Utilization => "utilization",
        }
    }
}

/// Section bodies (text after each anchor), borrowed from the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionSpans<'a> {
    pub timing: Option<&'a str>,
    pub latency: Option<&'a str>,
    pub utilization: Option<&'a str>,
}

impl<'a> SectionSpans<'a> {
    pub fn get(&self, kind: SectionKind) -> Option<&'a str> {
        match kind {
            SectionKind::Timing => self.timing,
            SectionKind::Latency => self.latency,
            SectionKind::Utilization => self.utilization,
        }
    }
}

/// Locate every section anchor and slice the report between them.
pub fn split_sections(content: &str) -> SectionSpans<'_> {
    let mut anchors: Vec<(usize, SectionKind)> = SectionKind::ALL
        .iter()
        .filter_map(|kind| content.find(kind.anchor()).map(|pos| (pos, *kind)))
        .collect();
    anchors.sort_by_key(|(pos, _)| *pos);

    let mut spans = SectionSpans::default();
    for (i, (start, kind)) in anchors.iter().enumerate() {
        let body_start = start + kind.anchor().len();
        let body_end = anchors
            .get(i + 1)
            .map(|(next, _)| *next)
            .unwrap_or(content.len());
        let body = &content[body_start..body_end.max(body_start)];
        match kind {
            SectionKind::Timing => spans.timing = Some(body),
            SectionKind::Latency => spans.latency = Some(body),
            SectionKind::Utilization => spans.utilization = Some(body),
        }
    }
    spans
}

/// Text after the section's summary marker, cut before any detail tables.
pub fn summary_block(body: &str) -> Option<&str> {
    let start = body.find(SUMMARY_MARKER)? + SUMMARY_MARKER.len();
    let rest = &body[start..];
    Some(match rest.find(DETAIL_MARKER) {
        Some(end) => &rest[..end],
        None => rest,
    })
}
