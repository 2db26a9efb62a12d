//! Normalized metrics extracted from a synthesis report.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Marker the tool prints when it cannot bound a value.
pub const UNRESOLVED_MARKER: &str = "?";

/// Marker the tool prints in resource cells that do not apply.
pub const NOT_APPLICABLE_MARKER: &str = "-";

/// A single numeric cell from a report table.
///
/// `Unresolved` and `NotApplicable` are distinct states: the first means the
/// tool could not determine the value, the second that the resource is not
/// used by that row at all. `NotApplicable` reads as numeric zero but never
/// compares equal to `Unresolved`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Unresolved,
    NotApplicable,
    /// Cell text that is neither a marker nor a number (ranges, annotations).
    Text(String),
}

impl CellValue {
    /// Convert a latency/interval cell: marker, then integer, then float,
    /// otherwise the literal text.
    pub fn parse_cycles(raw: &str) -> Self {
        let text = raw.trim();
        if text == UNRESOLVED_MARKER {
            return CellValue::Unresolved;
        }
        parse_number(text)
    }

    /// Convert a resource cell. Same as [`CellValue::parse_cycles`] plus the
    /// dash marker for "not applicable".
    pub fn parse_resource(raw: &str) -> Self {
        let text = raw.trim();
        if text == NOT_APPLICABLE_MARKER {
            return CellValue::NotApplicable;
        }
        Self::parse_cycles(text)
    }

    /// Numeric reading of the cell. `NotApplicable` reads as 0.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            CellValue::NotApplicable => Some(0.0),
            CellValue::Unresolved | CellValue::Text(_) => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, CellValue::Unresolved)
    }
}

fn parse_number(text: &str) -> CellValue {
    if let Ok(v) = text.parse::<i64>() {
        return CellValue::Integer(v);
    }
    match text.parse::<f64>() {
        Ok(v) => CellValue::Float(v),
        Err(_) => CellValue::Text(text.to_string()),
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Unresolved => f.write_str(UNRESOLVED_MARKER),
            CellValue::NotApplicable => f.write_str("0"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

// Job results keep the tool's conventions: unresolved cells serialize as the
// marker string, not-applicable cells as 0.
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Integer(v) => serializer.serialize_i64(*v),
            CellValue::Float(v) => serializer.serialize_f64(*v),
            CellValue::Unresolved => serializer.serialize_str(UNRESOLVED_MARKER),
            CellValue::NotApplicable => serializer.serialize_i64(0),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Resource kinds reported in the utilization summary.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceKind {
    Bram,
    Dsp,
    Ff,
    Lut,
    Uram,
}

impl ResourceKind {
    /// All kinds in report column order.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Bram,
        ResourceKind::Dsp,
        ResourceKind::Ff,
        ResourceKind::Lut,
        ResourceKind::Uram,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Bram => "BRAM",
            ResourceKind::Dsp => "DSP",
            ResourceKind::Ff => "FF",
            ResourceKind::Lut => "LUT",
            ResourceKind::Uram => "URAM",
        }
    }

    /// Map a column header (`BRAM_18K`, `DSP48E`, ...) to its kind.
    pub fn from_header(header: &str) -> Option<Self> {
        let upper = header.trim().to_ascii_uppercase();
        if upper.starts_with("URAM") {
            Some(ResourceKind::Uram)
        } else if upper.starts_with("BRAM") {
            Some(ResourceKind::Bram)
        } else if upper.starts_with("DSP") {
            Some(ResourceKind::Dsp)
        } else if upper == "FF" {
            Some(ResourceKind::Ff)
        } else if upper == "LUT" {
            Some(ResourceKind::Lut)
        } else {
            None
        }
    }
}

/// One utilization row keyed by resource kind.
pub type ResourceRow<T> = BTreeMap<ResourceKind, T>;

/// Timing summary. Absent entirely when the section is missing or unparsable.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimingMetrics {
    #[serde(rename = "clock")]
    pub clock_name: String,

    #[serde(rename = "target")]
    pub target_period_ns: f64,

    #[serde(rename = "estimated")]
    pub estimated_period_ns: f64,

    #[serde(rename = "uncertainty")]
    pub uncertainty_ns: f64,
}

/// Latency summary in clock cycles.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatencyMetrics {
    #[serde(rename = "min")]
    pub min_cycles: CellValue,

    #[serde(rename = "max")]
    pub max_cycles: CellValue,

    #[serde(rename = "interval_min")]
    pub interval_min_cycles: CellValue,

    #[serde(rename = "interval_max")]
    pub interval_max_cycles: CellValue,

    pub pipeline_type: String,
}

/// Utilization summary: the `Total`, `Available` and `Utilization (%)` rows.
///
/// Each row is present only if the report contained it.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UtilizationMetrics {
    #[serde(rename = "resources", skip_serializing_if = "Option::is_none")]
    pub used: Option<ResourceRow<CellValue>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<ResourceRow<CellValue>>,

    /// Raw percentage cells (`~0`, `12`, ...), kept as text.
    #[serde(rename = "utilization_percentage", skip_serializing_if = "Option::is_none")]
    pub percentage: Option<ResourceRow<String>>,
}

impl UtilizationMetrics {
    pub fn is_empty(&self) -> bool {
        self.used.is_none() && self.available.is_none() && self.percentage.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cycles_conversion_order() {
        assert_eq!(CellValue::parse_cycles(" 42 "), CellValue::Integer(42));
        assert_eq!(CellValue::parse_cycles("3.5"), CellValue::Float(3.5));
        assert_eq!(CellValue::parse_cycles("?"), CellValue::Unresolved);
        assert_eq!(
            CellValue::parse_cycles("2 ~ 10"),
            CellValue::Text("2 ~ 10".to_string())
        );
    }

    #[test]
    fn test_dash_is_not_applicable_only_for_resources() {
        assert_eq!(CellValue::parse_resource("-"), CellValue::NotApplicable);
        assert_eq!(CellValue::parse_cycles("-"), CellValue::Text("-".to_string()));
    }

    #[test]
    fn test_not_applicable_is_zero_but_not_unresolved() {
        let dash = CellValue::parse_resource("-");
        let unknown = CellValue::parse_resource("?");
        assert_eq!(dash.as_f64(), Some(0.0));
        assert_eq!(unknown.as_f64(), None);
        assert_ne!(dash, unknown);
    }

    #[test]
    fn test_cell_serialization_keeps_tool_conventions() {
        let json = serde_json::to_value(vec![
            CellValue::Integer(7),
            CellValue::Unresolved,
            CellValue::NotApplicable,
        ])
        .unwrap();
        assert_eq!(json, serde_json::json!([7, "?", 0]));
    }

    #[test]
    fn test_resource_kind_from_header() {
        assert_eq!(ResourceKind::from_header("BRAM_18K"), Some(ResourceKind::Bram));
        assert_eq!(ResourceKind::from_header(" DSP48E"), Some(ResourceKind::Dsp));
        assert_eq!(ResourceKind::from_header("  FF   "), Some(ResourceKind::Ff));
        assert_eq!(ResourceKind::from_header("LUT"), Some(ResourceKind::Lut));
        assert_eq!(ResourceKind::from_header("URAM"), Some(ResourceKind::Uram));
        assert_eq!(ResourceKind::from_header("Name"), None);
    }

    #[test]
    fn test_resource_row_serializes_with_uppercase_keys() {
        let mut row = ResourceRow::new();
        row.insert(ResourceKind::Lut, CellValue::Integer(66));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({ "LUT": 66 }));
    }
}
