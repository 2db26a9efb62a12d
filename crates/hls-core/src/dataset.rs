//! Reader for the paired-snippet dataset consumed by verification runs.
//!
//! The dataset is a markdown document of numbered entries:
//!
//! ```text
//! # 12
//!
//! ## 大类
//! ...
//! ## Top Function
//! top
//! ## 源代码
//! <original code>
//! ## 转写后代码
//! <fixed code>
//! ```
//!
//! English headings (`Category`, `Subcategory`, `Transform Rule`,
//! `Original Code`, `Fixed Code`) are accepted as aliases.

use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::domain::error::{HlsError, Result};

/// One dataset entry: a non-synthesizable snippet and its fix.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DatasetEntry {
    pub number: u32,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub transform_rule: Option<String>,
    pub top_function: String,
    pub original_code: String,
    pub fixed_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Field {
    Category,
    Subcategory,
    TransformRule,
    TopFunction,
    OriginalCode,
    FixedCode,
}

impl Field {
    fn from_heading(heading: &str) -> Option<Self> {
        match heading.trim() {
            "大类" | "Category" => Some(Field::Category),
            "子类" | "Subcategory" => Some(Field::Subcategory),
            "转写规则" | "Transform Rule" => Some(Field::TransformRule),
            "Top Function" => Some(Field::TopFunction),
            "源代码" | "Original Code" => Some(Field::OriginalCode),
            "转写后代码" | "Fixed Code" => Some(Field::FixedCode),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Field::Category => "category",
            Field::Subcategory => "subcategory",
            Field::TransformRule => "transform rule",
            Field::TopFunction => "top function",
            Field::OriginalCode => "original code",
            Field::FixedCode => "fixed code",
        }
    }
}

#[derive(Debug, Default)]
struct PendingEntry<'a> {
    number: u32,
    fields: BTreeMap<Field, Vec<&'a str>>,
}

impl<'a> PendingEntry<'a> {
    fn text(&self, field: Field) -> Option<String> {
        let lines = self.fields.get(&field)?;
        let text = lines.join("\n").trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    fn required(&self, field: Field) -> Result<String> {
        self.text(field).ok_or_else(|| {
            HlsError::Dataset(format!("entry {}: missing {}", self.number, field.label()))
        })
    }

    fn finish(self) -> Result<DatasetEntry> {
        Ok(DatasetEntry {
            number: self.number,
            category: self.text(Field::Category),
            subcategory: self.text(Field::Subcategory),
            transform_rule: self.text(Field::TransformRule),
            top_function: self.required(Field::TopFunction)?,
            original_code: strip_fence(&self.required(Field::OriginalCode)?),
            fixed_code: strip_fence(&self.required(Field::FixedCode)?),
        })
    }
}

/// Remove a code fence wrapping the whole block, if any.
fn strip_fence(block: &str) -> String {
    let lines: Vec<&str> = block.lines().collect();
    match (lines.first(), lines.last()) {
        (Some(first), Some(last))
            if lines.len() >= 2 && first.trim_start().starts_with("```") && last.trim() == "```" =>
        {
            lines[1..lines.len() - 1].join("\n")
        }
        _ => block.to_string(),
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| HlsError::Dataset(format!("invalid pattern: {}", e)))
}

/// Parse every entry in a dataset document, in document order.
///
/// An entry missing its top function or either code block is skipped with a
/// warning; the rest of the document is still read.
pub fn parse_dataset(text: &str) -> Result<Vec<DatasetEntry>> {
    let entry_header = compile(r"^#\s+(\d+)\s*$")?;
    let field_header = compile(r"^##\s+(.+?)\s*$")?;

    let mut entries = Vec::new();
    let mut pending: Option<PendingEntry<'_>> = None;
    let mut field: Option<Field> = None;
    let mut in_fence = false;

    for line in text.lines() {
        if !in_fence {
            if let Some(caps) = entry_header.captures(line) {
                flush(pending.take(), &mut entries);
                field = None;
                match caps[1].parse::<u32>() {
                    Ok(number) => {
                        pending = Some(PendingEntry {
                            number,
                            fields: BTreeMap::new(),
                        });
                    }
                    Err(e) => {
                        let error =
                            HlsError::Dataset(format!("bad entry number '{}': {}", &caps[1], e));
                        warn!(event = "dataset.entry_skipped", error = %error);
                    }
                }
                continue;
            }
            if let Some(caps) = field_header.captures(line) {
                field = Field::from_heading(&caps[1]);
                continue;
            }
        }
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        if let (Some(entry), Some(f)) = (pending.as_mut(), field) {
            entry.fields.entry(f).or_default().push(line);
        }
    }

    flush(pending.take(), &mut entries);
    Ok(entries)
}

fn flush(pending: Option<PendingEntry<'_>>, entries: &mut Vec<DatasetEntry>) {
    let Some(done) = pending else {
        return;
    };
    let number = done.number;
    match done.finish() {
        Ok(entry) => entries.push(entry),
        Err(error) => warn!(event = "dataset.entry_skipped", entry = number, error = %error),
    }
}

/// Entries numbered within `[start, end]`; `end = None` means no upper bound.
pub fn select_range(entries: Vec<DatasetEntry>, start: u32, end: Option<u32>) -> Vec<DatasetEntry> {
    entries
        .into_iter()
        .filter(|e| e.number >= start && end.map_or(true, |end| e.number <= end))
        .collect()
}
