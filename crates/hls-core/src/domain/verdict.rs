//! Classification verdicts for verification runs.

use serde::Serialize;

/// Expected vs. actual synthesizability of one code snippet.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Verdict {
    pub example_id: String,
    pub expected_synthesizable: bool,
    pub actual_synthesizable: bool,
    pub pass: bool,
}

impl Verdict {
    pub fn new(example_id: impl Into<String>, expected: bool, actual: bool) -> Self {
        Self {
            example_id: example_id.into(),
            expected_synthesizable: expected,
            actual_synthesizable: actual,
            pass: expected == actual,
        }
    }
}

/// Verdicts for a matched (original, rewritten) pair.
///
/// The pair passes iff the original is not synthesizable and the rewrite is.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PairVerdict {
    pub example_id: String,
    pub top_function: String,
    pub original: Verdict,
    pub rewritten: Verdict,
    pub overall_pass: bool,
}

impl PairVerdict {
    pub fn new(
        example_id: impl Into<String>,
        top_function: impl Into<String>,
        original: Verdict,
        rewritten: Verdict,
    ) -> Self {
        let overall_pass = original.pass && rewritten.pass;
        Self {
            example_id: example_id.into(),
            top_function: top_function.into(),
            original,
            rewritten,
            overall_pass,
        }
    }
}
