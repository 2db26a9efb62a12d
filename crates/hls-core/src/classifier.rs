//! Synthesizability classification.
//!
//! A snippet counts as synthesizable when its job succeeded and the report
//! yielded a timing estimate with a clock name. Missing reports and parse
//! errors therefore classify as not synthesizable even though the job
//! status is success.

use crate::domain::outcome::SynthesisOutcome;
use crate::domain::verdict::{PairVerdict, Verdict};

/// Whether the tool produced a usable estimate for this outcome.
pub fn is_synthesizable(outcome: &SynthesisOutcome) -> bool {
    outcome
        .timing()
        .map(|t| !t.clock_name.is_empty())
        .unwrap_or(false)
}

/// Compare an outcome against the expected verdict.
pub fn classify(example_id: &str, expected: bool, outcome: &SynthesisOutcome) -> Verdict {
    Verdict::new(example_id, expected, is_synthesizable(outcome))
}

/// Verify a (original, rewritten) pair: the original must fail to
/// synthesize and the rewrite must succeed.
pub fn verify_pair(
    example_id: &str,
    top_function: &str,
    original: &SynthesisOutcome,
    rewritten: &SynthesisOutcome,
) -> PairVerdict {
    PairVerdict::new(
        example_id,
        top_function,
        classify(example_id, false, original),
        classify(example_id, true, rewritten),
    )
}
