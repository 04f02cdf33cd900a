#![forbid(unsafe_code)]

use hours_contracts::{ScheduleCandidate, ENTRY_SEPARATOR};

/// Join already-postprocessed per-clause outputs back into one candidate.
/// Pure delimiter work; structural parsing stays in the rule battery so each
/// rule can be tested against the same raw string.
pub fn assemble(original_text: &str, clause_outputs: &[String]) -> ScheduleCandidate {
    let formatted = clause_outputs.join(&ENTRY_SEPARATOR.to_string());
    ScheduleCandidate::assembled(original_text, formatted)
}
