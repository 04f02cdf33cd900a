#![forbid(unsafe_code)]

use hours_contracts::ScheduleCandidate;
use hours_engines::assembler::assemble;
use hours_engines::generation::{GenerationClient, UpstreamError};
use hours_engines::text_adapter::{postprocess_entry, preprocess_clause, split_clauses};
use hours_engines::validation::{run_rule_battery, ValidationReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub candidate: ScheduleCandidate,
    pub report: ValidationReport,
}

/// Full per-row flow: split clauses, preprocess, one generation call per
/// clause, postprocess, assemble, validate. A generation failure on any
/// clause aborts the whole row; a row is accepted or reverted atomically,
/// never half-applied.
pub fn normalize_hours(
    original_text: &str,
    client: &GenerationClient,
) -> Result<NormalizedRow, UpstreamError> {
    let mut clause_outputs = Vec::new();
    for clause in split_clauses(original_text) {
        let generated = client.generate(&preprocess_clause(clause))?;
        clause_outputs.push(postprocess_entry(&generated));
    }
    let mut candidate = assemble(original_text, &clause_outputs);
    let report = run_rule_battery(&mut candidate);
    Ok(NormalizedRow { candidate, report })
}
