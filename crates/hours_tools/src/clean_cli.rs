#![forbid(unsafe_code)]

use std::fs::File;
use std::path::Path;

use hours_engines::generation::GenerationClient;
use hours_pipeline::bulk::{clean_bulk_table, BulkTable};

/// Derive the default output path from the input: `dir/file.csv` becomes
/// `dir/file_HOURS_CLEANED.csv`.
pub fn default_output_path(input_path: &str) -> String {
    match input_path.strip_suffix(".csv") {
        Some(stem) => format!("{stem}_HOURS_CLEANED.csv"),
        None => format!("{input_path}_HOURS_CLEANED.csv"),
    }
}

/// Load the bulk file, run the batch pipeline, write the expanded output,
/// and return the per-batch summary plus any rows left for manual review.
pub fn execute_clean_command(
    input_path: &str,
    output_path: Option<&str>,
    client: &GenerationClient,
) -> Result<String, String> {
    let input = File::open(Path::new(input_path))
        .map_err(|e| format!("cannot open {input_path}: {e}"))?;
    let table = BulkTable::from_reader(input).map_err(|e| e.to_string())?;

    let outcome = clean_bulk_table(&table, client);

    let output_path = output_path
        .map(str::to_string)
        .unwrap_or_else(|| default_output_path(input_path));
    let output = File::create(Path::new(&output_path))
        .map_err(|e| format!("cannot create {output_path}: {e}"))?;
    outcome.write_csv(output).map_err(|e| e.to_string())?;

    let mut lines = vec![format!("{} out={output_path}", outcome.summary_line())];
    for report in &outcome.row_reports {
        if !report.report.is_valid {
            lines.push(format!(
                "hours_clean row reverted id={} rules={}",
                report.id,
                report.report.failed_rule_labels().join(",")
            ));
        }
    }
    for id in &outcome.deferred_ids {
        lines.push(format!("hours_clean row deferred id={id}"));
    }
    Ok(lines.join("\n"))
}
