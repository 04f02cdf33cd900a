#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::fmt;
use std::io;

use hours_contracts::{ScheduleCandidate, ENTRY_FIELD_COUNT, FIELD_SEPARATOR};
use hours_engines::generation::GenerationClient;
use hours_engines::validation::ValidationReport;

use crate::row::normalize_hours;

pub const ID_COLUMN: &str = "Program External ID";
pub const HOURS_COLUMN: &str = "Hours Uncleaned";

/// Headers appended to the source columns: the 14 hours slots plus the
/// template's trailing blank column.
pub const HOURS_OUTPUT_HEADERS: [&str; 15] = [
    "Day of Week",
    "Opens At",
    "Closes At",
    "Reserved 1",
    "Reserved 2",
    "Reserved 3",
    "Reserved 4",
    "Additional Information",
    "Week of Month",
    "Day of Month",
    "Hour Type",
    "Reserved 5",
    "Reserved 6",
    "Reserved 7",
    "Reserved 8",
];

#[derive(Debug)]
pub enum BulkError {
    Csv(String),
    MissingColumn(&'static str),
    DuplicateId(String),
}

impl fmt::Display for BulkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkError::Csv(detail) => write!(f, "csv error: {detail}"),
            BulkError::MissingColumn(name) => write!(f, "missing required column: {name}"),
            BulkError::DuplicateId(id) => write!(f, "duplicate program id: {id}"),
        }
    }
}

impl From<csv::Error> for BulkError {
    fn from(err: csv::Error) -> Self {
        BulkError::Csv(err.to_string())
    }
}

/// In-memory bulk table: header row plus data rows, with the id and
/// raw-hours columns located up front so per-row work never re-scans
/// headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    id_column: usize,
    hours_column: usize,
}

impl BulkTable {
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, BulkError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect();
        let id_column = headers
            .iter()
            .position(|h| h == ID_COLUMN)
            .ok_or(BulkError::MissingColumn(ID_COLUMN))?;
        let hours_column = headers
            .iter()
            .position(|h| h == HOURS_COLUMN)
            .ok_or(BulkError::MissingColumn(HOURS_COLUMN))?;

        let mut rows = Vec::new();
        let mut seen_ids = BTreeSet::new();
        for record in csv_reader.records() {
            let record = record?;
            let row: Vec<String> = record.iter().map(str::to_string).collect();
            if !seen_ids.insert(row[id_column].clone()) {
                return Err(BulkError::DuplicateId(row[id_column].clone()));
            }
            rows.push(row);
        }
        Ok(Self {
            headers,
            rows,
            id_column,
            hours_column,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_id<'a>(&self, row: &'a [String]) -> &'a str {
        &row[self.id_column]
    }

    pub fn row_hours_text<'a>(&self, row: &'a [String]) -> &'a str {
        &row[self.hours_column]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    pub id: String,
    pub report: ValidationReport,
}

/// Result of one batch pass: the expanded output table, per-row rule
/// diagnostics, and the rows deferred by upstream failures. Deferred rows
/// are preserved verbatim in the output; nothing is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_reports: Vec<RowReport>,
    pub deferred_ids: Vec<String>,
    pub source_row_count: usize,
}

impl BatchOutcome {
    pub fn invalid_count(&self) -> usize {
        self.row_reports.iter().filter(|r| !r.report.is_valid).count()
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), BulkError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush().map_err(|e| BulkError::Csv(e.to_string()))?;
        Ok(())
    }

    pub fn summary_line(&self) -> String {
        format!(
            "hours_clean batch rows_in={} rows_out={} invalid={} deferred={}",
            self.source_row_count,
            self.rows.len(),
            self.invalid_count(),
            self.deferred_ids.len(),
        )
    }
}

/// Accept-or-revert for one source row. A valid candidate with k entries
/// expands to k rows, each copying every source column verbatim and
/// appending the 14 hours slots plus the trailing blank; anything else
/// re-emits the source row padded with empty hours cells so the original
/// text survives untouched in its own column.
pub fn reconcile_row(source_row: &[String], candidate: Option<&ScheduleCandidate>) -> Vec<Vec<String>> {
    if let Some(candidate) = candidate {
        if candidate.is_valid() {
            return candidate
                .entry_strings()
                .map(|entry| {
                    let mut out: Vec<String> = source_row.to_vec();
                    out.extend(entry.split(FIELD_SEPARATOR).map(str::to_string));
                    out.push(String::new());
                    out
                })
                .collect();
        }
    }
    let mut out: Vec<String> = source_row.to_vec();
    out.extend(std::iter::repeat(String::new()).take(ENTRY_FIELD_COUNT + 1));
    vec![out]
}

/// Run the per-row pipeline over every row of the table. A single row's
/// upstream failure defers that row for manual follow-up; it never aborts
/// the batch.
pub fn clean_bulk_table(table: &BulkTable, client: &GenerationClient) -> BatchOutcome {
    let mut headers = table.headers().to_vec();
    headers.extend(HOURS_OUTPUT_HEADERS.iter().map(|h| h.to_string()));

    let mut rows = Vec::new();
    let mut row_reports = Vec::new();
    let mut deferred_ids = Vec::new();

    for source_row in table.rows() {
        let id = table.row_id(source_row).to_string();
        match normalize_hours(table.row_hours_text(source_row), client) {
            Ok(normalized) => {
                rows.extend(reconcile_row(source_row, Some(&normalized.candidate)));
                row_reports.push(RowReport {
                    id,
                    report: normalized.report,
                });
            }
            Err(err) => {
                eprintln!(
                    "hours_clean row deferred id={} {}",
                    id,
                    err.safe_detail()
                );
                rows.extend(reconcile_row(source_row, None));
                deferred_ids.push(id);
            }
        }
    }

    BatchOutcome {
        headers,
        rows,
        row_reports,
        deferred_ids,
        source_row_count: table.rows().len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hours_engines::generation::{GenerationConfig, GenerationProviderConfig};

    const INPUT_CSV: &str = "\
Program External ID,Program Name,Hours Uncleaned
ID1,Food Pantry,\"Every Monday, from 3pm-5pm\"
ID2,Mobile Market,\"Mon 9-5; Tue 9-5\"
";

    fn table(csv_text: &str) -> BulkTable {
        BulkTable::from_reader(csv_text.as_bytes()).unwrap()
    }

    fn fixture_client(completion: &str) -> GenerationClient {
        GenerationClient::new(
            GenerationConfig::mvp_v1(),
            GenerationProviderConfig::fixture(completion),
        )
    }

    fn unconfigured_client() -> GenerationClient {
        GenerationClient::new(
            GenerationConfig::mvp_v1(),
            GenerationProviderConfig {
                completion_url: None,
                api_key: None,
                deployment: None,
                user_agent: "test".to_string(),
                fixture_completion: None,
            },
        )
    }

    #[test]
    fn loads_table_and_locates_required_columns() {
        let table = table(INPUT_CSV);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.row_id(&table.rows()[0]), "ID1");
        assert_eq!(
            table.row_hours_text(&table.rows()[0]),
            "Every Monday, from 3pm-5pm"
        );
    }

    #[test]
    fn rejects_missing_required_columns() {
        let err = BulkTable::from_reader("Program External ID,Name\nID1,x\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, BulkError::MissingColumn(HOURS_COLUMN)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let csv_text = "\
Program External ID,Hours Uncleaned
ID1,Mon 9-5
ID1,Tue 9-5
";
        let err = BulkTable::from_reader(csv_text.as_bytes()).unwrap_err();
        assert!(matches!(err, BulkError::DuplicateId(id) if id == "ID1"));
    }

    #[test]
    fn valid_multi_entry_candidate_expands_to_one_row_per_entry() {
        let table = table(INPUT_CSV);
        let outcome = clean_bulk_table(&table, &fixture_client("Monday,09:00,17:00,,,,,,,,Weekly,,,"));

        // ID1 has one clause, ID2 has two: three output rows in total.
        assert_eq!(outcome.rows.len(), 3);
        assert_eq!(outcome.deferred_ids.len(), 0);
        assert_eq!(outcome.invalid_count(), 0);

        let id2_rows: Vec<&Vec<String>> = outcome
            .rows
            .iter()
            .filter(|row| row[0] == "ID2")
            .collect();
        assert_eq!(id2_rows.len(), 2);
        for row in id2_rows {
            // Non-hours columns copied verbatim, then the 14 slots + blank.
            assert_eq!(row[1], "Mobile Market");
            assert_eq!(row.len(), 3 + 15);
            assert_eq!(row[3], "Monday");
            assert_eq!(row[13], "Weekly");
            assert_eq!(row[17], "");
        }
    }

    #[test]
    fn invalid_candidate_reverts_to_the_source_row() {
        let table = table(INPUT_CSV);
        let outcome = clean_bulk_table(&table, &fixture_client("not a schedule at all"));

        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.invalid_count(), 2);
        // Hours text preserved byte-for-byte in its own column.
        assert_eq!(outcome.rows[0][2], "Every Monday, from 3pm-5pm");
        assert_eq!(outcome.rows[1][2], "Mon 9-5; Tue 9-5");
        for report in &outcome.row_reports {
            assert!(!report.report.is_valid);
            assert!(!report.report.failed_rules.is_empty());
        }
    }

    #[test]
    fn upstream_failure_defers_rows_without_aborting_the_batch() {
        let table = table(INPUT_CSV);
        let outcome = clean_bulk_table(&table, &unconfigured_client());

        assert_eq!(outcome.deferred_ids, vec!["ID1", "ID2"]);
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.rows[0][2], "Every Monday, from 3pm-5pm");
        assert!(outcome.row_reports.is_empty());
    }

    #[test]
    fn output_headers_append_the_hours_block() {
        let table = table(INPUT_CSV);
        let outcome = clean_bulk_table(&table, &fixture_client("Monday,09:00,17:00,,,,,,,,Weekly,,,"));
        assert_eq!(outcome.headers.len(), 3 + 15);
        assert_eq!(outcome.headers[3], "Day of Week");
        assert_eq!(outcome.headers[13], "Hour Type");
    }

    #[test]
    fn writes_rectangular_csv_output() {
        let table = table(INPUT_CSV);
        let outcome = clean_bulk_table(&table, &fixture_client("Monday,09:00,17:00,,,,,,,,Weekly,,,"));
        let mut buf = Vec::new();
        outcome.write_csv(&mut buf).unwrap();
        let written = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 1 + 3);
        assert!(lines[0].starts_with("Program External ID,"));
    }

    #[test]
    fn summary_line_reports_batch_counters() {
        let table = table(INPUT_CSV);
        let outcome = clean_bulk_table(&table, &fixture_client("garbage"));
        assert_eq!(
            outcome.summary_line(),
            "hours_clean batch rows_in=2 rows_out=2 invalid=2 deferred=0"
        );
    }
}
