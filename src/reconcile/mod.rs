// src/reconcile/mod.rs
//! Joins the reference table against the import table by instrument identifier.
//!
//! Column names are validated up front; a table missing a required column
//! yields a [`SchemaError`] listing what is actually there. Individual reference
//! rows with an empty identifier or label are skipped and reported, never fatal.

use crate::inputs::{CellValue, Table};
use crate::utils::error::SchemaError;

/// Longest sheet name a workbook accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Column names the join looks up, matched exactly (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileColumns {
    pub reference_id: String,
    pub reference_label: String,
    pub import_id: String,
}

impl Default for ReconcileColumns {
    fn default() -> Self {
        Self {
            reference_id: "instrument id".to_string(),
            reference_label: "best ticker".to_string(),
            import_id: "InstrumentID".to_string(),
        }
    }
}

/// Validated column positions in the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSchema {
    pub id: usize,
    pub label: usize,
}

/// Validated column position in the import table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSchema {
    pub id: usize,
}

fn require_columns(table: &Table, role: &'static str, names: &[&str]) -> Result<Vec<usize>, SchemaError> {
    let missing: Vec<String> = names
        .iter()
        .filter(|n| table.column_index(n).is_none())
        .map(|n| n.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(SchemaError {
            table: role,
            missing,
            available: table.headers.clone(),
        });
    }

    Ok(names.iter().filter_map(|n| table.column_index(n)).collect())
}

impl ReferenceSchema {
    pub fn validate(table: &Table, columns: &ReconcileColumns) -> Result<Self, SchemaError> {
        let idx = require_columns(table, "reference", &[columns.reference_id.as_str(), columns.reference_label.as_str()])?;
        Ok(Self { id: idx[0], label: idx[1] })
    }
}

impl ImportSchema {
    pub fn validate(table: &Table, columns: &ReconcileColumns) -> Result<Self, SchemaError> {
        let idx = require_columns(table, "import", &[columns.import_id.as_str()])?;
        Ok(Self { id: idx[0] })
    }
}

/// Size of a bounded table widget anchored at A1, header row included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableExtent {
    pub rows: usize,
    pub columns: usize,
}

impl TableExtent {
    /// A1-style reference covering the extent, e.g. `A1:C4`.
    pub fn a1_range(&self) -> String {
        format!("A1:{}{}", column_letters(self.columns.max(1)), self.rows.max(1))
    }
}

/// 1-based column number to spreadsheet letters (1 -> A, 27 -> AA).
pub fn column_letters(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Truncates to at most `MAX_SHEET_NAME_LEN` characters.
pub fn truncate_sheet_name(name: &str) -> String {
    name.chars().take(MAX_SHEET_NAME_LEN).collect()
}

/// Import rows belonging to one reference record.
#[derive(Debug, Clone, PartialEq)]
pub struct Extract {
    pub sheet_name: String,
    pub identifier: CellValue,
    pub table: Table,
    pub extent: TableExtent,
}

/// A reference row that could not take part in the join.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub row: usize, // 1-based data row
    pub missing: Vec<String>,
    pub available: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconcileOutcome {
    pub extracts: Vec<Extract>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// One or both input tables were never found.
    Unavailable { reference_loaded: bool, import_loaded: bool },
    /// A table lacks a required column.
    SchemaMismatch(SchemaError),
    Completed(ReconcileOutcome),
}

/// Runs the join. Never fails: every problem is folded into the returned value.
pub fn reconcile(reference: Option<&Table>, import: Option<&Table>, columns: &ReconcileColumns) -> Reconciliation {
    let (reference, import) = match (reference, import) {
        (Some(r), Some(i)) => (r, i),
        (r, i) => {
            return Reconciliation::Unavailable {
                reference_loaded: r.is_some(),
                import_loaded: i.is_some(),
            }
        }
    };

    let ref_schema = match ReferenceSchema::validate(reference, columns) {
        Ok(s) => s,
        Err(e) => return Reconciliation::SchemaMismatch(e),
    };
    let import_schema = match ImportSchema::validate(import, columns) {
        Ok(s) => s,
        Err(e) => return Reconciliation::SchemaMismatch(e),
    };

    let mut outcome = ReconcileOutcome::default();

    for (row_idx, record) in reference.rows.iter().enumerate() {
        let identifier = &record[ref_schema.id];
        let label = &record[ref_schema.label];

        let mut missing = Vec::new();
        if identifier.is_blank() {
            missing.push(columns.reference_id.clone());
        }
        if label.is_blank() {
            missing.push(columns.reference_label.clone());
        }
        if !missing.is_empty() {
            tracing::warn!(
                "Reference row {} has no value for {:?}; available columns: {:?}",
                row_idx + 1,
                missing,
                reference.headers
            );
            outcome.skipped.push(SkippedRecord {
                row: row_idx + 1,
                missing,
                available: reference.headers.clone(),
            });
            continue;
        }

        // Exact typed equality: no trimming, no case folding.
        let selection: Vec<Vec<CellValue>> = import
            .rows
            .iter()
            .filter(|row| row[import_schema.id] == *identifier)
            .cloned()
            .collect();

        if selection.is_empty() {
            tracing::debug!("No import rows for instrument {}", identifier);
            continue;
        }

        let extent = TableExtent { rows: selection.len() + 1, columns: import.width() };
        let sheet_name = truncate_sheet_name(&label.to_string());
        tracing::info!(
            "Matched {} import rows for instrument {} -> sheet '{}'",
            selection.len(),
            identifier,
            sheet_name
        );

        outcome.extracts.push(Extract {
            sheet_name,
            identifier: identifier.clone(),
            table: Table::new(import.headers.clone(), selection),
            extent,
        });
    }

    Reconciliation::Completed(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    fn reference_table(rows: Vec<Vec<CellValue>>) -> Table {
        Table::new(vec!["instrument id".into(), "best ticker".into()], rows)
    }

    fn import_table() -> Table {
        Table::new(
            vec!["InstrumentID".into(), "Client".into(), "Balance".into()],
            vec![
                vec![t("ABC1"), t("c-1"), CellValue::Number(10.0)],
                vec![t("abc1"), t("c-2"), CellValue::Number(20.0)],
                vec![t("ABC1 "), t("c-3"), CellValue::Number(30.0)],
                vec![t("XYZ9"), t("c-4"), CellValue::Number(40.0)],
                vec![t("ABC1"), t("c-5"), CellValue::Number(50.0)],
                vec![CellValue::Number(7.0), t("c-6"), CellValue::Number(60.0)],
            ],
        )
    }

    fn completed(r: Reconciliation) -> ReconcileOutcome {
        match r {
            Reconciliation::Completed(o) => o,
            other => panic!("expected completed reconciliation, got {:?}", other),
        }
    }

    #[test]
    fn test_unavailable_when_a_table_is_missing() {
        let import = import_table();
        let r = reconcile(None, Some(&import), &ReconcileColumns::default());
        assert_eq!(r, Reconciliation::Unavailable { reference_loaded: false, import_loaded: true });
    }

    #[test]
    fn test_one_to_many_exact_join() {
        let reference = reference_table(vec![vec![t("ABC1"), t("ACME Corp")]]);
        let import = import_table();
        let outcome = completed(reconcile(Some(&reference), Some(&import), &ReconcileColumns::default()));

        assert_eq!(outcome.extracts.len(), 1);
        let extract = &outcome.extracts[0];
        assert_eq!(extract.sheet_name, "ACME Corp");
        // Case and trailing-space variants are not joined.
        let clients: Vec<String> = extract.table.rows.iter().map(|r| r[1].to_string()).collect();
        assert_eq!(clients, vec!["c-1", "c-5"]);
        assert_eq!(extract.table.headers, import.headers);
        assert_eq!(extract.extent, TableExtent { rows: 3, columns: 3 });
        assert_eq!(extract.extent.a1_range(), "A1:C3");
    }

    #[test]
    fn test_numeric_identifiers_match_numbers_only() {
        let reference = reference_table(vec![
            vec![CellValue::Number(7.0), t("SEVEN")],
            vec![t("7"), t("TEXT SEVEN")],
        ]);
        let import = import_table();
        let outcome = completed(reconcile(Some(&reference), Some(&import), &ReconcileColumns::default()));
        assert_eq!(outcome.extracts.len(), 1);
        assert_eq!(outcome.extracts[0].sheet_name, "SEVEN");
    }

    #[test]
    fn test_unmatched_reference_is_silently_skipped() {
        let reference = reference_table(vec![vec![t("NOPE"), t("Nothing")], vec![t("XYZ9"), t("Zed")]]);
        let import = import_table();
        let outcome = completed(reconcile(Some(&reference), Some(&import), &ReconcileColumns::default()));
        assert_eq!(outcome.extracts.len(), 1);
        assert_eq!(outcome.extracts[0].sheet_name, "Zed");
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_duplicate_reference_ids_each_get_an_extract() {
        let reference = reference_table(vec![vec![t("XYZ9"), t("First")], vec![t("XYZ9"), t("Second")]]);
        let import = import_table();
        let outcome = completed(reconcile(Some(&reference), Some(&import), &ReconcileColumns::default()));
        let names: Vec<&str> = outcome.extracts.iter().map(|e| e.sheet_name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(outcome.extracts[0].table, outcome.extracts[1].table);
    }

    #[test]
    fn test_invalid_record_is_skipped_with_diagnostic() {
        let reference = reference_table(vec![
            vec![t("ABC1"), CellValue::Empty],
            vec![t("XYZ9"), t("Zed")],
        ]);
        let import = import_table();
        let outcome = completed(reconcile(Some(&reference), Some(&import), &ReconcileColumns::default()));

        assert_eq!(outcome.extracts.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].row, 1);
        assert_eq!(outcome.skipped[0].missing, vec!["best ticker"]);
        assert_eq!(outcome.skipped[0].available, vec!["instrument id", "best ticker"]);
    }

    #[test]
    fn test_whitespace_identifier_joins_exactly() {
        let reference = reference_table(vec![vec![t("  "), t("Spaces")]]);
        let import = Table::new(
            vec!["InstrumentID".into(), "Client".into()],
            vec![vec![t("  "), t("c-1")], vec![t(" "), t("c-2")], vec![CellValue::Empty, t("c-3")]],
        );
        let outcome = completed(reconcile(Some(&reference), Some(&import), &ReconcileColumns::default()));
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.extracts.len(), 1);
        assert_eq!(outcome.extracts[0].table.rows, vec![vec![t("  "), t("c-1")]]);
    }

    #[test]
    fn test_misnamed_label_column_is_schema_mismatch() {
        let reference = Table::new(
            vec!["instrument id".into(), "Best Ticker".into()],
            vec![vec![t("ABC1"), t("ACME")]],
        );
        let import = import_table();
        let r = reconcile(Some(&reference), Some(&import), &ReconcileColumns::default());
        match r {
            Reconciliation::SchemaMismatch(e) => {
                assert_eq!(e.table, "reference");
                assert_eq!(e.missing, vec!["best ticker"]);
                assert_eq!(e.available, vec!["instrument id", "Best Ticker"]);
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_label_variant_columns() {
        let columns = ReconcileColumns { reference_label: "best name".to_string(), ..Default::default() };
        let reference = Table::new(
            vec!["instrument id".into(), "best name".into()],
            vec![vec![t("XYZ9"), t("Zed Holdings")]],
        );
        let import = import_table();
        let outcome = completed(reconcile(Some(&reference), Some(&import), &columns));
        assert_eq!(outcome.extracts[0].sheet_name, "Zed Holdings");
    }

    #[test]
    fn test_sheet_names_are_bounded() {
        let long = "An Extremely Long Instrument Display Name That Overflows";
        let reference = reference_table(vec![vec![t("XYZ9"), t(long)], vec![t("ABC1"), t("é".repeat(40).as_str())]]);
        let import = import_table();
        let outcome = completed(reconcile(Some(&reference), Some(&import), &ReconcileColumns::default()));
        for extract in &outcome.extracts {
            assert!(extract.sheet_name.chars().count() <= MAX_SHEET_NAME_LEN);
        }
        assert_eq!(outcome.extracts[0].sheet_name, &long[..31]);
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(703), "AAA");
    }
}
