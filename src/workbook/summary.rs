// src/workbook/summary.rs
use crate::inputs::CellValue;
use crate::reconcile::TableExtent;

pub const SUMMARY_HEADERS: [&str; 6] = [
    "id client",
    "best_id_imported",
    "balance best",
    "token",
    "balance tdx",
    "Diff",
];

// Pasted into the sheet by hand after the run; written as text, never evaluated.
pub const FORMULA_TEMPLATES: [&str; 6] = [
    r#"=IF(RIGHT([@token],3)="pdf","fichier",VLOOKUP(B2, 'id vs best'!$A$2:$B$3000, 2, FALSE))"#,
    r#"=IFERROR(VALUE(TRIM(CLEAN(LEFT(SUBSTITUTE('Combined Data'!K2, ".", ""), IFERROR(FIND(" ", SUBSTITUTE('Combined Data'!K2, ".", "")) - 1, LEN(SUBSTITUTE('Combined Data'!K2, ".", ""))))))), "")"#,
    r#"=IFERROR(VALUE(TRIM(CLEAN(SUBSTITUTE(SUBSTITUTE(IF('Combined Data'!M2="","",'Combined Data'!M2), "'", ""), ",", ".")))),"")"#,
    r#"=CLEAN(TRIM(IF(RIGHT('Combined Data'!A1, 3) = "pdf", 'Combined Data'!A1, IFERROR(LEFT(D1, FIND(".pdf", D1) - 1), D1))))"#,
    r#"=VLOOKUP([@[id client]], INDIRECT([@[token]] & "[#All]"), 9, FALSE)"#,
    r#"=IFERROR([@[balance best]]-[@[balance tdx]]," ")"#,
];

pub const INSTRUCTIONS: [&str; 3] = [
    "Paste the formula's in the cells above and then delete this line",
    "drag down the formula until where you need them",
    "in ID client filter out the NA's and in best_id filter out the 1 id AFTER you have dragged the formulas all the way down",
];

/// Rows of the Summary sheet: headers, a blank row, the quoted formula templates, then instructions.
pub fn summary_rows() -> Vec<Vec<CellValue>> {
    let mut rows = Vec::with_capacity(3 + INSTRUCTIONS.len());
    rows.push(SUMMARY_HEADERS.iter().map(|h| CellValue::text(*h)).collect());
    rows.push(Vec::new());
    rows.push(
        FORMULA_TEMPLATES
            .iter()
            .map(|f| CellValue::Text(format!("\"{}\"", f)))
            .collect(),
    );
    rows.extend(INSTRUCTIONS.iter().map(|line| vec![CellValue::text(*line)]));
    rows
}

/// The summary table covers the header row and the blank row below it (A1:F2).
pub fn summary_extent() -> TableExtent {
    TableExtent { rows: 2, columns: SUMMARY_HEADERS.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_layout() {
        let rows = summary_rows();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0][5], CellValue::text("Diff"));
        assert!(rows[1].is_empty());
        assert_eq!(rows[2].len(), 6);
        assert_eq!(rows[3][0], CellValue::text(INSTRUCTIONS[0]));
        assert_eq!(summary_extent().a1_range(), "A1:F2");
    }

    #[test]
    fn test_formulas_are_quoted_text() {
        for cell in &summary_rows()[2] {
            match cell {
                CellValue::Text(s) => assert!(s.starts_with("\"=") && s.ends_with('"'), "{}", s),
                other => panic!("formula cell should be text, got {:?}", other),
            }
        }
    }
}
