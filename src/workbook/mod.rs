// src/workbook/mod.rs
pub mod assembler;
pub mod names;
pub mod summary;

use crate::inputs::CellValue;
use crate::reconcile::TableExtent;
use names::NameRegistry;

pub const COMBINED_SHEET: &str = "Combined Data";
pub const SUMMARY_SHEET: &str = "Summary";
pub const SUMMARY_TABLE: &str = "SummaryTable";

/// A styled table over `extent`, anchored at A1 of its sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct TableWidget {
    pub name: String,
    pub extent: TableExtent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetSpec {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
    pub table: Option<TableWidget>,
}

/// In-memory output document: sheets in write order, names already unique.
#[derive(Debug)]
pub struct OutputWorkbook {
    sheets: Vec<SheetSpec>,
    names: NameRegistry,
}

impl OutputWorkbook {
    /// The fixed sheet and table names are claimed first so input files can never take them.
    pub fn new() -> Self {
        let mut names = NameRegistry::new();
        names.allocate_sheet(COMBINED_SHEET);
        names.allocate_sheet(SUMMARY_SHEET);
        names.claim_table(SUMMARY_TABLE);
        Self { sheets: Vec::new(), names }
    }

    /// Adds one of the reserved sheets under its exact name.
    pub fn add_reserved_sheet(&mut self, name: &'static str, rows: Vec<Vec<CellValue>>, table: Option<TableWidget>) {
        self.sheets.push(SheetSpec { name: name.to_string(), rows, table });
    }

    /// Adds a sheet under a unique name derived from `requested`; returns the name used.
    pub fn add_sheet(&mut self, requested: &str, rows: Vec<Vec<CellValue>>) -> String {
        let name = self.names.allocate_sheet(requested);
        self.sheets.push(SheetSpec { name: name.clone(), rows, table: None });
        name
    }

    /// Like `add_sheet`, with a table widget spanning `extent`.
    pub fn add_table_sheet(&mut self, requested: &str, rows: Vec<Vec<CellValue>>, extent: TableExtent) -> String {
        let name = self.names.allocate_sheet(requested);
        let table = TableWidget { name: self.names.allocate_table(&name), extent };
        self.sheets.push(SheetSpec { name: name.clone(), rows, table: Some(table) });
        name
    }

    pub fn sheets(&self) -> &[SheetSpec] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetSpec> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }
}

impl Default for OutputWorkbook {
    fn default() -> Self {
        Self::new()
    }
}
