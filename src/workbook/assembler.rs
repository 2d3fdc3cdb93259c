// src/workbook/assembler.rs
use crate::extractors::section::collect_captured;
use crate::extractors::{tokenize, PageTextSource, SectionExtractor};
use crate::inputs::pdf::PdfDocument;
use crate::inputs::spreadsheet::read_first_sheet;
use crate::inputs::{CellValue, InputFile, InputKind, Table};
use crate::reconcile::{reconcile, ReconcileColumns, Reconciliation};
use crate::utils::text_debug;
use crate::workbook::summary::{summary_extent, summary_rows};
use crate::workbook::{OutputWorkbook, TableWidget, COMBINED_SHEET, SUMMARY_SHEET, SUMMARY_TABLE};
use serde::Serialize;
use std::path::PathBuf;

/// Parsed fields start this many columns to the right of the raw line (column J).
pub const PARSED_COLUMN_OFFSET: usize = 9;

#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    pub reference_marker: String,
    pub import_marker: String,
    pub columns: ReconcileColumns,
    pub debug_dir: Option<PathBuf>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            reference_marker: "instrument_id".to_string(),
            import_marker: "import tdx".to_string(),
            columns: ReconcileColumns::default(),
            debug_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub pdf_documents: usize,
    pub pdf_unreadable: usize,
    pub captured_lines: usize,
    pub spreadsheets: usize,
    pub spreadsheets_failed: usize,
    pub extract_sheets: usize,
    pub skipped_reference_records: usize,
}

/// A spreadsheet copied into the output under its file stem.
#[derive(Debug, Clone, PartialEq)]
pub struct CopiedSheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

/// Everything gathered while walking the input files. Each processing step
/// takes it by value and hands it back.
#[derive(Debug, Default)]
pub struct Accumulator {
    pub combined_rows: Vec<Vec<CellValue>>,
    pub copied_sheets: Vec<CopiedSheet>,
    pub reference: Option<Table>,
    pub import: Option<Table>,
    pub stats: RunStats,
}

pub struct Assembler {
    config: AssemblerConfig,
    extractor: SectionExtractor,
}

/// Raw line tokenized and shifted right by `PARSED_COLUMN_OFFSET` empty cells.
pub fn parsed_row(line: &str) -> Vec<CellValue> {
    let mut row = vec![CellValue::Empty; PARSED_COLUMN_OFFSET];
    row.extend(tokenize(line).into_iter().map(CellValue::Text));
    row
}

impl Assembler {
    pub fn new(config: AssemblerConfig) -> Self {
        Self { config, extractor: SectionExtractor::new() }
    }

    pub fn process_files(&self, files: &[InputFile]) -> Accumulator {
        files
            .iter()
            .fold(Accumulator::default(), |acc, file| self.process_file(acc, file))
    }

    pub fn process_file(&self, acc: Accumulator, file: &InputFile) -> Accumulator {
        match file.kind {
            InputKind::Pdf => self.process_pdf(acc, file),
            InputKind::Spreadsheet => self.process_spreadsheet(acc, file),
        }
    }

    fn process_pdf(&self, mut acc: Accumulator, file: &InputFile) -> Accumulator {
        tracing::info!("Processing PDF file: {}", file.file_name());
        match PdfDocument::open(&file.path) {
            Ok(mut document) => self.process_document(acc, &file.file_name(), &mut document),
            Err(e) => {
                tracing::warn!("{}", e);
                acc.stats.pdf_unreadable += 1;
                acc
            }
        }
    }

    /// Appends one document's block to the combined rows: a title row, then a
    /// raw row and a parsed row per captured line, then two blank rows.
    /// Documents without captured lines add nothing.
    pub fn process_document<S: PageTextSource>(&self, mut acc: Accumulator, title: &str, source: &mut S) -> Accumulator {
        let pages = self.extractor.trace(source, title);
        acc.stats.pdf_documents += 1;

        if let Some(dir) = &self.config.debug_dir {
            if let Err(e) = text_debug::save_extraction_trace(dir, title, &pages) {
                tracing::warn!("Failed to save extraction trace for {}: {}", title, e);
            }
        }

        let lines = collect_captured(&pages);
        if lines.is_empty() {
            tracing::info!("No table lines found in {}", title);
            return acc;
        }

        acc.combined_rows.reserve(lines.len() * 2 + 3);
        acc.combined_rows.push(vec![CellValue::text(title)]);
        for line in &lines {
            acc.combined_rows.push(vec![CellValue::text(line.as_str())]);
            acc.combined_rows.push(parsed_row(line));
        }
        acc.combined_rows.push(Vec::new());
        acc.combined_rows.push(Vec::new());

        acc.stats.captured_lines += lines.len();
        tracing::info!("Captured {} table lines from {}", lines.len(), title);
        acc
    }

    fn process_spreadsheet(&self, mut acc: Accumulator, file: &InputFile) -> Accumulator {
        tracing::info!("Processing spreadsheet file: {}", file.file_name());
        let table = match read_first_sheet(&file.path) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("Error reading spreadsheet {}: {}", file.path.display(), e);
                acc.stats.spreadsheets_failed += 1;
                return acc;
            }
        };

        let name = file.stem();
        let lowered = name.to_lowercase();
        acc.copied_sheets.push(CopiedSheet { name: name.clone(), rows: table.to_sheet_rows() });
        acc.stats.spreadsheets += 1;

        if lowered.contains(&self.config.reference_marker.to_lowercase()) {
            if acc.reference.is_some() {
                tracing::warn!("Replacing previously loaded reference table with {}", file.file_name());
            }
            tracing::info!("Loaded reference table from {}", file.file_name());
            acc.reference = Some(table.clone());
        }
        if lowered.contains(&self.config.import_marker.to_lowercase()) {
            if acc.import.is_some() {
                tracing::warn!("Replacing previously loaded import table with {}", file.file_name());
            }
            tracing::info!("Loaded import table from {}", file.file_name());
            acc.import = Some(table);
        }

        acc
    }

    /// Builds the output workbook: combined sheet, copied spreadsheets,
    /// reconciled extracts, then the summary sheet.
    pub fn assemble(&self, acc: Accumulator) -> (OutputWorkbook, RunStats) {
        let mut stats = acc.stats;
        let mut workbook = OutputWorkbook::new();

        workbook.add_reserved_sheet(COMBINED_SHEET, acc.combined_rows, None);
        for sheet in acc.copied_sheets {
            workbook.add_sheet(&sheet.name, sheet.rows);
        }

        match reconcile(acc.reference.as_ref(), acc.import.as_ref(), &self.config.columns) {
            Reconciliation::Unavailable { reference_loaded, import_loaded } => {
                tracing::warn!(
                    "Missing one or both tables (reference '{}' loaded: {}, import '{}' loaded: {}). \
                     Check the file names and that they are spreadsheets, not csv.",
                    self.config.reference_marker,
                    reference_loaded,
                    self.config.import_marker,
                    import_loaded
                );
            }
            Reconciliation::SchemaMismatch(e) => {
                tracing::warn!("Reconciliation skipped: {}", e);
            }
            Reconciliation::Completed(outcome) => {
                tracing::info!("Both reference and import tables are loaded.");
                stats.skipped_reference_records = outcome.skipped.len();
                for extract in outcome.extracts {
                    let range = extract.extent.a1_range();
                    let name = workbook.add_table_sheet(&extract.sheet_name, extract.table.to_sheet_rows(), extract.extent);
                    tracing::info!(
                        "Created sheet {} ({}) for {} {}",
                        name,
                        range,
                        self.config.columns.import_id,
                        extract.identifier
                    );
                    stats.extract_sheets += 1;
                }
            }
        }

        workbook.add_reserved_sheet(
            SUMMARY_SHEET,
            summary_rows(),
            Some(TableWidget { name: SUMMARY_TABLE.to_string(), extent: summary_extent() }),
        );

        (workbook, stats)
    }
}
