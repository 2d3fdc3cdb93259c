// src/inputs/spreadsheet.rs
use crate::inputs::models::{CellValue, Table};
use crate::utils::error::InputError;
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

/// Reads the first worksheet of a spreadsheet: first row as headers, the rest as data.
pub fn read_first_sheet(path: &Path) -> Result<Table, InputError> {
    let spreadsheet_error = |reason: String| InputError::Spreadsheet {
        path: path.display().to_string(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| InputError::NoWorksheet(path.display().to_string()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    let table = range_to_table(&range);
    tracing::debug!(
        "Read {} rows x {} columns from {}",
        table.rows.len(),
        table.width(),
        path.display()
    );
    Ok(table)
}

/// Converts a calamine range into a `Table`, dropping rows with no content.
///
/// calamine ranges begin at the first used cell, so blank leading columns and
/// rows are put back to keep every cell at its original position.
pub fn range_to_table(range: &Range<Data>) -> Table {
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let width = start_col + range.width();

    let mut rows = std::iter::repeat_with(Vec::new)
        .take(start_row)
        .chain(range.rows().map(|row| {
            let mut cells = vec![CellValue::Empty; start_col];
            cells.extend(row.iter().map(to_cell_value));
            cells
        }));

    let header_row = rows.next().unwrap_or_default();
    let headers: Vec<String> = (0..width)
        .map(|idx| match header_row.get(idx) {
            Some(value) if !value.is_blank() => value.to_string(),
            _ => format!("Unnamed: {}", idx),
        })
        .collect();

    let data: Vec<Vec<CellValue>> = rows
        .filter(|row| row.iter().any(|cell| *cell != CellValue::Empty))
        .collect();

    Table::new(headers, data)
}

fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => {
            tracing::trace!("Cell error {:?} read as empty", e);
            CellValue::Empty
        }
    }
}
