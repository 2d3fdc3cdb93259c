// src/storage/xlsx.rs
use crate::inputs::CellValue;
use crate::utils::error::StorageError;
use crate::workbook::{OutputWorkbook, SheetSpec};
use rust_xlsxwriter::{Table, TableColumn, TableStyle, Workbook, Worksheet};

/// Renders the in-memory workbook to xlsx bytes.
pub fn render_workbook(model: &OutputWorkbook) -> Result<Vec<u8>, StorageError> {
    let mut workbook = Workbook::new();

    for spec in model.sheets() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(spec.name.as_str())?;
        write_rows(worksheet, spec)?;

        if let Some(widget) = &spec.table {
            let table = build_table(&widget.name, header_names(spec, widget.extent.columns));
            let (last_row, last_col) = (widget.extent.rows.max(1) - 1, widget.extent.columns.max(1) - 1);
            let (last_row, last_col) = grid_position(spec, last_row, last_col)?;

            // A rejected widget (e.g. duplicate header names) leaves the data in place.
            if let Err(e) = worksheet.add_table(0, 0, last_row, last_col, &table) {
                tracing::warn!("Sheet '{}' written without table widget '{}': {}", spec.name, widget.name, e);
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_rows(worksheet: &mut Worksheet, spec: &SheetSpec) -> Result<(), StorageError> {
    for (r, row) in spec.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (row_num, col_num) = grid_position(spec, r, c)?;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(s) if s.is_empty() => {}
                CellValue::Text(s) => {
                    worksheet.write_string(row_num, col_num, s.as_str())?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(row_num, col_num, *n)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row_num, col_num, *b)?;
                }
            }
        }
    }
    Ok(())
}

fn grid_position(spec: &SheetSpec, row: usize, column: usize) -> Result<(u32, u16), StorageError> {
    match (u32::try_from(row), u16::try_from(column)) {
        (Ok(r), Ok(c)) => Ok((r, c)),
        _ => Err(StorageError::OutOfBounds { sheet: spec.name.clone(), row, column }),
    }
}

/// Header cells of the widget, taken from the sheet's first row. Blank headers get `ColumnN`.
fn header_names(spec: &SheetSpec, columns: usize) -> Vec<String> {
    let first = spec.rows.first();
    (0..columns)
        .map(|c| {
            let header = first
                .and_then(|row| row.get(c))
                .map(|cell| cell.to_string())
                .unwrap_or_default();
            if header.trim().is_empty() {
                format!("Column{}", c + 1)
            } else {
                header
            }
        })
        .collect()
}

fn build_table(name: &str, headers: Vec<String>) -> Table {
    let columns: Vec<TableColumn> = headers
        .iter()
        .map(|h| TableColumn::new().set_header(h.as_str()))
        .collect();

    Table::new()
        .set_name(name)
        .set_style(TableStyle::Medium9)
        .set_banded_rows(true)
        .set_banded_columns(true)
        .set_first_column(false)
        .set_last_column(false)
        .set_columns(&columns)
}
