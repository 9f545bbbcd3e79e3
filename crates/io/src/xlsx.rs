// Spreadsheet import (xlsx, xlsm, xls, xlsb, ods) via calamine
//
// One sheet per load. The first row is the header; cells keep their native
// types, with whole floats narrowed to integers and date serials converted.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use mdrecon_table::{Table, Value};

use crate::error::LoadError;
use crate::options::{LoadOptions, SheetSelector};
use crate::text::header_names;

pub fn read(
    path: &Path,
    options: &LoadOptions,
    limit: Option<usize>,
    warnings: &mut Vec<String>,
) -> Result<Table, LoadError> {
    if !path.exists() {
        return Err(LoadError::SourceNotFound(path.display().to_string()));
    }

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| LoadError::Parse(format!("failed to open workbook: {e}")))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(LoadError::Sheet("workbook contains no sheets".into()));
    }

    let sheet_name = match &options.sheet {
        None => sheet_names[0].clone(),
        Some(SheetSelector::Name(name)) => sheet_names
            .iter()
            .find(|s| *s == name)
            .cloned()
            .ok_or_else(|| {
                LoadError::Sheet(format!(
                    "sheet '{name}' not found (available: {})",
                    sheet_names.join(", ")
                ))
            })?,
        Some(SheetSelector::Index(i)) => sheet_names.get(*i).cloned().ok_or_else(|| {
            LoadError::Sheet(format!(
                "sheet index {i} out of range ({} sheets)",
                sheet_names.len()
            ))
        })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Sheet(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let header: Vec<String> = if options.has_header {
        match rows.next() {
            Some(cells) => cells.iter().map(|c| c.to_string()).collect(),
            None => return Ok(Table::default()),
        }
    } else {
        (1..=range.width()).map(|i| format!("column_{i}")).collect()
    };

    let mut table = Table::new(header_names(header, warnings))?;
    let width = table.column_count();

    for cells in rows {
        if limit.is_some_and(|max| table.row_count() >= max) {
            break;
        }
        let mut row: Vec<Value> = cells.iter().take(width).map(cell_value).collect();
        row.resize(width, Value::Null);
        if row.iter().all(Value::is_null) {
            continue;
        }
        table.push_row(row)?;
    }

    log::debug!("sheet '{sheet_name}': {} rows", table.row_count());
    Ok(table)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => {
            if s.is_empty() {
                Value::Null
            } else {
                Value::Text(s.clone())
            }
        }
        Data::Float(n) => {
            // Narrow whole numbers so integer columns stay integer
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Value::Int(*n as i64)
            } else {
                Value::Float(*n)
            }
        }
        Data::Int(n) => Value::Int(*n),
        Data::Bool(b) => Value::Bool(*b),
        Data::Error(e) => Value::Text(e.to_string()),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(Value::DateTime)
            .unwrap_or(Value::Float(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso(s).map(Value::DateTime).unwrap_or_else(|| Value::Text(s.clone())),
        Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

/// Convert an Excel 1900-system serial to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if !millis.is_finite() || millis.abs() > 1e15 {
        return None;
    }
    base.checked_add_signed(chrono::Duration::milliseconds(millis as i64))
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    fn write_book(path: &Path) {
        let mut book = Workbook::new();
        let sheet = book.add_worksheet();
        sheet.set_name("Accounts").unwrap();
        sheet.write_string(0, 0, "code").unwrap();
        sheet.write_string(0, 1, "label").unwrap();
        sheet.write_string(0, 2, "balance").unwrap();
        sheet.write_number(1, 0, 1000).unwrap();
        sheet.write_string(1, 1, "Cash").unwrap();
        sheet.write_number(1, 2, 12.5).unwrap();
        sheet.write_number(2, 0, 2000).unwrap();
        sheet.write_string(2, 1, "Payables").unwrap();
        sheet.write_boolean(2, 2, false).unwrap();

        let second = book.add_worksheet();
        second.set_name("Other").unwrap();
        second.write_string(0, 0, "x").unwrap();
        second.write_number(1, 0, 1).unwrap();

        book.save(path).unwrap();
    }

    #[test]
    fn reads_first_sheet_by_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_book(&path);

        let mut warnings = Vec::new();
        let t = read(&path, &LoadOptions::default(), None, &mut warnings).unwrap();
        assert_eq!(t.columns(), &["code".to_string(), "label".to_string(), "balance".to_string()]);
        assert_eq!(t.row_count(), 2);
        let first = t.row(0).unwrap();
        assert_eq!(first.get("code"), Some(&Value::Int(1000)));
        assert_eq!(first.get("balance"), Some(&Value::Float(12.5)));
        assert_eq!(t.row(1).unwrap().get("balance"), Some(&Value::Bool(false)));
    }

    #[test]
    fn selects_sheet_by_name_and_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_book(&path);

        let mut warnings = Vec::new();
        let by_name = LoadOptions { sheet: Some(SheetSelector::Name("Other".into())), ..LoadOptions::default() };
        let t = read(&path, &by_name, None, &mut warnings).unwrap();
        assert_eq!(t.columns(), &["x".to_string()]);

        let by_index = LoadOptions { sheet: Some(SheetSelector::Index(1)), ..LoadOptions::default() };
        let t = read(&path, &by_index, None, &mut warnings).unwrap();
        assert_eq!(t.columns(), &["x".to_string()]);

        let missing = LoadOptions { sheet: Some(SheetSelector::Name("Nope".into())), ..LoadOptions::default() };
        let err = read(&path, &missing, None, &mut warnings).unwrap_err();
        assert!(err.to_string().contains("'Nope' not found"));
    }

    #[test]
    fn error_cells_keep_spreadsheet_text() {
        use calamine::CellErrorType;
        assert_eq!(cell_value(&Data::Error(CellErrorType::Div0)), Value::from("#DIV/0!"));
        assert_eq!(cell_value(&Data::Error(CellErrorType::NA)), Value::from("#N/A"));
    }

    #[test]
    fn serial_conversion() {
        let dt = excel_serial_to_datetime(45_672.5).unwrap();
        assert_eq!(dt.to_string(), "2025-01-15 12:00:00");
    }
}
