//! Excel import via calamine. First row is the header; everything below is
//! data. Cell typing is resolved here so the rest of the crate never touches
//! calamine types.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};

use crate::error::IngestError;
use crate::table::{Field, Table};

/// Which sheet of a workbook to read.
#[derive(Debug, Clone, Copy)]
pub enum SheetSelect {
    First,
    /// The last sheet (the cash-management export appends a sheet per
    /// period).
    Last,
    /// A named sheet when present, else the first.
    NamedOrFirst(&'static str),
}

/// Read one sheet of a workbook into a [`Table`].
pub fn read_table(path: &Path, select: SheetSelect) -> Result<Table, IngestError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IngestError::NoSheets(path.to_path_buf()));
    }

    let sheet_name = match select {
        SheetSelect::First => sheet_names[0].clone(),
        SheetSelect::Last => sheet_names[sheet_names.len() - 1].clone(),
        SheetSelect::NamedOrFirst(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .unwrap_or_else(|| sheet_names[0].clone()),
    };

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| IngestError::Sheet {
        path: path.to_path_buf(),
        sheet: sheet_name.clone(),
        message: e.to_string(),
    })?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(row) => row.iter().map(|cell| field_from(cell).as_text()).collect(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<Field>> =
        rows_iter.map(|row| row.iter().map(field_from).collect()).collect();

    Ok(Table::new(headers, rows))
}

fn field_from(cell: &Data) -> Field {
    match cell {
        Data::Empty => Field::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                Field::Empty
            } else {
                Field::Text(s.clone())
            }
        }
        Data::Float(n) => Field::Number(*n),
        Data::Int(n) => Field::Number(*n as f64),
        Data::Bool(b) => Field::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Field::Text(format!("#{e:?}")),
        Data::DateTime(dt) => match serial_to_date(dt.as_f64()) {
            Some(date) => Field::Date(date),
            None => Field::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Field::Text(s.clone()),
    }
}

/// Excel 1900-system serial → calendar date (epoch 1899-12-30, which also
/// absorbs Excel's phantom 1900 leap day for post-1900 dates).
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if serial <= 0.0 {
        return None;
    }
    let days = serial.floor() as i64;
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn serial_conversion() {
        // 2023-10-01 is serial 45200 in the 1900 date system.
        assert_eq!(serial_to_date(45200.0), NaiveDate::from_ymd_opt(2023, 10, 1));
        assert_eq!(serial_to_date(45200.75), NaiveDate::from_ymd_opt(2023, 10, 1));
        assert_eq!(serial_to_date(0.0), None);
    }

    #[test]
    fn reads_headers_and_typed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.xlsx");

        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.write_string(0, 0, "Company").unwrap();
        ws.write_string(0, 1, "Total").unwrap();
        ws.write_string(1, 0, "1010").unwrap();
        ws.write_number(1, 1, 250.5).unwrap();
        ws.write_number(2, 0, 2020.0).unwrap();
        ws.write_string(2, 1, "not a number").unwrap();
        workbook.save(&path).unwrap();

        let table = read_table(&path, SheetSelect::First).unwrap();
        assert_eq!(table.headers, vec!["Company", "Total"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.field(0, 0).as_text(), "1010");
        assert_eq!(table.field(0, 1).as_number(), Some(250.5));
        assert_eq!(table.field(1, 0).as_text(), "2020");
        assert_eq!(table.field(1, 1).as_number(), None);
    }

    #[test]
    fn sheet_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("multi.xlsx");

        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.set_name("2024-01").unwrap();
        first.write_string(0, 0, "Period").unwrap();
        first.write_string(1, 0, "january").unwrap();
        let last = workbook.add_worksheet();
        last.set_name("2024-02").unwrap();
        last.write_string(0, 0, "Period").unwrap();
        last.write_string(1, 0, "february").unwrap();
        workbook.save(&path).unwrap();

        let table = read_table(&path, SheetSelect::Last).unwrap();
        assert_eq!(table.field(0, 0).as_text(), "february");

        let table = read_table(&path, SheetSelect::NamedOrFirst("Balance")).unwrap();
        assert_eq!(table.field(0, 0).as_text(), "january");
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = read_table(Path::new("/nonexistent/nope.xlsx"), SheetSelect::First).unwrap_err();
        assert!(matches!(err, IngestError::Open { .. }));
    }
}
