//! Typed in-memory table: keeps calamine at the crate boundary.
//!
//! Column indices are resolved once by header name; downstream code works
//! with positions, never string-keyed lookups per row.

use chrono::NaiveDate;

use crate::error::IngestError;

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Field {
    /// Text rendering of the field. Whole-number floats drop the decimal
    /// point so a numeric company code reads as `1234`, not `1234.0`.
    pub fn as_text(&self) -> String {
        match self {
            Field::Empty => String::new(),
            Field::Text(s) => s.trim().to_string(),
            Field::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Field::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Lenient numeric coercion: text is parsed after stripping currency
    /// punctuation; anything unparseable is None.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Field::Number(n) => Some(*n),
            Field::Text(s) => {
                let cleaned: String =
                    s.trim().chars().filter(|c| !matches!(c, ',' | '$' | ' ')).collect();
                if cleaned.is_empty() {
                    None
                } else {
                    cleaned.parse().ok()
                }
            }
            _ => None,
        }
    }

    /// Lenient date coercion; unparseable values are None, never an error.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Field::Date(d) => Some(*d),
            Field::Text(s) => {
                let s = s.trim();
                let date_part = s.split_whitespace().next().unwrap_or(s);
                NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                    .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
                    .or_else(|_| NaiveDate::parse_from_str(date_part, "%m/%d/%Y"))
                    .ok()
            }
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Field::Empty => true,
            Field::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Field>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Field>>) -> Table {
        Table { headers, rows }
    }

    /// Index of a column by (trimmed) header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Like [`Table::column`] but required, with the owning file named in
    /// the error.
    pub fn require_column(&self, file: &str, name: &str) -> Result<usize, IngestError> {
        self.column(name).ok_or_else(|| IngestError::MissingColumn {
            file: file.to_string(),
            column: name.to_string(),
        })
    }

    pub fn field(&self, row: usize, col: usize) -> &Field {
        static EMPTY: Field = Field::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    /// Rename headers through a translation map, leaving unmapped headers
    /// untouched.
    pub fn translate_headers(&mut self, mapping: &[(&str, &str)]) {
        for header in &mut self.headers {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == header.trim()) {
                *header = (*to).to_string();
            }
        }
    }
}
