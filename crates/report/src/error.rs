use std::fmt;

#[derive(Debug)]
pub enum ReportError {
    /// rust_xlsxwriter error while building or saving the workbook.
    Xlsx(String),
    /// Filesystem error (temp file, final rename).
    Io(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xlsx(msg) => write!(f, "workbook error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::Xlsx(e.to_string())
    }
}
