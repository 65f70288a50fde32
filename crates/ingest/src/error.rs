use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum IngestError {
    /// One or more required input files are absent. Raised before any
    /// processing begins.
    MissingInputs(Vec<PathBuf>),
    /// Failed to open a workbook.
    Open { path: PathBuf, message: String },
    /// Failed to read a sheet from an opened workbook.
    Sheet { path: PathBuf, sheet: String, message: String },
    /// A workbook contains no sheets at all.
    NoSheets(PathBuf),
    /// A required column is missing from an input table.
    MissingColumn { file: String, column: String },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInputs(paths) => {
                let names: Vec<String> =
                    paths.iter().map(|p| p.display().to_string()).collect();
                write!(f, "missing input file(s): {}", names.join(", "))
            }
            Self::Open { path, message } => {
                write!(f, "cannot open {}: {message}", path.display())
            }
            Self::Sheet { path, sheet, message } => {
                write!(f, "cannot read sheet '{sheet}' of {}: {message}", path.display())
            }
            Self::NoSheets(path) => write!(f, "{} contains no sheets", path.display()),
            Self::MissingColumn { file, column } => {
                write!(f, "{file}: missing column '{column}'")
            }
        }
    }
}

impl std::error::Error for IngestError {}
