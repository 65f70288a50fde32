//! `payrep-report` — the report-layout engine.
//!
//! Takes a flat payables ledger and renders it as a hierarchical
//! (Company → Bank → Supplier → Invoice) workbook with running subtotals
//! expressed as live spreadsheet formulas.
//!
//! Rendering is split in two: [`grid`] walks the partition tree once and
//! emits a typed row grid (every formula already built, every row index
//! final), then [`workbook`] serializes grids to xlsx. The split keeps the
//! layout algorithm fully assertable without reading a file back.

pub mod error;
pub mod formula;
pub mod grid;
pub mod partition;
pub mod style;
pub mod workbook;

pub use error::ReportError;
pub use grid::{render_sheet, Cell, Row, RowKind, SheetGrid, SheetOptions};
pub use partition::build_tree;
pub use workbook::{write_report, WriteSummary};
