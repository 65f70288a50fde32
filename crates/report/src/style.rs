//! Style/layout controller: cell formats, column sizing, outline runs.
//!
//! Formats mirror the legacy report: parenthesized negatives for money,
//! `yyyy-mm-dd` dates, and a progressively darker shading ladder for
//! bank → company → grand total rows.

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder};

use crate::grid::{Cell, RowKind, SheetGrid, COL_AVAILABLE, COL_DATE, COL_NET, COL_PAID, COL_SUM, COL_TOTAL};

pub const NUMBER_PATTERN: &str = "#,##0.00_);(#,##0.00)";

/// Width applied to the numeric and date columns regardless of content.
pub const FIXED_COL_WIDTH: f64 = 16.0;

pub fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::Bottom)
        .set_font_name("Calibri")
        .set_border_top(FormatBorder::Medium)
        .set_border_bottom(FormatBorder::Medium)
}

pub fn date_format() -> Format {
    Format::new().set_num_format("yyyy-mm-dd").set_align(FormatAlign::Center)
}

pub fn number_format() -> Format {
    Format::new().set_num_format(NUMBER_PATTERN).set_align(FormatAlign::Right)
}

pub fn supplier_total_format() -> Format {
    Format::new().set_bold().set_num_format(NUMBER_PATTERN)
}

pub fn bank_total_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color("E8E8E8")
        .set_num_format(NUMBER_PATTERN)
}

pub fn company_total_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color("D3D3D3")
        .set_num_format(NUMBER_PATTERN)
        .set_border_bottom(FormatBorder::Medium)
}

pub fn grand_total_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color("B0B0B0")
        .set_num_format(NUMBER_PATTERN)
        .set_border_bottom(FormatBorder::Medium)
}

/// Format for the negative-net conditional rule.
pub fn negative_net_format() -> Format {
    Format::new().set_font_color("FF0000").set_num_format(NUMBER_PATTERN)
}

/// The row-level format for total rows, or None for content rows whose cells
/// are formatted individually.
pub fn row_format(kind: RowKind) -> Option<Format> {
    match kind {
        RowKind::SupplierTotal => Some(supplier_total_format()),
        RowKind::BankTotal => Some(bank_total_format()),
        RowKind::CompanyTotal => Some(company_total_format()),
        RowKind::GrandTotal => Some(grand_total_format()),
        _ => None,
    }
}

pub fn is_numeric_column(col: usize) -> bool {
    matches!(col, COL_AVAILABLE | COL_TOTAL | COL_PAID | COL_SUM | COL_NET)
}

// ---------------------------------------------------------------------------
// Column sizing
// ---------------------------------------------------------------------------

/// Auto-size columns to the longest rendered value plus padding. Formula
/// cells are skipped (their rendered width is governed by the fixed numeric
/// width below); dates count as the fixed `yyyy-mm-dd` width.
pub fn column_widths(grid: &SheetGrid) -> Vec<f64> {
    let width = grid.width();
    let mut max_chars = vec![0usize; width];

    for row in &grid.rows {
        for col in 0..width {
            let chars = match row.cell(col) {
                Cell::Empty | Cell::Formula(_) => 0,
                Cell::Text(s) => s.chars().count(),
                Cell::Number(n) => format!("{n:.2}").len(),
                Cell::Date(_) => 10,
            };
            if chars > max_chars[col] {
                max_chars[col] = chars;
            }
        }
    }

    (0..width)
        .map(|col| {
            if is_numeric_column(col) || col == COL_DATE {
                FIXED_COL_WIDTH
            } else {
                (max_chars[col] + 2) as f64
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Outline runs
// ---------------------------------------------------------------------------

/// Maximal contiguous row runs at or above an outline level, as inclusive
/// (first, last) pairs. Applying the level-1 runs and then the level-2 runs
/// with `group_rows` produces the nested supplier/detail outline.
pub fn outline_runs(grid: &SheetGrid, level: u8) -> Vec<(u32, u32)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, row) in grid.rows.iter().enumerate() {
        if row.outline >= level {
            if start.is_none() {
                start = Some(idx);
            }
        } else if let Some(s) = start.take() {
            runs.push((s as u32, (idx - 1) as u32));
        }
    }
    if let Some(s) = start {
        runs.push((s as u32, (grid.rows.len() - 1) as u32));
    }
    runs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{render_sheet, SheetOptions, COL_COMPANY, COL_SUPPLIER};
    use chrono::NaiveDate;
    use payrep_core::{PayableRecord, Status};

    fn record(company: &str, supplier: &str, invoice: &str) -> PayableRecord {
        PayableRecord {
            company_name: company.into(),
            bank: "1111".into(),
            available: Some(100.0),
            supplier_name: supplier.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            invoice_no: invoice.into(),
            comment: String::new(),
            total: 10.0,
            paid_amount: 0.0,
            status: Status::Active,
        }
    }

    fn fixture() -> SheetGrid {
        let records = vec![
            record("Northwind Property Group", "S1", "A"),
            record("Northwind Property Group", "S2", "B"),
        ];
        render_sheet(
            "Active",
            &records,
            SheetOptions { has_status: false, grand_total: true, hidden: false },
        )
    }

    #[test]
    fn fixed_width_for_numeric_and_date_columns() {
        let widths = column_widths(&fixture());
        assert_eq!(widths[COL_AVAILABLE], FIXED_COL_WIDTH);
        assert_eq!(widths[COL_DATE], FIXED_COL_WIDTH);
        assert_eq!(widths[COL_SUM], FIXED_COL_WIDTH);
    }

    #[test]
    fn text_columns_fit_longest_value() {
        let widths = column_widths(&fixture());
        // "Northwind Property Group Total" (30 chars) + 2 padding.
        assert_eq!(widths[COL_COMPANY], 32.0);
        // Header "Supplier Name" (13) beats "S1 Total"; + 2.
        assert_eq!(widths[COL_SUPPLIER], 15.0);
    }

    #[test]
    fn outline_runs_nest() {
        let grid = fixture();
        // Rows: 0 hdr, 1 bank hdr, 2 S1 hdr, 3 S1 detail, 4 S1 total,
        // 5 S2 hdr, 6 S2 detail, 7 S2 total, 8 bank total, 9 company,
        // 10 grand.
        assert_eq!(outline_runs(&grid, 1), vec![(2, 7)]);
        assert_eq!(outline_runs(&grid, 2), vec![(3, 3), (6, 6)]);
    }

    #[test]
    fn run_at_end_of_sheet_is_closed() {
        let records = vec![record("Acme", "S1", "A")];
        let grid = render_sheet(
            "Co",
            &records,
            SheetOptions { has_status: false, grand_total: false, hidden: true },
        );
        // Rows: 0 hdr, 1 bank hdr, 2 sup hdr, 3 detail, 4 sup total,
        // 5 bank total, 6 company total.
        assert_eq!(outline_runs(&grid, 1), vec![(2, 4)]);
    }
}
