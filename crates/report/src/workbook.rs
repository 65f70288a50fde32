//! Workbook assembler: grids → xlsx file.
//!
//! One sheet per status partition plus one hidden drill-down sheet per
//! company in the active partition. The file is written to a temporary
//! sibling path and renamed into place only after a successful save, so a
//! failed render never leaves a partial file claiming success.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rust_xlsxwriter::{
    ConditionalFormatCell, ConditionalFormatCellRule, Workbook as XlsxWorkbook, Worksheet,
};

use payrep_core::Partitions;

use crate::error::ReportError;
use crate::grid::{render_sheet, Cell, RowKind, SheetGrid, SheetOptions, COL_COMMENT, COL_NET, COL_PAID, COL_STATUS, COL_TOTAL};
use crate::style;

/// Excel's hard cap on sheet-name length.
const MAX_SHEET_NAME: usize = 31;

#[derive(Debug, Default)]
pub struct WriteSummary {
    pub sheets_written: usize,
    pub detail_rows: usize,
    pub companies: usize,
    pub write_duration_ms: u128,
}

/// Render every sheet for the given partitions and write the workbook.
pub fn write_report(partitions: &Partitions, path: &Path) -> Result<WriteSummary, ReportError> {
    let grids = build_grids(partitions);
    write_grids(&grids, path)
}

/// All sheet grids for one report, in tab order.
pub fn build_grids(partitions: &Partitions) -> Vec<SheetGrid> {
    let mut names: HashSet<String> = HashSet::new();
    let mut grids = Vec::new();

    let visible = SheetOptions { has_status: false, grand_total: true, hidden: false };
    let with_status = SheetOptions { has_status: true, grand_total: true, hidden: false };

    grids.push(render_sheet(&unique_sheet_name(&mut names, "Active"), &partitions.active, visible));
    grids.push(render_sheet(&unique_sheet_name(&mut names, "Others"), &partitions.others, with_status));
    grids.push(render_sheet(
        &unique_sheet_name(&mut names, "Zagora_AP"),
        &partitions.zagora_payable,
        visible,
    ));
    grids.push(render_sheet(
        &unique_sheet_name(&mut names, "Zagora_AR"),
        &partitions.receivable,
        with_status,
    ));

    // One hidden drill-down sheet per company in the active partition,
    // first-seen order, no grand total.
    let hidden = SheetOptions { has_status: false, grand_total: false, hidden: true };
    let mut companies: Vec<&str> = Vec::new();
    for rec in &partitions.active {
        if !companies.contains(&rec.company_name.as_str()) {
            companies.push(&rec.company_name);
        }
    }
    for company in companies {
        let records: Vec<_> =
            partitions.active.iter().filter(|r| r.company_name == company).cloned().collect();
        if records.is_empty() {
            continue;
        }
        grids.push(render_sheet(&unique_sheet_name(&mut names, company), &records, hidden));
    }

    grids
}

/// Serialize grids to an xlsx file, atomically.
pub fn write_grids(grids: &[SheetGrid], path: &Path) -> Result<WriteSummary, ReportError> {
    let start_time = Instant::now();
    let mut summary = WriteSummary::default();

    let mut workbook = XlsxWorkbook::new();
    for grid in grids {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&grid.name)
            .map_err(|e| ReportError::Xlsx(format!("failed to create sheet '{}': {e}", grid.name)))?;
        write_sheet(worksheet, grid)?;
        summary.sheets_written += 1;
        summary.detail_rows += grid.detail_row_count();
        if grid.hidden {
            summary.companies += 1;
        }
    }

    // First visible sheet is the active tab.
    if let Ok(ws) = workbook.worksheet_from_index(0) {
        let _ = ws.set_active(true);
    }

    save_atomic(&mut workbook, path)?;

    summary.write_duration_ms = start_time.elapsed().as_millis();
    Ok(summary)
}

fn save_atomic(workbook: &mut XlsxWorkbook, path: &Path) -> Result<(), ReportError> {
    let tmp: PathBuf = path.with_extension("xlsx.tmp");

    if let Err(e) = workbook.save(&tmp) {
        let _ = std::fs::remove_file(&tmp);
        return Err(ReportError::Xlsx(format!("failed to save workbook: {e}")));
    }

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(ReportError::Io(format!(
            "failed to move report into place at {}: {e}",
            path.display()
        )));
    }

    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, grid: &SheetGrid) -> Result<(), ReportError> {
    let width = grid.width();
    let number_format = style::number_format();
    let date_format = style::date_format();
    let header_format = style::header_format();
    let plain_format = rust_xlsxwriter::Format::new();

    for (row_idx, row) in grid.rows.iter().enumerate() {
        let r = row_idx as u32;

        if row.kind == RowKind::Header {
            for col in 0..width {
                match row.cell(col) {
                    Cell::Text(s) => worksheet.write_string_with_format(r, col as u16, s, &header_format),
                    _ => worksheet.write_blank(r, col as u16, &header_format),
                }
                .map_err(|e| write_err(row_idx, col, e))?;
            }
            continue;
        }

        if let Some(format) = style::row_format(row.kind) {
            // Total rows: the format (bold, fill, border) spans every cell of
            // the row, blanks included.
            for col in 0..width {
                match row.cell(col) {
                    Cell::Empty => worksheet.write_blank(r, col as u16, &format),
                    Cell::Text(s) => worksheet.write_string_with_format(r, col as u16, s, &format),
                    Cell::Number(n) => worksheet.write_number_with_format(r, col as u16, *n, &format),
                    Cell::Date(d) => worksheet.write_datetime_with_format(r, col as u16, *d, &date_format),
                    Cell::Formula(f) => {
                        worksheet.write_formula_with_format(r, col as u16, f.as_str(), &format)
                    }
                }
                .map_err(|e| write_err(row_idx, col, e))?;
            }
            continue;
        }

        // Content rows: only non-empty cells, formatted per type.
        for col in 0..width {
            match row.cell(col) {
                Cell::Empty => continue,
                Cell::Text(s) => worksheet.write_string_with_format(r, col as u16, s, &plain_format),
                Cell::Number(n) => {
                    worksheet.write_number_with_format(r, col as u16, *n, &number_format)
                }
                Cell::Date(d) => worksheet.write_datetime_with_format(r, col as u16, *d, &date_format),
                Cell::Formula(f) => {
                    worksheet.write_formula_with_format(r, col as u16, f.as_str(), &number_format)
                }
            }
            .map_err(|e| write_err(row_idx, col, e))?;
        }
    }

    apply_layout(worksheet, grid)?;
    Ok(())
}

fn write_err(row: usize, col: usize, e: rust_xlsxwriter::XlsxError) -> ReportError {
    ReportError::Xlsx(format!("failed to write cell ({row}, {col}): {e}"))
}

fn apply_layout(worksheet: &mut Worksheet, grid: &SheetGrid) -> Result<(), ReportError> {
    worksheet.set_freeze_panes(1, 0)?;

    for (col, width) in style::column_widths(grid).iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    // Comment, Total and Paid Amount stay in the file for formula
    // correctness but are hidden from the default view; same for Status.
    for col in [COL_COMMENT, COL_TOTAL, COL_PAID] {
        worksheet.set_column_hidden(col as u16)?;
    }
    if grid.has_status {
        worksheet.set_column_hidden(COL_STATUS as u16)?;
    }

    // Outline grouping: supplier blocks collapse under the bank row, detail
    // rows collapse under their supplier header. Level-2 runs nest inside
    // the level-1 runs already applied.
    for (first, last) in style::outline_runs(grid, 1) {
        worksheet.group_rows(first, last)?;
    }
    for (first, last) in style::outline_runs(grid, 2) {
        worksheet.group_rows(first, last)?;
    }

    // Negative net values render red.
    if grid.rows.len() > 1 {
        let last_row = (grid.rows.len() - 1) as u32;
        let negative = style::negative_net_format();
        worksheet.add_conditional_format(
            1,
            COL_NET as u16,
            last_row,
            COL_NET as u16,
            &ConditionalFormatCell::new()
                .set_rule(ConditionalFormatCellRule::LessThan(0.0))
                .set_format(&negative),
        )?;
    }

    if grid.hidden {
        worksheet.set_hidden(true);
    }

    Ok(())
}

/// Truncate to Excel's 31-char limit and de-duplicate case-insensitively
/// with a numeric suffix, re-truncating the base so the result still fits.
fn unique_sheet_name(taken: &mut HashSet<String>, desired: &str) -> String {
    let base: String = desired.chars().take(MAX_SHEET_NAME).collect();
    let mut candidate = base.clone();
    let mut n = 2;
    while taken.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME.saturating_sub(suffix.chars().count());
        candidate = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
        n += 1;
    }
    taken.insert(candidate.to_lowercase());
    candidate
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
