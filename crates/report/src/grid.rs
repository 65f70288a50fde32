//! Sheet renderer: one depth-first, top-to-bottom pass over the hierarchy
//! tree, emitting a typed row grid with every subtotal formula already built.
//!
//! The grid is the unit of testing: row indices are final, so formula
//! references can be asserted as strings without serializing a workbook.
//! Row bookkeeping records the exact row of each child's total cell — totals
//! are sparse (not every bank has an available value), so formulas reference
//! explicit row sets, never an assumed contiguous range.

use chrono::NaiveDate;
use payrep_core::PayableRecord;

use crate::formula;
use crate::partition::build_tree;

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

pub const COL_COMPANY: usize = 0;
pub const COL_BANK: usize = 1;
pub const COL_AVAILABLE: usize = 2;
pub const COL_SUPPLIER: usize = 3;
pub const COL_DATE: usize = 4;
pub const COL_INVOICE: usize = 5;
pub const COL_COMMENT: usize = 6;
pub const COL_TOTAL: usize = 7;
pub const COL_PAID: usize = 8;
pub const COL_SUM: usize = 9;
pub const COL_NET: usize = 10;
pub const COL_STATUS: usize = 11;

pub const HEADERS: [&str; 11] = [
    "Company Name",
    "Bank",
    "Available",
    "Supplier Name",
    "Date",
    "Invoice No",
    "Comment",
    "Total",
    "Paid Amount",
    "Sum of Balance",
    "Net of Balance",
];

// ---------------------------------------------------------------------------
// Grid model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Formula(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    BankHeader,
    SupplierHeader,
    Detail,
    SupplierTotal,
    BankTotal,
    CompanyTotal,
    GrandTotal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    /// Outline group level: 0 top, 1 supplier header/total, 2 detail.
    pub outline: u8,
    pub cells: Vec<Cell>,
}

impl Row {
    fn new(kind: RowKind, outline: u8, width: usize) -> Row {
        Row { kind, outline, cells: vec![Cell::Empty; width] }
    }

    pub fn cell(&self, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.cells.get(col).unwrap_or(&EMPTY)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SheetOptions {
    /// Append a Status column (hidden by default in the workbook).
    pub has_status: bool,
    /// Terminate with a grand-total row.
    pub grand_total: bool,
    /// Hide the sheet tab (per-company drill-down sheets).
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    pub has_status: bool,
    pub hidden: bool,
    pub rows: Vec<Row>,
}

impl SheetGrid {
    pub fn width(&self) -> usize {
        if self.has_status { 12 } else { 11 }
    }

    pub fn detail_row_count(&self) -> usize {
        self.rows.iter().filter(|r| r.kind == RowKind::Detail).count()
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Render one sheet. The ledger slice must already be filtered to this
/// sheet's partition; row order mirrors the partitioner's first-seen order,
/// and no re-sorting happens here beyond the leaf sort the partitioner
/// applied.
pub fn render_sheet(name: &str, records: &[PayableRecord], options: SheetOptions) -> SheetGrid {
    let width = if options.has_status { 12 } else { 11 };
    let tree = build_tree(records);
    let mut rows: Vec<Row> = Vec::new();

    let mut header = Row::new(RowKind::Header, 0, width);
    for (col, label) in HEADERS.iter().enumerate() {
        header.cells[col] = Cell::Text((*label).to_string());
    }
    if options.has_status {
        header.cells[COL_STATUS] = Cell::Text("Status".to_string());
    }
    rows.push(header);

    // Row sets feeding the grand-total formulas.
    let mut grand_sum_rows: Vec<usize> = Vec::new();
    let mut grand_avail_rows: Vec<usize> = Vec::new();

    for company in &tree {
        let mut company_sum_rows: Vec<usize> = Vec::new();
        let mut company_avail_rows: Vec<usize> = Vec::new();
        let mut first_bank = true;

        for bank in &company.banks {
            // Bank header row; the first one under a company also carries the
            // company label (written once at the start of its scope, blank on
            // repeats).
            let bank_header_row = rows.len();
            let mut row = Row::new(RowKind::BankHeader, 0, width);
            if first_bank {
                row.cells[COL_COMPANY] = Cell::Text(company.name.clone());
                first_bank = false;
            }
            row.cells[COL_BANK] = Cell::Text(bank.bank.clone());
            if let Some(available) = bank.available {
                row.cells[COL_AVAILABLE] = Cell::Number(available);
            }
            rows.push(row);

            let mut bank_sum_rows: Vec<usize> = Vec::new();

            for supplier in &bank.suppliers {
                let mut row = Row::new(RowKind::SupplierHeader, 1, width);
                row.cells[COL_SUPPLIER] = Cell::Text(supplier.name.clone());
                rows.push(row);

                let first_detail = rows.len();
                for rec in &supplier.records {
                    let mut row = Row::new(RowKind::Detail, 2, width);
                    if let Some(date) = rec.date {
                        row.cells[COL_DATE] = Cell::Date(date);
                    }
                    row.cells[COL_INVOICE] = Cell::Text(rec.invoice_no.clone());
                    row.cells[COL_COMMENT] = text_or_empty(&rec.comment);
                    row.cells[COL_TOTAL] = Cell::Number(rec.total);
                    row.cells[COL_PAID] = Cell::Number(rec.paid_amount);
                    row.cells[COL_SUM] = Cell::Number(rec.balance());
                    if options.has_status {
                        row.cells[COL_STATUS] = text_or_empty(rec.status.as_str());
                    }
                    rows.push(row);
                }
                let last_detail = rows.len() - 1;

                // Supplier total sums exactly the detail rows just emitted,
                // excluding the supplier header row.
                let total_row = rows.len();
                let mut row = Row::new(RowKind::SupplierTotal, 1, width);
                row.cells[COL_SUPPLIER] = Cell::Text(format!("{} Total", supplier.name));
                row.cells[COL_SUM] =
                    Cell::Formula(formula::sum_range(COL_SUM, first_detail, last_detail));
                rows.push(row);

                bank_sum_rows.push(total_row);
            }

            // Bank total: one reference per supplier total, available copied
            // from the bank header only when present.
            let bank_total_row = rows.len();
            let mut row = Row::new(RowKind::BankTotal, 0, width);
            row.cells[COL_BANK] = Cell::Text(format!("{} Total", bank.bank));
            if bank.available.is_some() {
                row.cells[COL_AVAILABLE] =
                    Cell::Formula(formula::cell_copy(bank_header_row, COL_AVAILABLE));
                company_avail_rows.push(bank_total_row);
            }
            row.cells[COL_SUM] = Cell::Formula(formula::sum_cells(COL_SUM, &bank_sum_rows));
            row.cells[COL_NET] =
                Cell::Formula(formula::net(bank_total_row, COL_AVAILABLE, COL_SUM));
            rows.push(row);

            company_sum_rows.push(bank_total_row);
        }

        let company_total_row = rows.len();
        let mut row = Row::new(RowKind::CompanyTotal, 0, width);
        row.cells[COL_COMPANY] = Cell::Text(format!("{} Total", company.name));
        if !company_avail_rows.is_empty() {
            row.cells[COL_AVAILABLE] =
                Cell::Formula(formula::sum_cells(COL_AVAILABLE, &company_avail_rows));
            grand_avail_rows.push(company_total_row);
        }
        row.cells[COL_SUM] = Cell::Formula(formula::sum_cells(COL_SUM, &company_sum_rows));
        row.cells[COL_NET] =
            Cell::Formula(formula::net(company_total_row, COL_AVAILABLE, COL_SUM));
        rows.push(row);

        grand_sum_rows.push(company_total_row);
    }

    if options.grand_total {
        let grand_total_row = rows.len();
        let mut row = Row::new(RowKind::GrandTotal, 0, width);
        row.cells[COL_COMPANY] = Cell::Text("Grand Total".to_string());
        if !grand_avail_rows.is_empty() {
            row.cells[COL_AVAILABLE] =
                Cell::Formula(formula::sum_cells(COL_AVAILABLE, &grand_avail_rows));
        }
        row.cells[COL_SUM] = Cell::Formula(formula::sum_cells(COL_SUM, &grand_sum_rows));
        row.cells[COL_NET] =
            Cell::Formula(formula::net(grand_total_row, COL_AVAILABLE, COL_SUM));
        rows.push(row);
    }

    SheetGrid { name: name.to_string(), has_status: options.has_status, hidden: options.hidden, rows }
}

fn text_or_empty(value: &str) -> Cell {
    if value.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
