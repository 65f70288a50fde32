//! Merge chain: three input tables → normalized payables ledger.
//!
//! Joins are first-match lookup maps keyed on the cleaned join keys. Records
//! with no dimension match keep empty company/bank fields rather than being
//! dropped; the report renders them under an empty-label group.

use std::cmp::Ordering;
use std::collections::HashMap;

use payrep_core::{PayableRecord, ReportConfig, Status};

use crate::error::IngestError;
use crate::normalize::{clean_bank_key, clean_key, AP_HEADER_TRANSLATION, CM_HEADER_TRANSLATION};
use crate::table::Table;

/// Build the normalized ledger from the three raw tables.
///
/// `ap` and `cm` headers are translated to the canonical vocabulary first.
pub fn build_ledger(
    ap: &Table,
    bb: &Table,
    cm: &Table,
    config: &ReportConfig,
) -> Result<Vec<PayableRecord>, IngestError> {
    let mut ap = ap.clone();
    ap.translate_headers(AP_HEADER_TRANSLATION);
    let mut cm = cm.clone();
    cm.translate_headers(CM_HEADER_TRANSLATION);

    // Resolve every column up front; the row loop is purely positional.
    let ap_file = "account_payables.xlsx";
    let ap_company = ap.require_column(ap_file, "Company")?;
    let ap_building = ap.require_column(ap_file, "Building")?;
    let ap_supplier_code = ap.require_column(ap_file, "Supplier code")?;
    let ap_supplier_name = ap.require_column(ap_file, "Supplier name")?;
    let ap_date = ap.require_column(ap_file, "Date")?;
    let ap_invoice = ap.require_column(ap_file, "Invoice no")?;
    let ap_comment = ap.require_column(ap_file, "Comment")?;
    let ap_total = ap.require_column(ap_file, "Total")?;
    let ap_paid = ap.require_column(ap_file, "Paid amount")?;

    let bb_file = "bank_balance.xlsx";
    let bb_company = bb.require_column(bb_file, "Company")?;
    let bb_company_name = bb.require_column(bb_file, "Company Name")?;
    let bb_building = bb.require_column(bb_file, "Building")?;
    let bb_bank = bb.require_column(bb_file, "Bank")?;
    let bb_bank_account = bb.require_column(bb_file, "Bank Account")?;
    let bb_status = bb.require_column(bb_file, "Status")?;

    let cm_file = "cash_management.xlsx";
    let cm_company = cm.require_column(cm_file, "Company")?;
    let cm_bank = cm.require_column(cm_file, "Bank")?;
    let cm_available = cm.require_column(cm_file, "Available")?;

    // Dimension lookups, first match wins.
    let mut name_by_company: HashMap<String, String> = HashMap::new();
    let mut bank_by_site: HashMap<(String, String), (String, String, String)> = HashMap::new();
    for idx in 0..bb.rows.len() {
        let company = clean_key(&bb.field(idx, bb_company).as_text());
        name_by_company
            .entry(company.clone())
            .or_insert_with(|| bb.field(idx, bb_company_name).as_text());

        let building = clean_key(&bb.field(idx, bb_building).as_text());
        bank_by_site.entry((company, building)).or_insert_with(|| {
            (
                clean_bank_key(&bb.field(idx, bb_bank).as_text()),
                bb.field(idx, bb_bank_account).as_text(),
                bb.field(idx, bb_status).as_text(),
            )
        });
    }

    // Available balances: non-numeric and zero are both "no balance", and
    // the sign flips (the export reports drawn amounts as negatives).
    let mut available_by_bank: HashMap<(String, String), f64> = HashMap::new();
    for idx in 0..cm.rows.len() {
        if let Some(v) = cm.field(idx, cm_available).as_number() {
            if v != 0.0 {
                let company = clean_key(&cm.field(idx, cm_company).as_text());
                let bank = clean_bank_key(&cm.field(idx, cm_bank).as_text());
                available_by_bank.entry((company, bank)).or_insert(-v);
            }
        }
    }

    let mut records: Vec<PayableRecord> = Vec::new();
    for idx in 0..ap.rows.len() {
        let supplier_code = ap.field(idx, ap_supplier_code).as_text();
        if config.excluded_suppliers.iter().any(|c| c == &supplier_code) {
            continue;
        }

        let date = ap.field(idx, ap_date).as_date();
        // The cutoff only applies to parsed dates; undated rows are kept and
        // sort to the end of their supplier block.
        if let Some(d) = date {
            if d < config.cutoff_date {
                continue;
            }
        }

        let mut total = ap.field(idx, ap_total).as_number().unwrap_or(0.0);
        let paid_amount = ap.field(idx, ap_paid).as_number().unwrap_or(0.0);
        if total == paid_amount {
            continue;
        }

        let comment = ap.field(idx, ap_comment).as_text();
        // CT marks a reverse payment.
        if comment.starts_with("CT") {
            total = -total;
        }

        let company_key = clean_key(&ap.field(idx, ap_company).as_text());
        let building_key = clean_key(&ap.field(idx, ap_building).as_text());

        let company_name = name_by_company.get(&company_key).cloned().unwrap_or_default();
        let (bank_key, bank_account, status_raw) = bank_by_site
            .get(&(company_key.clone(), building_key))
            .cloned()
            .unwrap_or_else(|| ("nan".to_string(), String::new(), String::new()));

        let status = Status::parse(&status_raw);
        if status == Status::Remove {
            continue;
        }

        let available = available_by_bank.get(&(company_key, bank_key)).copied();

        records.push(PayableRecord {
            company_name,
            bank: bank_account,
            available,
            supplier_name: ap.field(idx, ap_supplier_name).as_text(),
            date,
            invoice_no: ap.field(idx, ap_invoice).as_text(),
            comment,
            total,
            paid_amount,
            status,
        });
    }

    // Deterministic ledger order; the partitioner's first-seen grouping then
    // yields stable sheets. Identical rows become adjacent and collapse.
    records.sort_by(ledger_order);
    records.dedup_by(|a, b| a == b);

    Ok(records)
}

fn ledger_order(a: &PayableRecord, b: &PayableRecord) -> Ordering {
    a.company_name
        .cmp(&b.company_name)
        .then_with(|| a.bank.cmp(&b.bank))
        .then_with(|| cmp_option_f64(a.available, b.available))
        .then_with(|| a.supplier_name.cmp(&b.supplier_name))
        .then_with(|| cmp_option_date(a.date, b.date))
        .then_with(|| a.invoice_no.cmp(&b.invoice_no))
}

fn cmp_option_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_option_date(a: Option<chrono::NaiveDate>, b: Option<chrono::NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
