//! Hierarchy partitioner: flat ledger → 4-level tree.
//!
//! Company → BankGroup(bank, available) → Supplier → records. Grouping at
//! every level is first-seen order over the input slice; only combinations
//! present in the ledger produce nodes. Pure and deterministic: the same
//! ledger always yields the same tree.

use std::cmp::Ordering;

use payrep_core::PayableRecord;

pub struct CompanyNode<'a> {
    pub name: String,
    pub banks: Vec<BankNode<'a>>,
}

/// Grouping key is the *pair* (bank, available): two records with the same
/// bank but different available values form distinct groups, and a missing
/// available is its own group value, never merged with zero or present.
pub struct BankNode<'a> {
    pub bank: String,
    pub available: Option<f64>,
    pub suppliers: Vec<SupplierNode<'a>>,
}

pub struct SupplierNode<'a> {
    pub name: String,
    pub records: Vec<&'a PayableRecord>,
}

/// Build the hierarchy tree for one sheet.
///
/// Leaf rows are sorted (date ascending, invoice_no ascending) with undated
/// records last; everything above keeps input order. Group membership lookups
/// are linear scans — group counts are small and it avoids hashing floats.
pub fn build_tree(records: &[PayableRecord]) -> Vec<CompanyNode<'_>> {
    let mut companies: Vec<CompanyNode<'_>> = Vec::new();

    for rec in records {
        let ci = match companies.iter().position(|c| c.name == rec.company_name) {
            Some(i) => i,
            None => {
                companies.push(CompanyNode { name: rec.company_name.clone(), banks: Vec::new() });
                companies.len() - 1
            }
        };
        let company = &mut companies[ci];

        let bi = match company
            .banks
            .iter()
            .position(|b| b.bank == rec.bank && b.available == rec.available)
        {
            Some(i) => i,
            None => {
                company.banks.push(BankNode {
                    bank: rec.bank.clone(),
                    available: rec.available,
                    suppliers: Vec::new(),
                });
                company.banks.len() - 1
            }
        };
        let bank = &mut company.banks[bi];

        let si = match bank.suppliers.iter().position(|s| s.name == rec.supplier_name) {
            Some(i) => i,
            None => {
                bank.suppliers.push(SupplierNode {
                    name: rec.supplier_name.clone(),
                    records: Vec::new(),
                });
                bank.suppliers.len() - 1
            }
        };

        bank.suppliers[si].records.push(rec);
    }

    for company in &mut companies {
        for bank in &mut company.banks {
            for supplier in &mut bank.suppliers {
                supplier.records.sort_by(|a, b| leaf_order(a, b));
            }
        }
    }

    companies
}

/// Leaf ordering: date ascending with missing dates last, then invoice_no.
fn leaf_order(a: &PayableRecord, b: &PayableRecord) -> Ordering {
    let by_date = match (a.date, b.date) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a.invoice_no.cmp(&b.invoice_no))
}
