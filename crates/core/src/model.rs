use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One normalized payable row, as produced by the ingest merge chain.
///
/// Immutable once built. The outstanding balance is always derived from
/// `total` and `paid_amount` via [`PayableRecord::balance`]; it is never
/// stored or mutated on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayableRecord {
    pub company_name: String,
    pub bank: String,
    pub available: Option<f64>,
    pub supplier_name: String,
    pub date: Option<NaiveDate>,
    pub invoice_no: String,
    pub comment: String,
    pub total: f64,
    pub paid_amount: f64,
    pub status: Status,
}

impl PayableRecord {
    /// Outstanding balance: `total - paid_amount`.
    pub fn balance(&self) -> f64 {
        self.total - self.paid_amount
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Account status from the bank-balance dimension table.
///
/// The known vocabulary gets its own variants; anything else (including a
/// missing status) is carried verbatim so the Others sheet can display it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Status {
    Active,
    Zagora,
    Remove,
    Other(String),
}

impl Status {
    pub fn parse(raw: &str) -> Status {
        match raw.trim() {
            "ACTIVE" => Status::Active,
            "ZAGORA" => Status::Zagora,
            "REMOVE" => Status::Remove,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Active => "ACTIVE",
            Status::Zagora => "ZAGORA",
            Status::Remove => "REMOVE",
            Status::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Partitions
// ---------------------------------------------------------------------------

/// The ledger split into the four report sheets.
///
/// The receivable partition is cut by supplier name across *all* statuses and
/// does not remove those rows from the status partitions.
#[derive(Debug, Default)]
pub struct Partitions {
    /// Status == ACTIVE. Rendered without a Status column.
    pub active: Vec<PayableRecord>,
    /// Status == ZAGORA. Rendered without a Status column.
    pub zagora_payable: Vec<PayableRecord>,
    /// Everything that is neither ACTIVE nor ZAGORA. Status column shown.
    pub others: Vec<PayableRecord>,
    /// Rows for the configured receivable supplier, any status.
    pub receivable: Vec<PayableRecord>,
}

impl Partitions {
    /// Split a normalized ledger. Input order is preserved within each
    /// partition, so a deterministically sorted ledger yields deterministic
    /// sheets.
    pub fn split(records: &[PayableRecord], receivable_supplier: &str) -> Partitions {
        let mut parts = Partitions::default();
        for rec in records {
            if rec.supplier_name == receivable_supplier {
                parts.receivable.push(rec.clone());
            }
            match rec.status {
                Status::Active => parts.active.push(rec.clone()),
                Status::Zagora => parts.zagora_payable.push(rec.clone()),
                _ => parts.others.push(rec.clone()),
            }
        }
        parts
    }

    pub fn total_records(&self) -> usize {
        self.active.len() + self.zagora_payable.len() + self.others.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(supplier: &str, status: Status, total: f64, paid: f64) -> PayableRecord {
        PayableRecord {
            company_name: "Acme Holdings".into(),
            bank: "0045".into(),
            available: None,
            supplier_name: supplier.into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            invoice_no: "INV-1".into(),
            comment: String::new(),
            total,
            paid_amount: paid,
            status,
        }
    }

    #[test]
    fn balance_is_derived() {
        let rec = record("Plumbing Co", Status::Active, 150.0, 40.0);
        assert_eq!(rec.balance(), 110.0);
    }

    #[test]
    fn status_vocabulary_round_trips() {
        assert_eq!(Status::parse(" ACTIVE "), Status::Active);
        assert_eq!(Status::parse("ZAGORA"), Status::Zagora);
        assert_eq!(Status::parse("REMOVE"), Status::Remove);
        assert_eq!(Status::parse("HOLD"), Status::Other("HOLD".into()));
        assert_eq!(Status::parse("HOLD").as_str(), "HOLD");
        assert_eq!(Status::parse("").as_str(), "");
    }

    #[test]
    fn split_by_status() {
        let records = vec![
            record("Plumbing Co", Status::Active, 100.0, 0.0),
            record("Roofing Co", Status::Zagora, 200.0, 0.0),
            record("Paving Co", Status::Other("HOLD".into()), 300.0, 0.0),
        ];
        let parts = Partitions::split(&records, "Holdback Mgmt Inc");
        assert_eq!(parts.active.len(), 1);
        assert_eq!(parts.zagora_payable.len(), 1);
        assert_eq!(parts.others.len(), 1);
        assert!(parts.receivable.is_empty());
        assert_eq!(parts.total_records(), 3);
    }

    #[test]
    fn receivable_supplier_stays_in_status_partition() {
        let records = vec![
            record("Holdback Mgmt Inc", Status::Zagora, 100.0, 0.0),
            record("Roofing Co", Status::Zagora, 200.0, 0.0),
        ];
        let parts = Partitions::split(&records, "Holdback Mgmt Inc");
        // Receivable rows are a copy, not a removal.
        assert_eq!(parts.receivable.len(), 1);
        assert_eq!(parts.zagora_payable.len(), 2);
    }
}
