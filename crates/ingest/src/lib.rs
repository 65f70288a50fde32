//! `payrep-ingest` — upstream ETL for the payables report.
//!
//! Reads the three workbook exports (bank balances, accounts payable, cash
//! management), translates source column vocabulary to the canonical one,
//! applies the lenient cleaning rules, and merges everything into the
//! normalized payables ledger the report engine consumes.

pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod table;
pub mod xlsx;

use std::path::Path;

use payrep_core::{PayableRecord, ReportConfig};

pub use error::IngestError;
pub use table::{Field, Table};
pub use xlsx::SheetSelect;

/// Load the normalized ledger from the uploads directory.
///
/// Fails fast with a single [`IngestError::MissingInputs`] naming every
/// absent file before anything is opened.
pub fn load_ledger(uploads_dir: &Path, config: &ReportConfig) -> Result<Vec<PayableRecord>, IngestError> {
    let bank_balance = uploads_dir.join(&config.inputs.bank_balance);
    let account_payables = uploads_dir.join(&config.inputs.account_payables);
    let cash_management = uploads_dir.join(&config.inputs.cash_management);

    let missing: Vec<_> = [&bank_balance, &account_payables, &cash_management]
        .into_iter()
        .filter(|p| !p.exists())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingInputs(missing));
    }

    let bb = xlsx::read_table(&bank_balance, SheetSelect::NamedOrFirst("Balance"))?;
    let ap = xlsx::read_table(&account_payables, SheetSelect::First)?;
    let cm = xlsx::read_table(&cash_management, SheetSelect::Last)?;

    pipeline::build_ledger(&ap, &bb, &cm, config)
}
