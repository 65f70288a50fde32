//! End-to-end: write the three input workbooks, run the generate pipeline,
//! and read the produced report back with calamine.

use std::path::Path;

use calamine::{open_workbook, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use payrep_cli::generate;
use payrep_core::ReportConfig;

fn write_bank_balance(path: &Path) {
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name("Balance").unwrap();
    for (col, header) in ["Company", "Company Name", "Building", "Bank", "Bank Account", "Status"]
        .iter()
        .enumerate()
    {
        ws.write_string(0, col as u16, *header).unwrap();
    }
    let rows = [
        ("1010", "Acme Holdings", "B1", "0045", "004-555-777", "ACTIVE"),
        ("1010", "Acme Holdings", "B2", "0046", "004-555-778", "ZAGORA"),
        ("2020", "Beta Realty", "HQ", "1234", "123-000-111", "HOLD"),
    ];
    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        ws.write_string(r, 0, row.0).unwrap();
        ws.write_string(r, 1, row.1).unwrap();
        ws.write_string(r, 2, row.2).unwrap();
        ws.write_string(r, 3, row.3).unwrap();
        ws.write_string(r, 4, row.4).unwrap();
        ws.write_string(r, 5, row.5).unwrap();
    }
    workbook.save(path).unwrap();
}

fn write_account_payables(path: &Path) {
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    let headers = [
        "Compagnie",
        "Immeuble",
        "Code de fournisseur",
        "Nom du fournisseur",
        "Date",
        "No facture",
        "Commentaire",
        "Total",
        "Montant payé",
    ];
    for (col, header) in headers.iter().enumerate() {
        ws.write_string(0, col as u16, *header).unwrap();
    }
    struct Ap(&'static str, &'static str, &'static str, &'static str, &'static str, &'static str, f64, f64);
    let rows = [
        Ap("1010", "B1", "SUP1", "Plumbing Co", "2024-01-15", "INV-1", 100.0, 0.0),
        Ap("1010", "B1", "SUP2", "Roofing Co", "2024-01-20", "INV-2", 50.0, 0.0),
        Ap("1010", "B2", "SUP3", "Gestion Hazout Inc", "2024-02-01", "INV-3", 75.0, 0.0),
        Ap("2020", "HQ", "SUP4", "Paving Co", "2024-03-01", "INV-4", 60.0, 10.0),
    ];
    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        // Company as a number on purpose: the join key must bridge numeric
        // and text representations.
        ws.write_number(r, 0, row.0.parse::<f64>().unwrap()).unwrap();
        ws.write_string(r, 1, row.1).unwrap();
        ws.write_string(r, 2, row.2).unwrap();
        ws.write_string(r, 3, row.3).unwrap();
        ws.write_string(r, 4, row.4).unwrap();
        ws.write_string(r, 5, row.5).unwrap();
        ws.write_string(r, 6, "").unwrap();
        ws.write_number(r, 7, row.6).unwrap();
        ws.write_number(r, 8, row.7).unwrap();
    }
    workbook.save(path).unwrap();
}

fn write_cash_management(path: &Path) {
    let mut workbook = Workbook::new();
    // An older period sheet first; the pipeline must pick the last one.
    let stale = workbook.add_worksheet();
    stale.set_name("2024-01").unwrap();
    stale.write_string(0, 0, "Co. no.").unwrap();
    stale.write_string(0, 1, "Bank").unwrap();
    stale.write_string(0, 2, "Available").unwrap();
    stale.write_string(1, 0, "1010").unwrap();
    stale.write_number(1, 1, 45.0).unwrap();
    stale.write_number(1, 2, -99999.0).unwrap();

    let current = workbook.add_worksheet();
    current.set_name("2024-02").unwrap();
    current.write_string(0, 0, "Co. no.").unwrap();
    current.write_string(0, 1, "Bank").unwrap();
    current.write_string(0, 2, "Available").unwrap();
    current.write_string(1, 0, "1010").unwrap();
    current.write_number(1, 1, 45.0).unwrap();
    current.write_number(1, 2, -500.0).unwrap();
    workbook.save(path).unwrap();
}

#[test]
fn generate_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let processed = dir.path().join("processed");
    std::fs::create_dir_all(&uploads).unwrap();

    write_bank_balance(&uploads.join("bank_balance.xlsx"));
    write_account_payables(&uploads.join("account_payables.xlsx"));
    write_cash_management(&uploads.join("cash_management.xlsx"));

    let config = ReportConfig::default();
    let summary = generate::run(&uploads, Some(&processed), &config).unwrap();

    assert_eq!(summary.records, 4);
    // Active, Others, Zagora_AP, Zagora_AR + one hidden sheet per active
    // company (Acme only).
    assert_eq!(summary.sheets, 5);
    assert_eq!(summary.companies, 1);

    let report = Path::new(&summary.output);
    assert!(report.exists());
    assert!(report.file_name().unwrap().to_str().unwrap().starts_with("Payables_Summary_"));

    let mut workbook: Xlsx<_> = open_workbook(report).unwrap();
    assert_eq!(
        workbook.sheet_names().to_vec(),
        vec!["Active", "Others", "Zagora_AP", "Zagora_AR", "Acme Holdings"]
    );

    // Active sheet: header + Acme's two invoices under bank 004-555-777
    // (available 500 from the latest cash-management sheet).
    let range = workbook.worksheet_range("Active").unwrap();
    let cells: Vec<String> =
        range.rows().flatten().map(|c| c.to_string()).collect();
    assert!(cells.iter().any(|c| c == "Acme Holdings"));
    assert!(cells.iter().any(|c| c == "004-555-777"));
    assert!(cells.iter().any(|c| c == "INV-1"));
    assert!(cells.iter().any(|c| c == "INV-2"));
    assert!(cells.iter().any(|c| c == "500"));
    // The ZAGORA and HOLD rows belong to other sheets.
    assert!(!cells.iter().any(|c| c == "INV-3"));
    assert!(!cells.iter().any(|c| c == "INV-4"));

    // Zagora payable and receivable sheets both carry INV-3: the receivable
    // split copies, never removes.
    for sheet in ["Zagora_AP", "Zagora_AR"] {
        let range = workbook.worksheet_range(sheet).unwrap();
        let cells: Vec<String> = range.rows().flatten().map(|c| c.to_string()).collect();
        assert!(cells.iter().any(|c| c == "INV-3"), "{sheet} should carry INV-3");
    }

    // Others sheet shows the raw status value.
    let range = workbook.worksheet_range("Others").unwrap();
    let cells: Vec<String> = range.rows().flatten().map(|c| c.to_string()).collect();
    assert!(cells.iter().any(|c| c == "INV-4"));
    assert!(cells.iter().any(|c| c == "HOLD"));
}

#[test]
fn generate_twice_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let processed = dir.path().join("processed");
    std::fs::create_dir_all(&uploads).unwrap();

    write_bank_balance(&uploads.join("bank_balance.xlsx"));
    write_account_payables(&uploads.join("account_payables.xlsx"));
    write_cash_management(&uploads.join("cash_management.xlsx"));

    let config = ReportConfig::default();
    let first = generate::run(&uploads, Some(&processed), &config).unwrap();
    let second = generate::run(&uploads, Some(&processed), &config).unwrap();

    assert_eq!(first.records, second.records);
    assert_eq!(first.sheets, second.sheets);
    assert_eq!(first.detail_rows, second.detail_rows);
    // Same run date, same path: the second run overwrites atomically.
    assert_eq!(first.output, second.output);
}
