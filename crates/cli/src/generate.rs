//! `payrep generate` — run the full ingest → partition → render pipeline.

use std::path::{Path, PathBuf};

use payrep_core::{Partitions, ReportConfig};
use payrep_ingest::IngestError;
use payrep_report::WriteSummary;

use crate::exit_codes::{EXIT_CONFIG, EXIT_INGEST, EXIT_MISSING_INPUT, EXIT_RENDER};
use crate::postprocess;
use crate::CliError;

/// Machine-readable run summary for `--json`.
#[derive(Debug, serde::Serialize)]
pub struct GenerateSummary {
    pub output: String,
    pub records: usize,
    pub sheets: usize,
    pub detail_rows: usize,
    pub companies: usize,
    pub write_duration_ms: u128,
}

/// Load the report config, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<ReportConfig, CliError> {
    match path {
        None => Ok(ReportConfig::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                CliError::new(EXIT_CONFIG, format!("cannot read config {}: {e}", path.display()))
            })?;
            ReportConfig::from_toml(&text)
                .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))
        }
    }
}

/// The dated report path inside the output directory.
pub fn report_path(output_dir: &Path, stem: &str, run_date: chrono::NaiveDate) -> PathBuf {
    output_dir.join(format!("{stem}_{}.xlsx", run_date.format("%Y-%m-%d")))
}

/// Run the pipeline. Returns the summary for output formatting.
pub fn run(
    uploads_dir: &Path,
    output_dir: Option<&Path>,
    config: &ReportConfig,
) -> Result<GenerateSummary, CliError> {
    let ledger = payrep_ingest::load_ledger(uploads_dir, config).map_err(|e| match e {
        IngestError::MissingInputs(_) => CliError::new(EXIT_MISSING_INPUT, e.to_string())
            .with_hint("upload all three workbooks before processing"),
        other => CliError::new(EXIT_INGEST, other.to_string()),
    })?;

    let partitions = Partitions::split(&ledger, &config.receivable_supplier);

    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.output.dir));
    std::fs::create_dir_all(&output_dir).map_err(|e| {
        CliError::new(EXIT_RENDER, format!("cannot create {}: {e}", output_dir.display()))
    })?;

    let path = report_path(&output_dir, &config.output.stem, chrono::Local::now().date_naive());
    let written: WriteSummary = payrep_report::write_report(&partitions, &path)
        .map_err(|e| CliError::new(EXIT_RENDER, e.to_string()))?;

    // The workbook is closed and in place; the hook may open it now.
    // Hook failures are reported inside, never fatal.
    postprocess::run_hook(config.postprocess.command.as_deref(), &path);

    Ok(GenerateSummary {
        output: path.display().to_string(),
        records: ledger.len(),
        sheets: written.sheets_written,
        detail_rows: written.detail_rows,
        companies: written.companies,
        write_duration_ms: written.write_duration_ms,
    })
}

/// CLI entry: run + print summaries.
pub fn cmd_generate(
    uploads: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let summary = run(&uploads, output.as_deref(), &config)?;

    if json {
        let json_str = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::new(EXIT_RENDER, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    eprintln!(
        "wrote {} — {} record(s), {} sheet(s), {} company sheet(s), {}ms",
        summary.output, summary.records, summary.sheets, summary.companies,
        summary.write_duration_ms,
    );

    Ok(())
}

/// CLI entry for `payrep validate`.
pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    eprintln!(
        "valid: cutoff {}, {} excluded supplier(s), receivable '{}'",
        config.cutoff_date,
        config.excluded_suppliers.len(),
        config.receivable_supplier,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn report_path_is_dated() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let path = report_path(Path::new("processed"), "Payables_Summary", date);
        assert_eq!(path, Path::new("processed/Payables_Summary_2025-06-30.xlsx"));
    }

    #[test]
    fn missing_inputs_map_to_their_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::default();
        let err = run(dir.path(), None, &config).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_MISSING_INPUT);
        assert!(err.message.contains("bank_balance.xlsx"));
        assert!(err.message.contains("cash_management.xlsx"));
    }

    #[test]
    fn bad_config_maps_to_config_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payrep.toml");
        std::fs::write(&path, "cutoff_date = \"nope\"").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert_eq!(err.code, EXIT_CONFIG);
    }
}
