use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Report configuration, loaded from a TOML file. Every field has a default
/// matching the legacy monthly run, so a missing config file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Payables dated before this are dropped. Undated rows are kept.
    pub cutoff_date: NaiveDate,
    /// Supplier codes excluded from the report (pre-authorized payments that
    /// settle outside the payables process).
    pub excluded_suppliers: Vec<String>,
    /// Supplier whose rows form the receivable sheet.
    pub receivable_supplier: String,
    pub inputs: InputsConfig,
    pub output: OutputConfig,
    pub postprocess: PostprocessConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            cutoff_date: NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
            excluded_suppliers: default_excluded_suppliers(),
            receivable_supplier: "Gestion Hazout Inc".into(),
            inputs: InputsConfig::default(),
            output: OutputConfig::default(),
            postprocess: PostprocessConfig::default(),
        }
    }
}

fn default_excluded_suppliers() -> Vec<String> {
    [
        "ALT003", "BEL001", "BRA001", "CONR001", "ENE001", "ENVIROCONN", "GAZIFERE",
        "HYDROSOL", "HYDRO", "HYDRO WEST", "INTELECOM", "MILLER WAS", "NOVA SCOTI",
        "PRIMACO", "SUPERIEUR", "VIDEOTRON",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

// ---------------------------------------------------------------------------
// Inputs + Output
// ---------------------------------------------------------------------------

/// File names expected inside the uploads directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    pub bank_balance: String,
    pub account_payables: String,
    pub cash_management: String,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            bank_balance: "bank_balance.xlsx".into(),
            account_payables: "account_payables.xlsx".into(),
            cash_management: "cash_management.xlsx".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the dated report lands in.
    pub dir: String,
    /// File stem; the run date and `.xlsx` are appended.
    pub stem: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "processed".into(),
            stem: "Payables_Summary".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Postprocess hook
// ---------------------------------------------------------------------------

/// Optional macro-enabling conversion step, run after the workbook file is
/// closed and renamed into place. `{path}` in the command is replaced with
/// the finished report path. Hook failures are reported but never fail the
/// run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostprocessConfig {
    pub command: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReportConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: ReportConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.receivable_supplier.trim().is_empty() {
            return Err(ConfigError::Validation(
                "receivable_supplier must not be empty".into(),
            ));
        }
        if self.output.stem.trim().is_empty() {
            return Err(ConfigError::Validation("output.stem must not be empty".into()));
        }
        for name in [
            &self.inputs.bank_balance,
            &self.inputs.account_payables,
            &self.inputs.cash_management,
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "input file names must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ReportConfig::default();
        config.validate().unwrap();
        assert_eq!(config.cutoff_date.to_string(), "2023-10-01");
        assert_eq!(config.receivable_supplier, "Gestion Hazout Inc");
        assert!(config.excluded_suppliers.contains(&"VIDEOTRON".to_string()));
        assert_eq!(config.inputs.account_payables, "account_payables.xlsx");
        assert!(config.postprocess.command.is_none());
    }

    #[test]
    fn parse_overrides() {
        let input = r#"
cutoff_date = "2024-01-01"
receivable_supplier = "Holdback Mgmt Inc"
excluded_suppliers = ["AAA001"]

[inputs]
bank_balance = "bb.xlsx"

[output]
dir = "out"
stem = "AP_Report"

[postprocess]
command = "xlsm-convert {path}"
"#;
        let config = ReportConfig::from_toml(input).unwrap();
        assert_eq!(config.cutoff_date.to_string(), "2024-01-01");
        assert_eq!(config.receivable_supplier, "Holdback Mgmt Inc");
        assert_eq!(config.excluded_suppliers, vec!["AAA001".to_string()]);
        assert_eq!(config.inputs.bank_balance, "bb.xlsx");
        // Unspecified nested fields keep their defaults.
        assert_eq!(config.inputs.cash_management, "cash_management.xlsx");
        assert_eq!(config.output.stem, "AP_Report");
        assert_eq!(config.postprocess.command.as_deref(), Some("xlsm-convert {path}"));
    }

    #[test]
    fn reject_empty_receivable_supplier() {
        let err = ReportConfig::from_toml(r#"receivable_supplier = "  ""#).unwrap_err();
        assert!(err.to_string().contains("receivable_supplier"));
    }

    #[test]
    fn reject_bad_date() {
        let err = ReportConfig::from_toml(r#"cutoff_date = "not-a-date""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
