use std::path::Path;

use serde::Deserialize;

use crate::error::{AdsheetError, AdsheetResult};
use crate::types::DateRange;

/// Placeholder left in freshly copied configs; treated as "not configured".
pub const PLACEHOLDER_SPREADSHEET: &str = "YOUR_SPREADSHEET_URL";
pub const PLACEHOLDER_RECIPIENT: &str = "YOUR_EMAIL";

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `ADSHEET__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub bids: BidsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Destination workbook locator.
    #[serde(default)]
    pub spreadsheet: String,
    /// Who gets told the report is ready. No notification when unset.
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default = "default_headline_sheet")]
    pub headline_sheet: String,
    #[serde(default = "default_final_url_sheet")]
    pub final_url_sheet: String,
    /// 1-based row where the header row of the table is written.
    #[serde(default = "default_start_row")]
    pub start_row: usize,
    /// 1-based column of the segment-name column.
    #[serde(default = "default_start_col")]
    pub start_col: usize,
    #[serde(default = "default_min_impressions")]
    pub min_impressions: u64,
    #[serde(default)]
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BidsConfig {
    /// Source workbook locator holding the override sheet.
    #[serde(default)]
    pub spreadsheet: String,
    #[serde(default = "default_bids_sheet")]
    pub sheet: String,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub unknown_adjustment: UnknownAdjustmentPolicy,
}

/// What to do with an override row whose adjustment tag is neither
/// `FIXED` nor `RELATIVE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownAdjustmentPolicy {
    #[default]
    Reject,
    TreatAsRelative,
}

fn default_headline_sheet() -> String {
    "Headline".to_string()
}
fn default_final_url_sheet() -> String {
    "Final URL".to_string()
}
fn default_start_row() -> usize {
    5
}
fn default_start_col() -> usize {
    2
}
fn default_min_impressions() -> u64 {
    1
}
fn default_bids_sheet() -> String {
    "Bids".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            spreadsheet: String::new(),
            recipient: None,
            headline_sheet: default_headline_sheet(),
            final_url_sheet: default_final_url_sheet(),
            start_row: default_start_row(),
            start_col: default_start_col(),
            min_impressions: default_min_impressions(),
            date_range: DateRange::default(),
        }
    }
}

impl Default for BidsConfig {
    fn default() -> Self {
        Self {
            spreadsheet: String::new(),
            sheet: default_bids_sheet(),
            dry_run: false,
            unknown_adjustment: UnknownAdjustmentPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file and environment variables.
    /// Environment variables win over the file.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix("ADSHEET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        config.try_deserialize()
    }

    /// Fail fast on settings the segment report cannot run without.
    pub fn validate_report(&self) -> AdsheetResult<()> {
        check_spreadsheet("report.spreadsheet", &self.report.spreadsheet)?;
        if let Some(recipient) = &self.report.recipient {
            check_recipient(recipient)?;
        }
        if self.report.start_row < 4 {
            // Rows 1..=3 hold the account metadata block.
            return Err(AdsheetError::Config(format!(
                "report.start_row must be at least 4, got {}",
                self.report.start_row
            )));
        }
        if self.report.start_col == 0 {
            return Err(AdsheetError::Config(
                "report.start_col is 1-based and cannot be 0".into(),
            ));
        }
        if self.report.headline_sheet == self.report.final_url_sheet {
            return Err(AdsheetError::Config(format!(
                "headline and final URL reports cannot share sheet '{}'",
                self.report.headline_sheet
            )));
        }
        Ok(())
    }

    /// Fail fast on settings the bid override job cannot run without.
    pub fn validate_bids(&self) -> AdsheetResult<()> {
        check_spreadsheet("bids.spreadsheet", &self.bids.spreadsheet)?;
        if self.bids.sheet.trim().is_empty() {
            return Err(AdsheetError::Config("bids.sheet is empty".into()));
        }
        Ok(())
    }
}

fn check_spreadsheet(field: &str, value: &str) -> AdsheetResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AdsheetError::Config(format!("{field} is not set")));
    }
    if value == PLACEHOLDER_SPREADSHEET {
        return Err(AdsheetError::Config(format!(
            "{field} still holds the placeholder '{PLACEHOLDER_SPREADSHEET}'"
        )));
    }
    Ok(())
}

fn check_recipient(value: &str) -> AdsheetResult<()> {
    let value = value.trim();
    if value == PLACEHOLDER_RECIPIENT {
        return Err(AdsheetError::Config(format!(
            "report.recipient still holds the placeholder '{PLACEHOLDER_RECIPIENT}'"
        )));
    }
    if !value.contains('@') {
        return Err(AdsheetError::Config(format!(
            "report.recipient '{value}' is not an email address"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.report.spreadsheet = "reports.json".into();
        config.bids.spreadsheet = "bids.json".into();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.report.start_row, 5);
        assert_eq!(config.report.start_col, 2);
        assert_eq!(config.report.min_impressions, 1);
        assert_eq!(config.bids.sheet, "Bids");
        assert_eq!(config.bids.unknown_adjustment, UnknownAdjustmentPolicy::Reject);
        assert!(!config.bids.dry_run);
    }

    #[test]
    fn test_unset_destination_rejected() {
        let config = AppConfig::default();
        assert!(matches!(config.validate_report(), Err(AdsheetError::Config(_))));
        assert!(matches!(config.validate_bids(), Err(AdsheetError::Config(_))));
    }

    #[test]
    fn test_placeholders_rejected() {
        let mut config = configured();
        config.report.spreadsheet = PLACEHOLDER_SPREADSHEET.into();
        let err = config.validate_report().unwrap_err();
        assert!(err.to_string().contains("placeholder"));

        let mut config = configured();
        config.report.recipient = Some(PLACEHOLDER_RECIPIENT.into());
        assert!(config.validate_report().is_err());

        let mut config = configured();
        config.report.recipient = Some("not-an-address".into());
        assert!(config.validate_report().is_err());
    }

    #[test]
    fn test_valid_config_passes() {
        let mut config = configured();
        config.report.recipient = Some("ops@example.com".into());
        assert!(config.validate_report().is_ok());
        assert!(config.validate_bids().is_ok());
    }

    #[test]
    fn test_table_cannot_overlap_metadata() {
        let mut config = configured();
        config.report.start_row = 2;
        assert!(config.validate_report().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("adsheet-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("adsheet.toml");
        std::fs::write(
            &path,
            r#"
[report]
spreadsheet = "out.json"
start_row = 7
date_range = "last_30_days"

[bids]
spreadsheet = "in.json"
dry_run = true
unknown_adjustment = "treat_as_relative"
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.report.spreadsheet, "out.json");
        assert_eq!(config.report.start_row, 7);
        assert_eq!(config.report.date_range, DateRange::Last30Days);
        assert_eq!(config.report.headline_sheet, "Headline");
        assert!(config.bids.dry_run);
        assert_eq!(
            config.bids.unknown_adjustment,
            UnknownAdjustmentPolicy::TreatAsRelative
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_env_overrides_file() {
        // Keys here are not asserted by any other load test in this module.
        let dir = std::env::temp_dir().join(format!("adsheet-env-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("adsheet.toml");
        std::fs::write(
            &path,
            r#"
[report]
min_impressions = 3

[bids]
sheet = "FromFile"
"#,
        )
        .unwrap();

        std::env::set_var("ADSHEET__REPORT__MIN_IMPRESSIONS", "25");
        std::env::set_var("ADSHEET__BIDS__SHEET", "Overrides");
        let loaded = AppConfig::load(Some(path.as_path()));
        std::env::remove_var("ADSHEET__REPORT__MIN_IMPRESSIONS");
        std::env::remove_var("ADSHEET__BIDS__SHEET");

        let config = loaded.unwrap();
        assert_eq!(config.report.min_impressions, 25);
        assert_eq!(config.bids.sheet, "Overrides");
        std::fs::remove_dir_all(&dir).ok();
    }
}
