use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AgeingError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// An ageing run described in TOML (`*.ageing.toml`).
#[derive(Debug, Deserialize)]
pub struct AgeingConfig {
    pub name: String,
    /// Date overdue days are measured at. Defaults to today when absent.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
    /// Read ambiguous numeric dates (`03/04/2024`) as day-first.
    #[serde(default)]
    pub day_first: bool,
    pub inputs: InputsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct InputsConfig {
    pub ledger: SourceConfig,
    #[serde(default)]
    pub recoverability: Option<SourceConfig>,
    #[serde(default)]
    pub reversal_log: Option<SourceConfig>,
    #[serde(default)]
    pub manual_reversals: Option<SourceConfig>,
}

/// One tabular source: a CSV file, or a sheet of a workbook.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    /// Worksheet name; the first sheet when absent. Workbooks only.
    #[serde(default)]
    pub sheet: Option<String>,
    /// 1-based row holding the column headers. Rows above it are skipped.
    #[serde(default = "default_header_row")]
    pub header_row: usize,
}

fn default_header_row() -> usize {
    1
}

impl SourceConfig {
    pub fn is_workbook(&self) -> bool {
        let lower = self.file.to_ascii_lowercase();
        [".xlsx", ".xlsm", ".xlsb", ".xls", ".ods"]
            .iter()
            .any(|ext| lower.ends_with(ext))
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub xlsx: Option<String>,
    #[serde(default)]
    pub json: Option<String>,
    /// Directory receiving `ageing.csv` and `sales_reversal.csv`.
    #[serde(default)]
    pub csv_dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AgeingConfig {
    pub fn from_toml(input: &str) -> Result<Self, AgeingError> {
        let config: AgeingConfig =
            toml::from_str(input).map_err(|e| AgeingError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AgeingError> {
        let sources = [
            ("ledger", Some(&self.inputs.ledger)),
            ("recoverability", self.inputs.recoverability.as_ref()),
            ("reversal_log", self.inputs.reversal_log.as_ref()),
            ("manual_reversals", self.inputs.manual_reversals.as_ref()),
        ];

        for (name, source) in sources {
            let Some(source) = source else { continue };
            if source.file.trim().is_empty() {
                return Err(AgeingError::ConfigValidation(format!(
                    "inputs.{name}: file must not be empty"
                )));
            }
            if source.header_row == 0 {
                return Err(AgeingError::ConfigValidation(format!(
                    "inputs.{name}: header_row is 1-based, got 0"
                )));
            }
            if source.sheet.is_some() && !source.is_workbook() {
                return Err(AgeingError::ConfigValidation(format!(
                    "inputs.{name}: sheet is only valid for workbook files, got '{}'",
                    source.file
                )));
            }
        }

        if let Some(ref xlsx) = self.output.xlsx {
            if !xlsx.to_ascii_lowercase().ends_with(".xlsx") {
                return Err(AgeingError::ConfigValidation(format!(
                    "output.xlsx must end in .xlsx, got '{xlsx}'"
                )));
            }
        }

        Ok(())
    }

    /// The configured reference date, else `today`.
    pub fn reference_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.reference_date.unwrap_or(today)
    }
}

/// Parse a `YYYY-MM-DD` reference date from the command line.
pub fn parse_reference_date(raw: &str) -> Result<NaiveDate, AgeingError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AgeingError::ReferenceDate(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
