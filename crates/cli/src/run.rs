//! `ageing run` and `ageing validate`: config-driven ageing passes.

use std::path::{Path, PathBuf};

use ageing_engine::config::parse_reference_date;
use ageing_engine::AgeingConfig;
use ageing_io::{ExportError, LoadError};
use chrono::NaiveDate;
use tracing::info;

use crate::exit_codes::{EXIT_AGEING_INPUT, EXIT_AGEING_INVALID_CONFIG, EXIT_AGEING_OUTPUT};
use crate::CliError;

pub struct RunArgs {
    pub config: PathBuf,
    pub reference_date: Option<String>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub xlsx: Option<PathBuf>,
    pub csv_dir: Option<PathBuf>,
}

fn config_err(msg: impl Into<String>) -> CliError {
    CliError::new(EXIT_AGEING_INVALID_CONFIG, msg)
}

fn load_err(e: LoadError) -> CliError {
    let hint = match &e {
        LoadError::MissingColumn { .. } => Some("check header_row for this input in the config"),
        LoadError::SheetNotFound { .. } => Some("set inputs.<table>.sheet to one of the available sheets"),
        _ => None,
    };
    let err = CliError::new(EXIT_AGEING_INPUT, e.to_string());
    match hint {
        Some(h) => err.with_hint(h),
        None => err,
    }
}

fn export_err(e: ExportError) -> CliError {
    CliError::new(EXIT_AGEING_OUTPUT, e.to_string())
}

fn read_config(config_path: &Path) -> Result<AgeingConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| config_err(format!("cannot read config {}: {e}", config_path.display())))?;
    AgeingConfig::from_toml(&config_str).map_err(|e| config_err(e.to_string()))
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!("config ok: {}", config.name);
    Ok(())
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = read_config(&args.config)?;

    // Resolve file paths relative to config file's directory
    let base_dir = args
        .config
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let reference_date = match args.reference_date.as_deref() {
        Some(raw) => parse_reference_date(raw)
            .map_err(|e| CliError::args(e.to_string()).with_hint("use YYYY-MM-DD, e.g. 2024-03-31"))?,
        None => config.reference_date_or(today()),
    };

    let input = ageing_io::load_input(&config, &base_dir).map_err(load_err)?;
    info!(
        name = %config.name,
        %reference_date,
        ledger = input.ledger.len(),
        reversal_log = input.reversal_log.len(),
        manual = input.manual_reversals.len(),
        "inputs loaded"
    );

    let result = ageing_engine::run(&input, reference_date);

    // Outputs: CLI flags win over config, config paths are config-relative
    let xlsx = args
        .xlsx
        .or_else(|| config.output.xlsx.as_ref().map(|p| base_dir.join(p)));
    let csv_dir = args
        .csv_dir
        .or_else(|| config.output.csv_dir.as_ref().map(|p| base_dir.join(p)));
    let json_file = args
        .output
        .or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));

    if let Some(ref path) = xlsx {
        ageing_io::write_xlsx(&result, path).map_err(export_err)?;
        eprintln!("wrote {}", path.display());
    }
    if let Some(ref dir) = csv_dir {
        ageing_io::write_csv_dir(&result, dir).map_err(export_err)?;
        eprintln!("wrote {}", dir.display());
    }
    if let Some(ref path) = json_file {
        ageing_io::json::export(&result, path).map_err(export_err)?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        let json_str = ageing_io::json::to_string(&result)
            .map_err(|e| CliError::new(EXIT_AGEING_OUTPUT, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "ageing at {}: {} invoices, {} chain-adjusted, {} unknown, {} not recoverable, provision {}",
        result.meta.reference_date,
        s.invoices,
        s.chain_adjusted,
        s.unknown_bucket,
        s.not_recoverable,
        s.total_provision.round_dp(2),
    );
    if s.reversals > 0 {
        eprintln!(
            "reversals: {} rows, {} with unknown origin date",
            s.reversals, s.unknown_reversal_bucket,
        );
    }
    if !s.incidental_roots.is_empty() {
        eprintln!(
            "warning: {} reversal cycle(s) without a root; aged from {}",
            s.incidental_roots.len(),
            s.incidental_roots.join(", "),
        );
    }

    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
