// Ageing CLI - receivables ageing runs from a TOML config

mod exit_codes;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "ageing")]
#[command(about = "Receivables ageing with reversal-chain lineage")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an ageing pass from a TOML config file
    #[command(after_help = "\
Examples:
  ageing run march.ageing.toml
  ageing run march.ageing.toml --reference-date 2024-03-31
  ageing run march.ageing.toml --json
  ageing run march.ageing.toml --xlsx System_Ageing_Output.xlsx
  ageing run march.ageing.toml --csv-dir out/ --output ageing.json")]
    Run {
        /// Path to the .ageing.toml config file
        config: PathBuf,

        /// Date overdue days are measured at (YYYY-MM-DD). Overrides the config; defaults to today.
        #[arg(long, value_name = "DATE")]
        reference_date: Option<String>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the Ageing / Sales Reversal workbook (overrides the config)
        #[arg(long)]
        xlsx: Option<PathBuf>,

        /// Write ageing.csv and sales_reversal.csv into this directory (overrides the config)
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },

    /// Validate an ageing config without running
    #[command(after_help = "\
Examples:
  ageing validate march.ageing.toml")]
    Validate {
        /// Path to the .ageing.toml config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  ageing-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            reference_date,
            json,
            output,
            xlsx,
            csv_dir,
        } => run::cmd_run(run::RunArgs {
            config,
            reference_date,
            json,
            output,
            xlsx,
            csv_dir,
        }),
        Commands::Validate { config } => run::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
