// dealmap CLI - deal/company reconciliation from CSV or JSON exports

mod exit_codes;
mod recon;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "dealmap")]
#[command(about = "Link CRM deals to companies and report pipeline metrics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a deals export against a companies export
    #[command(after_help = "\
Examples:
  dealmap run --deals deals.csv --companies companies.csv
  dealmap run --deals deals.json --companies companies.json --json
  dealmap run --deals deals.csv --companies companies.csv --config dealmap.toml
  dealmap run --deals deals.csv --companies companies.csv --search acme --output result.json")]
    Run(recon::RunArgs),

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  dealmap validate dealmap.toml")]
    Validate {
        /// Path to the TOML config file
        config: std::path::PathBuf,
    },
}

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version come through here too
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS });
        }
    };

    let result = match cli.command {
        Commands::Run(args) => {
            init_logging(args.verbose);
            recon::cmd_run(args)
        }
        Commands::Validate { config } => {
            init_logging(false);
            recon::cmd_validate(config)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}
