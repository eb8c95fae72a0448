// paudit - reconcile POS print billing against printer job logs

mod audit;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};

use audit::{RunOptions, Sources};
use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "paudit")]
#[command(about = "Audit billed print jobs against what the printers actually printed")]
#[command(version)]
struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// POS sales export (CSV/TSV)
    #[arg(long, env = "PAUDIT_POS")]
    pos: PathBuf,

    /// Printer job log export (CSV/TSV)
    #[arg(long, env = "PAUDIT_PRINTER")]
    printer: PathBuf,

    /// Audit config TOML (defaults apply when omitted)
    #[arg(long, env = "PAUDIT_CONFIG")]
    config: Option<PathBuf>,
}

impl From<SourceArgs> for Sources {
    fn from(args: SourceArgs) -> Self {
        Sources { pos: args.pos, printer: args.printer, config: args.config }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one day's POS export against the printer log
    #[command(after_help = "\
Examples:
  paudit run --pos sales.csv --printer jobs.csv
  paudit run --pos sales.csv --printer jobs.csv --json
  paudit run --pos sales.csv --printer jobs.csv --mismatch-csv audit_mismatches.csv
  paudit run --pos sales.csv --printer jobs.csv --unprinted-csv --printed-only-csv
  paudit run --pos sales.csv --printer jobs.csv --config shop.toml --fail-on-discrepancy")]
    Run {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output JSON to stdout instead of text tables
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Export page mismatches as CSV
        #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "audit_mismatches.csv")]
        mismatch_csv: Option<PathBuf>,

        /// Export anonymous prints as CSV
        #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "anonymous_prints.csv")]
        anonymous_csv: Option<PathBuf>,

        /// Export unprinted invoices as CSV
        #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "unprinted_invoices.csv")]
        unprinted_csv: Option<PathBuf>,

        /// Export jobs printed without an invoice as CSV
        #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "printed_without_invoice.csv")]
        printed_only_csv: Option<PathBuf>,

        /// Exit 6 when anything is unprinted, mismatched, or printed without an invoice
        #[arg(long)]
        fail_on_discrepancy: bool,
    },

    /// List large mismatches, or show the printer jobs behind one DR number
    #[command(after_help = "\
Examples:
  paudit proof --pos sales.csv --printer jobs.csv
  paudit proof --pos sales.csv --printer jobs.csv --dr 15322
  paudit proof --pos sales.csv --printer jobs.csv --dr 15322 --csv proof_15322.csv")]
    Proof {
        #[command(flatten)]
        sources: SourceArgs,

        /// DR number to break down
        #[arg(long)]
        dr: Option<u64>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Also write the DR's printer jobs to a CSV file
        #[arg(long, value_name = "FILE", requires = "dr")]
        csv: Option<PathBuf>,
    },

    /// Validate an audit config without running
    #[command(after_help = "\
Examples:
  paudit validate shop.toml")]
    Validate {
        /// Path to the audit config TOML
        config: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            sources,
            json,
            output,
            mismatch_csv,
            anonymous_csv,
            unprinted_csv,
            printed_only_csv,
            fail_on_discrepancy,
        } => audit::cmd_run(
            sources.into(),
            RunOptions {
                json,
                output,
                mismatch_csv,
                anonymous_csv,
                unprinted_csv,
                printed_only_csv,
                fail_on_discrepancy,
            },
        ),
        Commands::Proof { sources, dr, json, csv } => {
            audit::cmd_proof(sources.into(), dr, json, csv.as_deref())
        }
        Commands::Validate { config } => audit::cmd_validate(config),
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
