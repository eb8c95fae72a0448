//! `paudit run` / `paudit proof` / `paudit validate`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use printaudit_cli::load::{load_table, LoadError};
use printaudit_cli::render;
use printaudit_recon::export::{
    write_anonymous, write_mismatches, write_printed_only, write_proof, write_unprinted,
};
use printaudit_recon::model::{AuditInput, AuditResult};
use printaudit_recon::{AuditConfig, DrNumber, ReconError};

use crate::exit_codes::{
    recon_exit_code, EXIT_CONFIG_INVALID, EXIT_DISCREPANCIES, EXIT_ERROR, EXIT_INPUT_LOAD,
    EXIT_RUNTIME, EXIT_USAGE,
};
use crate::CliError;

/// Files shared by `run` and `proof`.
pub struct Sources {
    pub pos: PathBuf,
    pub printer: PathBuf,
    pub config: Option<PathBuf>,
}

pub struct RunOptions {
    pub json: bool,
    pub output: Option<PathBuf>,
    pub mismatch_csv: Option<PathBuf>,
    pub anonymous_csv: Option<PathBuf>,
    pub unprinted_csv: Option<PathBuf>,
    pub printed_only_csv: Option<PathBuf>,
    pub fail_on_discrepancy: bool,
}

fn audit_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn from_recon(err: ReconError) -> CliError {
    let hint = match &err {
        ReconError::MissingColumn { table, .. } => Some(format!(
            "map the column under [columns.{table}] in the config"
        )),
        ReconError::EmptyTable { .. } => Some("the file needs a header row".to_string()),
        _ => None,
    };
    CliError { code: recon_exit_code(&err), message: err.to_string(), hint }
}

fn from_load(err: LoadError) -> CliError {
    let hint = match &err {
        LoadError::UnsupportedFormat { .. } => {
            Some("export the sheet as CSV or TSV and pass that file".to_string())
        }
        _ => None,
    };
    CliError { code: EXIT_INPUT_LOAD, message: err.to_string(), hint }
}

fn json_err(e: serde_json::Error) -> CliError {
    audit_err(EXIT_ERROR, format!("JSON serialization error: {e}"))
}

fn write_err(e: io::Error) -> CliError {
    audit_err(EXIT_RUNTIME, format!("cannot write output: {e}"))
}

fn read_config(path: &Path) -> Result<AuditConfig, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        audit_err(EXIT_USAGE, format!("cannot read config {}: {e}", path.display()))
    })?;
    AuditConfig::from_toml(&config_str).map_err(from_recon)
}

/// Load config and both tables, then run the engine.
fn audit(sources: &Sources) -> Result<AuditResult, CliError> {
    let config = match &sources.config {
        Some(path) => read_config(path)?,
        None => AuditConfig::default(),
    };

    let input = AuditInput {
        pos: load_table(&sources.pos).map_err(from_load)?,
        printer: load_table(&sources.printer).map_err(from_load)?,
    };
    log::info!(
        "loaded {} pos rows from {}, {} printer rows from {}",
        input.pos.rows.len(),
        sources.pos.display(),
        input.printer.rows.len(),
        sources.printer.display(),
    );

    printaudit_recon::run(&config, &input).map_err(from_recon)
}

fn export_to(
    path: &Path,
    write: impl FnOnce(BufWriter<File>) -> Result<(), ReconError>,
) -> Result<(), CliError> {
    let file = File::create(path).map_err(|e| {
        audit_err(EXIT_RUNTIME, format!("cannot create {}: {e}", path.display()))
    })?;
    write(BufWriter::new(file)).map_err(from_recon)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

pub fn cmd_run(sources: Sources, opts: RunOptions) -> Result<(), CliError> {
    let result = audit(&sources)?;

    if opts.json || opts.output.is_some() {
        let json_str = serde_json::to_string_pretty(&result).map_err(json_err)?;

        if let Some(ref path) = opts.output {
            std::fs::write(path, &json_str).map_err(write_err)?;
            eprintln!("wrote {}", path.display());
        }
        if opts.json {
            println!("{json_str}");
        }
    }

    if !opts.json {
        print_sections(&result).map_err(write_err)?;
    }

    if let Some(ref path) = opts.mismatch_csv {
        export_to(path, |w| write_mismatches(w, &result.reconciliation.mismatched))?;
    }
    if let Some(ref path) = opts.anonymous_csv {
        export_to(path, |w| write_anonymous(w, &result.anonymous))?;
    }
    if let Some(ref path) = opts.unprinted_csv {
        export_to(path, |w| write_unprinted(w, &result.reconciliation.unprinted))?;
    }
    if let Some(ref path) = opts.printed_only_csv {
        export_to(path, |w| write_printed_only(w, &result.reconciliation.printed_only))?;
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{} billed invoices: {} matched, {} mismatched, {} unprinted, {} printed without invoice",
        s.billed_invoices, s.matched, s.mismatches, s.unprinted, s.printed_only,
    );
    eprintln!(
        "{} anonymous jobs, {} large mismatches need proof",
        s.anonymous_jobs, s.proof_candidates,
    );

    if opts.fail_on_discrepancy && s.unprinted + s.mismatches + s.printed_only > 0 {
        return Err(audit_err(EXIT_DISCREPANCIES, "discrepancies found"));
    }

    Ok(())
}

fn print_sections(result: &AuditResult) -> io::Result<()> {
    let stdout = io::stdout();
    let mut w = stdout.lock();
    let recon = &result.reconciliation;

    let sections = [
        ("Unprinted invoices", recon.unprinted.len(), render::unprinted_table(&recon.unprinted)),
        ("Page mismatches", recon.mismatched.len(), render::mismatch_table(&recon.mismatched)),
        (
            "Printed without invoice",
            recon.printed_only.len(),
            render::printed_only_table(&recon.printed_only),
        ),
        ("Anonymous prints", result.anonymous.len(), render::anonymous_table(&result.anonymous)),
    ];

    for (i, (title, count, table)) in sections.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        writeln!(w, "{title} ({count})")?;
        if *count > 0 {
            write!(w, "{table}")?;
        }
    }
    Ok(())
}

pub fn cmd_proof(
    sources: Sources,
    dr: Option<u64>,
    json: bool,
    csv: Option<&Path>,
) -> Result<(), CliError> {
    let result = audit(&sources)?;
    let stdout = io::stdout();
    let mut w = stdout.lock();

    match dr {
        Some(n) => {
            let rows = result.proof(DrNumber(n));
            if let Some(path) = csv {
                export_to(path, |w| write_proof(w, &rows))?;
            }
            if json {
                let json_str = serde_json::to_string_pretty(&rows).map_err(json_err)?;
                writeln!(w, "{json_str}").map_err(write_err)?;
            } else if rows.is_empty() {
                eprintln!("no printer jobs for DR{n}");
            } else {
                write!(w, "{}", render::proof_table(&rows)).map_err(write_err)?;
            }
        }
        None => {
            if json {
                let json_str = serde_json::to_string_pretty(&result.proof_candidates).map_err(json_err)?;
                writeln!(w, "{json_str}").map_err(write_err)?;
            } else if result.proof_candidates.is_empty() {
                eprintln!(
                    "no mismatches above {} pages",
                    result.meta.large_diff_threshold
                );
            } else {
                write!(w, "{}", render::candidates_table(&result.proof_candidates))
                    .map_err(write_err)?;
            }
        }
    }
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
        audit_err(EXIT_USAGE, format!("cannot read config {}: {e}", config_path.display()))
    })?;

    match AuditConfig::from_toml(&config_str) {
        Ok(config) => {
            eprintln!(
                "valid: prefix '{}', proof threshold {} pages, billing '{}' excluding {:?}",
                config.identifier.prefix,
                config.large_diff_threshold,
                config.items.include,
                config.items.exclude,
            );
            Ok(())
        }
        Err(e) => Err(audit_err(EXIT_CONFIG_INVALID, e.to_string())),
    }
}
