//! Printer-log normalizer: identified vs anonymous jobs.

use std::collections::BTreeMap;

use crate::aggregate::{aggregate_printed, summarize_anonymous};
use crate::config::AuditConfig;
use crate::error::ReconError;
use crate::identifier::IdentifierPattern;
use crate::model::{cell, AnonymousGroup, PrinterGroup, PrinterRecord, RecordedAt, Table, TableKind};
use crate::pages::Pages;

/// Printer records split by whether the job name carries a DR number.
/// Both halves keep input order.
#[derive(Debug, Clone, Default)]
pub struct PrinterLog {
    pub identified: Vec<PrinterRecord>,
    pub anonymous: Vec<PrinterRecord>,
}

impl PrinterLog {
    pub fn partition(records: Vec<PrinterRecord>) -> Self {
        let (identified, anonymous): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|r| r.dr.is_some());
        Self {
            identified,
            anonymous,
        }
    }

    /// Printed pages per DR number.
    pub fn printed_groups(&self) -> Vec<PrinterGroup> {
        aggregate_printed(&self.identified)
    }

    /// Anonymous jobs per (job name, owner), largest first.
    pub fn anonymous_summary(&self) -> Vec<AnonymousGroup> {
        summarize_anonymous(&self.anonymous)
    }

    pub fn len(&self) -> usize {
        self.identified.len() + self.anonymous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read every printer-log row. Printed pages are coerced (unparseable → 0);
/// columns outside the mapping are kept in `extra`.
pub fn load_printer_records(
    table: &Table,
    config: &AuditConfig,
    pattern: &IdentifierPattern,
) -> Result<Vec<PrinterRecord>, ReconError> {
    let col = &config.columns.printer;
    let job_idx = table.require_column(TableKind::Printer, &col.job_name)?;
    let pages_idx = table.require_column(TableKind::Printer, &col.pages)?;
    let owner_idx = table.require_column(TableKind::Printer, &col.owner)?;
    let recorded_idx = table.require_column(TableKind::Printer, &col.recorded_at)?;
    let mapped = [job_idx, pages_idx, owner_idx, recorded_idx];

    let records = table
        .rows
        .iter()
        .map(|row| {
            let job_name = cell(row, job_idx);

            let extra: BTreeMap<String, String> = table
                .headers
                .iter()
                .enumerate()
                .filter(|(i, _)| !mapped.contains(i))
                .map(|(i, h)| (h.trim().to_string(), cell(row, i).to_string()))
                .collect();

            PrinterRecord {
                dr: pattern.extract(job_name),
                job_name: job_name.to_string(),
                printed_pages: Pages::coerce(cell(row, pages_idx)),
                owner: cell(row, owner_idx).to_string(),
                recorded_at: RecordedAt::parse(cell(row, recorded_idx)),
                extra,
            }
        })
        .collect();

    Ok(records)
}

/// Printer table → identified / anonymous split.
pub fn normalize_printer(
    table: &Table,
    config: &AuditConfig,
    pattern: &IdentifierPattern,
) -> Result<PrinterLog, ReconError> {
    let printer_log = PrinterLog::partition(load_printer_records(table, config, pattern)?);
    log::debug!(
        "printer: {} identified job(s), {} anonymous job(s)",
        printer_log.identified.len(),
        printer_log.anonymous.len()
    );
    Ok(printer_log)
}
