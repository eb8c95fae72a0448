use crate::classify::reconcile;
use crate::config::AuditConfig;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::identifier::IdentifierPattern;
use crate::model::{AuditInput, AuditMeta, AuditResult};
use crate::pages::Pages;
use crate::pos::normalize_pos;
use crate::printer::normalize_printer;
use crate::proof::proof_candidates;

/// Run the audit per config. Returns all result sets + summary.
///
/// Either table failing to normalize (missing header row or column) aborts
/// the run; bad cells inside a table never do.
pub fn run(config: &AuditConfig, input: &AuditInput) -> Result<AuditResult, ReconError> {
    config.validate()?;
    let pattern = IdentifierPattern::from_config(&config.identifier)?;

    let pos_groups = normalize_pos(&input.pos, config, &pattern)?;
    let printer_log = normalize_printer(&input.printer, config, &pattern)?;

    let printed_groups = printer_log.printed_groups();
    let anonymous = printer_log.anonymous_summary();

    let reconciliation = reconcile(&pos_groups, &printed_groups);

    // validate() guarantees finite and non-negative; None means out of range
    let candidates = match Pages::from_f64(config.large_diff_threshold) {
        Some(threshold) => proof_candidates(&reconciliation.mismatched, threshold),
        None => Vec::new(),
    };

    let summary = compute_summary(pos_groups.len(), &reconciliation, anonymous.len(), candidates.len());

    log::info!(
        "audit: {} billed, {} matched, {} mismatched, {} unprinted, {} printed-only, {} anonymous",
        summary.billed_invoices,
        summary.matched,
        summary.mismatches,
        summary.unprinted,
        summary.printed_only,
        summary.anonymous_jobs,
    );

    Ok(AuditResult {
        meta: AuditMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            large_diff_threshold: config.large_diff_threshold,
            pos_rows: input.pos.rows.len(),
            printer_rows: input.printer.rows.len(),
        },
        summary,
        reconciliation,
        anonymous,
        proof_candidates: candidates,
        identified: printer_log.identified,
    })
}
