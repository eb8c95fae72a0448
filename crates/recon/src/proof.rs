//! Proof lookup: the raw printer-log rows behind a mismatch.

use crate::model::{DrNumber, PrinterRecord, ProofCandidate, ProofRow, ReconRow};
use crate::pages::Pages;

/// Mismatches whose |diff| is strictly above `threshold`, in input order.
pub fn proof_candidates(mismatched: &[ReconRow], threshold: Pages) -> Vec<ProofCandidate> {
    mismatched
        .iter()
        .filter_map(|row| {
            let dr = row.dr?;
            let diff = row.diff?;
            (diff.abs() > threshold).then(|| ProofCandidate {
                dr,
                label: format!(
                    "{} - {} (Diff: {diff})",
                    row.invoice.as_deref().unwrap_or_default(),
                    row.customer.as_deref().unwrap_or_default(),
                ),
                diff,
            })
        })
        .collect()
}

/// Identified printer rows for `dr`, projected for display, in input order.
pub fn lookup_proof(identified: &[PrinterRecord], dr: DrNumber) -> Vec<ProofRow> {
    identified
        .iter()
        .filter(|r| r.dr == Some(dr))
        .map(|r| ProofRow {
            recorded_at: r.recorded_at.clone(),
            job_name: r.job_name.clone(),
            printed_pages: r.printed_pages,
            owner: r.owner.clone(),
            extra: r.extra.clone(),
        })
        .collect()
}
