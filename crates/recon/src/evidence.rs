use std::collections::HashMap;

use crate::model::{AuditSummary, Reconciliation};

/// Headline counts for one audit run.
pub fn compute_summary(
    billed_invoices: usize,
    reconciliation: &Reconciliation,
    anonymous_jobs: usize,
    proof_candidates: usize,
) -> AuditSummary {
    let mut bucket_counts: HashMap<String, usize> = HashMap::new();
    for row in reconciliation.rows() {
        *bucket_counts.entry(row.bucket.to_string()).or_insert(0) += 1;
    }

    AuditSummary {
        billed_invoices,
        unprinted: reconciliation.unprinted.len(),
        matched: reconciliation.matched.len(),
        mismatches: reconciliation.mismatched.len(),
        printed_only: reconciliation.printed_only.len(),
        anonymous_jobs,
        proof_candidates,
        bucket_counts,
    }
}
