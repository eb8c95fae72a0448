use crate::matcher::join_on_identifier;
use crate::model::{
    AuditBucket, JoinOutput, PosGroup, PrinterGroup, Provenance, ReconRow, Reconciliation,
};

/// Sort a join into unprinted / matched / mismatched / printed-only.
///
/// Matched means the diff is exactly zero; page totals are exact, so no
/// tolerance is applied.
pub fn classify(join: &JoinOutput) -> Reconciliation {
    let mut out = Reconciliation::default();

    for pair in &join.both {
        let bucket = if pair.diff.is_zero() {
            AuditBucket::Matched
        } else {
            AuditBucket::Mismatched
        };
        let row = ReconRow {
            bucket,
            provenance: Provenance::Both,
            dr: pair.pos.dr,
            invoice: Some(pair.pos.invoice.clone()),
            customer: Some(pair.pos.customer.clone()),
            expected_pages: Some(pair.pos.expected_pages),
            printed_pages: Some(pair.printer.printed_pages),
            diff: Some(pair.diff),
        };
        match bucket {
            AuditBucket::Matched => out.matched.push(row),
            _ => out.mismatched.push(row),
        }
    }

    for group in &join.pos_only {
        out.unprinted.push(ReconRow {
            bucket: AuditBucket::Unprinted,
            provenance: Provenance::PosOnly,
            dr: group.dr,
            invoice: Some(group.invoice.clone()),
            customer: Some(group.customer.clone()),
            expected_pages: Some(group.expected_pages),
            printed_pages: None,
            diff: None,
        });
    }

    for group in &join.printer_only {
        out.printed_only.push(ReconRow {
            bucket: AuditBucket::PrintedOnly,
            provenance: Provenance::PrinterOnly,
            dr: Some(group.dr),
            invoice: None,
            customer: None,
            expected_pages: None,
            printed_pages: Some(group.printed_pages),
            diff: None,
        });
    }

    out
}

/// Join + classify in one step.
pub fn reconcile(pos: &[PosGroup], printed: &[PrinterGroup]) -> Reconciliation {
    classify(&join_on_identifier(pos, printed))
}
