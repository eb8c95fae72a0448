use printaudit_recon::export::{write_anonymous, write_mismatches};
use printaudit_recon::model::{AuditBucket, AuditInput, AuditResult, Table};
use printaudit_recon::{run, AuditConfig, DrNumber, Pages};

const POS_HEADERS: &[&str] = &["Invoice No.", "Item Name", "Sales Qty", "Customer Name"];
const PRINTER_HEADERS: &[&str] = &["Job Name", "Printed Pages", "Owner", "Recorded Date/Time"];

fn audit(pos: &[&[&str]], printer: &[&[&str]]) -> AuditResult {
    let input = AuditInput {
        pos: Table::from_rows(POS_HEADERS, pos),
        printer: Table::from_rows(PRINTER_HEADERS, printer),
    };
    run(&AuditConfig::default(), &input).unwrap()
}

fn dr100_with_printed(pages: &str) -> AuditResult {
    audit(
        &[&["DR100", "DIGITAL PRINT 1 SIDE", "5", "Acme"]],
        &[&["Job DR100", pages, "ann", "2025-03-01 09:00:00"]],
    )
}

// -------------------------------------------------------------------------
// DR100 scenario
// -------------------------------------------------------------------------

#[test]
fn exact_print_is_matched() {
    let result = dr100_with_printed("5");
    let recon = &result.reconciliation;
    assert_eq!(recon.matched.len(), 1);
    assert!(recon.mismatched.is_empty());
    assert!(recon.unprinted.is_empty());
    assert_eq!(recon.matched[0].diff, Some(Pages::ZERO));
    assert_eq!(recon.matched[0].bucket, AuditBucket::Matched);
}

#[test]
fn small_overprint_is_mismatch_without_proof() {
    let result = dr100_with_printed("8");
    let recon = &result.reconciliation;
    assert_eq!(recon.mismatched.len(), 1);
    assert_eq!(recon.mismatched[0].diff, Some(Pages::from_whole(3)));
    assert!(result.proof_candidates.is_empty());
}

#[test]
fn large_overprint_is_proof_candidate() {
    let result = dr100_with_printed("20");
    let recon = &result.reconciliation;
    assert_eq!(recon.mismatched.len(), 1);
    assert_eq!(recon.mismatched[0].diff, Some(Pages::from_whole(15)));

    assert_eq!(result.proof_candidates.len(), 1);
    let candidate = &result.proof_candidates[0];
    assert_eq!(candidate.dr, DrNumber(100));
    assert_eq!(candidate.label, "DR100 - Acme (Diff: 15)");

    let proof = result.proof(candidate.dr);
    assert_eq!(proof.len(), 1);
    assert_eq!(proof[0].job_name, "Job DR100");
    assert_eq!(proof[0].printed_pages, Pages::from_whole(20));
    assert_eq!(proof[0].owner, "ann");
    assert_eq!(proof[0].recorded_at.as_str(), "2025-03-01 09:00:00");
}

// -------------------------------------------------------------------------
// Anonymous prints
// -------------------------------------------------------------------------

#[test]
fn anonymous_banner_summed() {
    let result = audit(
        &[],
        &[
            &["Banner A", "5", "Alice", "2025-03-01 10:00:00"],
            &["Banner A", "7", "Alice", "2025-03-01 16:20:00"],
        ],
    );
    assert_eq!(result.anonymous.len(), 1);
    let group = &result.anonymous[0];
    assert_eq!(group.job_name, "Banner A");
    assert_eq!(group.artist, "Alice");
    assert_eq!(group.printed_pages, Pages::from_whole(12));
    assert_eq!(group.recorded_at.as_str(), "2025-03-01 16:20:00");
    assert!(result.reconciliation.is_empty());
}

// -------------------------------------------------------------------------
// Mixed day
// -------------------------------------------------------------------------

#[test]
fn full_day_partition() {
    let result = audit(
        &[
            &["DR15322", "DIGITAL PRINT 1 SIDE", "1,200", "Acme"],
            &["DR15323", "DIGITAL PRINT 2 SIDES", "10", "Beta"],
            &["DR15323", "DIGITAL PRINT STICKER", "40", "Beta"],
            &["DR15324", "DIGITAL PRINT PROOF", "2", "Gamma"],
            &["DR15325", "DIGITAL PRINT 1 SIDE", "3", "Delta"],
            &["INV-999", "DIGITAL PRINT 1 SIDE", "6", "Walk-in"],
            &["DR15326", "LARGE FORMAT", "1", "Eps"],
        ],
        &[
            &["DR 15322 brochure", "600", "ann", "2025-03-01 09:00:00"],
            &["DR15322 brochure", "600", "ann", "2025-03-01 09:30:00"],
            &["dr15323", "18", "bob", "2025-03-01 10:00:00"],
            &["DR15330 test", "4", "bob", "2025-03-01 11:00:00"],
            &["Banner A", "oops", "Alice", "2025-03-01 12:00:00"],
            &["Flyer", "25", "Bob", "2025-03-01 13:00:00"],
        ],
    );
    let recon = &result.reconciliation;

    // 15322 matched at 1200, 15323 expects 20 but printed 18
    assert_eq!(recon.matched.len(), 1);
    assert_eq!(recon.matched[0].dr, Some(DrNumber(15322)));
    assert_eq!(recon.mismatched.len(), 1);
    assert_eq!(recon.mismatched[0].expected_pages, Some(Pages::from_whole(20)));
    assert_eq!(recon.mismatched[0].diff, Some(Pages::from_whole(-2)));

    // 15325 never printed; INV-999 has no DR number and lands here too
    assert_eq!(recon.unprinted.len(), 2);
    assert_eq!(recon.unprinted[0].dr, Some(DrNumber(15325)));
    assert_eq!(recon.unprinted[1].dr, None);
    assert_eq!(recon.unprinted[1].invoice.as_deref(), Some("INV-999"));

    assert_eq!(recon.printed_only.len(), 1);
    assert_eq!(recon.printed_only[0].dr, Some(DrNumber(15330)));

    // Flyer (25) sorts ahead of Banner A (0 after coercion)
    assert_eq!(result.anonymous.len(), 2);
    assert_eq!(result.anonymous[0].job_name, "Flyer");
    assert_eq!(result.anonymous[1].printed_pages, Pages::ZERO);

    assert_eq!(result.summary.billed_invoices, 4);
    assert_eq!(result.summary.anonymous_jobs, 2);
}

#[test]
fn exports_from_run() {
    let result = audit(
        &[&["DR7", "DIGITAL PRINT 2 SIDES", "4", "Acme"]],
        &[
            &["DR7", "9", "ann", "2025-03-01 09:00:00"],
            &["Poster", "3", "Alice", "2025-03-01 10:00:00"],
        ],
    );

    let mut mismatches = Vec::new();
    write_mismatches(&mut mismatches, &result.reconciliation.mismatched).unwrap();
    assert_eq!(
        String::from_utf8(mismatches).unwrap(),
        "Invoice No.,Customer Name,Expected Pages,Printed Pages,Diff\nDR7,Acme,8,9,1\n"
    );

    let mut anonymous = Vec::new();
    write_anonymous(&mut anonymous, &result.anonymous).unwrap();
    assert_eq!(
        String::from_utf8(anonymous).unwrap(),
        "Job Name,Artist Name,Printed Pages,Recorded Date/Time\nPoster,Alice,3,2025-03-01 10:00:00\n"
    );
}

#[test]
fn custom_columns_and_prefix() {
    let config = AuditConfig::from_toml(
        r#"
[identifier]
prefix = "JOB#"

[columns.pos]
invoice = "Receipt"
item = "Product"
quantity = "Qty"
customer = "Client"

[columns.printer]
job_name = "Document"
pages = "Sheets"
owner = "User"
recorded_at = "Time"
"#,
    )
    .unwrap();

    let input = AuditInput {
        pos: Table::from_rows(
            &["Receipt", "Product", "Qty", "Client"],
            &[&["JOB#12", "Digital Print", "2", "Acme"]],
        ),
        printer: Table::from_rows(
            &["Document", "Sheets", "User", "Time"],
            &[&["job# 12.pdf", "2", "ann", "2025-01-01"]],
        ),
    };
    let result = run(&config, &input).unwrap();
    assert_eq!(result.reconciliation.matched.len(), 1);
    assert_eq!(result.reconciliation.matched[0].dr, Some(DrNumber(12)));
}
