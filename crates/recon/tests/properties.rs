// Property-based tests for the audit engine.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::BTreeSet;

use proptest::prelude::*;
use printaudit_recon::identifier::IdentifierPattern;
use printaudit_recon::model::{AuditInput, DrNumber, Table};
use printaudit_recon::{reconcile, run, AuditConfig, Pages};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Invoice / job text: usually carries a DR number from a small pool so
/// keys collide, sometimes has none.
fn arb_reference() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => (0u64..12, prop::bool::ANY).prop_map(|(n, spaced)| {
            if spaced { format!("DR {n}") } else { format!("DR{n}") }
        }),
        1 => (0u64..12).prop_map(|n| format!("Job dr{n} reprint")),
        1 => r"[A-Z]{3}-[0-9]{1,4}",
    ]
}

fn arb_item() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => Just("DIGITAL PRINT 1 SIDE".to_string()),
        2 => Just("DIGITAL PRINT 2 SIDES".to_string()),
        1 => Just("DIGITAL PRINT PROOF".to_string()),
        1 => Just("Digital Print Sticker".to_string()),
        1 => Just("LAMINATION".to_string()),
    ]
}

/// Numeric cell: mostly integers, sometimes comma-grouped, text or empty.
fn arb_count() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (0u32..500).prop_map(|n| n.to_string()),
        1 => (1u32..9, 0u32..1000).prop_map(|(a, b)| format!("{a},{b:03}")),
        1 => r"[a-z]{1,5}",
        1 => Just(String::new()),
    ]
}

fn arb_pos_rows() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        (arb_reference(), arb_item(), arb_count(), r"[A-Z][a-z]{2,8}")
            .prop_map(|(inv, item, qty, cust)| vec![inv, item, qty, cust]),
        0..30,
    )
}

fn arb_printer_rows() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        (
            prop_oneof![2 => arb_reference(), 1 => r"(Banner|Flyer|Poster) [A-C]"],
            arb_count(),
            prop_oneof![Just("Alice".to_string()), Just("Bob".to_string())],
            (1u32..28, 0u32..24).prop_map(|(d, h)| format!("2025-03-{d:02} {h:02}:00:00")),
        )
            .prop_map(|(job, pages, owner, at)| vec![job, pages, owner, at]),
        0..30,
    )
}

fn input(pos: Vec<Vec<String>>, printer: Vec<Vec<String>>) -> AuditInput {
    let headers = |h: &[&str]| h.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    AuditInput {
        pos: Table::new(
            headers(&["Invoice No.", "Item Name", "Sales Qty", "Customer Name"]),
            pos,
        ),
        printer: Table::new(
            headers(&["Job Name", "Printed Pages", "Owner", "Recorded Date/Time"]),
            printer,
        ),
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// Every distinct key lands in exactly one bucket.
    #[test]
    fn partition_is_complete(pos in arb_pos_rows(), printer in arb_printer_rows()) {
        let data = input(pos, printer);
        let config = AuditConfig::default();
        let result = run(&config, &data).unwrap();
        let recon = &result.reconciliation;

        let pattern = IdentifierPattern::from_config(&config.identifier).unwrap();
        let mut keys: BTreeSet<Option<DrNumber>> = BTreeSet::new();
        for row in &data.pos.rows {
            if config.items.is_billable_print(&row[1]) {
                keys.insert(pattern.extract(&row[0]));
            }
        }
        for row in &data.printer.rows {
            if let Some(dr) = pattern.extract(&row[0]) {
                keys.insert(Some(dr));
            }
        }

        prop_assert_eq!(recon.len(), keys.len());
        let bucketed: BTreeSet<Option<DrNumber>> = recon.rows().map(|r| r.dr).collect();
        prop_assert_eq!(bucketed, keys);
    }

    /// Proofs and stickers never reach the expected totals.
    #[test]
    fn excluded_items_never_counted(pos in arb_pos_rows()) {
        let data = input(pos, vec![]);
        let result = run(&AuditConfig::default(), &data).unwrap();

        let expected: Pages = result
            .reconciliation
            .unprinted
            .iter()
            .filter_map(|r| r.expected_pages)
            .sum();

        let billable: Pages = data
            .pos
            .rows
            .iter()
            .filter(|r| {
                let item = r[1].to_lowercase();
                item.contains("digital print") && !item.contains("proof") && !item.contains("sticker")
            })
            .map(|r| {
                let qty = Pages::coerce(&r[2]);
                if r[1].to_lowercase().contains("2 sides") { qty.doubled() } else { qty }
            })
            .sum();

        prop_assert_eq!(expected, billable);
    }

    /// Matched rows have a zero diff, mismatched rows never do.
    #[test]
    fn diff_sign_matches_bucket(pos in arb_pos_rows(), printer in arb_printer_rows()) {
        let result = run(&AuditConfig::default(), &input(pos, printer)).unwrap();
        let recon = &result.reconciliation;
        for row in &recon.matched {
            prop_assert_eq!(row.diff, Some(Pages::ZERO));
        }
        for row in &recon.mismatched {
            let diff = row.diff.unwrap();
            prop_assert!(!diff.is_zero());
            prop_assert_eq!(Some(diff), row.printed_pages.zip(row.expected_pages).map(|(p, e)| p - e));
        }
        for row in recon.unprinted.iter().chain(&recon.printed_only) {
            prop_assert_eq!(row.diff, None);
        }
    }

    /// Re-running the matcher on the same groups is idempotent.
    #[test]
    fn matcher_is_idempotent(pos in arb_pos_rows(), printer in arb_printer_rows()) {
        let data = input(pos, printer);
        let config = AuditConfig::default();
        let pattern = IdentifierPattern::from_config(&config.identifier).unwrap();
        let pos_groups = printaudit_recon::pos::normalize_pos(&data.pos, &config, &pattern).unwrap();
        let printed = printaudit_recon::printer::normalize_printer(&data.printer, &config, &pattern)
            .unwrap()
            .printed_groups();

        prop_assert_eq!(reconcile(&pos_groups, &printed), reconcile(&pos_groups, &printed));
    }

    /// Anonymous totals add up to the pages of every DR-less job and come out
    /// sorted largest first.
    #[test]
    fn anonymous_totals_conserved(printer in arb_printer_rows()) {
        let data = input(vec![], printer);
        let config = AuditConfig::default();
        let pattern = IdentifierPattern::from_config(&config.identifier).unwrap();
        let result = run(&config, &data).unwrap();

        let raw: Pages = data
            .printer
            .rows
            .iter()
            .filter(|r| pattern.extract(&r[0]).is_none())
            .map(|r| Pages::coerce(&r[1]))
            .sum();
        let summed: Pages = result.anonymous.iter().map(|g| g.printed_pages).sum();
        prop_assert_eq!(raw, summed);

        for pair in result.anonymous.windows(2) {
            prop_assert!(pair[0].printed_pages >= pair[1].printed_pages);
        }
    }
}
