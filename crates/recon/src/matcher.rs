use std::collections::{BTreeMap, BTreeSet};

use crate::model::{DrNumber, JoinOutput, JoinedPair, PosGroup, PrinterGroup};

/// Outer join POS groups with identified printer groups on DR number.
///
/// `both` and `pos_only` follow POS group order; `printer_only` follows
/// printer group order. The POS group without a DR number (if any) is
/// always `pos_only`.
pub fn join_on_identifier(pos: &[PosGroup], printed: &[PrinterGroup]) -> JoinOutput {
    let printed_map: BTreeMap<DrNumber, &PrinterGroup> =
        printed.iter().map(|g| (g.dr, g)).collect();

    let mut out = JoinOutput::default();
    let mut seen: BTreeSet<DrNumber> = BTreeSet::new();

    for pos_group in pos {
        let printer_group = pos_group.dr.and_then(|dr| printed_map.get(&dr));
        match printer_group {
            Some(printer_group) => {
                seen.insert(printer_group.dr);
                out.both.push(JoinedPair {
                    pos: pos_group.clone(),
                    printer: (*printer_group).clone(),
                    diff: printer_group.printed_pages - pos_group.expected_pages,
                });
            }
            None => out.pos_only.push(pos_group.clone()),
        }
    }

    for printer_group in printed {
        if !seen.contains(&printer_group.dr) {
            out.printer_only.push(printer_group.clone());
        }
    }

    out
}
