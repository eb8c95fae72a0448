//! POS normalizer: sale lines → expected pages per DR number.

use crate::aggregate::aggregate_pos;
use crate::config::AuditConfig;
use crate::error::ReconError;
use crate::identifier::IdentifierPattern;
use crate::model::{cell, PosGroup, PosLine, Table, TableKind};
use crate::pages::Pages;

/// Read the POS table into billable print lines.
///
/// Lines whose item is not a digital print (or is a proof/sticker) are
/// dropped here, before any aggregation. Quantity is coerced (unparseable →
/// 0) and doubled for double-sided items.
pub fn load_pos_lines(
    table: &Table,
    config: &AuditConfig,
    pattern: &IdentifierPattern,
) -> Result<Vec<PosLine>, ReconError> {
    let col = &config.columns.pos;
    let invoice_idx = table.require_column(TableKind::Pos, &col.invoice)?;
    let item_idx = table.require_column(TableKind::Pos, &col.item)?;
    let quantity_idx = table.require_column(TableKind::Pos, &col.quantity)?;
    let customer_idx = table.require_column(TableKind::Pos, &col.customer)?;

    let rules = &config.items;
    let mut lines = Vec::new();

    for row in &table.rows {
        let item = cell(row, item_idx);
        if !rules.is_billable_print(item) {
            continue;
        }

        let invoice = cell(row, invoice_idx);
        let quantity = Pages::coerce(cell(row, quantity_idx));
        let expected_pages = if rules.is_double_sided(item) {
            quantity.doubled()
        } else {
            quantity
        };

        lines.push(PosLine {
            dr: pattern.extract(invoice),
            invoice: invoice.to_string(),
            customer: cell(row, customer_idx).to_string(),
            expected_pages,
        });
    }

    log::debug!(
        "pos: {} of {} rows are billable prints",
        lines.len(),
        table.rows.len()
    );

    Ok(lines)
}

/// POS table → one group per DR number with summed expected pages.
pub fn normalize_pos(
    table: &Table,
    config: &AuditConfig,
    pattern: &IdentifierPattern,
) -> Result<Vec<PosGroup>, ReconError> {
    let lines = load_pos_lines(table, config, pattern)?;
    let groups = aggregate_pos(&lines);

    if let Some(absent) = groups.iter().find(|g| g.dr.is_none()) {
        log::debug!(
            "pos: {} billable line(s) without a DR number, grouped under '{}'",
            absent.line_count,
            absent.invoice
        );
    }

    Ok(groups)
}
