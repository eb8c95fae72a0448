//! Plain-text tables for terminal output.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use printaudit_recon::export::{
    anonymous_record, mismatch_record, printed_only_record, proof_headers, proof_record,
    unprinted_record, ANONYMOUS_HEADERS, MISMATCH_HEADERS, PRINTED_ONLY_HEADERS, PROOF_HEADERS,
    UNPRINTED_HEADERS,
};
use printaudit_recon::model::{AnonymousGroup, ProofCandidate, ProofRow, ReconRow};

/// Widest a column may grow before cells are cut with "..".
pub const MAX_COLUMN_WIDTH: usize = 40;

/// Cut `s` to at most `width` display columns, marking the cut with "..".
pub fn truncate(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    let budget = width.saturating_sub(2);
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    if width >= 2 {
        out.push_str("..");
    }
    out
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.replace(',', "").parse::<f64>().is_ok()
}

fn pad(s: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(UnicodeWidthStr::width(s)));
    if right_align {
        format!("{fill}{s}")
    } else {
        format!("{s}{fill}")
    }
}

/// Render a header + rows grid. Numeric cells are right-aligned.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(*h)).collect();
    for row in rows {
        for (c, value) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(c) {
                *w = (*w).max(UnicodeWidthStr::width(value.as_str()));
            }
        }
    }
    for w in &mut widths {
        *w = (*w).min(MAX_COLUMN_WIDTH);
    }

    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(value, &w)| pad(&truncate(value, w), w, is_numeric(value)))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers.iter().map(|h| h.to_string()).collect()));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.clone()));
        out.push('\n');
    }
    out
}

pub fn unprinted_table(rows: &[ReconRow]) -> String {
    let records: Vec<_> = rows.iter().map(unprinted_record).collect();
    render_table(&UNPRINTED_HEADERS, &records)
}

pub fn mismatch_table(rows: &[ReconRow]) -> String {
    let records: Vec<_> = rows.iter().map(mismatch_record).collect();
    render_table(&MISMATCH_HEADERS, &records)
}

pub fn printed_only_table(rows: &[ReconRow]) -> String {
    let records: Vec<_> = rows.iter().map(printed_only_record).collect();
    render_table(&PRINTED_ONLY_HEADERS, &records)
}

pub fn anonymous_table(groups: &[AnonymousGroup]) -> String {
    let records: Vec<_> = groups.iter().map(anonymous_record).collect();
    render_table(&ANONYMOUS_HEADERS, &records)
}

/// Fixed proof columns followed by any unmapped printer-log columns.
pub fn proof_table(rows: &[ProofRow]) -> String {
    let headers = proof_headers(rows);
    let extra_columns = &headers[PROOF_HEADERS.len()..];
    let records: Vec<_> = rows.iter().map(|r| proof_record(r, extra_columns)).collect();
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    render_table(&header_refs, &records)
}

pub fn candidates_table(candidates: &[ProofCandidate]) -> String {
    let records: Vec<_> = candidates
        .iter()
        .map(|c| vec![c.dr.to_string(), c.label.clone()])
        .collect();
    render_table(&["DR Number", "Invoice"], &records)
}
