//! Delimited-text export streams.
//!
//! Each writer emits a header row followed by one row per record, values in
//! their natural text form. Missing values are empty cells.

use std::collections::BTreeSet;
use std::io::Write;

use crate::error::ReconError;
use crate::model::{AnonymousGroup, ProofRow, ReconRow};
use crate::pages::Pages;

pub const UNPRINTED_HEADERS: [&str; 3] = ["Invoice No.", "Customer Name", "Expected Pages"];

pub const MISMATCH_HEADERS: [&str; 5] = [
    "Invoice No.",
    "Customer Name",
    "Expected Pages",
    "Printed Pages",
    "Diff",
];

pub const ANONYMOUS_HEADERS: [&str; 4] =
    ["Job Name", "Artist Name", "Printed Pages", "Recorded Date/Time"];

pub const PROOF_HEADERS: [&str; 4] = ["Recorded Date/Time", "Job Name", "Printed Pages", "Owner"];

pub const PRINTED_ONLY_HEADERS: [&str; 2] = ["DR Number", "Printed Pages"];

fn pages_cell(pages: Option<Pages>) -> String {
    pages.map(|p| p.to_string()).unwrap_or_default()
}

pub fn unprinted_record(row: &ReconRow) -> Vec<String> {
    vec![
        row.invoice.clone().unwrap_or_default(),
        row.customer.clone().unwrap_or_default(),
        pages_cell(row.expected_pages),
    ]
}

pub fn mismatch_record(row: &ReconRow) -> Vec<String> {
    vec![
        row.invoice.clone().unwrap_or_default(),
        row.customer.clone().unwrap_or_default(),
        pages_cell(row.expected_pages),
        pages_cell(row.printed_pages),
        pages_cell(row.diff),
    ]
}

pub fn anonymous_record(group: &AnonymousGroup) -> Vec<String> {
    vec![
        group.job_name.clone(),
        group.artist.clone(),
        group.printed_pages.to_string(),
        group.recorded_at.to_string(),
    ]
}

/// Proof columns: the fixed four, then every pass-through column present in
/// `rows`, sorted by name.
pub fn proof_headers(rows: &[ProofRow]) -> Vec<String> {
    let extra: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.extra.keys().map(String::as_str))
        .collect();
    PROOF_HEADERS
        .iter()
        .copied()
        .chain(extra)
        .map(str::to_string)
        .collect()
}

pub fn proof_record(row: &ProofRow, extra_columns: &[String]) -> Vec<String> {
    let mut record = vec![
        row.recorded_at.to_string(),
        row.job_name.clone(),
        row.printed_pages.to_string(),
        row.owner.clone(),
    ];
    record.extend(
        extra_columns
            .iter()
            .map(|c| row.extra.get(c).cloned().unwrap_or_default()),
    );
    record
}

pub fn printed_only_record(row: &ReconRow) -> Vec<String> {
    vec![
        row.dr.map(|dr| dr.to_string()).unwrap_or_default(),
        pages_cell(row.printed_pages),
    ]
}

fn write_csv<W, T, F>(writer: W, headers: &[&str], items: &[T], to_record: F) -> Result<(), ReconError>
where
    W: Write,
    F: Fn(&T) -> Vec<String>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(headers)?;
    for item in items {
        csv_writer.write_record(to_record(item))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_unprinted<W: Write>(writer: W, rows: &[ReconRow]) -> Result<(), ReconError> {
    write_csv(writer, &UNPRINTED_HEADERS, rows, unprinted_record)
}

pub fn write_mismatches<W: Write>(writer: W, rows: &[ReconRow]) -> Result<(), ReconError> {
    write_csv(writer, &MISMATCH_HEADERS, rows, mismatch_record)
}

pub fn write_anonymous<W: Write>(writer: W, groups: &[AnonymousGroup]) -> Result<(), ReconError> {
    write_csv(writer, &ANONYMOUS_HEADERS, groups, anonymous_record)
}

pub fn write_proof<W: Write>(writer: W, rows: &[ProofRow]) -> Result<(), ReconError> {
    let headers = proof_headers(rows);
    let extra_columns = &headers[PROOF_HEADERS.len()..];
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    write_csv(writer, &header_refs, rows, |row| proof_record(row, extra_columns))
}

pub fn write_printed_only<W: Write>(writer: W, rows: &[ReconRow]) -> Result<(), ReconError> {
    write_csv(writer, &PRINTED_ONLY_HEADERS, rows, printed_only_record)
}
