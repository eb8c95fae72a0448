use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::error::ReconError;
use crate::pages::Pages;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which of the two input tables a row or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Pos,
    Printer,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pos => write!(f, "pos"),
            Self::Printer => write!(f, "printer"),
        }
    }
}

/// A decoded table: one header row plus text cells.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Convenience constructor for literal data.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    /// Index of a column by header name, ignoring surrounding whitespace.
    pub fn column(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub(crate) fn require_column(&self, table: TableKind, name: &str) -> Result<usize, ReconError> {
        if self.headers.is_empty() {
            return Err(ReconError::EmptyTable { table });
        }
        self.column(name).ok_or_else(|| ReconError::MissingColumn {
            table,
            column: name.into(),
        })
    }
}

/// Cell text, empty for short rows.
pub(crate) fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// The two tables handed over by the loader.
#[derive(Debug, Clone, Default)]
pub struct AuditInput {
    pub pos: Table,
    pub printer: Table,
}

// ---------------------------------------------------------------------------
// Identifiers + timestamps
// ---------------------------------------------------------------------------

/// Canonical job/invoice number ("DR number"), the join key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DrNumber(pub u64);

impl fmt::Display for DrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Printer-log "Recorded Date/Time" cell.
///
/// Keeps the raw text for display. Values that parse as a date-time order
/// chronologically and rank above values that don't; the rest order as text.
/// Empty text sorts lowest, so it never wins a maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAt {
    raw: String,
    parsed: Option<NaiveDateTime>,
}

impl RecordedAt {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let parsed = DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.naive_utc())
            .ok()
            .or_else(|| {
                TIMESTAMP_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            })
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            });
        Self {
            raw: trimmed.to_string(),
            parsed,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn datetime(&self) -> Option<NaiveDateTime> {
        self.parsed
    }

    pub fn is_missing(&self) -> bool {
        self.raw.is_empty()
    }
}

impl Ord for RecordedAt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.parsed, other.parsed) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.raw.cmp(&other.raw)),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.raw.cmp(&other.raw),
        }
    }
}

impl PartialOrd for RecordedAt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RecordedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for RecordedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

// ---------------------------------------------------------------------------
// Normalized records
// ---------------------------------------------------------------------------

/// A POS sale line that passed the item filter.
#[derive(Debug, Clone, Serialize)]
pub struct PosLine {
    pub dr: Option<DrNumber>,
    pub invoice: String,
    pub customer: String,
    pub expected_pages: Pages,
}

/// A single printer-log entry after page coercion.
#[derive(Debug, Clone, Serialize)]
pub struct PrinterRecord {
    pub dr: Option<DrNumber>,
    pub job_name: String,
    pub printed_pages: Pages,
    pub owner: String,
    pub recorded_at: RecordedAt,
    /// Every other column of the source row, passed through for display.
    pub extra: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// POS lines sharing one DR number (or all lines without one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosGroup {
    pub dr: Option<DrNumber>,
    pub invoice: String,
    pub customer: String,
    pub expected_pages: Pages,
    pub line_count: usize,
}

/// Identified printer jobs sharing one DR number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrinterGroup {
    pub dr: DrNumber,
    pub printed_pages: Pages,
    pub job_count: usize,
}

/// Anonymous printer jobs sharing one (job name, owner) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnonymousGroup {
    pub job_name: String,
    pub artist: String,
    pub printed_pages: Pages,
    pub recorded_at: RecordedAt,
    pub job_count: usize,
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedPair {
    pub pos: PosGroup,
    pub printer: PrinterGroup,
    pub diff: Pages,
}

#[derive(Debug, Clone, Default)]
pub struct JoinOutput {
    pub both: Vec<JoinedPair>,
    pub pos_only: Vec<PosGroup>,
    pub printer_only: Vec<PrinterGroup>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    PosOnly,
    Both,
    PrinterOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditBucket {
    Unprinted,
    Matched,
    Mismatched,
    PrintedOnly,
}

impl fmt::Display for AuditBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unprinted => write!(f, "unprinted"),
            Self::Matched => write!(f, "matched"),
            Self::Mismatched => write!(f, "mismatched"),
            Self::PrintedOnly => write!(f, "printed_only"),
        }
    }
}

/// One reconciled DR number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconRow {
    pub bucket: AuditBucket,
    pub provenance: Provenance,
    pub dr: Option<DrNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_pages: Option<Pages>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printed_pages: Option<Pages>,
    /// printed − expected; only present when both sides exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<Pages>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub unprinted: Vec<ReconRow>,
    pub matched: Vec<ReconRow>,
    pub mismatched: Vec<ReconRow>,
    pub printed_only: Vec<ReconRow>,
}

impl Reconciliation {
    pub fn len(&self) -> usize {
        self.unprinted.len() + self.matched.len() + self.mismatched.len() + self.printed_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All rows, bucket by bucket.
    pub fn rows(&self) -> impl Iterator<Item = &ReconRow> {
        self.unprinted
            .iter()
            .chain(&self.matched)
            .chain(&self.mismatched)
            .chain(&self.printed_only)
    }
}

// ---------------------------------------------------------------------------
// Proof
// ---------------------------------------------------------------------------

/// A mismatch large enough to warrant a detailed printer-log breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofCandidate {
    pub dr: DrNumber,
    pub label: String,
    pub diff: Pages,
}

/// A raw identified printer-log row shown as audit evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofRow {
    pub recorded_at: RecordedAt,
    pub job_name: String,
    pub printed_pages: Pages,
    pub owner: String,
    /// Unmapped printer-log columns of the source row.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub billed_invoices: usize,
    pub unprinted: usize,
    pub matched: usize,
    pub mismatches: usize,
    pub printed_only: usize,
    pub anonymous_jobs: usize,
    pub proof_candidates: usize,
    pub bucket_counts: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditMeta {
    pub engine_version: String,
    pub run_at: String,
    pub large_diff_threshold: f64,
    pub pos_rows: usize,
    pub printer_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    pub meta: AuditMeta,
    pub summary: AuditSummary,
    pub reconciliation: Reconciliation,
    pub anonymous: Vec<AnonymousGroup>,
    pub proof_candidates: Vec<ProofCandidate>,
    /// Identified printer records (post-coercion, pre-aggregation) backing
    /// proof lookups.
    #[serde(skip)]
    pub identified: Vec<PrinterRecord>,
}

impl AuditResult {
    /// Raw printer-log rows for one DR number, in input order.
    pub fn proof(&self, dr: DrNumber) -> Vec<ProofRow> {
        crate::proof::lookup_proof(&self.identified, dr)
    }
}
