//! Delimited-text table loader.
//!
//! POS and printer exports arrive as CSV or TSV, frequently saved from Excel
//! on Windows. Bytes are decoded as UTF-8 with a Windows-1252 fallback, the
//! delimiter is sniffed from the first lines, and the first non-blank record
//! becomes the header row.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use printaudit_recon::Table;

const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

#[derive(Debug)]
pub enum LoadError {
    /// File could not be opened or read.
    Io { path: PathBuf, source: io::Error },
    /// Spreadsheet, PDF, or other non-delimited format.
    UnsupportedFormat { path: PathBuf, extension: String },
    /// Delimited text was malformed.
    Parse { path: PathBuf, message: String },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::UnsupportedFormat { path, .. } | Self::Parse { path, .. } => {
                path
            }
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::UnsupportedFormat { path, extension } => write!(
                f,
                "unsupported input format '.{extension}' for {}",
                path.display()
            ),
            Self::Parse { path, message } => write!(f, "cannot parse {}: {message}", path.display()),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Load a CSV/TSV file into a [`Table`].
///
/// `.tsv` files are always tab-delimited; anything else is sniffed.
pub fn load_table(path: &Path) -> Result<Table, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    if let Some(ext) = &extension {
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext.clone(),
            });
        }
    }

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = decode(bytes);

    let delimiter = match extension.as_deref() {
        Some("tsv") => b'\t',
        _ => sniff_delimiter(&content),
    };
    log::debug!(
        "loading {} with delimiter {:?}",
        path.display(),
        delimiter as char
    );

    parse_table(&content, delimiter).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// UTF-8 first; on failure fall back to Windows-1252 (Excel's default on
/// Windows). A leading BOM is dropped either way.
pub fn decode(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Pick the delimiter that splits the sample lines most consistently.
///
/// Each candidate is scored by how many of the first ten lines share the
/// first line's field count, weighted by that count. A candidate must split
/// the first line into at least two fields to be considered.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    let mut best = b',';
    let mut best_score = 0usize;

    for &delimiter in candidates {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| field_count(line, delimiter))
            .collect();

        let Some(&first) = counts.first() else {
            break;
        };
        if first <= 1 {
            continue;
        }

        let score = counts.iter().filter(|&&c| c == first).count() * first;
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }

    best
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Split delimited text into headers and rows.
///
/// Blank lines are skipped. Text with no records yields a table without
/// headers, which the engine reports as an empty table.
pub fn parse_table(content: &str, delimiter: u8) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        match headers {
            None => headers = Some(record.iter().map(|h| h.trim().to_string()).collect()),
            Some(_) => rows.push(record.iter().map(str::to_string).collect()),
        }
    }

    Ok(Table::new(headers.unwrap_or_default(), rows))
}
