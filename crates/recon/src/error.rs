use std::fmt;

use crate::model::TableKind;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, empty marker, etc.).
    ConfigValidation(String),
    /// Input table has no header row at all.
    EmptyTable { table: TableKind },
    /// Missing required column in input data.
    MissingColumn { table: TableKind, column: String },
    /// Export stream could not be written.
    Export(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::EmptyTable { table } => {
                write!(f, "{table} table: no header row found")
            }
            Self::MissingColumn { table, column } => {
                write!(f, "{table} table: missing column '{column}'")
            }
            Self::Export(msg) => write!(f, "export error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<csv::Error> for ReconError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<std::io::Error> for ReconError {
    fn from(err: std::io::Error) -> Self {
        Self::Export(err.to_string())
    }
}
