//! `printaudit-recon`: POS billing vs printer-log reconciliation engine.
//!
//! Pure engine crate: receives two pre-loaded tables, returns the unprinted,
//! matched, mismatched, printed-only and anonymous result sets.
//! No CLI or file-decoding dependencies.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod export;
pub mod identifier;
pub mod matcher;
pub mod model;
pub mod pages;
pub mod pos;
pub mod printer;
pub mod proof;

pub use classify::reconcile;
pub use config::AuditConfig;
pub use engine::run;
pub use error::ReconError;
pub use model::{AuditInput, AuditResult, DrNumber, ReconRow, Table, TableKind};
pub use pages::Pages;
