use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Audit configuration. Every field has a default, so an empty TOML
/// document is a valid config equal to `AuditConfig::default()`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Mismatches with |diff| strictly above this many pages get a
    /// detailed printer-log proof.
    #[serde(default = "default_large_diff_threshold")]
    pub large_diff_threshold: f64,
    #[serde(default)]
    pub identifier: IdentifierConfig,
    #[serde(default)]
    pub items: ItemRules,
    #[serde(default)]
    pub columns: ColumnConfig,
}

fn default_large_diff_threshold() -> f64 {
    10.0
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            large_diff_threshold: default_large_diff_threshold(),
            identifier: IdentifierConfig::default(),
            items: ItemRules::default(),
            columns: ColumnConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct IdentifierConfig {
    /// Literal marker in front of the digits, matched case-insensitively.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "DR".into()
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// Item rules
// ---------------------------------------------------------------------------

/// Which POS lines are billable prints, and which are double-sided.
/// All markers are case-insensitive substrings of the item name.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRules {
    #[serde(default = "default_include")]
    pub include: String,
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    #[serde(default = "default_double_sided")]
    pub double_sided: String,
}

fn default_include() -> String {
    "digital print".into()
}

fn default_exclude() -> Vec<String> {
    vec!["proof".into(), "sticker".into()]
}

fn default_double_sided() -> String {
    "2 sides".into()
}

impl Default for ItemRules {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
            double_sided: default_double_sided(),
        }
    }
}

impl ItemRules {
    pub fn is_billable_print(&self, item: &str) -> bool {
        let item = item.to_lowercase();
        item.contains(&self.include.to_lowercase())
            && !self
                .exclude
                .iter()
                .filter(|marker| !marker.is_empty())
                .any(|marker| item.contains(&marker.to_lowercase()))
    }

    pub fn is_double_sided(&self, item: &str) -> bool {
        !self.double_sided.is_empty()
            && item
                .to_lowercase()
                .contains(&self.double_sided.to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnConfig {
    #[serde(default)]
    pub pos: PosColumns,
    #[serde(default)]
    pub printer: PrinterColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PosColumns {
    #[serde(default = "default_invoice")]
    pub invoice: String,
    #[serde(default = "default_item")]
    pub item: String,
    #[serde(default = "default_quantity")]
    pub quantity: String,
    #[serde(default = "default_customer")]
    pub customer: String,
}

fn default_invoice() -> String {
    "Invoice No.".into()
}

fn default_item() -> String {
    "Item Name".into()
}

fn default_quantity() -> String {
    "Sales Qty".into()
}

fn default_customer() -> String {
    "Customer Name".into()
}

impl Default for PosColumns {
    fn default() -> Self {
        Self {
            invoice: default_invoice(),
            item: default_item(),
            quantity: default_quantity(),
            customer: default_customer(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrinterColumns {
    #[serde(default = "default_job_name")]
    pub job_name: String,
    #[serde(default = "default_pages")]
    pub pages: String,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_recorded_at")]
    pub recorded_at: String,
}

fn default_job_name() -> String {
    "Job Name".into()
}

fn default_pages() -> String {
    "Printed Pages".into()
}

fn default_owner() -> String {
    "Owner".into()
}

fn default_recorded_at() -> String {
    "Recorded Date/Time".into()
}

impl Default for PrinterColumns {
    fn default() -> Self {
        Self {
            job_name: default_job_name(),
            pages: default_pages(),
            owner: default_owner(),
            recorded_at: default_recorded_at(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AuditConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: AuditConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !self.large_diff_threshold.is_finite() || self.large_diff_threshold < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "large_diff_threshold must be a non-negative number, got {}",
                self.large_diff_threshold
            )));
        }

        if self.identifier.prefix.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "identifier.prefix must not be empty".into(),
            ));
        }

        if self.items.include.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "items.include must not be empty".into(),
            ));
        }

        let pos = &self.columns.pos;
        let printer = &self.columns.printer;
        let columns = [
            ("columns.pos.invoice", &pos.invoice),
            ("columns.pos.item", &pos.item),
            ("columns.pos.quantity", &pos.quantity),
            ("columns.pos.customer", &pos.customer),
            ("columns.printer.job_name", &printer.job_name),
            ("columns.printer.pages", &printer.pages),
            ("columns.printer.owner", &printer.owner),
            ("columns.printer.recorded_at", &printer.recorded_at),
        ];
        for (key, name) in columns {
            if name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{key} must not be empty"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
