//! DR-number extraction from free text.

use regex::Regex;

use crate::config::IdentifierConfig;
use crate::error::ReconError;
use crate::model::DrNumber;

/// Compiled `<prefix>\s*<digits>` pattern, prefix matched case-insensitively.
///
/// Whitespace between the prefix and the digits is tolerated for both
/// invoice numbers and printer job names.
#[derive(Debug, Clone)]
pub struct IdentifierPattern {
    re: Regex,
}

impl IdentifierPattern {
    pub fn new(prefix: &str) -> Result<Self, ReconError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(ReconError::ConfigValidation(
                "identifier prefix must not be empty".into(),
            ));
        }
        let pattern = format!(r"(?i){}\s*([0-9]+)", regex::escape(prefix));
        let re = Regex::new(&pattern)
            .map_err(|e| ReconError::ConfigValidation(format!("identifier pattern: {e}")))?;
        Ok(Self { re })
    }

    pub fn from_config(config: &IdentifierConfig) -> Result<Self, ReconError> {
        Self::new(&config.prefix)
    }

    /// First DR number in `text`, or `None` when there is no match.
    pub fn extract(&self, text: &str) -> Option<DrNumber> {
        let digits = self.re.captures(text)?.get(1)?.as_str();
        match digits.parse::<u64>() {
            Ok(n) => Some(DrNumber(n)),
            Err(_) => {
                log::warn!("identifier digits {digits:?} in {text:?} out of range, treated as absent");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dr() -> IdentifierPattern {
        IdentifierPattern::new("DR").unwrap()
    }

    #[test]
    fn extracts_plain_and_spaced() {
        assert_eq!(dr().extract("DR15322"), Some(DrNumber(15322)));
        assert_eq!(dr().extract("DR 15322"), Some(DrNumber(15322)));
        assert_eq!(dr().extract("Job DR100"), Some(DrNumber(100)));
        assert_eq!(dr().extract("Banner DR\t42 final.pdf"), Some(DrNumber(42)));
    }

    #[test]
    fn prefix_is_case_insensitive() {
        assert_eq!(dr().extract("dr777"), Some(DrNumber(777)));
        assert_eq!(dr().extract("Dr 5"), Some(DrNumber(5)));
    }

    #[test]
    fn absent_without_marker() {
        assert_eq!(dr().extract("INV-999"), None);
        assert_eq!(dr().extract(""), None);
        assert_eq!(dr().extract("DR-15"), None);
        assert_eq!(dr().extract("DRAFT poster"), None);
    }

    #[test]
    fn zero_is_not_absent() {
        assert_eq!(dr().extract("DR0"), Some(DrNumber(0)));
        assert_eq!(dr().extract("DR0015"), Some(DrNumber(15)));
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(dr().extract("DR12 reprint of DR11"), Some(DrNumber(12)));
        assert_eq!(dr().extract("ADDRESS DR9"), Some(DrNumber(9)));
    }

    #[test]
    fn overflow_is_absent() {
        assert_eq!(dr().extract("DR99999999999999999999999"), None);
    }

    #[test]
    fn custom_prefix_is_escaped() {
        let pattern = IdentifierPattern::new("J.").unwrap();
        assert_eq!(pattern.extract("j. 31"), Some(DrNumber(31)));
        assert_eq!(pattern.extract("JX31"), None);
    }

    #[test]
    fn empty_prefix_rejected() {
        assert!(IdentifierPattern::new(" ").is_err());
    }
}
