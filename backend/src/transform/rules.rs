//! Industry label rules.
//!
//! A rule collapses every industry label starting with `prefix`
//! (case-sensitive) into `canonical`. The table is plain JSON so new
//! families can be added without code changes:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "rules": [
//!     { "prefix": "Crypto", "canonical": "Crypto" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{RulesError, RulesResult};

/// One `{prefix -> canonical}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryRule {
    pub prefix: String,
    pub canonical: String,
}

impl IndustryRule {
    pub fn new(prefix: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            canonical: canonical.into(),
        }
    }
}

/// Ordered rule table; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryRules {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub rules: Vec<IndustryRule>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl IndustryRules {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            version: default_version(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, prefix: &str, canonical: &str) -> Self {
        self.rules.push(IndustryRule::new(prefix, canonical));
        self
    }

    /// Parse and check a table from JSON.
    pub fn from_json(json: &str) -> RulesResult<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.check()?;
        Ok(rules)
    }

    /// Load and check a table from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> RulesResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Canonical label for `value`, or `None` when no rule applies or the
    /// value is already canonical.
    pub fn canonicalize(&self, value: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| value.starts_with(r.prefix.as_str()))
            .map(|r| r.canonical.as_str())
            .filter(|canonical| *canonical != value)
    }

    /// Reject tables that would make standardization non-idempotent:
    /// empty prefixes or canonicals, and canonical labels another rule
    /// would rewrite again.
    pub fn check(&self) -> RulesResult<()> {
        for rule in &self.rules {
            if rule.prefix.is_empty() {
                return Err(RulesError::InvalidRules("rule with empty prefix".into()));
            }
            if rule.canonical.trim().is_empty() {
                return Err(RulesError::InvalidRules(format!(
                    "rule '{}' has an empty canonical label",
                    rule.prefix
                )));
            }
            if let Some(other) = self.canonicalize(&rule.canonical) {
                return Err(RulesError::InvalidRules(format!(
                    "canonical label '{}' would be rewritten to '{}'",
                    rule.canonical, other
                )));
            }
        }
        Ok(())
    }
}

impl Default for IndustryRules {
    fn default() -> Self {
        default_rules()
    }
}

/// Rules for the label families observed in the layoffs dataset.
pub fn default_rules() -> IndustryRules {
    // "Crypto", "Crypto Currency", "CryptoCurrency"
    IndustryRules::new().with_rule("Crypto", "Crypto")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_crypto_family() {
        let rules = default_rules();
        assert_eq!(rules.canonicalize("Crypto Currency"), Some("Crypto"));
        assert_eq!(rules.canonicalize("CryptoCurrency"), Some("Crypto"));
        assert_eq!(rules.canonicalize("Crypto"), None);
        assert_eq!(rules.canonicalize("Retail"), None);
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert_eq!(default_rules().canonicalize("crypto"), None);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = IndustryRules::new()
            .with_rule("Fin", "Finance")
            .with_rule("Fintech", "Fintech");
        assert_eq!(rules.canonicalize("Fintech"), Some("Finance"));
    }

    #[test]
    fn test_non_idempotent_table_rejected() {
        let rules = IndustryRules::new()
            .with_rule("Health", "Care")
            .with_rule("Care", "Healthcare");
        let err = rules.check().unwrap_err();
        assert!(err.to_string().contains("'Care'"));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let err = IndustryRules::from_json(r#"{"rules":[{"prefix":"","canonical":"X"}]}"#).unwrap_err();
        assert!(matches!(err, RulesError::InvalidRules(_)));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let rules = default_rules().with_rule("Transport", "Transportation");
        fs::write(&path, rules.to_json().unwrap()).unwrap();

        let loaded = IndustryRules::from_file(&path).unwrap();
        assert_eq!(loaded, rules);
        assert_eq!(loaded.canonicalize("Transports"), Some("Transportation"));
    }
}
