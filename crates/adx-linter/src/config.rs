//! Lint configuration: per-code severity overrides.
//!
//! Every check runs with its taxonomy default severity unless the host
//! supplies overrides. Configuration is keyed by taxonomy code:
//!
//! ```json
//! {
//!   "rel-path.not-found": "error",
//!   "template-info.name-folder-match": "off"
//! }
//! ```

use adx_template::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configured severity for one rule code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Error,
    Warn,
    Info,
    Off,
}

/// Severity overrides keyed by taxonomy code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LintConfig {
    overrides: HashMap<String, LintSeverity>,
}

impl LintConfig {
    /// Returns `false` when the code is configured `off`.
    #[must_use]
    pub fn is_enabled(&self, code: &str) -> bool {
        self.overrides.get(code) != Some(&LintSeverity::Off)
    }

    /// The configured severity for a code, when overridden.
    #[must_use]
    pub fn severity_override(&self, code: &str) -> Option<Severity> {
        match self.overrides.get(code)? {
            LintSeverity::Error => Some(Severity::Error),
            LintSeverity::Warn => Some(Severity::Warning),
            LintSeverity::Info => Some(Severity::Information),
            LintSeverity::Off => None,
        }
    }

    /// Set an override programmatically (used by tests and the CLI).
    pub fn set(&mut self, code: impl Into<String>, severity: LintSeverity) {
        self.overrides.insert(code.into(), severity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adx_template::codes;

    #[test]
    fn test_default_config_enables_everything() {
        let config = LintConfig::default();
        assert!(config.is_enabled(codes::REL_PATH_NOT_FOUND));
        assert_eq!(config.severity_override(codes::REL_PATH_NOT_FOUND), None);
    }

    #[test]
    fn test_deserialize_overrides() {
        let config: LintConfig = serde_json::from_str(
            r#"{"rel-path.not-found": "error", "template-info.name-folder-match": "off"}"#,
        )
        .unwrap();
        assert_eq!(
            config.severity_override(codes::REL_PATH_NOT_FOUND),
            Some(Severity::Error)
        );
        assert!(!config.is_enabled(codes::NAME_FOLDER_MATCH));
        assert!(config.is_enabled(codes::REL_PATH_DUPLICATE));
    }
}
