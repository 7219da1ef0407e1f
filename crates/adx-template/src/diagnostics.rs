//! Diagnostic types shared by the rule engine and the coordinator.

use adx_json::OffsetRange;
use serde::{Deserialize, Serialize};

use crate::codes;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Information => write!(f, "info"),
            Self::Hint => write!(f, "hint"),
        }
    }
}

/// Identity of one file, as a normalized workspace path string.
///
/// The coordinator keys all per-file state (diagnostics, generations)
/// by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    #[must_use]
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(path.as_ref().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location in a file — an explicit `(file, range)` pair, never a live
/// node reference, since the target file's tree may be re-parsed between
/// diagnostic creation and consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: FileId,
    pub range: OffsetRange,
}

/// Related information for a diagnostic; may point into a different file
/// than the diagnostic itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedInfo {
    pub location: Location,
    pub message: String,
}

/// A diagnostic message (error, warning, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Range where the diagnostic applies
    pub range: OffsetRange,

    /// Severity level
    pub severity: Severity,

    /// Stable taxonomy code (see [`crate::codes`]), never free text
    pub code: String,

    /// Diagnostic message
    pub message: String,

    /// Source of the diagnostic (e.g., "adx-template")
    pub source: String,

    /// Related information, possibly in other files
    pub related_info: Vec<RelatedInfo>,

    /// Machine-readable arguments for quick-fix consumption
    /// (e.g. `{"name": "badvar", "match": "var1"}`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Diagnostic {
    /// Create a diagnostic for a taxonomy code, using the code's default
    /// severity and message template.
    #[must_use]
    pub fn for_code(code: &str, range: OffsetRange) -> Self {
        Self {
            range,
            severity: codes::default_severity(code),
            code: code.to_string(),
            message: codes::message_template(code).to_string(),
            source: "adx-template".to_string(),
            related_info: Vec::new(),
            args: None,
        }
    }

    /// Replace the templated message with a parameterized one.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Override the default severity.
    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Attach a related-information entry.
    #[must_use]
    pub fn with_related_info(mut self, info: RelatedInfo) -> Self {
        self.related_info.push(info);
        self
    }

    /// Attach one structured argument for quick-fix consumption.
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.args
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// One structured argument, if present.
    #[must_use]
    pub fn arg(&self, key: &str) -> Option<&serde_json::Value> {
        self.args.as_ref().and_then(|args| args.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_code_uses_taxonomy_defaults() {
        let diag = Diagnostic::for_code(codes::REL_PATH_NOT_FOUND, OffsetRange::new(3, 9));
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.code, codes::REL_PATH_NOT_FOUND);
        assert_eq!(diag.message, "Specified file does not exist in workspace");
        assert!(diag.related_info.is_empty());
        assert!(diag.args.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let other = Location {
            file: FileId::new("rules2.json"),
            range: OffsetRange::new(1, 2),
        };
        let diag = Diagnostic::for_code(codes::RULES_DUPLICATE_CONSTANT, OffsetRange::at(0))
            .with_message("Duplicate constant 'A'")
            .with_related_info(RelatedInfo {
                location: other,
                message: "Other usage".to_string(),
            })
            .with_arg("name", "A");

        assert_eq!(diag.message, "Duplicate constant 'A'");
        assert_eq!(diag.related_info.len(), 1);
        assert_eq!(diag.arg("name"), Some(&serde_json::json!("A")));
        assert_eq!(diag.related_info[0].location.file.as_str(), "rules2.json");
    }

    #[test]
    fn test_serializes_without_empty_args() {
        let diag = Diagnostic::for_code(codes::NAVIGATION_WITHOUT_PANEL, OffsetRange::at(0));
        let json = serde_json::to_value(&diag).unwrap();
        assert!(json.get("args").is_none());
        assert_eq!(json["code"], codes::NAVIGATION_WITHOUT_PANEL);
    }
}
