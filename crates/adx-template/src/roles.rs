//! File roles and template classification.

use serde::{Deserialize, Serialize};

/// Name of the root manifest of every template directory.
pub const MANIFEST_FILE_NAME: &str = "template-info.json";

/// The declared type of a template, from the manifest's `templateType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateType {
    App,
    Dashboard,
    Embedded,
    Lens,
    Data,
}

impl TemplateType {
    /// Parse the manifest's `templateType` value (case-insensitive, as the
    /// runtime accepts either casing). Unknown values return `None`; the
    /// host's schema validation owns reporting those.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "app" => Some(Self::App),
            "dashboard" => Some(Self::Dashboard),
            "embeddedapp" => Some(Self::Embedded),
            "lens" => Some(Self::Lens),
            "data" => Some(Self::Data),
            _ => None,
        }
    }
}

/// Which rule-type bucket a rules file belongs to.
///
/// Buckets are isolated from each other for duplicate-name detection:
/// an `appToTemplate` constant never conflicts with a `templateToApp` one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleBucket {
    /// `rules` entries with `"type": "appToTemplate"`.
    AppToTemplate,
    /// `rules` entries with `"type": "templateToApp"`.
    TemplateToApp,
    /// The deprecated top-level `ruleDefinition` file.
    Legacy,
}

/// The role a file plays within a template, as declared by the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileRole {
    TemplateInfo,
    Folder,
    Variables,
    Ui,
    Layout,
    AutoInstall,
    Rules(RuleBucket),
    Dashboard,
    Component,
    Lens,
    Dataflow,
    Recipe,
    Dataset,
    ExternalFile,
    /// Schema/xmd companions of external files and datasets.
    ExternalFileCompanion,
    Image,
    /// Entries under `extendedTypes.*`.
    ExtendedType,
}

impl FileRole {
    /// Roles whose files the rule engine runs template-specific checks on.
    /// Everything else is referenced (path-checked from the manifest) but
    /// not itself linted.
    #[must_use]
    pub const fn is_linted(self) -> bool {
        matches!(
            self,
            Self::TemplateInfo
                | Self::Variables
                | Self::Ui
                | Self::Layout
                | Self::AutoInstall
                | Self::Rules(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_type_parse() {
        assert_eq!(TemplateType::parse("app"), Some(TemplateType::App));
        assert_eq!(TemplateType::parse("Dashboard"), Some(TemplateType::Dashboard));
        assert_eq!(TemplateType::parse("embeddedapp"), Some(TemplateType::Embedded));
        assert_eq!(TemplateType::parse("bogus"), None);
    }

    #[test]
    fn test_linted_roles() {
        assert!(FileRole::Variables.is_linted());
        assert!(FileRole::Rules(RuleBucket::Legacy).is_linted());
        assert!(!FileRole::Dashboard.is_linted());
        assert!(!FileRole::Image.is_linted());
    }
}
