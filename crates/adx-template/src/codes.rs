//! The fixed rule-code taxonomy.
//!
//! Every check emits diagnostics under one of these stable codes, and
//! quick-fix providers match on them. Each code carries a default severity
//! and a default message template; checks parameterize the message with
//! field values but never invent new codes.

use crate::Severity;

// any template file
pub const SYNTAX: &str = "syntax.error";

// template-info.json
pub const DASHBOARD_COUNT: &str = "template-info.dashboard-count";
pub const APP_CONTENTS: &str = "template-info.app-contents";
pub const DUPLICATE_LABEL: &str = "template-info.duplicate-label";
pub const NAME_FOLDER_MATCH: &str = "template-info.name-folder-match";
pub const ASSET_ICON_AND_BADGE: &str = "template-info.asset-icon-and-badge";
pub const RULE_DEFINITION_CONFLICT: &str = "template-info.rule-definition-conflict";

// relative-path fields in template-info.json
pub const REL_PATH_EMPTY: &str = "rel-path.empty";
pub const REL_PATH_SELF: &str = "rel-path.self";
pub const REL_PATH_TRAVERSAL: &str = "rel-path.traversal";
pub const REL_PATH_NOT_FOUND: &str = "rel-path.not-found";
pub const REL_PATH_NOT_A_FILE: &str = "rel-path.not-a-file";
pub const REL_PATH_DUPLICATE: &str = "rel-path.duplicate";

// rules files
pub const RULES_DUPLICATE_CONSTANT: &str = "rules.duplicate-constant";
pub const RULES_DUPLICATE_RULE_NAME: &str = "rules.duplicate-rule-name";
pub const RULES_DUPLICATE_MACRO: &str = "rules.duplicate-macro";
pub const RULES_NOOP_MACRO: &str = "rules.noop-macro";

// variables.json
pub const VARIABLES_MULTIPLE_REGEX_EXCLUDES: &str = "variables.multiple-regex-excludes";
pub const VARIABLES_UNTERMINATED_REGEX: &str = "variables.unterminated-regex";
pub const VARIABLES_INVALID_REGEX: &str = "variables.invalid-regex";
pub const VARIABLES_INVALID_REGEX_OPTIONS: &str = "variables.invalid-regex-options";
pub const VARIABLES_DUPLICATE_REGEX_OPTION: &str = "variables.duplicate-regex-option";

// ui.json / layout.json pages
pub const PAGE_UNKNOWN_VARIABLE: &str = "page.unknown-variable";
pub const PAGE_UNSUPPORTED_VARIABLE_TYPE: &str = "page.unsupported-variable-type";
pub const NAVIGATION_WITHOUT_PANEL: &str = "layout.navigation-without-panel";

/// The full taxonomy: `(code, default severity, default message template)`.
pub const TABLE: &[(&str, Severity, &str)] = &[
    (SYNTAX, Severity::Error, "Invalid JSON syntax"),
    (
        DASHBOARD_COUNT,
        Severity::Error,
        "Dashboard templates must have exactly 1 dashboard specified",
    ),
    (
        APP_CONTENTS,
        Severity::Error,
        "App templates must have at least 1 dashboard, component, dataflow, dataset, externalFile, lens, or recipe specified",
    ),
    (DUPLICATE_LABEL, Severity::Warning, "Duplicate label"),
    (
        NAME_FOLDER_MATCH,
        Severity::Warning,
        "Template name should match the containing folder name",
    ),
    (
        ASSET_ICON_AND_BADGE,
        Severity::Warning,
        "Template is combining deprecated assetIcon with icons.appBadge",
    ),
    (
        RULE_DEFINITION_CONFLICT,
        Severity::Error,
        "Template is combining deprecated ruleDefinition with rules",
    ),
    (
        REL_PATH_EMPTY,
        Severity::Error,
        "Value should be a path relative to this file",
    ),
    (REL_PATH_SELF, Severity::Error, "Path cannot be 'template-info.json'"),
    (
        REL_PATH_TRAVERSAL,
        Severity::Error,
        "Path should not contain '..' parts",
    ),
    (
        REL_PATH_NOT_FOUND,
        Severity::Warning,
        "Specified file does not exist in workspace",
    ),
    (
        REL_PATH_NOT_A_FILE,
        Severity::Warning,
        "Specified path is not a file",
    ),
    (REL_PATH_DUPLICATE, Severity::Warning, "Duplicate usage of path"),
    (RULES_DUPLICATE_CONSTANT, Severity::Error, "Duplicate constant"),
    (RULES_DUPLICATE_RULE_NAME, Severity::Error, "Duplicate rule name"),
    (RULES_DUPLICATE_MACRO, Severity::Error, "Duplicate macro"),
    (
        RULES_NOOP_MACRO,
        Severity::Information,
        "Macro should have a return value or actions",
    ),
    (
        VARIABLES_MULTIPLE_REGEX_EXCLUDES,
        Severity::Warning,
        "Multiple regular expression excludes found, only the first will be used",
    ),
    (
        VARIABLES_UNTERMINATED_REGEX,
        Severity::Error,
        "Missing closing / for regular expression",
    ),
    (VARIABLES_INVALID_REGEX, Severity::Error, "Invalid regular expression"),
    (
        VARIABLES_INVALID_REGEX_OPTIONS,
        Severity::Error,
        "Invalid regular expression options",
    ),
    (
        VARIABLES_DUPLICATE_REGEX_OPTION,
        Severity::Error,
        "Duplicate option in regular expression options",
    ),
    (PAGE_UNKNOWN_VARIABLE, Severity::Warning, "Cannot find variable"),
    (
        PAGE_UNSUPPORTED_VARIABLE_TYPE,
        Severity::Error,
        "Unsupported variable type for a page",
    ),
    (
        NAVIGATION_WITHOUT_PANEL,
        Severity::Warning,
        "Navigation objects have no effect without a navigationPanel in the layout",
    ),
];

/// Default severity for a code. Unknown codes default to Error, which only
/// happens if a check invents a code outside the taxonomy — a programming
/// error surfaced loudly in tests.
#[must_use]
pub fn default_severity(code: &str) -> Severity {
    TABLE
        .iter()
        .find(|(c, _, _)| *c == code)
        .map_or(Severity::Error, |(_, severity, _)| *severity)
}

/// Default message template for a code.
#[must_use]
pub fn message_template(code: &str) -> &'static str {
    TABLE
        .iter()
        .find(|(c, _, _)| *c == code)
        .map_or("", |(_, _, template)| template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let mut seen = HashSet::new();
        for (code, _, _) in TABLE {
            assert!(seen.insert(*code), "duplicate taxonomy code {code}");
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(default_severity(REL_PATH_NOT_FOUND), Severity::Warning);
        assert_eq!(default_severity(RULES_DUPLICATE_MACRO), Severity::Error);
        assert_eq!(
            message_template(VARIABLES_DUPLICATE_REGEX_OPTION),
            "Duplicate option in regular expression options"
        );
    }
}
