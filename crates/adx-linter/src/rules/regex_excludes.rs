//! Validation of regular-expression `excludes` entries in `variables.json`.
//!
//! An `excludes` array mixes literal strings with at most one regex entry
//! of the form `/pattern/flags`. The runtime only honors the first regex,
//! so additional ones get a single warning with related information on
//! every extra entry. Each regex entry is then validated on its own:
//! delimiters, pattern compilation, and the flags substring.

use crate::traits::{LintRule, TemplateLintRule};
use crate::{LintTarget, TemplateContext};
use adx_json::{match_pattern, JsonPath, OffsetRange};
use adx_template::{codes, Diagnostic, FileRole, Location, RelatedInfo};
use std::collections::HashSet;

/// Flags the runtime's regex engine accepts.
const ALLOWED_OPTIONS: &str = "dgimsuvy";

pub struct RegexExcludesRuleImpl;

impl LintRule for RegexExcludesRuleImpl {
    fn name(&self) -> &'static str {
        "regex_excludes"
    }

    fn description(&self) -> &'static str {
        "Validates regular-expression excludes entries in variables.json"
    }
}

impl TemplateLintRule for RegexExcludesRuleImpl {
    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::Variables
    }

    fn check(&self, _ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic> {
        let tree = target.tree;
        let mut diagnostics = Vec::new();

        for m in match_pattern(tree, &JsonPath::pattern(&["*", "excludes"]), None) {
            let regex_entries: Vec<(String, OffsetRange)> = tree
                .array_items(m.node)
                .iter()
                .filter_map(|item| {
                    let value = tree.string_value(*item)?;
                    value
                        .starts_with('/')
                        .then(|| (value.to_string(), tree.span(*item)))
                })
                .collect();

            if regex_entries.len() > 1 {
                let mut diag = Diagnostic::for_code(
                    codes::VARIABLES_MULTIPLE_REGEX_EXCLUDES,
                    regex_entries[0].1,
                );
                for (_, range) in &regex_entries[1..] {
                    diag = diag.with_related_info(RelatedInfo {
                        location: Location {
                            file: target.file.clone(),
                            range: *range,
                        },
                        message: "Regular expression exclude".to_string(),
                    });
                }
                diagnostics.push(diag);
            }

            for (entry, range) in &regex_entries {
                validate_entry(entry, *range, &mut diagnostics);
            }
        }
        diagnostics
    }
}

fn validate_entry(entry: &str, range: OffsetRange, diagnostics: &mut Vec<Diagnostic>) {
    // entry starts with '/'; the closing delimiter must come after it.
    let body = &entry[1..];
    let Some(close) = body.rfind('/') else {
        diagnostics.push(Diagnostic::for_code(codes::VARIABLES_UNTERMINATED_REGEX, range));
        return;
    };
    let pattern = &body[..close];
    let options = &body[close + 1..];

    if let Err(error) = regex::Regex::new(pattern) {
        diagnostics.push(
            Diagnostic::for_code(codes::VARIABLES_INVALID_REGEX, range)
                .with_message(format!("Invalid regular expression: {error}")),
        );
    }

    let mut seen = HashSet::new();
    let mut has_unknown = false;
    let mut has_duplicate = false;
    for option in options.chars() {
        if !ALLOWED_OPTIONS.contains(option) {
            has_unknown = true;
        } else if !seen.insert(option) {
            has_duplicate = true;
        }
    }
    // An unknown flag makes the whole options substring invalid; only
    // report duplicates when every flag is at least recognized.
    if has_unknown {
        diagnostics.push(Diagnostic::for_code(
            codes::VARIABLES_INVALID_REGEX_OPTIONS,
            range,
        ));
    } else if has_duplicate {
        diagnostics.push(Diagnostic::for_code(
            codes::VARIABLES_DUPLICATE_REGEX_OPTION,
            range,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    const MANIFEST: &str = r#"{"variableDefinition": "variables.json"}"#;

    fn lint_variables(variables: &str) -> Vec<Diagnostic> {
        Fixture::new(MANIFEST)
            .with_file("variables.json", variables)
            .lint_file_with("variables.json", &RegexExcludesRuleImpl)
    }

    #[test]
    fn test_valid_regex_is_clean() {
        let diags = lint_variables(
            r#"{"v": {"excludes": ["/^(?:abc|def)$/i", "literal exclude"]}}"#,
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_invalid_options() {
        let diags = lint_variables(r#"{"v": {"excludes": ["/foo/badoptions"]}}"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::VARIABLES_INVALID_REGEX_OPTIONS);
        assert_eq!(diags[0].message, "Invalid regular expression options");
    }

    #[test]
    fn test_duplicate_options() {
        let diags = lint_variables(r#"{"v": {"excludes": ["/double options/ii"]}}"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::VARIABLES_DUPLICATE_REGEX_OPTION);
        assert_eq!(
            diags[0].message,
            "Duplicate option in regular expression options"
        );
    }

    #[test]
    fn test_missing_closing_delimiter() {
        let diags = lint_variables(r#"{"v": {"excludes": ["/unterminated"]}}"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::VARIABLES_UNTERMINATED_REGEX);
        assert_eq!(diags[0].message, "Missing closing / for regular expression");
    }

    #[test]
    fn test_pattern_that_does_not_compile() {
        let diags = lint_variables(r#"{"v": {"excludes": ["/((/"]}}"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::VARIABLES_INVALID_REGEX);
        assert!(diags[0].message.starts_with("Invalid regular expression:"));
    }

    #[test]
    fn test_multiple_regexes_warn_once_with_related_info() {
        // Three regex entries (validity does not matter for the count):
        // one warning, related info on the two extras.
        let diags = lint_variables(
            r#"{"v": {"excludes": ["/first/", "/second/", "/third/x!"]}}"#,
        );
        let multiple: Vec<_> = diags
            .iter()
            .filter(|d| d.code == codes::VARIABLES_MULTIPLE_REGEX_EXCLUDES)
            .collect();
        assert_eq!(multiple.len(), 1);
        assert_eq!(multiple[0].related_info.len(), 2);

        // The malformed third entry still gets its own diagnostic.
        assert!(diags
            .iter()
            .any(|d| d.code == codes::VARIABLES_INVALID_REGEX_OPTIONS));
    }

    #[test]
    fn test_literal_entries_are_ignored() {
        let diags = lint_variables(
            r#"{"v": {"excludes": ["plain", "another literal", "/one regex/"]}}"#,
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_excludes_checked_per_variable() {
        let diags = lint_variables(
            r#"{
  "a": {"excludes": ["/one/"]},
  "b": {"excludes": ["/two/", "/three/"]}
}"#,
        );
        // Only b has multiple regexes.
        let multiple: Vec<_> = diags
            .iter()
            .filter(|d| d.code == codes::VARIABLES_MULTIPLE_REGEX_EXCLUDES)
            .collect();
        assert_eq!(multiple.len(), 1);
        assert_eq!(multiple[0].related_info.len(), 1);
    }
}
