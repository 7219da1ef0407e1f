//! Cross-file duplicate-name detection for rules files.
//!
//! Constants, rule names, and macro `namespace:name` pairs must be unique
//! across *all* rules files of the same rule-type bucket in one template.
//! Buckets are isolated: an `appToTemplate` constant never conflicts with
//! a `templateToApp` one, and neither conflicts with the legacy
//! `ruleDefinition` file.
//!
//! For a name with N occurrences, each occurrence in the lint target gets
//! one diagnostic whose related information points at every other
//! occurrence — including those in sibling files.

use crate::traits::{LintRule, TemplateLintRule};
use crate::{LintTarget, TemplateContext};
use adx_json::{match_pattern, JsonPath, JsonTree, NodeId, OffsetRange};
use adx_template::{codes, Diagnostic, FileId, FileRole, Location, RelatedInfo};
use std::collections::BTreeMap;

pub struct DuplicateNamesRuleImpl;

impl LintRule for DuplicateNamesRuleImpl {
    fn name(&self) -> &'static str {
        "duplicate_rule_names"
    }

    fn description(&self) -> &'static str {
        "Ensures constants, rule names, and macros are unique across a bucket's rules files"
    }
}

#[derive(Debug, Clone)]
struct Occurrence {
    file: FileId,
    range: OffsetRange,
}

/// name → occurrences, ordered by name for deterministic emission.
type NameMap = BTreeMap<String, Vec<Occurrence>>;

impl TemplateLintRule for DuplicateNamesRuleImpl {
    fn applies_to(&self, role: FileRole) -> bool {
        matches!(role, FileRole::Rules(_))
    }

    fn check(&self, ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic> {
        let FileRole::Rules(bucket) = target.role else {
            return Vec::new();
        };

        let mut files = ctx.rules_files(bucket);
        if !files.iter().any(|(file, _)| *file == target.file) {
            // The manifest no longer references the target; lint it alone.
            files = vec![(target.file, target.tree)];
        }

        let mut constants = NameMap::new();
        let mut rule_names = NameMap::new();
        let mut macros = NameMap::new();
        for (file, tree) in &files {
            collect_names(tree, &JsonPath::pattern(&["constants", "*", "name"]), file, &mut constants);
            collect_names(tree, &JsonPath::pattern(&["rules", "*", "name"]), file, &mut rule_names);
            collect_macros(tree, file, &mut macros);
        }

        let mut diagnostics = Vec::new();
        emit(&constants, target, codes::RULES_DUPLICATE_CONSTANT, "constant", &mut diagnostics);
        emit(&rule_names, target, codes::RULES_DUPLICATE_RULE_NAME, "rule name", &mut diagnostics);
        emit(&macros, target, codes::RULES_DUPLICATE_MACRO, "macro", &mut diagnostics);
        diagnostics
    }
}

fn collect_names(tree: &JsonTree, pattern: &JsonPath, file: &FileId, into: &mut NameMap) {
    let only_strings = |tree: &JsonTree, node: NodeId| tree.string_value(node).is_some();
    for m in match_pattern(tree, pattern, Some(&only_strings)) {
        let name = tree.string_value(m.node).unwrap_or_default().to_string();
        into.entry(name).or_default().push(Occurrence {
            file: file.clone(),
            range: tree.span(m.node),
        });
    }
}

/// Macro identity is `namespace:name`, with the namespace taken from the
/// definition's containing `macros` entry.
fn collect_macros(tree: &JsonTree, file: &FileId, into: &mut NameMap) {
    for m in match_pattern(tree, &JsonPath::pattern(&["macros", "*"]), None) {
        let namespace = tree
            .object_get(m.node, "namespace")
            .and_then(|node| tree.string_value(node))
            .unwrap_or_default()
            .to_string();
        let Some(definitions) = tree.object_get(m.node, "definitions") else {
            continue;
        };
        for def in tree.array_items(definitions) {
            let Some(name_node) = tree.object_get(*def, "name") else {
                continue;
            };
            let Some(name) = tree.string_value(name_node) else {
                continue;
            };
            into.entry(format!("{namespace}:{name}"))
                .or_default()
                .push(Occurrence {
                    file: file.clone(),
                    range: tree.span(name_node),
                });
        }
    }
}

fn emit(
    names: &NameMap,
    target: &LintTarget<'_>,
    code: &str,
    noun: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (name, occurrences) in names {
        if occurrences.len() < 2 {
            continue;
        }
        for occurrence in occurrences {
            if occurrence.file != *target.file {
                continue;
            }
            let mut diag = Diagnostic::for_code(code, occurrence.range)
                .with_message(format!("Duplicate {noun} '{name}'"));
            for other in occurrences {
                if other.file == occurrence.file && other.range == occurrence.range {
                    continue;
                }
                diag = diag.with_related_info(RelatedInfo {
                    location: Location {
                        file: other.file.clone(),
                        range: other.range,
                    },
                    message: "Other usage".to_string(),
                });
            }
            diagnostics.push(diag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    const MANIFEST: &str = r#"{
  "rules": [
    {"type": "appToTemplate", "file": "rules1.json"},
    {"type": "appToTemplate", "file": "rules2.json"},
    {"type": "templateToApp", "file": "t2a.json"}
  ]
}"#;

    #[test]
    fn test_unique_names_are_clean() {
        let diags = Fixture::new(MANIFEST)
            .with_file("rules1.json", r#"{"constants": [{"name": "A", "value": 1}]}"#)
            .with_file("rules2.json", r#"{"constants": [{"name": "B", "value": 2}]}"#)
            .with_file("t2a.json", "{}")
            .lint_file_with("rules1.json", &DuplicateNamesRuleImpl);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_duplicate_constant_across_files() {
        let fixture = Fixture::new(MANIFEST)
            .with_file("rules1.json", r#"{"constants": [{"name": "Shared", "value": 1}]}"#)
            .with_file("rules2.json", r#"{"constants": [{"name": "Shared", "value": 2}]}"#)
            .with_file("t2a.json", "{}");

        let diags = fixture.lint_file_with("rules1.json", &DuplicateNamesRuleImpl);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::RULES_DUPLICATE_CONSTANT);
        assert_eq!(diags[0].message, "Duplicate constant 'Shared'");
        // The single related entry points into the sibling file.
        assert_eq!(diags[0].related_info.len(), 1);
        assert_eq!(diags[0].related_info[0].location.file.as_str(), "rules2.json");

        // The sibling file's own pass emits its occurrence too.
        let sibling = fixture.lint_file_with("rules2.json", &DuplicateNamesRuleImpl);
        assert_eq!(sibling.len(), 1);
        assert_eq!(sibling[0].related_info[0].location.file.as_str(), "rules1.json");
    }

    #[test]
    fn test_buckets_are_isolated() {
        let diags = Fixture::new(MANIFEST)
            .with_file("rules1.json", r#"{"constants": [{"name": "Shared", "value": 1}]}"#)
            .with_file("rules2.json", "{}")
            .with_file("t2a.json", r#"{"constants": [{"name": "Shared", "value": 2}]}"#)
            .lint_file_with("rules1.json", &DuplicateNamesRuleImpl);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_duplicate_within_one_file() {
        let diags = Fixture::new(MANIFEST)
            .with_file(
                "rules1.json",
                r#"{"rules": [{"name": "r1"}, {"name": "r1"}, {"name": "r2"}]}"#,
            )
            .with_file("rules2.json", "{}")
            .with_file("t2a.json", "{}")
            .lint_file_with("rules1.json", &DuplicateNamesRuleImpl);
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.code == codes::RULES_DUPLICATE_RULE_NAME));
        assert!(diags.iter().all(|d| d.related_info.len() == 1));
    }

    #[test]
    fn test_macro_identity_includes_namespace() {
        let rules1 = r#"{
  "macros": [
    {"namespace": "ns1", "definitions": [{"name": "m", "returns": "x"}]},
    {"namespace": "ns2", "definitions": [{"name": "m", "returns": "y"}]}
  ]
}"#;
        // Same definition name under different namespaces: no conflict.
        let diags = Fixture::new(MANIFEST)
            .with_file("rules1.json", rules1)
            .with_file("rules2.json", "{}")
            .with_file("t2a.json", "{}")
            .lint_file_with("rules1.json", &DuplicateNamesRuleImpl);
        assert!(diags.is_empty());

        // Same namespace:name across files: conflict.
        let diags = Fixture::new(MANIFEST)
            .with_file(
                "rules1.json",
                r#"{"macros": [{"namespace": "ns", "definitions": [{"name": "m", "returns": "x"}]}]}"#,
            )
            .with_file(
                "rules2.json",
                r#"{"macros": [{"namespace": "ns", "definitions": [{"name": "m", "returns": "y"}]}]}"#,
            )
            .with_file("t2a.json", "{}")
            .lint_file_with("rules1.json", &DuplicateNamesRuleImpl);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::RULES_DUPLICATE_MACRO);
        assert_eq!(diags[0].message, "Duplicate macro 'ns:m'");
    }

    #[test]
    fn test_legacy_rule_definition_is_its_own_bucket() {
        let manifest = r#"{
  "ruleDefinition": "legacy.json",
  "rules": [{"type": "appToTemplate", "file": "rules1.json"}]
}"#;
        let diags = Fixture::new(manifest)
            .with_file("legacy.json", r#"{"constants": [{"name": "C", "value": 1}]}"#)
            .with_file("rules1.json", r#"{"constants": [{"name": "C", "value": 2}]}"#)
            .lint_file_with("legacy.json", &DuplicateNamesRuleImpl);
        assert!(diags.is_empty());
    }
}
