//! The manifest's `name` must equal the basename of its directory.

use crate::traits::{LintRule, TemplateLintRule};
use crate::{LintTarget, TemplateContext};
use adx_template::{codes, Diagnostic, FileRole};

pub struct NameMatchesFolderRuleImpl;

impl LintRule for NameMatchesFolderRuleImpl {
    fn name(&self) -> &'static str {
        "name_matches_folder"
    }

    fn description(&self) -> &'static str {
        "Checks that the manifest's name equals the containing folder name"
    }
}

impl TemplateLintRule for NameMatchesFolderRuleImpl {
    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::TemplateInfo
    }

    fn check(&self, ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic> {
        let tree = target.tree;
        let Some(root) = tree.root() else {
            return Vec::new();
        };
        let Some(name_node) = tree.object_get(root, "name") else {
            return Vec::new();
        };
        let Some(name) = tree.string_value(name_node) else {
            return Vec::new();
        };
        if name == ctx.folder_name {
            return Vec::new();
        }
        vec![
            Diagnostic::for_code(codes::NAME_FOLDER_MATCH, tree.span(name_node)).with_message(
                format!(
                    "Template name '{name}' should match the containing folder name '{}'",
                    ctx.folder_name
                ),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn test_matching_name_is_clean() {
        let diags = Fixture::new(r#"{"name": "MyTemplate"}"#)
            .with_folder_name("MyTemplate")
            .lint_manifest_with(&NameMatchesFolderRuleImpl);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_mismatched_name_warns() {
        let diags = Fixture::new(r#"{"name": "Renamed"}"#)
            .with_folder_name("MyTemplate")
            .lint_manifest_with(&NameMatchesFolderRuleImpl);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::NAME_FOLDER_MATCH);
        assert_eq!(
            diags[0].message,
            "Template name 'Renamed' should match the containing folder name 'MyTemplate'"
        );
    }

    #[test]
    fn test_absent_name_is_unchecked() {
        let diags = Fixture::new(r#"{"templateType": "app"}"#)
            .lint_manifest_with(&NameMatchesFolderRuleImpl);
        assert!(diags.is_empty());
    }
}
