//! Deprecated-field-combination checks.
//!
//! `assetIcon` alongside `icons.appBadge` is a Warning (the old field is
//! simply shadowed). `ruleDefinition` alongside `rules` is an Error: the
//! runtime ignores one of them and that is invariably developer error.

use crate::traits::{LintRule, TemplateLintRule};
use crate::{LintTarget, TemplateContext};
use adx_template::{codes, Diagnostic, FileRole, Location, RelatedInfo};

pub struct DeprecatedFieldsRuleImpl;

impl LintRule for DeprecatedFieldsRuleImpl {
    fn name(&self) -> &'static str {
        "deprecated_fields"
    }

    fn description(&self) -> &'static str {
        "Detects simultaneous use of a deprecated manifest field and its replacement"
    }
}

impl TemplateLintRule for DeprecatedFieldsRuleImpl {
    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::TemplateInfo
    }

    fn check(&self, _ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic> {
        let tree = target.tree;
        let Some(root) = tree.root() else {
            return Vec::new();
        };
        let mut diagnostics = Vec::new();

        let app_badge = tree
            .object_get(root, "icons")
            .and_then(|icons| tree.object_property(icons, "appBadge"));
        if let (Some(asset_icon), Some(badge)) =
            (tree.object_property(root, "assetIcon"), app_badge)
        {
            diagnostics.push(
                Diagnostic::for_code(codes::ASSET_ICON_AND_BADGE, tree.span(asset_icon))
                    .with_related_info(RelatedInfo {
                        location: Location {
                            file: target.file.clone(),
                            range: tree.span(badge),
                        },
                        message: "icons.appBadge specified here".to_string(),
                    }),
            );
        }

        if let (Some(rule_definition), Some(rules)) = (
            tree.object_property(root, "ruleDefinition"),
            tree.object_property(root, "rules"),
        ) {
            diagnostics.push(
                Diagnostic::for_code(codes::RULE_DEFINITION_CONFLICT, tree.span(rule_definition))
                    .with_related_info(RelatedInfo {
                        location: Location {
                            file: target.file.clone(),
                            range: tree.span(rules),
                        },
                        message: "rules specified here".to_string(),
                    }),
            );
        }

        diagnostics
    }
}
