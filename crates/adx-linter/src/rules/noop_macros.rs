//! A macro definition with neither a return value nor actions does
//! nothing; that is almost always an authoring mistake, flagged at
//! Information severity.

use crate::traits::{LintRule, TemplateLintRule};
use crate::{LintTarget, TemplateContext};
use adx_json::{match_pattern, JsonPath};
use adx_template::{codes, Diagnostic, FileRole};

pub struct NoopMacrosRuleImpl;

impl LintRule for NoopMacrosRuleImpl {
    fn name(&self) -> &'static str {
        "noop_macros"
    }

    fn description(&self) -> &'static str {
        "Flags macro definitions with no return value and no actions"
    }
}

impl TemplateLintRule for NoopMacrosRuleImpl {
    fn applies_to(&self, role: FileRole) -> bool {
        matches!(role, FileRole::Rules(_))
    }

    fn check(&self, _ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic> {
        let tree = target.tree;
        let mut diagnostics = Vec::new();

        for m in match_pattern(
            tree,
            &JsonPath::pattern(&["macros", "*", "definitions", "*"]),
            None,
        ) {
            let has_returns = tree.object_get(m.node, "returns").is_some();
            let has_actions = tree
                .object_get(m.node, "actions")
                .is_some_and(|actions| !tree.array_items(actions).is_empty());
            if has_returns || has_actions {
                continue;
            }
            // Anchor on the definition's name when present, else the
            // whole definition object.
            let anchor = tree
                .object_get(m.node, "name")
                .map_or_else(|| tree.span(m.node), |name| tree.span(name));
            diagnostics.push(Diagnostic::for_code(codes::RULES_NOOP_MACRO, anchor));
        }
        diagnostics
    }
}
