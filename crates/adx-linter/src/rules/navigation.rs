//! Page `navigation` objects are inert unless the layout declares a
//! `navigationPanel` — a "field present but has no effect" check.

use crate::traits::{LintRule, TemplateLintRule};
use crate::{LintTarget, TemplateContext};
use adx_json::{match_pattern, JsonPath};
use adx_template::{codes, Diagnostic, FileRole};

pub struct NavigationPanelRuleImpl;

impl LintRule for NavigationPanelRuleImpl {
    fn name(&self) -> &'static str {
        "navigation_panel"
    }

    fn description(&self) -> &'static str {
        "Flags page navigation objects when the layout has no navigationPanel"
    }
}

impl TemplateLintRule for NavigationPanelRuleImpl {
    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::Layout
    }

    fn check(&self, _ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic> {
        let tree = target.tree;
        let Some(root) = tree.root() else {
            return Vec::new();
        };
        if tree.object_get(root, "navigationPanel").is_some() {
            return Vec::new();
        }

        let mut diagnostics = Vec::new();
        for m in match_pattern(tree, &JsonPath::pattern(&["pages", "*", "navigation"]), None) {
            // Anchor on the whole navigation property.
            let anchor = tree
                .parent(m.node)
                .map_or_else(|| tree.span(m.node), |prop| tree.span(prop));
            diagnostics.push(Diagnostic::for_code(
                codes::NAVIGATION_WITHOUT_PANEL,
                anchor,
            ));
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    const MANIFEST: &str = r#"{"layoutDefinition": "layout.json"}"#;

    #[test]
    fn test_navigation_with_panel_is_clean() {
        let diags = Fixture::new(MANIFEST)
            .with_file(
                "layout.json",
                r#"{"navigationPanel": {"title": "Nav"}, "pages": [{"navigation": {"label": "P1"}}]}"#,
            )
            .lint_file_with("layout.json", &NavigationPanelRuleImpl);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_navigation_without_panel_warns_per_page() {
        let diags = Fixture::new(MANIFEST)
            .with_file(
                "layout.json",
                r#"{"pages": [{"navigation": {"label": "P1"}}, {"navigation": {"label": "P2"}}, {"title": "none"}]}"#,
            )
            .lint_file_with("layout.json", &NavigationPanelRuleImpl);
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.code == codes::NAVIGATION_WITHOUT_PANEL));
    }

    #[test]
    fn test_pages_without_navigation_are_clean() {
        let diags = Fixture::new(MANIFEST)
            .with_file("layout.json", r#"{"pages": [{"title": "plain"}]}"#)
            .lint_file_with("layout.json", &NavigationPanelRuleImpl);
        assert!(diags.is_empty());
    }
}
