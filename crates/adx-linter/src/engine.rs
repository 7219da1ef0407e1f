//! The lint engine: runs every applicable rule over one file.

use crate::config::LintConfig;
use crate::context::{LintTarget, TemplateContext};
use crate::registry;
use adx_template::Diagnostic;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Linter that runs the registered rules with a configuration.
pub struct Linter {
    config: LintConfig,
}

impl Linter {
    /// Create a new linter with the given configuration
    #[must_use]
    pub const fn new(config: LintConfig) -> Self {
        Self { config }
    }

    /// Lint one file of a template.
    ///
    /// Runs every registered rule whose applicability matches the target's
    /// role. A rule that panics is caught and logged and contributes zero
    /// diagnostics for this pass — it never aborts the other rules. The
    /// returned list is sorted by `(range.start, code)` so repeated passes
    /// over an unchanged tree produce an identical set.
    #[must_use]
    #[tracing::instrument(skip(self, ctx, target), fields(file = %target.file, role = ?target.role))]
    pub fn lint_file(
        &self,
        ctx: &TemplateContext<'_>,
        target: &LintTarget<'_>,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for rule in registry::template_rules() {
            if !rule.applies_to(target.role) {
                continue;
            }
            let rule_name = rule.name();
            tracing::trace!(rule = rule_name, "Running rule");

            let result = catch_unwind(AssertUnwindSafe(|| rule.check(ctx, target)));
            let rule_diagnostics = match result {
                Ok(diags) => diags,
                Err(_) => {
                    tracing::error!(rule = rule_name, "Lint rule panicked, skipping");
                    continue;
                }
            };

            if !rule_diagnostics.is_empty() {
                tracing::debug!(
                    rule = rule_name,
                    diagnostics = rule_diagnostics.len(),
                    "Rule found issues"
                );
            }

            for mut diag in rule_diagnostics {
                if !self.config.is_enabled(&diag.code) {
                    continue;
                }
                if let Some(severity) = self.config.severity_override(&diag.code) {
                    diag.severity = severity;
                }
                diagnostics.push(diag);
            }
        }

        diagnostics.sort_by(|a, b| {
            (a.range.start, &a.code, a.range.end).cmp(&(b.range.start, &b.code, b.range.end))
        });
        tracing::debug!(total = diagnostics.len(), "File linting complete");
        diagnostics
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(LintConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::Fixture;
    use crate::{LintConfig, LintSeverity, Linter};
    use adx_template::{codes, Severity};

    fn fixture() -> Fixture {
        Fixture::new(
            r#"{
  "templateType": "app",
  "name": "MyTemplate",
  "dashboards": [{"file": "dash.json", "label": "Dash"}],
  "variableDefinition": "variables.json",
  "uiDefinition": "ui.json"
}"#,
        )
        .with_file("variables.json", r#"{"var1": {"variableType": {"type": "StringType"}}}"#)
        .with_file("ui.json", r#"{"pages": [{"variables": [{"name": "var1"}]}]}"#)
    }

    #[test]
    fn test_clean_template_has_no_diagnostics() {
        assert!(fixture().lint_manifest().is_empty());
        assert!(fixture().lint_file("ui.json").is_empty());
    }

    #[test]
    fn test_engine_is_idempotent() {
        let fixture = fixture().mark_missing("dash.json").with_folder_name("Elsewhere");
        let first = fixture.lint_manifest();
        let second = fixture.lint_manifest();
        assert!(!first.is_empty());
        assert_eq!(first, second, "re-running must produce an identical set");
    }

    #[test]
    fn test_severity_override_applies() {
        let mut config = LintConfig::default();
        config.set(codes::REL_PATH_NOT_FOUND, LintSeverity::Error);
        let linter = Linter::new(config);

        let fixture = fixture().mark_missing("dash.json");
        let diags = fixture.run_linter(&linter, None);
        let missing: Vec<_> = diags
            .iter()
            .filter(|d| d.code == codes::REL_PATH_NOT_FOUND)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].severity, Severity::Error);
    }

    #[test]
    fn test_rule_can_be_disabled() {
        let mut config = LintConfig::default();
        config.set(codes::REL_PATH_NOT_FOUND, LintSeverity::Off);
        let linter = Linter::new(config);

        let fixture = fixture().mark_missing("dash.json");
        let diags = fixture.run_linter(&linter, None);
        assert!(diags.iter().all(|d| d.code != codes::REL_PATH_NOT_FOUND));
    }

    #[test]
    fn test_diagnostics_sorted_by_position() {
        let fixture = fixture()
            .with_folder_name("Elsewhere")
            .mark_missing("dash.json")
            .mark_missing("variables.json");
        let diags = fixture.lint_manifest();
        let starts: Vec<_> = diags.iter().map(|d| d.range.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }
}
