//! Trait hierarchy for lint rules.

use crate::context::{LintTarget, TemplateContext};
use adx_template::{Diagnostic, FileRole};

/// Base trait for all lint rules
pub trait LintRule: Send + Sync {
    /// Unique identifier for this rule (e.g., `"relative_paths"`)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;
}

/// A semantic check over one file of a template.
///
/// Each rule declares which file roles it runs against; the engine calls
/// [`check`](TemplateLintRule::check) once per matching file-lint
/// invocation. Rules must be stateless — every invocation receives the
/// full context it needs and returns a fresh diagnostic list.
pub trait TemplateLintRule: LintRule {
    /// Whether this rule runs against files of the given role.
    fn applies_to(&self, role: FileRole) -> bool;

    /// Check one file. The target's tree is always parsed (unparsable
    /// files never reach the engine); sibling trees in the context may be
    /// absent and rules must degrade to "nothing to check" for them.
    fn check(&self, ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic>;
}
