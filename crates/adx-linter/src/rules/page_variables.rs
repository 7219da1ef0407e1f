//! Variable-reference checks for `ui.json` / `layout.json` pages.
//!
//! Every page variable reference must resolve against the template's
//! `variables.json`. Unknown names get a "did you mean" suggestion when a
//! declared name is close enough, with `args = {name, match?}` for the
//! rename quick fix. Resolved references are additionally checked against
//! the variable types a page cannot host.

use crate::fuzzy::did_you_mean;
use crate::traits::{LintRule, TemplateLintRule};
use crate::variables::VariableIndex;
use crate::{LintTarget, TemplateContext};
use adx_json::{match_pattern, JsonPath, JsonTree, OffsetRange};
use adx_template::{codes, Diagnostic, FileRole, Location, RelatedInfo, TemplateType};

/// All page variable references in a ui or layout tree, in document order.
///
/// `ui.json` references live at `pages[*].variables[*].name`. The layout
/// format references variables through items of `"type": "Variable"`,
/// which may be nested one level inside GroupBox items.
fn page_variable_refs(tree: &JsonTree, role: FileRole) -> Vec<(String, OffsetRange)> {
    let mut refs = Vec::new();
    match role {
        FileRole::Ui => {
            for m in match_pattern(
                tree,
                &JsonPath::pattern(&["pages", "*", "variables", "*", "name"]),
                None,
            ) {
                if let Some(name) = tree.string_value(m.node) {
                    refs.push((name.to_string(), tree.span(m.node)));
                }
            }
        }
        FileRole::Layout => {
            let patterns = [
                JsonPath::pattern(&["pages", "*", "layout", "*", "items", "*"]),
                JsonPath::pattern(&["pages", "*", "layout", "*", "items", "*", "items", "*"]),
            ];
            for pattern in &patterns {
                for m in match_pattern(tree, pattern, None) {
                    let is_variable_item = tree
                        .object_get(m.node, "type")
                        .and_then(|t| tree.string_value(t))
                        == Some("Variable");
                    if !is_variable_item {
                        continue;
                    }
                    if let Some(name_node) = tree.object_get(m.node, "name") {
                        if let Some(name) = tree.string_value(name_node) {
                            refs.push((name.to_string(), tree.span(name_node)));
                        }
                    }
                }
            }
        }
        _ => {}
    }
    refs
}

/// Unknown-variable references, with fuzzy suggestions.
pub struct UnknownVariablesRuleImpl;

impl LintRule for UnknownVariablesRuleImpl {
    fn name(&self) -> &'static str {
        "unknown_variables"
    }

    fn description(&self) -> &'static str {
        "Resolves page variable references against variables.json"
    }
}

impl TemplateLintRule for UnknownVariablesRuleImpl {
    fn applies_to(&self, role: FileRole) -> bool {
        matches!(role, FileRole::Ui | FileRole::Layout)
    }

    fn check(&self, ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic> {
        // No parsed variables definition: nothing to resolve against.
        let Some((_, variables_tree)) = ctx.variables() else {
            return Vec::new();
        };
        let index = VariableIndex::from_tree(variables_tree);

        let mut diagnostics = Vec::new();
        for (name, range) in page_variable_refs(target.tree, target.role) {
            if index.get(&name).is_some() {
                continue;
            }
            let suggestion = did_you_mean(&name, index.names());
            let message = match suggestion {
                Some(best) => format!("Cannot find variable '{name}', did you mean '{best}'?"),
                None => format!("Cannot find variable '{name}'"),
            };
            let mut diag = Diagnostic::for_code(codes::PAGE_UNKNOWN_VARIABLE, range)
                .with_message(message)
                .with_arg("name", name.clone());
            if let Some(best) = suggestion {
                diag = diag.with_arg("match", best);
            }
            diagnostics.push(diag);
        }
        diagnostics
    }
}

/// Disallowed variable types in page references.
pub struct VariableTypesRuleImpl;

impl LintRule for VariableTypesRuleImpl {
    fn name(&self) -> &'static str {
        "page_variable_types"
    }

    fn description(&self) -> &'static str {
        "Flags page references to variable types pages cannot host"
    }
}

impl TemplateLintRule for VariableTypesRuleImpl {
    fn applies_to(&self, role: FileRole) -> bool {
        matches!(role, FileRole::Ui | FileRole::Layout)
    }

    fn check(&self, ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic> {
        let Some((variables_file, variables_tree)) = ctx.variables() else {
            return Vec::new();
        };
        let index = VariableIndex::from_tree(variables_tree);
        let template_type = ctx.model.template_type();

        let mut diagnostics = Vec::new();
        for (name, range) in page_variable_refs(target.tree, target.role) {
            let Some(def) = index.get(&name) else {
                continue;
            };
            let Some(type_name) = def.type_name.as_deref() else {
                continue;
            };
            let message = match type_name {
                "ObjectType" => "ObjectType variables cannot be used on a page",
                "DateTimeType" => "DateTimeType variables cannot be used on a page",
                "DatasetAnyFieldType" if template_type != Some(TemplateType::Data) => {
                    "DatasetAnyFieldType variables can only be used in data templates"
                }
                _ => continue,
            };
            diagnostics.push(
                Diagnostic::for_code(codes::PAGE_UNSUPPORTED_VARIABLE_TYPE, range)
                    .with_message(message)
                    .with_related_info(RelatedInfo {
                        location: Location {
                            file: variables_file.clone(),
                            range: def.name_range,
                        },
                        message: "Variable defined here".to_string(),
                    }),
            );
        }
        diagnostics
    }
}
