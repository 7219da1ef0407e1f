//! Required-object-count checks for the manifest's template type.
//!
//! Dashboard templates must declare exactly one dashboard. App templates
//! must declare at least one content object (dashboard, component,
//! dataflow, dataset, external file, lens, or recipe); when the arrays are
//! present but all empty, each empty array is called out via related
//! information.

use crate::traits::{LintRule, TemplateLintRule};
use crate::{LintTarget, TemplateContext};
use adx_template::{codes, Diagnostic, FileRole, Location, RelatedInfo, TemplateType};

/// Content-bearing manifest fields counted for app templates.
const APP_CONTENT_FIELDS: &[&str] = &[
    "dashboards",
    "components",
    "lenses",
    "dataflows",
    "eltDataflows",
    "recipes",
    "datasetFiles",
    "externalFiles",
];

pub struct TemplateContentsRuleImpl;

impl LintRule for TemplateContentsRuleImpl {
    fn name(&self) -> &'static str {
        "template_contents"
    }

    fn description(&self) -> &'static str {
        "Ensures the manifest declares the content objects its templateType requires"
    }
}

impl TemplateLintRule for TemplateContentsRuleImpl {
    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::TemplateInfo
    }

    fn check(&self, ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic> {
        let tree = target.tree;
        let Some(root) = tree.root() else {
            return Vec::new();
        };
        let Some(template_type) = ctx.model.template_type() else {
            return Vec::new();
        };

        match template_type {
            TemplateType::Dashboard => {
                let dashboards = tree.object_get(root, "dashboards");
                let count = dashboards.map_or(0, |node| tree.array_items(node).len());
                if count == 1 {
                    return Vec::new();
                }
                // Anchor on the dashboards node when the field is present
                // (empty or over-full); on templateType when it is absent.
                let anchor = dashboards
                    .or_else(|| tree.object_get(root, "templateType"))
                    .map_or_else(|| tree.span(root), |node| tree.span(node));
                vec![Diagnostic::for_code(codes::DASHBOARD_COUNT, anchor)]
            }
            TemplateType::App => {
                let mut total = 0;
                let mut empty_arrays = Vec::new();
                for field in APP_CONTENT_FIELDS {
                    if let Some(node) = tree.object_get(root, field) {
                        let count = tree.array_items(node).len();
                        total += count;
                        if count == 0 {
                            empty_arrays.push((*field, tree.span(node)));
                        }
                    }
                }
                if total > 0 {
                    return Vec::new();
                }
                let anchor = tree
                    .object_get(root, "templateType")
                    .map_or_else(|| tree.span(root), |node| tree.span(node));
                let mut diag = Diagnostic::for_code(codes::APP_CONTENTS, anchor);
                for (field, range) in empty_arrays {
                    diag = diag.with_related_info(RelatedInfo {
                        location: Location {
                            file: target.file.clone(),
                            range,
                        },
                        message: format!("Empty {field} array"),
                    });
                }
                vec![diag]
            }
            _ => Vec::new(),
        }
    }
}
