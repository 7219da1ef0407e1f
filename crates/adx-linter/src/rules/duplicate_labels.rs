//! Duplicate-label detection across labeled manifest array entries.

use crate::traits::{LintRule, TemplateLintRule};
use crate::{LintTarget, TemplateContext};
use adx_json::{match_pattern, JsonPath, JsonTree, NodeId, OffsetRange};
use adx_template::{codes, Diagnostic, FileRole, Location, RelatedInfo};
use std::collections::HashMap;

/// Manifest arrays whose entries carry user-facing labels.
const LABELED_ARRAY_FIELDS: &[&str] = &[
    "dashboards",
    "components",
    "lenses",
    "dataflows",
    "eltDataflows",
    "recipes",
    "datasetFiles",
    "externalFiles",
    "imageFiles",
];

pub struct DuplicateLabelsRuleImpl;

impl LintRule for DuplicateLabelsRuleImpl {
    fn name(&self) -> &'static str {
        "duplicate_labels"
    }

    fn description(&self) -> &'static str {
        "Detects repeated labels across the manifest's labeled array entries"
    }
}

impl TemplateLintRule for DuplicateLabelsRuleImpl {
    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::TemplateInfo
    }

    fn check(&self, _ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic> {
        let tree = target.tree;
        let only_strings = |tree: &JsonTree, node: NodeId| tree.string_value(node).is_some();

        // All label occurrences in document order, pooled across kinds:
        // a dashboard and a lens sharing a label still collide.
        let mut occurrences: Vec<(String, OffsetRange)> = Vec::new();
        for &field in LABELED_ARRAY_FIELDS {
            for m in match_pattern(
                tree,
                &JsonPath::pattern(&[field, "*", "label"]),
                Some(&only_strings),
            ) {
                let label = tree.string_value(m.node).unwrap_or_default().to_string();
                occurrences.push((label, tree.span(m.node)));
            }
        }
        for m in match_pattern(
            tree,
            &JsonPath::pattern(&["extendedTypes", "*", "*", "label"]),
            Some(&only_strings),
        ) {
            let label = tree.string_value(m.node).unwrap_or_default().to_string();
            occurrences.push((label, tree.span(m.node)));
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (label, _) in &occurrences {
            *counts.entry(label.as_str()).or_default() += 1;
        }

        let mut diagnostics = Vec::new();
        for (label, range) in &occurrences {
            if counts[label.as_str()] < 2 {
                continue;
            }
            let mut diag = Diagnostic::for_code(codes::DUPLICATE_LABEL, *range)
                .with_message(format!("Duplicate label '{label}'"));
            for (other_label, other_range) in &occurrences {
                if other_label == label && other_range != range {
                    diag = diag.with_related_info(RelatedInfo {
                        location: Location {
                            file: target.file.clone(),
                            range: *other_range,
                        },
                        message: "Other usage".to_string(),
                    });
                }
            }
            diagnostics.push(diag);
        }
        diagnostics
    }
}
