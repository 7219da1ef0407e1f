//! Relative-path validation for every path-valued manifest field.
//!
//! Each declared path must be non-empty and relative, must not name the
//! manifest itself, must not traverse out of the template directory, and
//! must point at an existing regular file. Separately, any relative path
//! used by more than one field gets a diagnostic per occurrence with
//! related information listing every other occurrence.

use crate::traits::{LintRule, TemplateLintRule};
use crate::{LintTarget, TemplateContext};
use adx_template::{
    codes, Diagnostic, FileRole, Location, RelatedInfo, MANIFEST_FILE_NAME,
};
use std::collections::HashMap;

pub struct RelativePathsRuleImpl;

impl LintRule for RelativePathsRuleImpl {
    fn name(&self) -> &'static str {
        "relative_paths"
    }

    fn description(&self) -> &'static str {
        "Validates every path-valued manifest field and flags duplicate path usage"
    }
}

impl TemplateLintRule for RelativePathsRuleImpl {
    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::TemplateInfo
    }

    fn check(&self, ctx: &TemplateContext<'_>, target: &LintTarget<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let entries = ctx.model.entries();

        for entry in entries {
            let rel_path = entry.rel_path.as_str();
            // First failure mode wins per entry; the checks are ordered
            // from "cannot possibly resolve" to "does not resolve today".
            if rel_path.is_empty() || is_absolute(rel_path) {
                diagnostics.push(Diagnostic::for_code(codes::REL_PATH_EMPTY, entry.range));
            } else if rel_path == MANIFEST_FILE_NAME {
                diagnostics.push(Diagnostic::for_code(codes::REL_PATH_SELF, entry.range));
            } else if rel_path.split(['/', '\\']).any(|part| part == "..") {
                diagnostics.push(Diagnostic::for_code(codes::REL_PATH_TRAVERSAL, entry.range));
            } else {
                let stat = ctx.fs.stat(rel_path);
                if !stat.exists {
                    diagnostics.push(Diagnostic::for_code(codes::REL_PATH_NOT_FOUND, entry.range));
                } else if !stat.is_file {
                    diagnostics
                        .push(Diagnostic::for_code(codes::REL_PATH_NOT_A_FILE, entry.range));
                }
            }
        }

        // Duplicate usage across all path-valued fields of this manifest.
        let mut usage: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            if !entry.rel_path.is_empty() {
                usage.entry(entry.rel_path.as_str()).or_default().push(index);
            }
        }
        for entry in entries {
            let Some(occurrences) = usage.get(entry.rel_path.as_str()) else {
                continue;
            };
            if occurrences.len() < 2 {
                continue;
            }
            let mut diag = Diagnostic::for_code(codes::REL_PATH_DUPLICATE, entry.range)
                .with_message(format!("Duplicate usage of path {}", entry.rel_path));
            for other_index in occurrences {
                let other = &entries[*other_index];
                if other.range == entry.range {
                    continue;
                }
                diag = diag.with_related_info(RelatedInfo {
                    location: Location {
                        file: target.file.clone(),
                        range: other.range,
                    },
                    message: "Other usage".to_string(),
                });
            }
            diagnostics.push(diag);
        }

        diagnostics
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
        || path.starts_with('\\')
        || path.chars().nth(1) == Some(':')
}
