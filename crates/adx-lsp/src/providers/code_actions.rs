//! Quick fixes driven by diagnostic `code` + `args`.
//!
//! The linter publishes machine-readable args on its diagnostics (carried
//! here in the LSP diagnostic's `data`); this provider turns them into
//! edits without re-deriving anything:
//!
//! - `page.unknown-variable` with a `match` arg → rename the reference.
//! - deprecated-field conflicts → remove the deprecated property, using
//!   the trailing-comma-aware range so the edit leaves valid JSON.

use crate::conversions::{convert_position, convert_range};
use crate::documents::DocumentStore;
use adx_json::{range_for_node, LineIndex, NodeKind};
use adx_template::codes;
use lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Diagnostic, NumberOrString, TextEdit, Uri,
    WorkspaceEdit,
};
use std::collections::HashMap;
use std::path::Path;

pub async fn code_actions(
    docs: &DocumentStore,
    uri: &Uri,
    path: &Path,
    diagnostics: &[Diagnostic],
) -> Option<Vec<CodeActionOrCommand>> {
    let text = docs.read_text(&path.to_string_lossy()).await?;
    let index = LineIndex::new(&text);

    let mut actions = Vec::new();
    for diag in diagnostics {
        let Some(NumberOrString::String(code)) = &diag.code else {
            continue;
        };
        let action = match code.as_str() {
            codes::PAGE_UNKNOWN_VARIABLE => rename_variable_action(uri, diag),
            codes::ASSET_ICON_AND_BADGE | codes::RULE_DEFINITION_CONFLICT => {
                remove_property_action(uri, diag, &text, &index)
            }
            _ => None,
        };
        actions.extend(action.map(CodeActionOrCommand::CodeAction));
    }
    Some(actions)
}

/// Replace the misspelled reference with the suggested match from the
/// diagnostic's args.
fn rename_variable_action(uri: &Uri, diag: &Diagnostic) -> Option<CodeAction> {
    let suggestion = diag.data.as_ref()?.get("match")?.as_str()?.to_string();
    let edit = TextEdit {
        range: diag.range,
        new_text: format!("\"{suggestion}\""),
    };
    Some(quick_fix(
        format!("Switch to '{suggestion}'"),
        uri,
        diag,
        edit,
    ))
}

/// Remove the deprecated property the diagnostic is anchored on.
fn remove_property_action(
    uri: &Uri,
    diag: &Diagnostic,
    text: &str,
    index: &LineIndex,
) -> Option<CodeAction> {
    let offset = convert_position(index, diag.range.start)?;
    let parse = adx_json::parse(text);
    let tree = &parse.tree;

    let mut node = tree.node_at_offset(offset)?;
    while !matches!(tree.kind(node), NodeKind::Property { .. }) {
        node = tree.parent(node)?;
    }
    let name = tree.property_name(node).unwrap_or_default().to_string();
    let removal = range_for_node(tree, node, true);

    let edit = TextEdit {
        range: convert_range(index, removal),
        new_text: String::new(),
    };
    Some(quick_fix(format!("Remove {name}"), uri, diag, edit))
}

fn quick_fix(title: String, uri: &Uri, diag: &Diagnostic, edit: TextEdit) -> CodeAction {
    let mut changes = HashMap::new();
    changes.insert(uri.clone(), vec![edit]);
    CodeAction {
        title,
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diag.clone()]),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }),
        ..Default::default()
    }
}
