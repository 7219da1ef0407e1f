//! Variable-name completions inside ui/layout page variable references.

use super::{variable_ref_at, TemplateView};
use crate::conversions::convert_position;
use crate::documents::DocumentStore;
use adx_json::LineIndex;
use adx_linter::VariableIndex;
use adx_template::FileRole;
use lsp_types::{CompletionItem, CompletionItemKind, Position};
use std::path::Path;

pub async fn completions(
    docs: &DocumentStore,
    path: &Path,
    position: Position,
) -> Option<Vec<CompletionItem>> {
    let view = TemplateView::discover(docs, path).await?;
    let role = view.role_of(path)?;
    if !matches!(role, FileRole::Ui | FileRole::Layout) {
        return None;
    }

    let text = docs.read_text(&path.to_string_lossy()).await?;
    let index = LineIndex::new(&text);
    let offset = convert_position(&index, position)?;
    let parse = adx_json::parse(&text);
    variable_ref_at(&parse.tree, offset)?;

    let variables_path = view.path_of_role(FileRole::Variables)?;
    let variables_text = docs
        .read_text(&variables_path.to_string_lossy())
        .await?;
    let variables = VariableIndex::from_tree(&adx_json::parse(&variables_text).tree);

    let items = variables
        .variables()
        .iter()
        .map(|def| CompletionItem {
            label: def.name.clone(),
            kind: Some(CompletionItemKind::VARIABLE),
            detail: def.type_name.clone(),
            ..Default::default()
        })
        .collect();
    Some(items)
}
