//! Hover for page variable references: label, type, and description from
//! the variable's definition.

use super::{variable_ref_at, TemplateView};
use crate::conversions::{convert_position, convert_range};
use crate::documents::DocumentStore;
use adx_json::LineIndex;
use adx_template::FileRole;
use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};
use std::fmt::Write as _;
use std::path::Path;

pub async fn hover(docs: &DocumentStore, path: &Path, position: Position) -> Option<Hover> {
    let view = TemplateView::discover(docs, path).await?;
    let role = view.role_of(path)?;
    if !matches!(role, FileRole::Ui | FileRole::Layout) {
        return None;
    }

    let text = docs.read_text(&path.to_string_lossy()).await?;
    let index = LineIndex::new(&text);
    let offset = convert_position(&index, position)?;
    let parse = adx_json::parse(&text);
    let (name, node) = variable_ref_at(&parse.tree, offset)?;

    let variables_path = view.path_of_role(FileRole::Variables)?;
    let variables_text = docs
        .read_text(&variables_path.to_string_lossy())
        .await?;
    let variables = adx_json::parse(&variables_text);
    let tree = &variables.tree;
    let def = tree.object_get(tree.root()?, &name)?;

    let mut contents = format!("**{name}**");
    if let Some(type_name) = tree
        .object_get(def, "variableType")
        .and_then(|vt| tree.object_get(vt, "type"))
        .and_then(|t| tree.string_value(t))
    {
        let _ = write!(contents, ": `{type_name}`");
    }
    for field in ["label", "description"] {
        if let Some(value) = tree
            .object_get(def, field)
            .and_then(|n| tree.string_value(n))
        {
            let _ = write!(contents, "\n\n{value}");
        }
    }

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: contents,
        }),
        range: Some(convert_range(&index, parse.tree.span(node))),
    })
}
