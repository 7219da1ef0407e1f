//! Go to definition: variable references jump to their declaration in
//! `variables.json`; manifest path fields jump to the referenced file.

use super::{variable_ref_at, TemplateView};
use crate::conversions::{convert_position, convert_range, uri_for_path};
use crate::documents::DocumentStore;
use adx_json::LineIndex;
use adx_linter::VariableIndex;
use adx_template::FileRole;
use lsp_types::{Location, Position, Range};
use std::path::Path;

pub async fn goto_definition(
    docs: &DocumentStore,
    path: &Path,
    position: Position,
) -> Option<Location> {
    let view = TemplateView::discover(docs, path).await?;
    let role = view.role_of(path)?;
    let text = docs.read_text(&path.to_string_lossy()).await?;
    let index = LineIndex::new(&text);
    let offset = convert_position(&index, position)?;

    match role {
        FileRole::Ui | FileRole::Layout => {
            let parse = adx_json::parse(&text);
            let (name, _) = variable_ref_at(&parse.tree, offset)?;

            let variables_path = view.path_of_role(FileRole::Variables)?;
            let variables_text = docs
                .read_text(&variables_path.to_string_lossy())
                .await?;
            let variables = VariableIndex::from_tree(&adx_json::parse(&variables_text).tree);
            let def = variables.get(&name)?;

            let variables_index = LineIndex::new(&variables_text);
            Some(Location {
                uri: uri_for_path(&variables_path.to_string_lossy())?,
                range: convert_range(&variables_index, def.name_range),
            })
        }
        FileRole::TemplateInfo => {
            // On a path-valued field: jump to the referenced file.
            let entry = view
                .model
                .entries()
                .iter()
                .find(|entry| offset >= entry.range.start && offset < entry.range.end)?;
            let target = view.root.join(&entry.rel_path);
            Some(Location {
                uri: uri_for_path(&target.to_string_lossy())?,
                range: Range::default(),
            })
        }
        _ => None,
    }
}
