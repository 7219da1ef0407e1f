//! Editing-surface providers: completion, hover, go-to-definition, code
//! actions. All of them are thin — they re-parse the file at request time
//! and consume the same directory model the linter uses.

pub mod code_actions;
pub mod completion;
pub mod goto_definition;
pub mod hover;

use crate::documents::DocumentStore;
use adx_json::{JsonTree, NodeId};
use adx_template::{FileRole, TemplateDirModel, MANIFEST_FILE_NAME};
use std::path::{Path, PathBuf};

/// Parsed view of the template owning one file, discovered by walking up
/// to the nearest directory with a readable manifest.
pub struct TemplateView {
    pub root: PathBuf,
    pub model: TemplateDirModel,
}

impl TemplateView {
    pub async fn discover(docs: &DocumentStore, path: &Path) -> Option<Self> {
        for ancestor in path.ancestors().skip(1) {
            let manifest_path = ancestor.join(MANIFEST_FILE_NAME);
            let Some(text) = docs.read_text(&manifest_path.to_string_lossy()).await else {
                continue;
            };
            let manifest = adx_json::parse(&text);
            let model = TemplateDirModel::rebuild(&manifest.tree);
            return Some(Self {
                root: ancestor.to_path_buf(),
                model,
            });
        }
        None
    }

    /// The role the manifest assigns to a file of this template.
    #[must_use]
    pub fn role_of(&self, path: &Path) -> Option<FileRole> {
        if path.file_name().is_some_and(|name| name == MANIFEST_FILE_NAME)
            && path.parent() == Some(self.root.as_path())
        {
            return Some(FileRole::TemplateInfo);
        }
        let rel = path.strip_prefix(&self.root).ok()?;
        self.model.role_of(&rel.to_string_lossy().replace('\\', "/"))
    }

    /// Absolute path of the first file declared for a role.
    #[must_use]
    pub fn path_of_role(&self, role: FileRole) -> Option<PathBuf> {
        self.model
            .path_for_role(role)
            .map(|entry| self.root.join(&entry.rel_path))
    }
}

/// The variable name string under the cursor, when the offset sits in a
/// `"name"` property of a ui/layout page file. Intentionally looser than
/// the linter's reference walk: good enough for editing surfaces.
#[must_use]
pub fn variable_ref_at(tree: &JsonTree, offset: usize) -> Option<(String, NodeId)> {
    let node = tree.node_at_offset(offset)?;
    let name = tree.string_value(node)?.to_string();
    let prop = tree.parent(node)?;
    if tree.property_name(prop) != Some("name") {
        return None;
    }
    // The cursor must be on the value, not the "name" key itself.
    if tree.property_key(prop) == Some(node) {
        return None;
    }
    Some((name, node))
}
