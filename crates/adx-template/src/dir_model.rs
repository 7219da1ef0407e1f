//! The Template Directory Model.
//!
//! Tracks, per template root, the resolved relative paths referenced by the
//! root manifest — which file plays which role, plus the `name`/`label`
//! pairs needed for duplicate-label detection. The model is rebuilt
//! wholesale from the manifest's tree every time that manifest changes;
//! stale entries are simply discarded. Rebuilding is total and synchronous:
//! no partial state is ever observable by a concurrent rule check.

use adx_json::{match_pattern, JsonPath, JsonTree, NodeId, OffsetRange};

use crate::roles::{FileRole, RuleBucket, TemplateType};

/// One relative path declared by the manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry {
    /// The declared relative path, exactly as written.
    pub rel_path: String,
    /// The role the manifest assigns to the file.
    pub role: FileRole,
    /// `name` of the declaring array entry, where applicable.
    pub name: Option<String>,
    /// `label` of the declaring array entry, where applicable.
    pub label: Option<String>,
    /// Concrete structural path of the path-valued node in the manifest.
    pub node_path: JsonPath,
    /// Byte range of the path-valued node in the manifest.
    pub range: OffsetRange,
}

/// Single-file manifest fields and their roles.
const SINGLE_FILE_FIELDS: &[(&str, FileRole)] = &[
    ("variableDefinition", FileRole::Variables),
    ("uiDefinition", FileRole::Ui),
    ("layoutDefinition", FileRole::Layout),
    ("folderDefinition", FileRole::Folder),
    ("autoInstallDefinition", FileRole::AutoInstall),
    ("ruleDefinition", FileRole::Rules(RuleBucket::Legacy)),
    ("assetIcon", FileRole::Image),
    ("templateIcon", FileRole::Image),
];

/// Array-of-`{file, name, label}` manifest fields and their roles.
const ARRAY_FILE_FIELDS: &[(&str, FileRole)] = &[
    ("dashboards", FileRole::Dashboard),
    ("components", FileRole::Component),
    ("lenses", FileRole::Lens),
    ("dataflows", FileRole::Dataflow),
    ("eltDataflows", FileRole::Dataflow),
    ("recipes", FileRole::Recipe),
    ("datasetFiles", FileRole::Dataset),
    ("imageFiles", FileRole::Image),
    ("externalFiles", FileRole::ExternalFile),
];

/// Companion path fields inside array entries (schemas, xmds, metadata).
const COMPANION_FIELDS: &[(&str, &str)] = &[
    ("externalFiles", "schema"),
    ("externalFiles", "userXmd"),
    ("datasetFiles", "userXmd"),
    ("datasetFiles", "conversionMetadata"),
];

/// Resolved relative-path index for one template root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDirModel {
    template_type: Option<TemplateType>,
    name: Option<String>,
    entries: Vec<PathEntry>,
}

impl TemplateDirModel {
    /// Rebuild the model from a manifest tree.
    ///
    /// An absent or rootless manifest yields [`TemplateDirModel::default`]:
    /// "no known paths", so referencing rules simply have nothing to check.
    #[must_use]
    pub fn rebuild(manifest: &JsonTree) -> Self {
        let Some(root) = manifest.root() else {
            return Self::default();
        };

        let template_type = manifest
            .object_get(root, "templateType")
            .and_then(|node| manifest.string_value(node))
            .and_then(TemplateType::parse);
        let name = manifest
            .object_get(root, "name")
            .and_then(|node| manifest.string_value(node))
            .map(ToString::to_string);

        let mut entries = Vec::new();

        for &(field, role) in SINGLE_FILE_FIELDS {
            for m in match_pattern(manifest, &JsonPath::pattern(&[field]), None) {
                push_entry(manifest, &mut entries, m.node, m.path, role, None);
            }
        }

        for &(field, role) in ARRAY_FILE_FIELDS {
            for m in match_pattern(manifest, &JsonPath::pattern(&[field, "*", "file"]), None) {
                let entry_object = containing_entry(manifest, m.node);
                push_entry(manifest, &mut entries, m.node, m.path, role, entry_object);
            }
        }

        for &(field, companion) in COMPANION_FIELDS {
            for m in match_pattern(manifest, &JsonPath::pattern(&[field, "*", companion]), None) {
                let entry_object = containing_entry(manifest, m.node);
                push_entry(
                    manifest,
                    &mut entries,
                    m.node,
                    m.path,
                    FileRole::ExternalFileCompanion,
                    entry_object,
                );
            }
        }

        for m in match_pattern(manifest, &JsonPath::pattern(&["rules", "*", "file"]), None) {
            let entry_object = containing_entry(manifest, m.node);
            let bucket = entry_object
                .and_then(|obj| manifest.object_get(obj, "type"))
                .and_then(|node| manifest.string_value(node))
                .map_or(RuleBucket::AppToTemplate, |value| match value {
                    "templateToApp" => RuleBucket::TemplateToApp,
                    // appToTemplate is the schema default; unknown strings
                    // are the schema validator's problem.
                    _ => RuleBucket::AppToTemplate,
                });
            push_entry(
                manifest,
                &mut entries,
                m.node,
                m.path,
                FileRole::Rules(bucket),
                entry_object,
            );
        }

        for m in match_pattern(
            manifest,
            &JsonPath::pattern(&["extendedTypes", "*", "*", "file"]),
            None,
        ) {
            let entry_object = containing_entry(manifest, m.node);
            push_entry(
                manifest,
                &mut entries,
                m.node,
                m.path,
                FileRole::ExtendedType,
                entry_object,
            );
        }

        entries.sort_by_key(|entry| entry.range.start);
        tracing::debug!(paths = entries.len(), "rebuilt template directory model");
        Self {
            template_type,
            name,
            entries,
        }
    }

    /// The manifest's declared template type, when recognized.
    #[must_use]
    pub const fn template_type(&self) -> Option<TemplateType> {
        self.template_type
    }

    /// The manifest's `name`, when present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// All declared path entries, in manifest document order.
    #[must_use]
    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    /// Returns `true` when the manifest declares no paths at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The single file declared for a role, when exactly that role matches.
    /// For roles that can repeat (rules, dashboards, ...) this returns the
    /// first declaration.
    #[must_use]
    pub fn path_for_role(&self, role: FileRole) -> Option<&PathEntry> {
        self.entries.iter().find(|entry| entry.role == role)
    }

    /// All rules files of one bucket, in document order.
    #[must_use]
    pub fn rules_entries(&self, bucket: RuleBucket) -> Vec<&PathEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.role == FileRole::Rules(bucket))
            .collect()
    }

    /// The role of a declared relative path, when the manifest declares it.
    #[must_use]
    pub fn role_of(&self, rel_path: &str) -> Option<FileRole> {
        self.entries
            .iter()
            .find(|entry| entry.rel_path == rel_path)
            .map(|entry| entry.role)
    }
}

/// The array-entry object containing a matched path value node
/// (`value → property → entry object`).
fn containing_entry(tree: &JsonTree, value: NodeId) -> Option<NodeId> {
    tree.parent(value).and_then(|prop| tree.parent(prop))
}

fn push_entry(
    tree: &JsonTree,
    entries: &mut Vec<PathEntry>,
    node: NodeId,
    node_path: JsonPath,
    role: FileRole,
    entry_object: Option<NodeId>,
) {
    // Only string-valued fields are paths; other types are the schema
    // validator's concern.
    let Some(rel_path) = tree.string_value(node) else {
        return;
    };
    let field_string = |name: &str| {
        entry_object
            .and_then(|obj| tree.object_get(obj, name))
            .and_then(|n| tree.string_value(n))
            .map(ToString::to_string)
    };
    entries.push(PathEntry {
        rel_path: rel_path.to_string(),
        role,
        name: field_string("name"),
        label: field_string("label"),
        node_path,
        range: tree.span(node),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use adx_json::parse;

    const MANIFEST: &str = r#"{
  "templateType": "app",
  "name": "MyTemplate",
  "label": "My Template",
  "variableDefinition": "variables.json",
  "uiDefinition": "ui.json",
  "folderDefinition": "folder.json",
  "rules": [
    {"type": "appToTemplate", "file": "app-to-template-rules.json"},
    {"type": "templateToApp", "file": "template-to-app-rules.json"},
    {"file": "more-rules.json"}
  ],
  "dashboards": [
    {"file": "dashboard/dash.json", "name": "dash", "label": "Dash"}
  ],
  "externalFiles": [
    {"file": "external/data.csv", "name": "data", "schema": "external/schema.json"}
  ],
  "extendedTypes": {
    "discoveryStories": [{"file": "stories/story.json", "label": "Story"}]
  }
}"#;

    fn model() -> TemplateDirModel {
        TemplateDirModel::rebuild(&parse(MANIFEST).tree)
    }

    #[test]
    fn test_rebuild_collects_roles() {
        let model = model();
        assert_eq!(model.template_type(), Some(TemplateType::App));
        assert_eq!(model.name(), Some("MyTemplate"));
        assert_eq!(model.role_of("variables.json"), Some(FileRole::Variables));
        assert_eq!(model.role_of("ui.json"), Some(FileRole::Ui));
        assert_eq!(model.role_of("folder.json"), Some(FileRole::Folder));
        assert_eq!(model.role_of("dashboard/dash.json"), Some(FileRole::Dashboard));
        assert_eq!(
            model.role_of("external/schema.json"),
            Some(FileRole::ExternalFileCompanion)
        );
        assert_eq!(model.role_of("stories/story.json"), Some(FileRole::ExtendedType));
        assert_eq!(model.role_of("unknown.json"), None);
    }

    #[test]
    fn test_rule_buckets() {
        let model = model();
        let app_to_template: Vec<_> = model
            .rules_entries(RuleBucket::AppToTemplate)
            .iter()
            .map(|e| e.rel_path.clone())
            .collect();
        // Entry without a "type" defaults to appToTemplate.
        assert_eq!(
            app_to_template,
            vec!["app-to-template-rules.json", "more-rules.json"]
        );
        assert_eq!(model.rules_entries(RuleBucket::TemplateToApp).len(), 1);
        assert!(model.rules_entries(RuleBucket::Legacy).is_empty());
    }

    #[test]
    fn test_name_label_captured() {
        let model = model();
        let dash = model.path_for_role(FileRole::Dashboard).unwrap();
        assert_eq!(dash.name.as_deref(), Some("dash"));
        assert_eq!(dash.label.as_deref(), Some("Dash"));

        let story = model.path_for_role(FileRole::ExtendedType).unwrap();
        assert_eq!(story.label.as_deref(), Some("Story"));
        assert_eq!(story.name, None);
    }

    #[test]
    fn test_entries_in_document_order() {
        let model = model();
        let positions: Vec<_> = model.entries().iter().map(|e| e.range.start).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_rootless_manifest_is_empty() {
        let model = TemplateDirModel::rebuild(&parse("// nothing here").tree);
        assert!(model.is_empty());
        assert_eq!(model.template_type(), None);
    }

    #[test]
    fn test_rebuild_discards_stale_entries() {
        let before = model();
        assert!(before.role_of("ui.json").is_some());

        let after = TemplateDirModel::rebuild(
            &parse(r#"{"templateType": "dashboard", "variableDefinition": "vars.json"}"#).tree,
        );
        assert_eq!(after.role_of("ui.json"), None);
        assert_eq!(after.role_of("vars.json"), Some(FileRole::Variables));
        assert_eq!(after.template_type(), Some(TemplateType::Dashboard));
    }
}
