//! The Cross-File Coordinator.
//!
//! Per template root the coordinator moves through a two-state lifecycle:
//! **Inactive** (no entry in the template map) → **Active** (manifest seen
//! and parsed) → **Inactive** (manifest or root directory deleted, at which
//! point the diagnostics of every file under that root are cleared).
//!
//! A lint pass is the only async work here, and its only suspension points
//! are document reads. Staleness is handled without cancellation tokens:
//! every change bumps a per-file generation counter, a pass snapshots the
//! generations of the files it will publish, and the pass is discarded
//! before publishing when any of them has moved on — last-writer-wins,
//! keyed by file identity, not by completion order.

use crate::host::{DiagnosticsSink, DocumentProvider, FileSystem};
use adx_json::{parse, Parse};
use adx_linter::{LintTarget, Linter, PathExistence, RelatedFile, TemplateContext};
use adx_template::{
    codes, Diagnostic, FileId, FileRole, TemplateDirModel, MANIFEST_FILE_NAME,
};
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-root state while a template is active.
struct TemplateState {
    model: TemplateDirModel,
    /// Files with a currently published diagnostic set, for teardown.
    published: HashSet<FileId>,
}

/// Coordinates linting across the files of each active template.
pub struct Coordinator<D, F, S> {
    docs: D,
    fs: F,
    sink: S,
    linter: Linter,
    debounce: Duration,
    templates: DashMap<PathBuf, TemplateState>,
    generations: DashMap<FileId, u64>,
}

impl<D, F, S> Coordinator<D, F, S>
where
    D: DocumentProvider,
    F: FileSystem,
    S: DiagnosticsSink,
{
    #[must_use]
    pub fn new(docs: D, fs: F, sink: S, linter: Linter) -> Self {
        Self {
            docs,
            fs,
            sink,
            linter,
            debounce: Duration::from_millis(200),
            templates: DashMap::new(),
            generations: DashMap::new(),
        }
    }

    /// Override the per-file debounce window (tests use zero).
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Currently active template roots.
    #[must_use]
    pub fn active_roots(&self) -> Vec<PathBuf> {
        self.templates.iter().map(|entry| entry.key().clone()).collect()
    }

    /// A document was opened. Activates the owning template when its
    /// manifest is discoverable, then lints without debouncing: the first
    /// activation lints the whole template, a later open just the opened
    /// file's affected set.
    pub async fn on_document_opened(&self, file: FileId) {
        let path = PathBuf::from(file.as_str());
        let Some((root, newly_active)) = self.find_or_activate_root(&path) else {
            tracing::trace!(file = %file, "opened file belongs to no template");
            return;
        };
        let Some(rel) = rel_of(&root, &path) else {
            return;
        };
        let scope = if newly_active {
            PassScope::Full
        } else {
            self.scope_for(&root, &rel)
        };
        self.run_pass(&root, scope).await;
    }

    /// A document's content changed. Debounced per file: the pass only
    /// proceeds when no newer change for the same file arrived during the
    /// debounce window.
    pub async fn on_document_changed(&self, file: FileId) {
        let generation = self.bump(&file);
        tokio::time::sleep(self.debounce).await;
        if self.generation(&file) != generation {
            tracing::trace!(file = %file, "superseded during debounce");
            return;
        }

        let path = PathBuf::from(file.as_str());
        let Some((root, newly_active)) = self.find_or_activate_root(&path) else {
            return;
        };
        let Some(rel) = rel_of(&root, &path) else {
            return;
        };
        let scope = if newly_active {
            PassScope::Full
        } else {
            self.scope_for(&root, &rel)
        };
        self.run_pass(&root, scope).await;
    }

    /// A file or directory was deleted.
    ///
    /// Deleting a manifest or a directory containing an active root
    /// deactivates the template and clears the diagnostics of every file
    /// under it. Deleting an individual related file only clears that
    /// file's diagnostics and re-runs the referrers (the manifest's
    /// path-existence checks now fail until the file is recreated).
    pub async fn on_file_deleted(&self, file: FileId) {
        let path = PathBuf::from(file.as_str());
        self.bump(&file);

        let mut deactivated: Vec<PathBuf> = Vec::new();
        for entry in self.templates.iter() {
            let root = entry.key();
            if *root == path || root.starts_with(&path) {
                deactivated.push(root.clone());
            }
        }
        if path.file_name().is_some_and(|name| name == MANIFEST_FILE_NAME) {
            if let Some(parent) = path.parent() {
                if self.templates.contains_key(parent) {
                    deactivated.push(parent.to_path_buf());
                }
            }
        }
        if !deactivated.is_empty() {
            for root in deactivated {
                self.deactivate(&root);
            }
            return;
        }

        let Some(root) = self.find_root_for(&path) else {
            return;
        };
        let Some(rel) = rel_of(&root, &path) else {
            return;
        };

        self.sink.clear(&file);
        if let Some(mut state) = self.templates.get_mut(&root) {
            state.published.remove(&file);
        }

        // Re-lint the manifest (existence checks) plus whatever read the
        // deleted file's declared names.
        let mut affected = vec![MANIFEST_FILE_NAME.to_string()];
        if let PassScope::Files(dependents) = self.scope_for(&root, &rel) {
            for dependent in dependents {
                if dependent != rel && !affected.contains(&dependent) {
                    affected.push(dependent);
                }
            }
        }
        self.run_pass(&root, PassScope::Files(affected)).await;
    }

    fn bump(&self, file: &FileId) -> u64 {
        let mut entry = self.generations.entry(file.clone()).or_insert(0);
        *entry += 1;
        *entry
    }

    fn generation(&self, file: &FileId) -> u64 {
        self.generations.get(file).map_or(0, |entry| *entry)
    }

    fn model_of(&self, root: &Path) -> TemplateDirModel {
        self.templates
            .get(root)
            .map(|state| state.model.clone())
            .unwrap_or_default()
    }

    /// Active root owning `path`, deepest root first.
    fn find_root_for(&self, path: &Path) -> Option<PathBuf> {
        let mut best: Option<PathBuf> = None;
        for entry in self.templates.iter() {
            let root = entry.key();
            if path.starts_with(root)
                && best.as_ref().is_none_or(|b| root.components().count() > b.components().count())
            {
                best = Some(root.clone());
            }
        }
        best
    }

    /// Find the active root for a path, activating one when the path is a
    /// manifest or some ancestor directory holds one. Returns the root and
    /// whether it was newly activated.
    fn find_or_activate_root(&self, path: &Path) -> Option<(PathBuf, bool)> {
        if let Some(root) = self.find_root_for(path) {
            return Some((root, false));
        }
        let root = if path.file_name().is_some_and(|name| name == MANIFEST_FILE_NAME) {
            path.parent()?.to_path_buf()
        } else {
            let mut found = None;
            for ancestor in path.ancestors().skip(1) {
                if self.fs.stat(&ancestor.join(MANIFEST_FILE_NAME)).is_file {
                    found = Some(ancestor.to_path_buf());
                    break;
                }
            }
            found?
        };
        tracing::debug!(root = %root.display(), "activating template");
        self.templates.insert(
            root.clone(),
            TemplateState {
                model: TemplateDirModel::default(),
                published: HashSet::new(),
            },
        );
        Some((root, true))
    }

    fn deactivate(&self, root: &Path) {
        if let Some((_, state)) = self.templates.remove(root) {
            tracing::debug!(root = %root.display(), files = state.published.len(), "deactivating template");
            for file in state.published {
                self.sink.clear(&file);
                self.generations.remove(&file);
            }
        }
    }

    /// The minimal re-lint scope for a change to `changed_rel`.
    fn scope_for(&self, root: &Path, changed_rel: &str) -> PassScope {
        if changed_rel == MANIFEST_FILE_NAME {
            // The model itself may have changed: everything re-lints,
            // against the freshly rebuilt model.
            return PassScope::Full;
        }
        let model = self.model_of(root);
        match model.role_of(changed_rel) {
            Some(FileRole::Variables) => {
                // Variable names feed the ui/layout reference checks.
                let mut affected = vec![changed_rel.to_string()];
                for role in [FileRole::Ui, FileRole::Layout] {
                    if let Some(entry) = model.path_for_role(role) {
                        affected.push(entry.rel_path.clone());
                    }
                }
                PassScope::Files(affected)
            }
            Some(FileRole::Rules(bucket)) => {
                // Duplicate names span every rules file of the bucket.
                let mut affected: Vec<String> = model
                    .rules_entries(bucket)
                    .iter()
                    .map(|entry| entry.rel_path.clone())
                    .collect();
                if !affected.iter().any(|rel| rel == changed_rel) {
                    affected.push(changed_rel.to_string());
                }
                PassScope::Files(affected)
            }
            Some(role) if role.is_linted() => PassScope::Files(vec![changed_rel.to_string()]),
            // Referenced but unlinted (dashboards, images, ...): content
            // changes cannot affect any check.
            _ => PassScope::Files(Vec::new()),
        }
    }

    /// One lint pass over the scope's files.
    async fn run_pass(&self, root: &Path, scope: PassScope) {
        if !self.templates.contains_key(root) {
            return;
        }
        if matches!(&scope, PassScope::Files(files) if files.is_empty()) {
            return;
        }

        // The manifest's generation must be captured before its read, the
        // pass's first suspension point.
        let manifest_id = file_id(root, MANIFEST_FILE_NAME);
        let manifest_generation = self.generation(&manifest_id);

        // Fetch and re-parse the manifest; the model is rebuilt wholesale.
        let manifest_doc = self.docs.read(&manifest_id).await;
        let manifest_parse = manifest_doc.as_ref().map(|doc| parse(&doc.text));
        let model = manifest_parse
            .as_ref()
            .map_or_else(TemplateDirModel::default, |p| TemplateDirModel::rebuild(&p.tree));
        if let Some(mut state) = self.templates.get_mut(root) {
            state.model = model.clone();
        }

        let affected = match scope {
            PassScope::Full => full_set(&model),
            PassScope::Files(files) => files,
        };
        if affected.is_empty() {
            return;
        }

        // Snapshot the remaining generations before their files are read.
        let pass_generations: HashMap<String, u64> = affected
            .iter()
            .map(|rel| {
                let generation = if rel == MANIFEST_FILE_NAME {
                    manifest_generation
                } else {
                    self.generation(&file_id(root, rel))
                };
                (rel.clone(), generation)
            })
            .collect();

        // Fetch every linted related file once (cross-file context).
        let mut fetched: Vec<(FileId, String, FileRole, Option<Parse>)> = Vec::new();
        for entry in model.entries() {
            if !entry.role.is_linted() {
                continue;
            }
            if fetched.iter().any(|(_, rel, _, _)| *rel == entry.rel_path) {
                continue;
            }
            let id = file_id(root, &entry.rel_path);
            let doc = self.docs.read(&id).await;
            let file_parse = doc.as_ref().map(|doc| parse(&doc.text));
            fetched.push((id, entry.rel_path.clone(), entry.role, file_parse));
        }

        let mut related: Vec<RelatedFile<'_>> = vec![RelatedFile {
            file: &manifest_id,
            rel_path: MANIFEST_FILE_NAME,
            role: FileRole::TemplateInfo,
            tree: manifest_parse
                .as_ref()
                .and_then(|p| p.tree.root().map(|_| &p.tree)),
        }];
        for (id, rel, role, file_parse) in &fetched {
            related.push(RelatedFile {
                file: id,
                rel_path: rel,
                role: *role,
                tree: file_parse
                    .as_ref()
                    .and_then(|p| p.tree.root().map(|_| &p.tree)),
            });
        }

        // All reads are done. If any file in the pass has moved on since
        // its generation was captured, this whole result is stale: a newer
        // pass for the same change is already running (or queued) and will
        // publish from fresher content. Discard, never publish partial.
        let stale = pass_generations.iter().any(|(rel, generation)| {
            self.generation(&file_id(root, rel)) != *generation
        });
        if stale {
            tracing::debug!(root = %root.display(), "discarding stale lint pass");
            return;
        }

        let folder_name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let root_fs = RootFs { fs: &self.fs, root };
        let ctx = TemplateContext {
            manifest_file: &manifest_id,
            manifest: manifest_parse
                .as_ref()
                .and_then(|p| p.tree.root().map(|_| &p.tree)),
            model: &model,
            folder_name: &folder_name,
            files: &related,
            fs: &root_fs,
        };

        for rel in &affected {
            let (id, role, file_parse) = if rel == MANIFEST_FILE_NAME {
                (&manifest_id, FileRole::TemplateInfo, manifest_parse.as_ref())
            } else {
                match fetched.iter().find(|(_, r, _, _)| r == rel) {
                    Some((id, _, role, file_parse)) => (id, *role, file_parse.as_ref()),
                    None => continue,
                }
            };
            let Some(file_parse) = file_parse else {
                // Unreadable file: nothing to publish for it.
                continue;
            };

            let mut diagnostics = syntax_diagnostics(file_parse);
            if file_parse.tree.root().is_some() {
                let target = LintTarget {
                    file: id,
                    role,
                    tree: &file_parse.tree,
                };
                diagnostics.extend(self.linter.lint_file(&ctx, &target));
            }

            self.sink.publish(id, diagnostics);
            if let Some(mut state) = self.templates.get_mut(root) {
                state.published.insert(id.clone());
            }
        }
    }
}

/// What a pass covers: the whole template (against the freshly rebuilt
/// model) or an explicit file list.
enum PassScope {
    Full,
    Files(Vec<String>),
}

/// Manifest plus every linted related file, manifest first.
fn full_set(model: &TemplateDirModel) -> Vec<String> {
    let mut set = vec![MANIFEST_FILE_NAME.to_string()];
    for entry in model.entries() {
        if entry.role.is_linted() && !set.contains(&entry.rel_path) {
            set.push(entry.rel_path.clone());
        }
    }
    set
}

fn file_id(root: &Path, rel: &str) -> FileId {
    FileId::new(root.join(rel).to_string_lossy())
}

fn rel_of(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

fn syntax_diagnostics(file_parse: &Parse) -> Vec<Diagnostic> {
    file_parse
        .errors
        .iter()
        .map(|error| {
            Diagnostic::for_code(
                codes::SYNTAX,
                adx_json::OffsetRange::new(error.offset, error.offset + error.len),
            )
            .with_message(error.message.clone())
        })
        .collect()
}

/// Adapter giving the engine existence checks relative to one root.
struct RootFs<'a, F> {
    fs: &'a F,
    root: &'a Path,
}

impl<F: FileSystem> PathExistence for RootFs<'_, F> {
    fn stat(&self, rel_path: &str) -> adx_linter::FileStat {
        self.fs.stat(&self.root.join(rel_path))
    }
}
