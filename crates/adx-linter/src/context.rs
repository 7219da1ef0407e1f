//! Per-invocation context passed to every check.
//!
//! Checks are pure: they own no state and reach everything — the manifest
//! tree, the directory model, sibling file trees, the filesystem oracle —
//! through [`TemplateContext`]. The coordinator fetches and parses all
//! relevant files *before* the engine runs, so checks are entirely
//! synchronous.

use adx_json::JsonTree;
use adx_template::{FileId, FileRole, RuleBucket, TemplateDirModel};

/// Result of a filesystem stat. Never an error: a missing path reports
/// `exists == false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    pub exists: bool,
    pub is_file: bool,
    pub is_dir: bool,
}

/// The narrow filesystem view the engine needs: existence/type of paths
/// relative to the template root. Implemented by the coordinator over the
/// host's filesystem oracle.
pub trait PathExistence {
    fn stat(&self, rel_path: &str) -> FileStat;
}

/// One file belonging to the template, with its parse when available.
#[derive(Debug, Clone, Copy)]
pub struct RelatedFile<'a> {
    pub file: &'a FileId,
    /// Path relative to the template root, as declared by the manifest.
    pub rel_path: &'a str,
    pub role: FileRole,
    /// `None` when the file is missing or produced no root value.
    pub tree: Option<&'a JsonTree>,
}

/// The file a single lint invocation targets.
#[derive(Debug, Clone, Copy)]
pub struct LintTarget<'a> {
    pub file: &'a FileId,
    pub role: FileRole,
    pub tree: &'a JsonTree,
}

/// Everything a check may consult for one template.
pub struct TemplateContext<'a> {
    pub manifest_file: &'a FileId,
    /// `None` when the manifest itself is unparsable.
    pub manifest: Option<&'a JsonTree>,
    pub model: &'a TemplateDirModel,
    /// Basename of the template root directory.
    pub folder_name: &'a str,
    /// All files currently resolvable from the manifest (the lint target
    /// included), in manifest document order.
    pub files: &'a [RelatedFile<'a>],
    pub fs: &'a dyn PathExistence,
}

impl<'a> TemplateContext<'a> {
    /// First related file with the given role.
    #[must_use]
    pub fn file_by_role(&self, role: FileRole) -> Option<&RelatedFile<'a>> {
        self.files.iter().find(|file| file.role == role)
    }

    /// The template's variables definition, when declared and parsed.
    #[must_use]
    pub fn variables(&self) -> Option<(&'a FileId, &'a JsonTree)> {
        let file = self.file_by_role(FileRole::Variables)?;
        Some((file.file, file.tree?))
    }

    /// The template's layout definition, when declared and parsed.
    #[must_use]
    pub fn layout(&self) -> Option<(&'a FileId, &'a JsonTree)> {
        let file = self.file_by_role(FileRole::Layout)?;
        Some((file.file, file.tree?))
    }

    /// All parsed rules files of one bucket, in manifest document order.
    #[must_use]
    pub fn rules_files(&self, bucket: RuleBucket) -> Vec<(&'a FileId, &'a JsonTree)> {
        self.files
            .iter()
            .filter(|file| file.role == FileRole::Rules(bucket))
            .filter_map(|file| Some((file.file, file.tree?)))
            .collect()
    }
}
