//! In-crate test fixture: builds a template in memory (manifest + related
//! files), derives the directory model, and runs a single rule or the
//! whole engine against any file of it.

use crate::context::{FileStat, LintTarget, PathExistence, RelatedFile, TemplateContext};
use crate::engine::Linter;
use crate::traits::TemplateLintRule;
use crate::LintConfig;
use adx_json::parse;
use adx_template::{Diagnostic, FileId, FileRole, TemplateDirModel, MANIFEST_FILE_NAME};
use std::collections::HashSet;

pub(crate) struct Fixture {
    manifest_text: String,
    files: Vec<(String, String)>,
    folder_name: String,
    missing: HashSet<String>,
    dirs: HashSet<String>,
}

struct FixtureFs {
    existing_files: HashSet<String>,
    dirs: HashSet<String>,
}

impl PathExistence for FixtureFs {
    fn stat(&self, rel_path: &str) -> FileStat {
        if self.dirs.contains(rel_path) {
            FileStat {
                exists: true,
                is_file: false,
                is_dir: true,
            }
        } else if self.existing_files.contains(rel_path) {
            FileStat {
                exists: true,
                is_file: true,
                is_dir: false,
            }
        } else {
            FileStat::default()
        }
    }
}

impl Fixture {
    pub fn new(manifest_text: &str) -> Self {
        Self {
            manifest_text: manifest_text.to_string(),
            files: Vec::new(),
            folder_name: "MyTemplate".to_string(),
            missing: HashSet::new(),
            dirs: HashSet::new(),
        }
    }

    /// Add a related file with content. The file's role comes from the
    /// manifest's declaration of its path.
    pub fn with_file(mut self, rel_path: &str, text: &str) -> Self {
        self.files.push((rel_path.to_string(), text.to_string()));
        self
    }

    pub fn with_folder_name(mut self, name: &str) -> Self {
        self.folder_name = name.to_string();
        self
    }

    /// Declared paths "exist" by default; mark one as absent on disk.
    pub fn mark_missing(mut self, rel_path: &str) -> Self {
        self.missing.insert(rel_path.to_string());
        self
    }

    /// Mark a declared path as a directory instead of a regular file.
    pub fn mark_dir(mut self, rel_path: &str) -> Self {
        self.dirs.insert(rel_path.to_string());
        self
    }

    pub fn manifest_text(&self) -> &str {
        &self.manifest_text
    }

    pub fn lint_manifest_with(&self, rule: &dyn TemplateLintRule) -> Vec<Diagnostic> {
        self.run(None, |ctx, target| rule.check(ctx, target))
    }

    pub fn lint_file_with(&self, rel_path: &str, rule: &dyn TemplateLintRule) -> Vec<Diagnostic> {
        self.run(Some(rel_path), |ctx, target| rule.check(ctx, target))
    }

    pub fn lint_manifest(&self) -> Vec<Diagnostic> {
        let linter = Linter::new(LintConfig::default());
        self.run(None, |ctx, target| linter.lint_file(ctx, target))
    }

    pub fn lint_file(&self, rel_path: &str) -> Vec<Diagnostic> {
        let linter = Linter::new(LintConfig::default());
        self.run(Some(rel_path), |ctx, target| linter.lint_file(ctx, target))
    }

    /// Run a pre-configured linter against the manifest (`None`) or a
    /// related file.
    pub fn run_linter(&self, linter: &Linter, target_rel: Option<&str>) -> Vec<Diagnostic> {
        self.run(target_rel, |ctx, target| linter.lint_file(ctx, target))
    }

    fn run<R>(
        &self,
        target_rel: Option<&str>,
        f: impl FnOnce(&TemplateContext<'_>, &LintTarget<'_>) -> R,
    ) -> R {
        let manifest_parse = parse(&self.manifest_text);
        let model = TemplateDirModel::rebuild(&manifest_parse.tree);

        let manifest_id = FileId::new(MANIFEST_FILE_NAME);
        let parses: Vec<(FileId, &str, adx_json::Parse)> = self
            .files
            .iter()
            .map(|(rel, text)| (FileId::new(rel), rel.as_str(), parse(text)))
            .collect();

        let mut related: Vec<RelatedFile<'_>> = vec![RelatedFile {
            file: &manifest_id,
            rel_path: MANIFEST_FILE_NAME,
            role: FileRole::TemplateInfo,
            tree: manifest_parse.tree.root().map(|_| &manifest_parse.tree),
        }];
        for (id, rel, file_parse) in &parses {
            let Some(role) = model.role_of(rel) else {
                continue;
            };
            related.push(RelatedFile {
                file: id,
                rel_path: rel,
                role,
                tree: file_parse.tree.root().map(|_| &file_parse.tree),
            });
        }

        let mut existing_files: HashSet<String> = model
            .entries()
            .iter()
            .map(|entry| entry.rel_path.clone())
            .collect();
        existing_files.extend(self.files.iter().map(|(rel, _)| rel.clone()));
        for gone in &self.missing {
            existing_files.remove(gone);
        }
        let fs = FixtureFs {
            existing_files,
            dirs: self.dirs.clone(),
        };

        let ctx = TemplateContext {
            manifest_file: &manifest_id,
            manifest: manifest_parse.tree.root().map(|_| &manifest_parse.tree),
            model: &model,
            folder_name: &self.folder_name,
            files: &related,
            fs: &fs,
        };

        let target = match target_rel {
            None => LintTarget {
                file: &manifest_id,
                role: FileRole::TemplateInfo,
                tree: &manifest_parse.tree,
            },
            Some(rel) => {
                let (id, _, file_parse) = parses
                    .iter()
                    .find(|(_, r, _)| *r == rel)
                    .unwrap_or_else(|| panic!("fixture has no file {rel}"));
                let role = model
                    .role_of(rel)
                    .unwrap_or_else(|| panic!("manifest does not declare {rel}"));
                LintTarget {
                    file: id,
                    role,
                    tree: &file_parse.tree,
                }
            }
        };

        f(&ctx, &target)
    }
}
