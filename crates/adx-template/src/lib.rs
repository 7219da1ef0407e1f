//! Data model for analytics application templates.
//!
//! A template is a directory rooted at `template-info.json` plus the
//! related files the manifest declares. This crate holds everything the
//! rule engine and coordinator share: the diagnostic types, the fixed
//! rule-code taxonomy, file roles, and the Template Directory Model that
//! maps the manifest's declared relative paths to their roles.

pub mod codes;
mod diagnostics;
mod dir_model;
mod roles;

pub use diagnostics::{Diagnostic, FileId, Location, RelatedInfo, Severity};
pub use dir_model::{PathEntry, TemplateDirModel};
pub use roles::{FileRole, RuleBucket, TemplateType, MANIFEST_FILE_NAME};
