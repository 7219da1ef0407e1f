//! Cross-file lint coordination for analytics templates.
//!
//! The coordinator owns the per-template lifecycle: it activates a
//! template when its manifest appears, tracks the "interesting" file set
//! via the Template Directory Model, decides which files to re-lint when
//! any one of them changes, runs the rule engine over each, and publishes
//! the resulting diagnostic sets — wholesale replacement per file, with a
//! generation counter guarding against stale publishes.
//!
//! The host supplies three collaborators ([`DocumentProvider`],
//! [`FileSystem`], [`DiagnosticsSink`]); everything else lives here.

mod coordinator;
mod host;
mod local;

pub use coordinator::Coordinator;
pub use host::{DiagnosticsSink, Document, DocumentProvider, FileSystem};
pub use local::{CollectingSink, LocalDocuments, LocalFileSystem};
