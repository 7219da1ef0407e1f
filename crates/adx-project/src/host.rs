//! Collaborator interfaces supplied by the host (editor or CLI).
//!
//! The core depends on these existing; it does not implement the
//! editor's document model, its file watcher, or its diagnostics UI.

use adx_linter::FileStat;
use adx_template::{Diagnostic, FileId};
use std::path::Path;

/// A point-in-time read of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    /// Monotonic per-document version from the host. The coordinator
    /// keeps its own generation counters; the version is surfaced so
    /// adapter layers can drop out-of-order change notifications.
    pub version: i64,
}

/// Supplies current document text by file identity. Open editors win over
/// disk content; the host decides.
pub trait DocumentProvider: Send + Sync {
    /// Read the current text, or `None` when the file is unavailable.
    /// This is the coordinator's only suspension point.
    fn read(
        &self,
        file: &FileId,
    ) -> impl std::future::Future<Output = Option<Document>> + Send;
}

/// Existence/type oracle. Never errors: a missing path reports
/// `exists == false`.
pub trait FileSystem: Send + Sync {
    fn stat(&self, path: &Path) -> FileStat;
}

/// Where diagnostics go. `publish` replaces the prior set for the file
/// wholesale — there is no diffing or merging — and must be atomic from
/// the consumer's perspective.
pub trait DiagnosticsSink: Send + Sync {
    fn publish(&self, file: &FileId, diagnostics: Vec<Diagnostic>);
    fn clear(&self, file: &FileId);
}
