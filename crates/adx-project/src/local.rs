//! Disk-backed collaborator implementations (used by the CLI) and an
//! in-memory diagnostics sink (used by the CLI and tests).

use crate::host::{DiagnosticsSink, Document, DocumentProvider, FileSystem};
use adx_linter::FileStat;
use adx_template::{Diagnostic, FileId};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// Stat against the local filesystem.
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn stat(&self, path: &Path) -> FileStat {
        match std::fs::metadata(path) {
            Ok(metadata) => FileStat {
                exists: true,
                is_file: metadata.is_file(),
                is_dir: metadata.is_dir(),
            },
            Err(_) => FileStat::default(),
        }
    }
}

/// Read documents straight from disk. Each successful read gets the next
/// value of a process-wide counter as its version, which is monotonic per
/// file as the interface requires.
#[derive(Default)]
pub struct LocalDocuments {
    next_version: AtomicI64,
}

impl DocumentProvider for LocalDocuments {
    async fn read(&self, file: &FileId) -> Option<Document> {
        let text = tokio::fs::read_to_string(file.as_str()).await.ok()?;
        Some(Document {
            text,
            version: self.next_version.fetch_add(1, Ordering::Relaxed),
        })
    }
}

/// Diagnostics sink that retains the latest published set per file.
#[derive(Default)]
pub struct CollectingSink {
    state: Mutex<SinkState>,
}

#[derive(Default)]
struct SinkState {
    diagnostics: HashMap<FileId, Vec<Diagnostic>>,
    publish_counts: HashMap<FileId, usize>,
}

impl CollectingSink {
    /// Latest published set for a file; `None` after a clear (or never
    /// published).
    #[must_use]
    pub fn get(&self, file: &FileId) -> Option<Vec<Diagnostic>> {
        self.state
            .lock()
            .map(|state| state.diagnostics.get(file).cloned())
            .unwrap_or_default()
    }

    /// Snapshot of every file's latest set.
    #[must_use]
    pub fn all(&self) -> HashMap<FileId, Vec<Diagnostic>> {
        self.state
            .lock()
            .map(|state| state.diagnostics.clone())
            .unwrap_or_default()
    }

    /// How many times `publish` ran for a file (including empty sets).
    #[must_use]
    pub fn publish_count(&self, file: &FileId) -> usize {
        self.state
            .lock()
            .map(|state| state.publish_counts.get(file).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl DiagnosticsSink for CollectingSink {
    fn publish(&self, file: &FileId, diagnostics: Vec<Diagnostic>) {
        if let Ok(mut state) = self.state.lock() {
            state.diagnostics.insert(file.clone(), diagnostics);
            *state.publish_counts.entry(file.clone()).or_default() += 1;
        }
    }

    fn clear(&self, file: &FileId) {
        if let Ok(mut state) = self.state.lock() {
            state.diagnostics.remove(file);
        }
    }
}

impl<T: DiagnosticsSink> DiagnosticsSink for std::sync::Arc<T> {
    fn publish(&self, file: &FileId, diagnostics: Vec<Diagnostic>) {
        T::publish(self, file, diagnostics);
    }

    fn clear(&self, file: &FileId) {
        T::clear(self, file);
    }
}
