//! Document cache and the diagnostics bridge to the LSP client.

use adx_project::{DiagnosticsSink, Document, DocumentProvider};
use adx_template::{Diagnostic, FileId};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Open-editor documents win over disk content; everything else is read
/// from disk on demand. Keys are filesystem paths, matching the
/// coordinator's [`FileId`]s.
#[derive(Clone, Default)]
pub struct DocumentStore {
    open: Arc<DashMap<String, OpenDocument>>,
}

#[derive(Clone)]
struct OpenDocument {
    text: String,
    version: i64,
}

impl DocumentStore {
    /// Track an opened/changed document. Out-of-order updates (an older
    /// version arriving after a newer one) are dropped.
    pub fn update(&self, path: &str, text: String, version: i64) {
        match self.open.get(path) {
            Some(existing) if existing.version > version => {
                tracing::warn!(path, version, "dropping out-of-order document update");
            }
            _ => {
                self.open
                    .insert(path.to_string(), OpenDocument { text, version });
            }
        }
    }

    /// Stop tracking a closed document; reads fall back to disk.
    pub fn close(&self, path: &str) {
        self.open.remove(path);
    }

    /// Current text from the cache or disk.
    pub async fn read_text(&self, path: &str) -> Option<String> {
        if let Some(doc) = self.open.get(path) {
            return Some(doc.text.clone());
        }
        tokio::fs::read_to_string(path).await.ok()
    }
}

impl DocumentProvider for DocumentStore {
    async fn read(&self, file: &FileId) -> Option<Document> {
        if let Some(doc) = self.open.get(file.as_str()) {
            return Some(Document {
                text: doc.text.clone(),
                version: doc.version,
            });
        }
        let text = tokio::fs::read_to_string(file.as_str()).await.ok()?;
        Some(Document { text, version: 0 })
    }
}

/// One publish/clear event from the coordinator.
#[derive(Debug)]
pub enum SinkEvent {
    Publish(FileId, Vec<Diagnostic>),
    Clear(FileId),
}

/// Sink that forwards coordinator output to an async channel; the server
/// drains it and pushes `textDocument/publishDiagnostics` to the client.
/// The sink itself stays synchronous, preserving the coordinator's
/// atomic-replacement discipline.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DiagnosticsSink for ChannelSink {
    fn publish(&self, file: &FileId, diagnostics: Vec<Diagnostic>) {
        let _ = self.tx.send(SinkEvent::Publish(file.clone(), diagnostics));
    }

    fn clear(&self, file: &FileId) {
        let _ = self.tx.send(SinkEvent::Clear(file.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_out_of_order_updates_dropped() {
        let store = DocumentStore::default();
        store.update("/t/a.json", "v2".to_string(), 2);
        store.update("/t/a.json", "v1".to_string(), 1);
        assert_eq!(store.read_text("/t/a.json").await.as_deref(), Some("v2"));

        store.update("/t/a.json", "v3".to_string(), 3);
        assert_eq!(store.read_text("/t/a.json").await.as_deref(), Some("v3"));
    }

    #[tokio::test]
    async fn test_close_falls_back_to_disk() {
        let store = DocumentStore::default();
        store.update("/t/a.json", "x".to_string(), 1);
        store.close("/t/a.json");
        // Nothing at that path on disk either.
        assert_eq!(store.read_text("/t/a.json").await, None);
    }
}
