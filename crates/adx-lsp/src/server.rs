//! The LSP server: protocol handling only. Lint scheduling lives in the
//! coordinator; language smarts live in the providers.

use crate::conversions::{convert_diagnostic, uri_for_path};
use crate::documents::{ChannelSink, DocumentStore, SinkEvent};
use crate::providers;
use adx_json::LineIndex;
use adx_linter::Linter;
use adx_project::{Coordinator, LocalFileSystem};
use adx_template::FileId;
use lsp_types::{
    CodeActionParams, CodeActionProviderCapability, CodeActionResponse, CompletionOptions,
    CompletionParams, CompletionResponse, DidChangeTextDocumentParams,
    DidChangeWatchedFilesParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DidSaveTextDocumentParams, FileChangeType, GotoDefinitionParams, GotoDefinitionResponse,
    Hover, HoverParams, HoverProviderCapability, InitializeParams, InitializeResult,
    InitializedParams, MessageType, OneOf, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind, Uri,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::{Client, LanguageServer, UriExt};

pub struct TemplateLanguageServer {
    client: Client,
    documents: DocumentStore,
    coordinator: Arc<Coordinator<DocumentStore, LocalFileSystem, ChannelSink>>,
}

impl TemplateLanguageServer {
    pub fn new(client: Client) -> Self {
        let documents = DocumentStore::default();
        let (sink, rx) = ChannelSink::new();
        let coordinator = Arc::new(Coordinator::new(
            documents.clone(),
            LocalFileSystem,
            sink,
            Linter::default(),
        ));
        tokio::spawn(forward_diagnostics(client.clone(), documents.clone(), rx));
        Self {
            client,
            documents,
            coordinator,
        }
    }

    fn path_of(uri: &Uri) -> Option<PathBuf> {
        uri.to_file_path().map(|path| path.into_owned())
    }

    fn spawn_opened(&self, file: FileId) {
        let coordinator = Arc::clone(&self.coordinator);
        tokio::spawn(async move { coordinator.on_document_opened(file).await });
    }

    fn spawn_changed(&self, file: FileId) {
        let coordinator = Arc::clone(&self.coordinator);
        tokio::spawn(async move { coordinator.on_document_changed(file).await });
    }

    fn spawn_deleted(&self, file: FileId) {
        let coordinator = Arc::clone(&self.coordinator);
        tokio::spawn(async move { coordinator.on_file_deleted(file).await });
    }
}

impl LanguageServer for TemplateLanguageServer {
    async fn initialize(&self, _params: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec!["\"".to_string()]),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "adx-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Analytics template LSP initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let Some(path) = Self::path_of(&params.text_document.uri) else {
            return;
        };
        let path = path.to_string_lossy().into_owned();
        self.documents.update(
            &path,
            params.text_document.text,
            i64::from(params.text_document.version),
        );
        self.spawn_opened(FileId::new(path));
    }

    async fn did_change(&self, mut params: DidChangeTextDocumentParams) {
        let Some(path) = Self::path_of(&params.text_document.uri) else {
            return;
        };
        // Full sync: the last change event carries the whole document.
        let Some(change) = params.content_changes.pop() else {
            return;
        };
        let path = path.to_string_lossy().into_owned();
        self.documents.update(
            &path,
            change.text,
            i64::from(params.text_document.version),
        );
        self.spawn_changed(FileId::new(path));
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        if let Some(path) = Self::path_of(&params.text_document.uri) {
            self.spawn_changed(FileId::new(path.to_string_lossy()));
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        if let Some(path) = Self::path_of(&params.text_document.uri) {
            self.documents.close(&path.to_string_lossy());
        }
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        for event in params.changes {
            let Some(path) = Self::path_of(&event.uri) else {
                continue;
            };
            let file = FileId::new(path.to_string_lossy());
            match event.typ {
                FileChangeType::DELETED => self.spawn_deleted(file),
                _ => self.spawn_changed(file),
            }
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let Some(path) = Self::path_of(&uri) else {
            return Ok(None);
        };
        let items = providers::completion::completions(
            &self.documents,
            &path,
            params.text_document_position.position,
        )
        .await;
        Ok(items.map(CompletionResponse::Array))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let Some(path) = Self::path_of(&uri) else {
            return Ok(None);
        };
        Ok(providers::hover::hover(
            &self.documents,
            &path,
            params.text_document_position_params.position,
        )
        .await)
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let Some(path) = Self::path_of(&uri) else {
            return Ok(None);
        };
        let location = providers::goto_definition::goto_definition(
            &self.documents,
            &path,
            params.text_document_position_params.position,
        )
        .await;
        Ok(location.map(GotoDefinitionResponse::Scalar))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;
        let Some(path) = Self::path_of(&uri) else {
            return Ok(None);
        };
        Ok(providers::code_actions::code_actions(
            &self.documents,
            &uri,
            &path,
            &params.context.diagnostics,
        )
        .await)
    }
}

/// Drain coordinator publishes and forward them to the client, mapping
/// byte offsets to editor positions with each file's current text.
async fn forward_diagnostics(
    client: Client,
    documents: DocumentStore,
    mut rx: UnboundedReceiver<SinkEvent>,
) {
    while let Some(event) = rx.recv().await {
        match event {
            SinkEvent::Publish(file, diagnostics) => {
                let Some(uri) = uri_for_path(file.as_str()) else {
                    continue;
                };
                let Some(text) = documents.read_text(file.as_str()).await else {
                    client.publish_diagnostics(uri, Vec::new(), None).await;
                    continue;
                };
                let index = LineIndex::new(&text);

                // Pre-read every file that related information points into.
                let mut related_indexes: HashMap<FileId, LineIndex> = HashMap::new();
                for diag in &diagnostics {
                    for info in &diag.related_info {
                        let other = &info.location.file;
                        if related_indexes.contains_key(other) {
                            continue;
                        }
                        if let Some(other_text) = documents.read_text(other.as_str()).await {
                            related_indexes.insert(other.clone(), LineIndex::new(&other_text));
                        }
                    }
                }

                let lsp_diagnostics = diagnostics
                    .iter()
                    .map(|diag| {
                        convert_diagnostic(&index, diag, &|other| {
                            related_indexes.get(other).cloned()
                        })
                    })
                    .collect();
                client.publish_diagnostics(uri, lsp_diagnostics, None).await;
            }
            SinkEvent::Clear(file) => {
                if let Some(uri) = uri_for_path(file.as_str()) {
                    client.publish_diagnostics(uri, Vec::new(), None).await;
                }
            }
        }
    }
}
