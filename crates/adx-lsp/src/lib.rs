//! Language Server Protocol implementation for analytics templates.
//!
//! A thin adapter: lifecycle notifications feed the
//! [`adx_project::Coordinator`], published diagnostics flow back to the
//! client, and the editing-surface providers (completion, hover,
//! go-to-definition, code actions) consume the same parsed trees and
//! directory model the linter uses.

mod conversions;
mod documents;
mod providers;
mod server;

use server::TemplateLanguageServer;
use tower_lsp_server::{LspService, Server};

/// Initialize tracing for the LSP server.
///
/// Safe to call when a subscriber is already installed (e.g. when run as
/// a CLI subcommand); initialization is simply skipped then.
pub fn init_tracing() {
    // IMPORTANT: LSP uses stdin/stdout for JSON-RPC communication.
    // All logs MUST go to stderr to avoid breaking the protocol.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Run the language server over stdio.
pub async fn run_server() {
    init_tracing();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(TemplateLanguageServer::new).finish();
    Server::new(stdin, stdout, socket).serve(service).await;
}
