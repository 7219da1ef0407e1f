//! Analytics-template language server binary entry point.

#[tokio::main]
async fn main() {
    adx_lsp::run_server().await;
}
