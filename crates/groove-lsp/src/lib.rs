//! Language Server Protocol host for Groove completion.
//!
//! Serves `textDocument/completion` over stdin/stdout with `tower-lsp`. Every
//! request runs a basic completion; right after `new` a smart completion runs
//! too and its candidates are listed first.

pub mod completion;
pub mod position;
pub mod server;

use std::sync::Arc;

use groove_completion::{ClassIndex, CompletionConfig};
use tower_lsp::{LspService, Server};

use server::GrooveBackend;

/// Run the server on stdin/stdout until the client disconnects.
///
/// Client `initializationOptions`, when present, replace `config`.
pub async fn run_server(config: CompletionConfig, index: Arc<ClassIndex>) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| GrooveBackend::new(client, config, index));
    Server::new(stdin, stdout, socket).serve(service).await;
}
