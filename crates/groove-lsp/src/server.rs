//! Tower-lsp backend for the Groove completion server.
//!
//! Documents are synced in full. Each completion request runs on the blocking
//! pool against a snapshot of the document text; a newer request or an edit to
//! the same document cancels the one in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use groove_completion::{ClassIndex, CompletionConfig, CompletionEngine};
use tokio_util::sync::CancellationToken;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, warn};

use crate::completion;
use crate::position::position_to_offset;

pub struct GrooveBackend {
    client: Client,
    index: Arc<ClassIndex>,
    /// Replaced when the client sends initialization options.
    engine: RwLock<Arc<CompletionEngine>>,
    /// URI -> latest source text.
    documents: Mutex<HashMap<String, String>>,
    /// URI -> cancellation token of the completion request in flight.
    pending: Mutex<HashMap<String, CancellationToken>>,
}

impl GrooveBackend {
    pub fn new(client: Client, config: CompletionConfig, index: Arc<ClassIndex>) -> Self {
        let engine = CompletionEngine::new(config, Arc::clone(&index));
        Self {
            client,
            index,
            engine: RwLock::new(Arc::new(engine)),
            documents: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> Arc<CompletionEngine> {
        self.engine.read().unwrap().clone()
    }

    fn cancel_pending(&self, uri: &str) {
        if let Some(token) = self.pending.lock().unwrap().remove(uri) {
            token.cancel();
        }
    }

    /// Register `token` as the request in flight for `uri`, cancelling the
    /// previous one.
    fn replace_pending(&self, uri: &str, token: CancellationToken) {
        if let Some(previous) = self.pending.lock().unwrap().insert(uri.to_string(), token) {
            previous.cancel();
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for GrooveBackend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(options) = params.initialization_options {
            match serde_json::from_value::<CompletionConfig>(options) {
                Ok(config) => {
                    debug!(?config, "using client configuration");
                    let engine = CompletionEngine::new(config, Arc::clone(&self.index));
                    *self.engine.write().unwrap() = Arc::new(engine);
                }
                Err(err) => warn!(%err, "ignoring invalid initialization options"),
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string()]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "groove".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Groove completion server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        let mut pending = self.pending.lock().unwrap();
        for (_, token) in pending.drain() {
            token.cancel();
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        self.documents
            .lock()
            .unwrap()
            .insert(uri, params.text_document.text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        // Full sync: the first change holds the whole document.
        if let Some(change) = params.content_changes.into_iter().next() {
            self.cancel_pending(&uri);
            self.documents.lock().unwrap().insert(uri, change.text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        self.cancel_pending(&uri);
        self.documents.lock().unwrap().remove(&uri);
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = params.text_document_position.position;

        let Some(source) = self.documents.lock().unwrap().get(&uri).cloned() else {
            debug!(%uri, "completion for unknown document");
            return Ok(None);
        };
        let Some(offset) = position_to_offset(&source, position) else {
            debug!(%uri, ?position, "completion position outside document");
            return Ok(None);
        };

        let cancel = CancellationToken::new();
        self.replace_pending(&uri, cancel.clone());
        // Dropping this future (client-side cancellation) stops the search.
        let _guard = cancel.clone().drop_guard();

        let engine = self.engine();
        let task = tokio::task::spawn_blocking(move || {
            completion::completions(&engine, &source, offset, &cancel)
        });
        match task.await {
            Ok(Ok(response)) => Ok(Some(response)),
            Ok(Err(err)) => {
                warn!(%uri, %err, "completion failed");
                Ok(None)
            }
            Err(err) => {
                warn!(%uri, %err, "completion task failed");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::LspService;

    fn service() -> (LspService<GrooveBackend>, tower_lsp::ClientSocket) {
        LspService::new(|client| {
            GrooveBackend::new(
                client,
                CompletionConfig::default(),
                Arc::new(ClassIndex::bundled()),
            )
        })
    }

    fn uri() -> Url {
        Url::parse("file:///demo/Main.groovy").unwrap()
    }

    fn request(line: u32, character: u32) -> CompletionParams {
        CompletionParams {
            text_document_position: TextDocumentPositionParams::new(
                TextDocumentIdentifier::new(uri()),
                Position::new(line, character),
            ),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: None,
        }
    }

    fn labels(response: Option<CompletionResponse>) -> Vec<String> {
        match response {
            Some(CompletionResponse::List(list)) => list.items.into_iter().map(|i| i.label).collect(),
            Some(CompletionResponse::Array(items)) => items.into_iter().map(|i| i.label).collect(),
            None => Vec::new(),
        }
    }

    /// Verify that the server advertises the expected capabilities.
    #[tokio::test]
    async fn server_capabilities() {
        let (service, _) = service();
        let server = service.inner();
        let result = server
            .initialize(InitializeParams::default())
            .await
            .unwrap();

        let caps = result.capabilities;
        assert!(caps.text_document_sync.is_some());
        let completion = caps.completion_provider.expect("completion provider");
        assert_eq!(completion.trigger_characters, Some(vec![".".to_string()]));
        assert_eq!(completion.resolve_provider, Some(false));
    }

    #[tokio::test]
    async fn initialization_options_configure_the_engine() {
        let (service, _) = service();
        let server = service.inner();
        let params = InitializeParams {
            initialization_options: Some(serde_json::json!({ "max_results": 7, "qualify": "always" })),
            ..Default::default()
        };
        server.initialize(params).await.unwrap();
        assert_eq!(server.engine().config().max_results, 7);

        let (service, _) = self::service();
        let server = service.inner();
        let params = InitializeParams {
            initialization_options: Some(serde_json::json!({ "no_such_option": true })),
            ..Default::default()
        };
        server.initialize(params).await.unwrap();
        assert_eq!(
            server.engine().config(),
            &CompletionConfig::default(),
            "invalid options should leave the defaults in place"
        );
    }

    #[tokio::test]
    async fn completes_open_document_and_follows_changes() {
        let (service, _) = service();
        let server = service.inner();
        server
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem::new(
                    uri(),
                    "groovy".to_string(),
                    1,
                    "File f = new File('a')\nf.getN".to_string(),
                ),
            })
            .await;
        let response = server.completion(request(1, 6)).await.unwrap();
        assert_eq!(labels(response), vec!["getName"]);

        server
            .did_change(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier::new(uri(), 2),
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: "File f = new File('a')\nf.getP".to_string(),
                }],
            })
            .await;
        let response = server.completion(request(1, 6)).await.unwrap();
        assert_eq!(labels(response), vec!["getPath"]);
    }

    #[tokio::test]
    async fn unknown_document_gives_no_response() {
        let (service, _) = service();
        let response = service.inner().completion(request(0, 0)).await.unwrap();
        assert!(response.is_none());
    }
}
