//! The completion pipeline: patch, classify, generate, collect.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::classify::Registry;
use crate::config::CompletionConfig;
use crate::context::{CompletionContext, CompletionRequest};
use crate::error::{check_offset, GrooveError};
use crate::index::{ClassIndex, FileResolver};
use crate::insert::{self, replace_range, DocumentEdit, InsertContext};
use crate::item::{Candidate, CompletionList};
use crate::patch::{self, Patch};
use crate::resolve::SymbolResolver;
use crate::sink::CompletionResultSink;

/// Entry point for hosts.
///
/// The engine holds only immutable state (registry, configuration, class
/// index) and can serve concurrent requests from several threads; each
/// request gets its own patched copy, tree and resolver.
pub struct CompletionEngine {
    registry: Registry,
    config: CompletionConfig,
    index: Arc<ClassIndex>,
}

impl Default for CompletionEngine {
    fn default() -> Self {
        Self::new(CompletionConfig::default(), Arc::new(ClassIndex::bundled()))
    }
}

impl CompletionEngine {
    pub fn new(config: CompletionConfig, index: Arc<ClassIndex>) -> Self {
        Self {
            registry: Registry::standard(),
            config,
            index,
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    pub fn index(&self) -> &ClassIndex {
        &self.index
    }

    /// The patched copy of the request's document.
    pub fn before_completion(&self, request: &CompletionRequest) -> Result<Patch, GrooveError> {
        check_offset(&request.text, request.offset)?;
        Ok(patch::before_completion(
            &request.text,
            request.offset,
            request.invocation,
            &self.config.dummy_identifier,
        ))
    }

    /// Patch and parse; `None` when the cursor is somewhere nothing can be
    /// completed (inside a literal or a comment).
    pub fn context(&self, request: &CompletionRequest) -> Result<Option<CompletionContext>, GrooveError> {
        let patch = self.before_completion(request)?;
        Ok(CompletionContext::new(request, patch))
    }

    pub fn complete(&self, request: &CompletionRequest) -> Result<CompletionList, GrooveError> {
        match self.context(request)? {
            Some(ctx) => Ok(self.complete_at(&ctx)),
            None => {
                debug!(offset = request.offset, "no completion position");
                Ok(CompletionList::default())
            }
        }
    }

    /// Complete against the file's own declarations and the class index.
    pub fn complete_at(&self, ctx: &CompletionContext) -> CompletionList {
        let resolver = FileResolver::new(ctx.root(), &self.index, &self.config);
        self.complete_with(ctx, &resolver)
    }

    /// Complete with a caller-supplied resolver.
    pub fn complete_with(
        &self,
        ctx: &CompletionContext,
        resolver: &dyn SymbolResolver,
    ) -> CompletionList {
        let mut sink = CompletionResultSink::new(ctx.prefix(), &self.config, ctx.cancel())
            .exclude(&self.config.dummy_identifier);

        for entry in self.registry.classify(ctx.position(), ctx.invocation()) {
            if sink.is_cancelled() {
                debug!("completion cancelled");
                break;
            }
            let before = sink.len();
            entry.strategy.generate(ctx, resolver, &mut sink);
            trace!(
                strategy = entry.strategy.name(),
                added = sink.len() - before,
                "strategy finished"
            );
        }

        let list = sink.finish();
        debug!(
            prefix = %list.prefix,
            count = list.len(),
            incomplete = list.incomplete,
            "completion finished"
        );
        list
    }

    /// Edits that insert `candidate` at `offset` of the original document.
    pub fn apply(
        &self,
        candidate: &Candidate,
        document: &str,
        offset: u32,
    ) -> Result<DocumentEdit, GrooveError> {
        check_offset(document, offset)?;
        let cx = InsertContext::new(document, &self.config);
        Ok(insert::apply(candidate, &cx, replace_range(document, offset)))
    }
}
