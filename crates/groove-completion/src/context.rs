//! Per-request state shared by every strategy.

use groove_parser::{SyntaxKind, SyntaxNode, SyntaxToken};
use rowan::TextSize;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::patch::Patch;

/// How completion was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Invocation {
    /// Plain completion: everything that fits the position.
    #[default]
    Basic,
    /// Expected-type driven completion.
    Smart,
}

/// A completion request against a document snapshot.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub text: String,
    pub offset: u32,
    pub invocation: Invocation,
    pub cancel: CancellationToken,
}

impl CompletionRequest {
    pub fn basic(text: impl Into<String>, offset: u32) -> Self {
        Self {
            text: text.into(),
            offset,
            invocation: Invocation::Basic,
            cancel: CancellationToken::new(),
        }
    }

    pub fn smart(text: impl Into<String>, offset: u32) -> Self {
        Self {
            invocation: Invocation::Smart,
            ..Self::basic(text, offset)
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// The patched tree and the completion position inside it.
///
/// Built once per request and never modified; strategies only read it.
pub struct CompletionContext {
    original_text: String,
    patch: Patch,
    root: SyntaxNode,
    position: SyntaxToken,
    prefix: String,
    invocation: Invocation,
    cancel: CancellationToken,
}

impl CompletionContext {
    /// Parse the patched text and locate the dummy identifier.
    ///
    /// Returns `None` when the dummy did not end up in an identifier token,
    /// e.g. when it was glued onto a number or swallowed by a string
    /// literal. There is nothing to complete there.
    pub fn new(request: &CompletionRequest, patch: Patch) -> Option<Self> {
        let root = groove_parser::parse(&patch.text).syntax();
        let offset = patch.offset();
        let position = root.token_at_offset(TextSize::from(offset)).right_biased()?;
        if position.kind() != SyntaxKind::IDENT {
            trace!(kind = ?position.kind(), offset, "completion position is not an identifier");
            return None;
        }
        let start = u32::from(position.text_range().start());
        let prefix = position.text()[..(offset - start) as usize].to_string();
        Some(Self {
            original_text: request.text.clone(),
            patch,
            root,
            position,
            prefix,
            invocation: request.invocation,
            cancel: request.cancel.clone(),
        })
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn patched_text(&self) -> &str {
        &self.patch.text
    }

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// The identifier holding the dummy in the patched tree.
    pub fn position(&self) -> &SyntaxToken {
        &self.position
    }

    /// What the user typed before the cursor in the current identifier.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn offset(&self) -> u32 {
        self.patch.offset()
    }

    pub fn invocation(&self) -> Invocation {
        self.invocation
    }

    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
