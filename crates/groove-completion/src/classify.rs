//! Routes a completion position to the strategies that apply there.

use groove_parser::{SyntaxKind, SyntaxToken};
use tracing::trace;

use crate::context::Invocation;
use crate::pattern::{
    after_leaf, after_leaf_in, after_leaf_text, anything, not, text, with_parent,
    with_super_parent, ContextPattern,
};
use crate::strategy::{
    CandidateStrategy, DeclaredTypeCompletion, NewExpressionCompletion,
    QualifierKeywordCompletion, ReferenceCompletion,
};

/// Words that can start a declaration without a type.
pub const MODIFIERS: &[&str] = &[
    "private",
    "public",
    "protected",
    "transient",
    "abstract",
    "native",
    "volatile",
    "strictfp",
    "def",
    "final",
    "synchronized",
    "static",
];

/// `Type x = new <caret>`: the reference right after `new` (but not
/// `throw new`) in a variable initializer.
pub fn after_new() -> ContextPattern {
    after_leaf(text("new").and(not(after_leaf_text("throw"))))
        .and(with_super_parent(3, SyntaxKind::VARIABLE))
        .named("AFTER_NEW")
}

/// `qualifier.<caret>` in an expression.
pub fn after_dot() -> ContextPattern {
    after_leaf_text(".")
        .and(with_parent(SyntaxKind::REFERENCE_EXPR))
        .named("AFTER_DOT")
}

/// `private <caret>`, or an untyped parameter: the word the parser took for
/// a declared name may be the start of a type.
pub fn type_in_variable_declaration_after_modifier() -> ContextPattern {
    with_parent(SyntaxKind::VARIABLE)
        .and(after_leaf_in(MODIFIERS))
        .or(with_parent(SyntaxKind::PARAMETER))
        .named("TYPE_IN_VARIABLE_DECLARATION_AFTER_MODIFIER")
}

pub struct RegistryEntry {
    pub invocation: Invocation,
    pub pattern: ContextPattern,
    pub strategy: Box<dyn CandidateStrategy>,
}

/// Ordered (pattern, strategy) pairs. Every entry whose invocation and
/// pattern match runs, in registration order.
#[derive(Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        invocation: Invocation,
        pattern: ContextPattern,
        strategy: impl CandidateStrategy + 'static,
    ) -> &mut Self {
        self.entries.push(RegistryEntry {
            invocation,
            pattern,
            strategy: Box::new(strategy),
        });
        self
    }

    /// The Groovy completion registry.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(Invocation::Basic, anything(), ReferenceCompletion)
            .register(Invocation::Smart, after_new(), NewExpressionCompletion)
            .register(Invocation::Basic, after_dot(), QualifierKeywordCompletion)
            .register(
                Invocation::Basic,
                type_in_variable_declaration_after_modifier(),
                DeclaredTypeCompletion,
            );
        registry
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Entries matching `position` for `invocation`, in registration order.
    pub fn classify(&self, position: &SyntaxToken, invocation: Invocation) -> Vec<&RegistryEntry> {
        let matched: Vec<&RegistryEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.invocation == invocation && entry.pattern.matches(position))
            .collect();
        trace!(
            ?invocation,
            patterns = ?matched.iter().map(|e| e.pattern.name()).collect::<Vec<_>>(),
            "classified completion position"
        );
        matched
    }
}
