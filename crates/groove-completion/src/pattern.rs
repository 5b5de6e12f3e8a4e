//! Composable predicates over the completion position.
//!
//! A [`ContextPattern`] looks at a leaf of the patched tree (normally the
//! dummy identifier) and its surroundings: the previous significant leaf and
//! the chain of ancestors. Patterns are built once, shared by the registry
//! and evaluated for every request.

use std::fmt;
use std::sync::Arc;

use groove_parser::{SyntaxKind, SyntaxToken};

type Predicate = Arc<dyn Fn(&SyntaxToken) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct ContextPattern {
    name: String,
    predicate: Predicate,
}

impl fmt::Debug for ContextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextPattern").field(&self.name).finish()
    }
}

impl ContextPattern {
    fn new(
        name: impl Into<String>,
        predicate: impl Fn(&SyntaxToken) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, leaf: &SyntaxToken) -> bool {
        (self.predicate)(leaf)
    }

    /// Rename a composed pattern for logging.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn and(self, other: ContextPattern) -> Self {
        let name = format!("({} && {})", self.name, other.name);
        Self::new(name, move |leaf| self.matches(leaf) && other.matches(leaf))
    }

    pub fn or(self, other: ContextPattern) -> Self {
        let name = format!("({} || {})", self.name, other.name);
        Self::new(name, move |leaf| self.matches(leaf) || other.matches(leaf))
    }
}

/// Matches every position.
pub fn anything() -> ContextPattern {
    ContextPattern::new("anything", |_| true)
}

pub fn not(pattern: ContextPattern) -> ContextPattern {
    let name = format!("!{}", pattern.name);
    ContextPattern::new(name, move |leaf| !pattern.matches(leaf))
}

/// The leaf's own text is `text`.
pub fn text(text: &'static str) -> ContextPattern {
    ContextPattern::new(format!("text({text:?})"), move |leaf| leaf.text() == text)
}

/// The previous non-trivia leaf exists and matches `pattern`.
pub fn after_leaf(pattern: ContextPattern) -> ContextPattern {
    let name = format!("after_leaf({})", pattern.name);
    ContextPattern::new(name, move |leaf| {
        previous_leaf(leaf).is_some_and(|prev| pattern.matches(&prev))
    })
}

pub fn after_leaf_text(leaf_text: &'static str) -> ContextPattern {
    after_leaf(text(leaf_text))
}

/// The previous non-trivia leaf has one of `texts`.
pub fn after_leaf_in(texts: &'static [&'static str]) -> ContextPattern {
    ContextPattern::new(format!("after_leaf_in({texts:?})"), move |leaf| {
        previous_leaf(leaf).is_some_and(|prev| texts.contains(&prev.text()))
    })
}

pub fn with_parent(kind: SyntaxKind) -> ContextPattern {
    with_super_parent(1, kind)
}

/// The ancestor `depth` levels up is a `kind` node; depth 1 is the parent.
/// A chain shorter than `depth` never matches.
pub fn with_super_parent(depth: usize, kind: SyntaxKind) -> ContextPattern {
    ContextPattern::new(format!("super_parent({depth}, {kind:?})"), move |leaf| {
        super_parent(leaf, depth).is_some_and(|node| node.kind() == kind)
    })
}

/// The nearest preceding leaf that is not whitespace or a comment.
pub fn previous_leaf(leaf: &SyntaxToken) -> Option<SyntaxToken> {
    let mut current = leaf.prev_token();
    while let Some(token) = current {
        if !token.kind().is_trivia() {
            return Some(token);
        }
        current = token.prev_token();
    }
    None
}

pub fn super_parent(leaf: &SyntaxToken, depth: usize) -> Option<groove_parser::SyntaxNode> {
    if depth == 0 {
        return None;
    }
    leaf.parent_ancestors().nth(depth - 1)
}
