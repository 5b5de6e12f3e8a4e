//! Makes an incomplete file parseable at the cursor before analysis.
//!
//! The original text is never touched: a copy gets a dummy identifier at the
//! cursor, sometimes followed by closing punctuation so that the parser
//! recovers the surrounding construct instead of swallowing the dummy into
//! the next statement.

use groove_common::span::Span;
use groove_common::token::TokenKind;
use groove_lexer::token_stream_at;
use groove_parser::ast::expr::Expr;
use groove_parser::{SyntaxElement, SyntaxKind, SyntaxToken};
use rowan::TextSize;
use tracing::trace;

use crate::context::Invocation;

/// Which punctuation, if any, followed the dummy identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    /// Just the dummy identifier.
    Plain,
    /// Dummy identifier plus `;`, ending the statement before a call or a
    /// following declaration.
    Semicolon,
    /// Dummy identifier plus `->`, closing a closure's parameter list.
    ClosureArrow,
}

/// A patched copy of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub text: String,
    /// The inserted text, in patched-text offsets. Starts at the cursor.
    pub synthetic: Span,
    pub kind: PatchKind,
}

impl Patch {
    /// Offset of the cursor; the same in the original and the patched text.
    pub fn offset(&self) -> u32 {
        self.synthetic.start
    }

    /// Length of the inserted dummy identifier, without punctuation.
    pub fn dummy_len(&self) -> u32 {
        let punctuation = match self.kind {
            PatchKind::Plain => 0,
            PatchKind::Semicolon => 1,
            PatchKind::ClosureArrow => 2,
        };
        self.synthetic.len() - punctuation
    }
}

/// Build the patched copy for a completion at `offset`.
///
/// Smart completion always inserts the bare dummy. `offset` must be a
/// character boundary inside `original`.
pub fn before_completion(original: &str, offset: u32, invocation: Invocation, dummy: &str) -> Patch {
    let kind = match invocation {
        Invocation::Smart => PatchKind::Plain,
        Invocation::Basic if semicolon_needed(original, offset) => PatchKind::Semicolon,
        Invocation::Basic if is_in_closure_parameters(original, offset) => PatchKind::ClosureArrow,
        Invocation::Basic => PatchKind::Plain,
    };
    let inserted = match kind {
        PatchKind::Plain => dummy.to_string(),
        PatchKind::Semicolon => format!("{dummy};"),
        PatchKind::ClosureArrow => format!("{dummy}->"),
    };
    trace!(?kind, offset, "patching completion copy");

    let at = offset as usize;
    let mut text = String::with_capacity(original.len() + inserted.len());
    text.push_str(&original[..at]);
    text.push_str(&inserted);
    text.push_str(&original[at..]);
    Patch {
        text,
        synthetic: Span::new(offset, offset + inserted.len() as u32),
        kind,
    }
}

/// Whether the code after the cursor looks like the start of a call or of a
/// declaration (`<caret>String name = ...`), which the dummy would otherwise
/// merge with.
pub fn semicolon_needed(text: &str, offset: u32) -> bool {
    let mut tokens = token_stream_at(text, offset).filter(|t| t.kind != TokenKind::Eof);
    let Some(mut token) = tokens.next() else {
        return false;
    };

    if token.kind == TokenKind::Ident {
        match tokens.next() {
            Some(next) => token = next,
            None => return false,
        }
    }
    if token.kind == TokenKind::LParen {
        return true;
    }
    while token.kind.is_trivia() {
        match tokens.next() {
            Some(next) => token = next,
            None => return false,
        }
    }
    // Everything after the second identifier is accepted: an assignment
    // does not have to follow.
    token.kind == TokenKind::Ident
}

/// Whether the cursor sits in the parameter part of a closure whose `->` has
/// not been typed yet (`{ String x, <caret>`).
///
/// Works on the unpatched text.
pub fn is_in_closure_parameters(text: &str, offset: u32) -> bool {
    if offset as usize >= text.len() {
        return false;
    }
    let root = groove_parser::parse(text).syntax();
    let Some(position) = root.token_at_offset(TextSize::from(offset)).right_biased() else {
        return false;
    };

    let declaration = enclosing_declaration(&position).or_else(|| {
        let mut prev = skip_trivia(position.prev_sibling_or_token());
        if prev.as_ref().is_some_and(|p| p.kind() == SyntaxKind::ERROR_NODE) {
            prev = skip_trivia(prev.and_then(|p| p.prev_sibling_or_token()));
        }
        prev.and_then(|p| p.into_node())
            .filter(|n| n.kind() == SyntaxKind::VARIABLE_DECL)
    });
    let Some(declaration) = declaration else {
        return false;
    };
    if declaration.parent().map(|p| p.kind()) != Some(SyntaxKind::CLOSURE) {
        return false;
    }
    skip_trivia(declaration.prev_sibling_or_token())
        .is_some_and(|p| p.kind() == SyntaxKind::PARAMETER_LIST)
}

/// The variable declaration containing `position`, not looking past the
/// enclosing expression or statement.
fn enclosing_declaration(position: &SyntaxToken) -> Option<groove_parser::SyntaxNode> {
    for node in position.parent_ancestors() {
        let kind = node.kind();
        if kind == SyntaxKind::VARIABLE_DECL {
            return Some(node);
        }
        if Expr::is_expr_kind(kind) || is_statement_kind(kind) {
            return None;
        }
    }
    None
}

fn is_statement_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::RETURN_STMT
            | SyntaxKind::THROW_STMT
            | SyntaxKind::IF_STMT
            | SyntaxKind::WHILE_STMT
            | SyntaxKind::BLOCK
    )
}

fn skip_trivia(mut element: Option<SyntaxElement>) -> Option<SyntaxElement> {
    while let Some(current) = element {
        if !current.kind().is_trivia() {
            return Some(current);
        }
        element = current.prev_sibling_or_token();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMMY: &str = "IntellijIdeaRulezzz";

    fn patch_at(source: &str) -> Patch {
        let offset = source.find("<caret>").unwrap();
        let text = source.replace("<caret>", "");
        before_completion(&text, offset as u32, Invocation::Basic, DUMMY)
    }

    #[test]
    fn call_after_cursor_gets_semicolon() {
        let patch = patch_at("foo<caret>(1)");
        assert_eq!(patch.kind, PatchKind::Semicolon);
        assert_eq!(patch.text, "fooIntellijIdeaRulezzz;(1)");
        assert_eq!(patch.synthetic, Span::new(3, 3 + DUMMY.len() as u32 + 1));
        assert_eq!(patch.dummy_len(), DUMMY.len() as u32);
    }

    #[test]
    fn declaration_after_cursor_gets_semicolon() {
        assert_eq!(patch_at("<caret>String name = 'x'").kind, PatchKind::Semicolon);
        // No assignment needed after the name.
        assert_eq!(patch_at("<caret>String name").kind, PatchKind::Semicolon);
        assert_eq!(patch_at("<caret> /* c */ String name").kind, PatchKind::Semicolon);
    }

    #[test]
    fn no_punctuation_when_heuristic_says_no() {
        for source in ["foo.<caret>", "x = <caret>", "<caret>", "foo(<caret>)", "<caret>String"] {
            let patch = patch_at(source);
            assert_eq!(patch.kind, PatchKind::Plain, "{source}");
            assert_eq!(patch.synthetic.len(), DUMMY.len() as u32, "{source}");
        }
    }

    #[test]
    fn original_text_is_preserved_around_the_dummy() {
        let original = "def a = 1\nfoo.b\nbar()";
        let patch = before_completion(original, 15, Invocation::Basic, DUMMY);
        assert_eq!(&patch.text[..15], &original[..15]);
        assert_eq!(&patch.text[patch.synthetic.end as usize..], &original[15..]);
        assert_eq!(patch.offset(), 15);
    }

    #[test]
    fn closure_parameters_get_arrow() {
        assert!(is_in_closure_parameters("def c = { String x, String }", 27));
        assert!(is_in_closure_parameters("def c = { String x, }", 20));
        let patch = patch_at("def c = { String x <caret>}");
        assert_eq!(patch.kind, PatchKind::ClosureArrow);
        assert!(patch.text.contains("IntellijIdeaRulezzz->"));
    }

    #[test]
    fn closure_body_is_not_parameters() {
        assert!(!is_in_closure_parameters("def c = { a -> String x }", 22));
        assert!(!is_in_closure_parameters("def c = { foo() }", 11));
        assert!(!is_in_closure_parameters("String x = 1", 7));
        assert!(!is_in_closure_parameters("def c = { String x", 18));
    }

    #[test]
    fn smart_invocation_uses_plain_dummy() {
        let patch = before_completion("foo(1)", 3, Invocation::Smart, DUMMY);
        assert_eq!(patch.kind, PatchKind::Plain);
        assert_eq!(patch.text, "fooIntellijIdeaRulezzz(1)");
    }
}
