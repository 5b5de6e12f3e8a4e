//! Groove parser: error-tolerant event parser producing a rowan-based CST.
//!
//! This crate transforms the token stream from `groove-lexer` into a lossless
//! concrete syntax tree. Every byte of the input, trivia included, ends up in
//! the tree, so node offsets are source offsets. Parsing never aborts: errors
//! are collected in [`Parse`] and the tree covers whatever could be
//! recognized, which is what completion on half-typed code needs.

pub mod ast;
pub mod cst;
pub mod error;
mod parser;
pub mod syntax_kind;

use std::fmt::Write;

pub use cst::{GroovyLanguage, SyntaxElement, SyntaxNode, SyntaxToken};
pub use error::ParseError;
pub use syntax_kind::SyntaxKind;

/// Result of parsing a Groovy source file.
///
/// Contains the green tree (the immutable, cheap-to-clone CST) and all parse
/// errors encountered.
#[derive(Debug, Clone)]
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    /// Build the syntax tree root from the green node.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Parse errors encountered during parsing.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Whether parsing completed without errors.
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Indented `KIND@start..end` dump of the tree, tokens with their text.
    pub fn debug_tree(&self) -> String {
        debug_tree(&self.syntax())
    }
}

/// Parse a Groovy source file into a CST.
///
/// Lexes the source, runs the event parser over the full token stream and
/// builds the tree. Lexer errors are reported as parse errors at the same
/// span.
pub fn parse(source: &str) -> Parse {
    let (tokens, lex_errors) = groove_lexer::Lexer::tokenize_with_errors(source);
    let mut p = parser::Parser::new(tokens, source);
    parser::parse_source_file(&mut p);
    let (green, mut errors) = p.build_tree();
    errors.extend(
        lex_errors
            .into_iter()
            .map(|e| ParseError::new(e.kind.to_string(), e.span)),
    );
    errors.sort_by_key(|e| e.span.start);
    Parse { green, errors }
}

/// Render a subtree in the indented debug format used by the parser tests.
pub fn debug_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    for event in node.preorder_with_tokens() {
        match event {
            rowan::WalkEvent::Enter(element) => {
                let range = element.text_range();
                let _ = write!(
                    out,
                    "{:indent$}{:?}@{}..{}",
                    "",
                    element.kind(),
                    u32::from(range.start()),
                    u32::from(range.end()),
                    indent = depth * 2
                );
                if let rowan::NodeOrToken::Token(token) = &element {
                    let _ = write!(out, " {:?}", token.text());
                }
                out.push('\n');
                depth += 1;
            }
            rowan::WalkEvent::Leave(_) => depth -= 1,
        }
    }
    out
}
