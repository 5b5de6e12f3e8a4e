//! Event-based parser for the Groovy subset.
//!
//! The parser consumes a token stream and produces events (Open/Close/Advance)
//! that are later converted into a rowan green tree. This decouples parsing
//! logic from tree construction.
//!
//! # Architecture
//!
//! The parser uses matklad's event-based approach (as in rust-analyzer):
//!
//! 1. Parse functions call `open()` to start a node, `advance()` to consume
//!    tokens, and `close()` to finish a node with its actual kind.
//! 2. Events are collected into a flat `Vec<Event>`.
//! 3. `build_tree()` converts events into a rowan `GreenNode`.
//!
//! The `open_before()` method enables wrapping a previously completed node
//! (e.g., turning `a` into `a.b` or `f` into `f(x)`) using the
//! "forward parent" technique.
//!
//! # Newline significance
//!
//! Newlines terminate statements unless the innermost open delimiter is `(`
//! or `[`. Braces open blocks, closures and class bodies, all of which hold
//! newline-separated statements, so a delimiter *stack* is tracked instead of
//! per-kind depths. Whitespace and comments are always skipped by lookahead
//! and emitted into the tree when the next significant token is consumed.
//!
//! # Error tolerance
//!
//! Completion runs on code that is being typed, so the parser records every
//! error and keeps going. Each loop either consumes a token or exits.

pub(crate) mod expressions;
pub(crate) mod items;

use groove_common::span::Span;
use groove_common::token::{Token, TokenKind};

use crate::error::ParseError;
use crate::syntax_kind::SyntaxKind;

/// A parser event. Events are collected during parsing and later converted
/// into a rowan green tree by [`Parser::build_tree`].
#[derive(Debug)]
enum Event {
    /// Start a new CST node. The `kind` is initially TOMBSTONE and gets
    /// patched by `close()` with the real node kind.
    ///
    /// `forward_parent` is used by `open_before()` to indicate that this
    /// node should be opened before the node at the specified event index.
    Open {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },
    /// Finish the current CST node.
    Close,
    /// Consume the current token, advancing the token position.
    Advance,
}

/// An opaque marker for a started but not-yet-closed CST node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

/// An opaque marker for a completed (opened and closed) CST node.
/// Used by `open_before()` to wrap a previously completed node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

/// Event-based parser for Groovy source code.
pub(crate) struct Parser<'src> {
    /// All tokens from the lexer (including Eof).
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Collected parser events.
    events: Vec<Event>,
    /// Original source text (for extracting token text via spans).
    source: &'src str,
    /// Open delimiters, innermost last.
    delimiters: Vec<SyntaxKind>,
    /// Collected parse errors.
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            delimiters: Vec::new(),
            errors: Vec::new(),
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// Returns the SyntaxKind of the current significant token.
    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Returns the SyntaxKind of the Nth significant token ahead.
    ///
    /// `nth(0)` is equivalent to `current()`. Skips trivia and
    /// insignificant newlines. Returns `SyntaxKind::EOF` if past end.
    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_token(n)
            .map(|token| SyntaxKind::from(token.kind))
            .unwrap_or(SyntaxKind::EOF)
    }

    /// Text of the Nth significant token ahead.
    pub(crate) fn nth_text(&self, n: usize) -> &'src str {
        match self.nth_token(n) {
            Some(token) => &self.source[token.span.start as usize..token.span.end as usize],
            None => "",
        }
    }

    /// Returns the text of the current significant token.
    pub(crate) fn current_text(&self) -> &'src str {
        self.nth_text(0)
    }

    fn nth_token(&self, n: usize) -> Option<&Token> {
        let mut pos = self.pos;
        let mut remaining = n;
        while pos < self.tokens.len() {
            let token = &self.tokens[pos];
            if self.should_skip(token.kind) {
                pos += 1;
                continue;
            }
            if remaining == 0 {
                return Some(token);
            }
            remaining -= 1;
            pos += 1;
        }
        None
    }

    /// Returns the span of the current significant token.
    pub(crate) fn current_span(&self) -> Span {
        match self.nth_token(0) {
            Some(token) => token.span,
            None => Span::empty(self.source.len() as u32),
        }
    }

    /// Check if the current significant token matches the given kind.
    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Check if the current significant token matches any of the given kinds.
    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Whether the current token ends a statement.
    pub(crate) fn at_statement_end(&self) -> bool {
        self.at_any(&[
            SyntaxKind::NEWLINE,
            SyntaxKind::SEMICOLON,
            SyntaxKind::R_BRACE,
            SyntaxKind::EOF,
        ])
    }

    // ── Mutation: node management ──────────────────────────────────────

    /// Start a new CST node. Returns a marker that must be passed to
    /// `close()` to finish the node.
    ///
    /// Pending trivia is flushed into the enclosing node first, so every
    /// node starts at its first significant token.
    pub(crate) fn open(&mut self) -> MarkOpened {
        self.flush_trivia();
        self.open_here()
    }

    fn open_here(&mut self) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        mark
    }

    /// Start a new CST node BEFORE a previously completed node.
    ///
    /// Instead of physically inserting into the events vec (which would
    /// invalidate indices), a `forward_parent` link is set on the completed
    /// node's Open event.
    pub(crate) fn open_before(&mut self, completed: MarkClosed) -> MarkOpened {
        let mark = self.open_here();
        if let Event::Open { forward_parent, .. } = &mut self.events[completed.index] {
            *forward_parent = Some(mark.index);
        }
        mark
    }

    /// Close a CST node, patching its Open event with the actual kind.
    /// Returns a `MarkClosed` that can be used with `open_before()`.
    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        if let Event::Open {
            kind: slot_kind, ..
        } = &mut self.events[m.index]
        {
            *slot_kind = kind;
        }
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    // ── Mutation: token consumption ────────────────────────────────────

    /// Consume the current token, emitting Advance events for all skipped
    /// trivia tokens and then for the significant token itself.
    ///
    /// At end of input only the trailing trivia is consumed.
    pub(crate) fn advance(&mut self) {
        self.flush_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            if token.kind == TokenKind::Eof {
                return;
            }
            self.update_delimiters(SyntaxKind::from(token.kind));
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    fn flush_trivia(&mut self) {
        while self.pos < self.tokens.len() && self.should_skip(self.tokens[self.pos].kind) {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    /// Consume the current token wrapped in an ERROR_NODE.
    pub(crate) fn advance_with_error(&mut self, message: &str) {
        self.error(message);
        let m = self.open();
        self.advance();
        self.close(m, SyntaxKind::ERROR_NODE);
    }

    /// If the current token matches `kind`, consume it and return true.
    /// Otherwise record an error and return false.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(&format!("expected {:?}", kind));
            false
        }
    }

    /// If the current token matches `kind`, consume it and return true.
    /// Otherwise, return false (no error emitted).
    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume statement separators: significant newlines and `;`.
    pub(crate) fn eat_separators(&mut self) {
        while self.at_any(&[SyntaxKind::NEWLINE, SyntaxKind::SEMICOLON]) {
            self.advance();
        }
    }

    /// Consume significant newlines only.
    pub(crate) fn eat_newlines(&mut self) {
        while self.at(SyntaxKind::NEWLINE) {
            self.advance();
        }
    }

    // ── Error reporting ────────────────────────────────────────────────

    /// Record a parse error at the current position.
    pub(crate) fn error(&mut self, message: &str) {
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span));
    }

    /// Record a parse error with a related span for additional context.
    pub(crate) fn error_with_related(&mut self, message: &str, related_span: Span, related_msg: &str) {
        let span = self.current_span();
        self.errors
            .push(ParseError::with_related(message, span, related_msg, related_span));
    }

    // ── Newline significance ───────────────────────────────────────────

    fn is_newline_insignificant(&self) -> bool {
        matches!(
            self.delimiters.last(),
            Some(SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET)
        )
    }

    /// Whether a token should be skipped by lookahead methods.
    fn should_skip(&self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::Newline => self.is_newline_insignificant(),
            other => other.is_trivia(),
        }
    }

    fn update_delimiters(&mut self, kind: SyntaxKind) {
        let opener = match kind {
            SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET | SyntaxKind::L_BRACE => {
                self.delimiters.push(kind);
                return;
            }
            SyntaxKind::R_PAREN => SyntaxKind::L_PAREN,
            SyntaxKind::R_BRACKET => SyntaxKind::L_BRACKET,
            SyntaxKind::R_BRACE => SyntaxKind::L_BRACE,
            _ => return,
        };
        // A stray closer leaves the stack alone.
        if self.delimiters.last() == Some(&opener) {
            self.delimiters.pop();
        }
    }

    // ── Tree building ──────────────────────────────────────────────────

    /// Convert collected events into a rowan `GreenNode` and errors.
    ///
    /// Forward parents: when `open_before(completed)` is called, the completed
    /// node's Open event gets a `forward_parent` link pointing to the wrapping
    /// Open event. During tree building, when we encounter such an Open, we
    /// follow the chain, collect all kinds, and open nodes in reverse order
    /// (outermost wrapper first). The wrapper Open events are then marked as
    /// TOMBSTONE so they are skipped when encountered later.
    pub(crate) fn build_tree(mut self) -> (rowan::GreenNode, Vec<ParseError>) {
        let mut builder = rowan::GreenNodeBuilder::new();
        let mut token_pos: usize = 0;
        let mut forward_parents: Vec<(usize, SyntaxKind)> = Vec::new();

        let mut i = 0;
        while i < self.events.len() {
            match self.events[i] {
                Event::Open {
                    kind,
                    forward_parent,
                } => {
                    if forward_parent.is_some() {
                        forward_parents.clear();
                        let mut current = i;
                        loop {
                            let (fk, fp) = match self.events[current] {
                                Event::Open {
                                    kind,
                                    forward_parent,
                                } => (kind, forward_parent),
                                _ => unreachable!("forward parent must point at an Open event"),
                            };
                            forward_parents.push((current, fk));
                            match fp {
                                Some(next) => current = next,
                                None => break,
                            }
                        }

                        for &(fp_idx, _) in forward_parents.iter().skip(1) {
                            if let Event::Open {
                                ref mut kind,
                                ref mut forward_parent,
                            } = self.events[fp_idx]
                            {
                                *kind = SyntaxKind::TOMBSTONE;
                                *forward_parent = None;
                            }
                        }

                        for &(_, fk) in forward_parents.iter().rev() {
                            if fk != SyntaxKind::TOMBSTONE {
                                builder.start_node(rowan::SyntaxKind(fk as u16));
                            }
                        }
                    } else if kind != SyntaxKind::TOMBSTONE {
                        builder.start_node(rowan::SyntaxKind(kind as u16));
                    }
                }
                Event::Close => {
                    builder.finish_node();
                }
                Event::Advance => {
                    if let Some(token) = self.tokens.get(token_pos) {
                        let syntax_kind = SyntaxKind::from(token.kind);
                        let text = &self.source[token.span.start as usize..token.span.end as usize];
                        builder.token(rowan::SyntaxKind(syntax_kind as u16), text);
                        token_pos += 1;
                    }
                }
            }
            i += 1;
        }

        (builder.finish(), self.errors)
    }
}

// ── Top-level parsing ──────────────────────────────────────────────────

/// Parse a complete source file: optional package, imports, then classes
/// and script statements in any order.
pub(crate) fn parse_source_file(p: &mut Parser) {
    let root = p.open_here();
    statement_list(p, None);
    // Remaining tokens at top level are stray closers; keep them in the tree.
    while !p.at(SyntaxKind::EOF) {
        p.advance_with_error("unexpected token");
        statement_list(p, None);
    }
    p.advance(); // trailing trivia
    p.close(root, SyntaxKind::SOURCE_FILE);
}

/// Parse statements until `closing` (or EOF / a stray closer at top level).
///
/// Statements are separated by significant newlines or `;`. A missing
/// separator is reported and parsing continues with the next statement.
pub(crate) fn statement_list(p: &mut Parser, closing: Option<SyntaxKind>) {
    loop {
        p.eat_separators();
        if p.at(SyntaxKind::EOF) {
            break;
        }
        match closing {
            Some(kind) if p.at(kind) => break,
            None if p.at_any(&[SyntaxKind::R_BRACE, SyntaxKind::R_PAREN, SyntaxKind::R_BRACKET]) => {
                break
            }
            _ => {}
        }

        let before = p.pos;
        statement(p);
        if p.pos == before {
            p.advance_with_error("expected statement");
            continue;
        }

        if !p.at_statement_end() {
            p.error("expected newline or `;` after statement");
        }
    }
}

/// Parse one statement or declaration.
pub(crate) fn statement(p: &mut Parser) {
    match p.current() {
        SyntaxKind::PACKAGE_KW => items::package_decl(p),
        SyntaxKind::IMPORT_KW => items::import_decl(p),
        SyntaxKind::RETURN_KW => {
            let m = p.open();
            p.advance();
            if !p.at_statement_end() {
                expressions::expr(p);
            }
            p.close(m, SyntaxKind::RETURN_STMT);
        }
        SyntaxKind::THROW_KW => {
            let m = p.open();
            p.advance();
            expressions::expr(p);
            p.close(m, SyntaxKind::THROW_STMT);
        }
        SyntaxKind::IF_KW => if_stmt(p),
        SyntaxKind::WHILE_KW => while_stmt(p),
        _ if items::at_declaration_start(p) => items::declaration(p, None),
        _ => {
            expressions::expr(p);
        }
    }
}

/// `{ statement* }`
pub(crate) fn block(p: &mut Parser) {
    let m = p.open();
    let open_span = p.current_span();
    p.expect(SyntaxKind::L_BRACE);
    statement_list(p, Some(SyntaxKind::R_BRACE));
    if !p.eat(SyntaxKind::R_BRACE) {
        p.error_with_related("expected `}`", open_span, "block opened here");
    }
    p.close(m, SyntaxKind::BLOCK);
}

fn if_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // if
    condition(p);
    branch(p);
    // `else` may follow on the next line.
    if p.at(SyntaxKind::NEWLINE) && next_significant_is_else(p) {
        p.eat_newlines();
    }
    if p.eat(SyntaxKind::ELSE_KW) {
        branch(p);
    }
    p.close(m, SyntaxKind::IF_STMT);
}

fn next_significant_is_else(p: &Parser) -> bool {
    let mut n = 0;
    while p.nth(n) == SyntaxKind::NEWLINE {
        n += 1;
    }
    p.nth(n) == SyntaxKind::ELSE_KW
}

fn while_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // while
    condition(p);
    branch(p);
    p.close(m, SyntaxKind::WHILE_STMT);
}

fn condition(p: &mut Parser) {
    if p.expect(SyntaxKind::L_PAREN) {
        expressions::expr(p);
        p.expect(SyntaxKind::R_PAREN);
    }
}

fn branch(p: &mut Parser) {
    if p.at(SyntaxKind::L_BRACE) {
        block(p);
    } else if !p.at_statement_end() {
        statement(p);
    } else {
        p.error("expected statement");
    }
}
