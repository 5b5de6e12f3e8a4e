//! Groove lexer -- lossless tokenizer for the Groovy subset the completion
//! engine analyses.
//!
//! Every byte of the input ends up in exactly one token: whitespace, newlines
//! and comments are emitted as trivia so the parser can build a syntax tree
//! whose offsets match the source. The stream always ends with a zero-length
//! `Eof` token.

mod cursor;

use cursor::Cursor;
use groove_common::error::{LexError, LexErrorKind};
use groove_common::span::Span;
use groove_common::token::{keyword_from_str, Token, TokenKind};

/// The Groove lexer. Converts source text into a stream of tokens.
///
/// Implements `Iterator<Item = Token>` so callers (the completion patcher in
/// particular) can consume tokens lazily and stop early.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    emitted_eof: bool,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            emitted_eof: false,
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source into a `Vec<Token>`, including the final
    /// `Eof` token.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    /// Tokenize the entire source and return the errors encountered.
    pub fn tokenize_with_errors(source: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.by_ref().collect();
        (tokens, lexer.errors)
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    fn next_token(&mut self) -> Token {
        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            // ── Trivia ───────────────────────────────────────────────────
            '\n' => self.single_char_token(TokenKind::Newline, start),
            ' ' | '\t' | '\r' => {
                self.cursor
                    .eat_while(|c| c == ' ' || c == '\t' || c == '\r');
                Token::new(TokenKind::Whitespace, start, self.cursor.pos())
            }
            '/' if self.cursor.peek_next() == Some('/') => {
                self.cursor.eat_while(|c| c != '\n');
                Token::new(TokenKind::LineComment, start, self.cursor.pos())
            }
            '/' if self.cursor.peek_next() == Some('*') => self.lex_block_comment(start),

            // ── Single-character delimiters ───────────────────────────────
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '[' => self.single_char_token(TokenKind::LBracket, start),
            ']' => self.single_char_token(TokenKind::RBracket, start),
            '{' => self.single_char_token(TokenKind::LBrace, start),
            '}' => self.single_char_token(TokenKind::RBrace, start),
            ',' => self.single_char_token(TokenKind::Comma, start),
            ';' => self.single_char_token(TokenKind::Semicolon, start),
            '.' => self.single_char_token(TokenKind::Dot, start),
            ':' => self.single_char_token(TokenKind::Colon, start),
            '@' => self.single_char_token(TokenKind::At, start),
            '+' => self.single_char_token(TokenKind::Plus, start),
            '*' => self.single_char_token(TokenKind::Star, start),
            '/' => self.single_char_token(TokenKind::Slash, start),
            '%' => self.single_char_token(TokenKind::Percent, start),

            // ── Multi-character operators ─────────────────────────────────
            '=' => self.one_or_two(start, '=', TokenKind::Eq, TokenKind::EqEq),
            '!' => self.one_or_two(start, '=', TokenKind::Bang, TokenKind::NotEq),
            '<' => self.one_or_two(start, '=', TokenKind::Lt, TokenKind::LtEq),
            '>' => self.one_or_two(start, '=', TokenKind::Gt, TokenKind::GtEq),
            '-' => self.one_or_two(start, '>', TokenKind::Minus, TokenKind::Arrow),
            '?' => self.one_or_two(start, '.', TokenKind::Question, TokenKind::SafeDot),
            '&' => self.doubled_only(start, '&', TokenKind::AmpAmp),
            '|' => self.doubled_only(start, '|', TokenKind::PipePipe),

            '0'..='9' => self.lex_number(start),
            '"' | '\'' => self.lex_string(start, c),
            c if is_ident_start(c) => self.lex_ident(start),

            // ── Unknown character (error recovery) ───────────────────────
            other => {
                self.cursor.advance();
                let end = self.cursor.pos();
                self.errors.push(LexError::new(
                    LexErrorKind::UnexpectedCharacter(other),
                    Span::new(start, end),
                ));
                Token::new(TokenKind::Error, start, end)
            }
        }
    }

    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// Consume the current character; if the next one is `second`, consume it
    /// too and return `two`, otherwise return `one`.
    fn one_or_two(&mut self, start: u32, second: char, one: TokenKind, two: TokenKind) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some(second) {
            self.cursor.advance();
            Token::new(two, start, self.cursor.pos())
        } else {
            Token::new(one, start, self.cursor.pos())
        }
    }

    /// `&&` / `||`: the single-character forms are not part of the subset.
    fn doubled_only(&mut self, start: u32, c: char, kind: TokenKind) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some(c) {
            self.cursor.advance();
            return Token::new(kind, start, self.cursor.pos());
        }
        let end = self.cursor.pos();
        self.errors.push(LexError::new(
            LexErrorKind::UnexpectedCharacter(c),
            Span::new(start, end),
        ));
        Token::new(TokenKind::Error, start, end)
    }

    fn lex_block_comment(&mut self, start: u32) -> Token {
        self.cursor.advance_by(2); // `/*`
        loop {
            if self.cursor.is_eof() {
                self.errors.push(LexError::new(
                    LexErrorKind::UnterminatedBlockComment,
                    Span::new(start, self.cursor.pos()),
                ));
                break;
            }
            if self.cursor.starts_with("*/") {
                self.cursor.advance_by(2);
                break;
            }
            self.cursor.advance();
        }
        Token::new(TokenKind::BlockComment, start, self.cursor.pos())
    }

    /// Integer and decimal literals, with Groovy's type suffixes (`L`, `G`,
    /// `d`, `f`, ...) folded into the token.
    fn lex_number(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let mut kind = TokenKind::IntLiteral;
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance(); // .
            self.cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
            kind = TokenKind::FloatLiteral;
        }
        Token::new(kind, start, self.cursor.pos())
    }

    /// Single-, double- and triple-quoted strings. GString interpolation is
    /// not tokenized separately; the whole literal is one token.
    fn lex_string(&mut self, start: u32, quote: char) -> Token {
        let triple: String = std::iter::repeat(quote).take(3).collect();
        if self.cursor.starts_with(&triple) {
            self.cursor.advance_by(3);
            loop {
                if self.cursor.is_eof() {
                    self.unterminated_string(start);
                    break;
                }
                if self.cursor.starts_with(&triple) {
                    self.cursor.advance_by(3);
                    break;
                }
                if self.cursor.advance() == Some('\\') {
                    self.cursor.advance();
                }
            }
            return Token::new(TokenKind::StringLiteral, start, self.cursor.pos());
        }

        self.cursor.advance(); // opening quote
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    self.unterminated_string(start);
                    break;
                }
                Some('\\') => {
                    self.cursor.advance();
                    if self.cursor.peek() != Some('\n') {
                        self.cursor.advance();
                    }
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    break;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        Token::new(TokenKind::StringLiteral, start, self.cursor.pos())
    }

    fn unterminated_string(&mut self, start: u32) {
        self.errors.push(LexError::new(
            LexErrorKind::UnterminatedString,
            Span::new(start, self.cursor.pos()),
        ));
    }

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.eat_while(is_ident_continue);
        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end);
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        Token::new(kind, start, end)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

/// Token stream positioned at `offset`.
///
/// The first token yielded is the one containing `offset` (start inclusive,
/// end exclusive); when `offset` is at the end of input only `Eof` remains.
/// Lexing always starts from the beginning of the text because string and
/// comment state is not recoverable from an arbitrary offset.
pub fn token_stream_at(source: &str, offset: u32) -> impl Iterator<Item = Token> + '_ {
    Lexer::new(source).skip_while(move |token| token.kind != TokenKind::Eof && token.span.end <= offset)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_variable_declaration_keeps_trivia() {
        assert_eq!(
            kinds("List x = new"),
            vec![
                TokenKind::Ident,
                TokenKind::Whitespace,
                TokenKind::Ident,
                TokenKind::Whitespace,
                TokenKind::Eq,
                TokenKind::Whitespace,
                TokenKind::New,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokens_cover_every_byte() {
        let source = "def f = { String a, b -> a.size() } // done\n/* c */ x";
        let tokens = Lexer::tokenize(source);
        let mut expected_start = 0;
        for token in &tokens {
            assert_eq!(token.span.start, expected_start, "gap before {token:?}");
            expected_start = token.span.end;
        }
        assert_eq!(expected_start as usize, source.len());
    }

    #[test]
    fn lex_operators() {
        assert_eq!(
            kinds("-> ?. == != <= >= && ||"),
            vec![
                TokenKind::Arrow,
                TokenKind::Whitespace,
                TokenKind::SafeDot,
                TokenKind::Whitespace,
                TokenKind::EqEq,
                TokenKind::Whitespace,
                TokenKind::NotEq,
                TokenKind::Whitespace,
                TokenKind::LtEq,
                TokenKind::Whitespace,
                TokenKind::GtEq,
                TokenKind::Whitespace,
                TokenKind::AmpAmp,
                TokenKind::Whitespace,
                TokenKind::PipePipe,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_strings_and_numbers() {
        assert_eq!(
            kinds("'a' \"b\\\"c\" '''x\ny''' 10L 1.5d"),
            vec![
                TokenKind::StringLiteral,
                TokenKind::Whitespace,
                TokenKind::StringLiteral,
                TokenKind::Whitespace,
                TokenKind::StringLiteral,
                TokenKind::Whitespace,
                TokenKind::IntLiteral,
                TokenKind::Whitespace,
                TokenKind::FloatLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_stops_at_newline() {
        let (tokens, errors) = Lexer::tokenize_with_errors("'abc\nx");
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].span, Span::new(0, 4));
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn unexpected_character_is_error_token() {
        let (tokens, errors) = Lexer::tokenize_with_errors("a # b");
        assert_eq!(tokens[2].kind, TokenKind::Error);
        assert_eq!(errors[0].kind, LexErrorKind::UnexpectedCharacter('#'));
    }

    #[test]
    fn token_stream_at_starts_at_containing_token() {
        let source = "foo bar(";
        let first: Vec<_> = token_stream_at(source, 0).map(|t| t.kind).take(2).collect();
        assert_eq!(first, vec![TokenKind::Ident, TokenKind::Whitespace]);

        // Offset 3 is the end of `foo`, i.e. the start of the whitespace.
        let at_space = token_stream_at(source, 3).next().unwrap();
        assert_eq!(at_space.kind, TokenKind::Whitespace);

        // Mid-identifier offsets land on the identifier.
        let mid = token_stream_at(source, 5).next().unwrap();
        assert_eq!(mid.span, Span::new(4, 7));

        let end: Vec<_> = token_stream_at(source, source.len() as u32).collect();
        assert_eq!(end.len(), 1);
        assert_eq!(end[0].kind, TokenKind::Eof);
    }
}
