use serde::Serialize;

use crate::span::Span;

/// A token produced by the Groove lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Every kind of token in the Groovy subset understood by the engine.
///
/// Unlike a compiler lexer, trivia (whitespace, newlines, comments) is part of
/// the vocabulary: completion works on byte offsets and the syntax tree must
/// cover every byte of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Keywords ───────────────────────────────────────────────────────
    Abstract,
    As,
    Boolean,
    Byte,
    Char,
    Class,
    Def,
    Double,
    Else,
    Enum,
    Extends,
    False,
    Final,
    Float,
    If,
    Implements,
    Import,
    In,
    Instanceof,
    Int,
    Interface,
    Long,
    Native,
    New,
    Null,
    Package,
    Private,
    Protected,
    Public,
    Return,
    Short,
    Static,
    Strictfp,
    Super,
    Synchronized,
    This,
    Throw,
    Throws,
    Trait,
    Transient,
    True,
    Void,
    Volatile,
    While,

    // ── Operators ──────────────────────────────────────────────────────
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `!`
    Bang,
    /// `=`
    Eq,
    /// `->`
    Arrow,
    /// `?`
    Question,
    /// `?.`
    SafeDot,
    /// `@`
    At,

    // ── Delimiters ─────────────────────────────────────────────────────
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // ── Punctuation ────────────────────────────────────────────────────
    Comma,
    Dot,
    Colon,
    Semicolon,

    // ── Literals ───────────────────────────────────────────────────────
    IntLiteral,
    FloatLiteral,
    /// Any complete or unterminated string literal, including GStrings.
    StringLiteral,

    Ident,

    // ── Trivia ─────────────────────────────────────────────────────────
    /// Spaces, tabs and carriage returns.
    Whitespace,
    /// A single `\n`. Significant as a statement terminator outside
    /// parentheses and brackets.
    Newline,
    /// `// ...`
    LineComment,
    /// `/* ... */`, including Groovydoc.
    BlockComment,

    // ── Special ────────────────────────────────────────────────────────
    Eof,
    /// Invalid/unexpected input. Used for error recovery.
    Error,
}

impl TokenKind {
    /// Whitespace, newlines and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::LineComment
                | TokenKind::BlockComment
        )
    }

    /// Keywords that may open a declaration's modifier list. `def` counts:
    /// in Groovy it stands in for a type and behaves like a modifier.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Private
                | TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Transient
                | TokenKind::Abstract
                | TokenKind::Native
                | TokenKind::Volatile
                | TokenKind::Strictfp
                | TokenKind::Def
                | TokenKind::Final
                | TokenKind::Synchronized
                | TokenKind::Static
        )
    }

    /// Built-in primitive type keywords, `void` included.
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::Boolean
                | TokenKind::Byte
                | TokenKind::Char
                | TokenKind::Double
                | TokenKind::Float
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Short
                | TokenKind::Void
        )
    }
}

/// Look up a keyword from its string representation.
///
/// Keywords are case-sensitive. Returns `None` for identifiers.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    let kind = match s {
        "abstract" => TokenKind::Abstract,
        "as" => TokenKind::As,
        "boolean" => TokenKind::Boolean,
        "byte" => TokenKind::Byte,
        "char" => TokenKind::Char,
        "class" => TokenKind::Class,
        "def" => TokenKind::Def,
        "double" => TokenKind::Double,
        "else" => TokenKind::Else,
        "enum" => TokenKind::Enum,
        "extends" => TokenKind::Extends,
        "false" => TokenKind::False,
        "final" => TokenKind::Final,
        "float" => TokenKind::Float,
        "if" => TokenKind::If,
        "implements" => TokenKind::Implements,
        "import" => TokenKind::Import,
        "in" => TokenKind::In,
        "instanceof" => TokenKind::Instanceof,
        "int" => TokenKind::Int,
        "interface" => TokenKind::Interface,
        "long" => TokenKind::Long,
        "native" => TokenKind::Native,
        "new" => TokenKind::New,
        "null" => TokenKind::Null,
        "package" => TokenKind::Package,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "public" => TokenKind::Public,
        "return" => TokenKind::Return,
        "short" => TokenKind::Short,
        "static" => TokenKind::Static,
        "strictfp" => TokenKind::Strictfp,
        "super" => TokenKind::Super,
        "synchronized" => TokenKind::Synchronized,
        "this" => TokenKind::This,
        "throw" => TokenKind::Throw,
        "throws" => TokenKind::Throws,
        "trait" => TokenKind::Trait,
        "transient" => TokenKind::Transient,
        "true" => TokenKind::True,
        "void" => TokenKind::Void,
        "volatile" => TokenKind::Volatile,
        "while" => TokenKind::While,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_from_str_recognizes_keywords() {
        let keywords = [
            ("class", TokenKind::Class),
            ("def", TokenKind::Def),
            ("new", TokenKind::New),
            ("this", TokenKind::This),
            ("super", TokenKind::Super),
            ("throw", TokenKind::Throw),
            ("private", TokenKind::Private),
            ("instanceof", TokenKind::Instanceof),
            ("void", TokenKind::Void),
        ];
        for (s, expected) in keywords {
            assert_eq!(
                keyword_from_str(s),
                Some(expected),
                "keyword_from_str({s:?}) should return Some({expected:?})"
            );
        }
    }

    #[test]
    fn keyword_from_str_rejects_non_keywords() {
        assert_eq!(keyword_from_str("foo"), None);
        assert_eq!(keyword_from_str("String"), None);
        assert_eq!(keyword_from_str("Class"), None); // case-sensitive
        assert_eq!(keyword_from_str(""), None);
    }

    #[test]
    fn modifier_set_matches_declaration_keywords() {
        for kw in [
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
        ] {
            let kind = keyword_from_str(kw).unwrap();
            assert!(kind.is_modifier(), "{kw} should be a modifier");
        }
        assert!(!TokenKind::Class.is_modifier());
        assert!(!TokenKind::Int.is_modifier());
    }

    #[test]
    fn trivia_kinds() {
        assert!(TokenKind::Whitespace.is_trivia());
        assert!(TokenKind::Newline.is_trivia());
        assert!(TokenKind::BlockComment.is_trivia());
        assert!(!TokenKind::Ident.is_trivia());
        assert!(!TokenKind::Eof.is_trivia());
    }

    #[test]
    fn token_new_constructor() {
        let tok = Token::new(TokenKind::New, 10, 13);
        assert_eq!(tok.kind, TokenKind::New);
        assert_eq!(tok.span, Span::new(10, 13));
    }
}
