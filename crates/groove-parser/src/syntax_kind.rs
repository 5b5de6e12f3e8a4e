//! SyntaxKind enum for the Groove CST.
//!
//! This is a superset of `TokenKind` (mapped to SCREAMING_SNAKE_CASE) plus
//! composite node kinds for CST nodes produced by the parser.

use groove_common::token::TokenKind;

/// Every kind of syntax element in the Groove CST.
///
/// Token kinds (leaves) are mapped 1:1 from [`TokenKind`]. Composite node kinds
/// represent parser-produced tree nodes. The first two values are sentinels used
/// by the event-based parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    /// Placeholder kind for incomplete/unfinished parser events.
    TOMBSTONE = 0,
    /// Wrapper for tokens/nodes that couldn't be parsed.
    ERROR_NODE = 1,

    // ── Keywords (44) ──────────────────────────────────────────────────
    ABSTRACT_KW,
    AS_KW,
    BOOLEAN_KW,
    BYTE_KW,
    CHAR_KW,
    CLASS_KW,
    DEF_KW,
    DOUBLE_KW,
    ELSE_KW,
    ENUM_KW,
    EXTENDS_KW,
    FALSE_KW,
    FINAL_KW,
    FLOAT_KW,
    IF_KW,
    IMPLEMENTS_KW,
    IMPORT_KW,
    IN_KW,
    INSTANCEOF_KW,
    INT_KW,
    INTERFACE_KW,
    LONG_KW,
    NATIVE_KW,
    NEW_KW,
    NULL_KW,
    PACKAGE_KW,
    PRIVATE_KW,
    PROTECTED_KW,
    PUBLIC_KW,
    RETURN_KW,
    SHORT_KW,
    STATIC_KW,
    STRICTFP_KW,
    SUPER_KW,
    SYNCHRONIZED_KW,
    THIS_KW,
    THROW_KW,
    THROWS_KW,
    TRAIT_KW,
    TRANSIENT_KW,
    TRUE_KW,
    VOID_KW,
    VOLATILE_KW,
    WHILE_KW,

    // ── Operators (19) ─────────────────────────────────────────────────
    PLUS,
    MINUS,
    STAR,
    SLASH,
    PERCENT,
    EQ_EQ,
    NOT_EQ,
    LT,
    GT,
    LT_EQ,
    GT_EQ,
    AMP_AMP,
    PIPE_PIPE,
    BANG,
    EQ,
    ARROW,
    QUESTION,
    SAFE_DOT,
    AT,

    // ── Delimiters (6) ─────────────────────────────────────────────────
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    L_BRACE,
    R_BRACE,

    // ── Punctuation (4) ────────────────────────────────────────────────
    COMMA,
    DOT,
    COLON,
    SEMICOLON,

    // ── Literals (3) ───────────────────────────────────────────────────
    INT_LITERAL,
    FLOAT_LITERAL,
    STRING_LITERAL,

    IDENT,

    // ── Trivia (4) ─────────────────────────────────────────────────────
    WHITESPACE,
    NEWLINE,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // ── Special (2) ────────────────────────────────────────────────────
    EOF,
    ERROR,

    // ── Composite node kinds ───────────────────────────────────────────
    /// Root node of every parse.
    SOURCE_FILE,
    /// `package a.b.c`
    PACKAGE_DECL,
    /// `import a.b.C`, `import a.b.*`, `import static a.B.m`, `import a.B as C`
    IMPORT_DECL,
    /// Dotted name in package and import declarations.
    QUALIFIED_NAME,
    /// `class`, `interface`, `enum` or `trait` declaration.
    CLASS_DECL,
    /// `{ member* }` of a class declaration.
    CLASS_BODY,
    /// `extends A, B`
    EXTENDS_CLAUSE,
    /// `implements A, B`
    IMPLEMENTS_CLAUSE,
    /// Method declaration, with or without a body.
    METHOD_DECL,
    /// Constructor declaration: a method whose name is the class name.
    CONSTRUCTOR_DECL,
    /// `throws A, B`
    THROWS_CLAUSE,
    /// `(a, b)` of a method, or the parameters of a closure (possibly empty).
    PARAMETER_LIST,
    /// One method or closure parameter.
    PARAMETER,
    /// Leading modifier keywords of a declaration (`private static final def`).
    MODIFIER_LIST,
    /// Declaration of one or more variables sharing modifiers and type.
    VARIABLE_DECL,
    /// A single declared variable: name plus optional initializer.
    VARIABLE,
    /// Declared type: primitive or code reference, plus array dimensions.
    TYPE_ELEMENT,
    /// Reference to a class in type position. Qualified references nest the
    /// qualifier as the first child.
    CODE_REFERENCE,
    /// `<A, B>` after a code reference.
    TYPE_ARG_LIST,
    /// `{ statement* }` body of a method, `if` or `while`.
    BLOCK,
    RETURN_STMT,
    THROW_STMT,
    IF_STMT,
    WHILE_STMT,

    // ── Expressions ────────────────────────────────────────────────────
    /// Number, string, boolean or `null`.
    LITERAL,
    /// Simple (`a`) or qualified (`q.a`, `q?.a`) reference.
    REFERENCE_EXPR,
    THIS_EXPR,
    SUPER_EXPR,
    /// `callee(args)`
    CALL_EXPR,
    /// `(a, b)` argument list of a call or `new` expression.
    ARG_LIST,
    /// `a[i]`
    INDEX_EXPR,
    /// `new T(args)`, `new T[n]`
    NEW_EXPR,
    /// `[n]` dimension of an array `new` expression.
    ARRAY_DIMENSION,
    /// `{ params -> statements }`
    CLOSURE,
    /// `[a, b]`
    LIST_EXPR,
    /// `(expr)`
    PAREN_EXPR,
    /// `a + b`, `a instanceof B`, `a as B`
    BINARY_EXPR,
    /// `!a`, `-a`
    PREFIX_EXPR,
    /// `a = b`
    ASSIGN_EXPR,
    /// `c ? a : b`
    TERNARY_EXPR,
}

impl SyntaxKind {
    /// Whether this kind is trivia (whitespace, newlines or comments).
    ///
    /// Trivia is kept in the tree but skipped by leaf-adjacency queries such
    /// as "the previous leaf".
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE
                | SyntaxKind::NEWLINE
                | SyntaxKind::LINE_COMMENT
                | SyntaxKind::BLOCK_COMMENT
        )
    }

    /// Whether this kind is a declaration modifier keyword.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PRIVATE_KW
                | SyntaxKind::PUBLIC_KW
                | SyntaxKind::PROTECTED_KW
                | SyntaxKind::TRANSIENT_KW
                | SyntaxKind::ABSTRACT_KW
                | SyntaxKind::NATIVE_KW
                | SyntaxKind::VOLATILE_KW
                | SyntaxKind::STRICTFP_KW
                | SyntaxKind::DEF_KW
                | SyntaxKind::FINAL_KW
                | SyntaxKind::SYNCHRONIZED_KW
                | SyntaxKind::STATIC_KW
        )
    }

    /// Whether this kind is a primitive type keyword (including `void`).
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            SyntaxKind::BOOLEAN_KW
                | SyntaxKind::BYTE_KW
                | SyntaxKind::CHAR_KW
                | SyntaxKind::DOUBLE_KW
                | SyntaxKind::FLOAT_KW
                | SyntaxKind::INT_KW
                | SyntaxKind::LONG_KW
                | SyntaxKind::SHORT_KW
                | SyntaxKind::VOID_KW
        )
    }

    /// Whether this kind opens a class-like declaration.
    pub fn is_class_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::CLASS_KW
                | SyntaxKind::INTERFACE_KW
                | SyntaxKind::ENUM_KW
                | SyntaxKind::TRAIT_KW
        )
    }

    /// Nodes that hold a sequence of statements.
    pub fn is_statement_container(self) -> bool {
        matches!(
            self,
            SyntaxKind::SOURCE_FILE | SyntaxKind::BLOCK | SyntaxKind::CLOSURE | SyntaxKind::CLASS_BODY
        )
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            // Keywords
            TokenKind::Abstract => SyntaxKind::ABSTRACT_KW,
            TokenKind::As => SyntaxKind::AS_KW,
            TokenKind::Boolean => SyntaxKind::BOOLEAN_KW,
            TokenKind::Byte => SyntaxKind::BYTE_KW,
            TokenKind::Char => SyntaxKind::CHAR_KW,
            TokenKind::Class => SyntaxKind::CLASS_KW,
            TokenKind::Def => SyntaxKind::DEF_KW,
            TokenKind::Double => SyntaxKind::DOUBLE_KW,
            TokenKind::Else => SyntaxKind::ELSE_KW,
            TokenKind::Enum => SyntaxKind::ENUM_KW,
            TokenKind::Extends => SyntaxKind::EXTENDS_KW,
            TokenKind::False => SyntaxKind::FALSE_KW,
            TokenKind::Final => SyntaxKind::FINAL_KW,
            TokenKind::Float => SyntaxKind::FLOAT_KW,
            TokenKind::If => SyntaxKind::IF_KW,
            TokenKind::Implements => SyntaxKind::IMPLEMENTS_KW,
            TokenKind::Import => SyntaxKind::IMPORT_KW,
            TokenKind::In => SyntaxKind::IN_KW,
            TokenKind::Instanceof => SyntaxKind::INSTANCEOF_KW,
            TokenKind::Int => SyntaxKind::INT_KW,
            TokenKind::Interface => SyntaxKind::INTERFACE_KW,
            TokenKind::Long => SyntaxKind::LONG_KW,
            TokenKind::Native => SyntaxKind::NATIVE_KW,
            TokenKind::New => SyntaxKind::NEW_KW,
            TokenKind::Null => SyntaxKind::NULL_KW,
            TokenKind::Package => SyntaxKind::PACKAGE_KW,
            TokenKind::Private => SyntaxKind::PRIVATE_KW,
            TokenKind::Protected => SyntaxKind::PROTECTED_KW,
            TokenKind::Public => SyntaxKind::PUBLIC_KW,
            TokenKind::Return => SyntaxKind::RETURN_KW,
            TokenKind::Short => SyntaxKind::SHORT_KW,
            TokenKind::Static => SyntaxKind::STATIC_KW,
            TokenKind::Strictfp => SyntaxKind::STRICTFP_KW,
            TokenKind::Super => SyntaxKind::SUPER_KW,
            TokenKind::Synchronized => SyntaxKind::SYNCHRONIZED_KW,
            TokenKind::This => SyntaxKind::THIS_KW,
            TokenKind::Throw => SyntaxKind::THROW_KW,
            TokenKind::Throws => SyntaxKind::THROWS_KW,
            TokenKind::Trait => SyntaxKind::TRAIT_KW,
            TokenKind::Transient => SyntaxKind::TRANSIENT_KW,
            TokenKind::True => SyntaxKind::TRUE_KW,
            TokenKind::Void => SyntaxKind::VOID_KW,
            TokenKind::Volatile => SyntaxKind::VOLATILE_KW,
            TokenKind::While => SyntaxKind::WHILE_KW,

            // Operators
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Minus => SyntaxKind::MINUS,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::Percent => SyntaxKind::PERCENT,
            TokenKind::EqEq => SyntaxKind::EQ_EQ,
            TokenKind::NotEq => SyntaxKind::NOT_EQ,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::LtEq => SyntaxKind::LT_EQ,
            TokenKind::GtEq => SyntaxKind::GT_EQ,
            TokenKind::AmpAmp => SyntaxKind::AMP_AMP,
            TokenKind::PipePipe => SyntaxKind::PIPE_PIPE,
            TokenKind::Bang => SyntaxKind::BANG,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::Arrow => SyntaxKind::ARROW,
            TokenKind::Question => SyntaxKind::QUESTION,
            TokenKind::SafeDot => SyntaxKind::SAFE_DOT,
            TokenKind::At => SyntaxKind::AT,

            // Delimiters
            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,

            // Punctuation
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::Semicolon => SyntaxKind::SEMICOLON,

            // Literals
            TokenKind::IntLiteral => SyntaxKind::INT_LITERAL,
            TokenKind::FloatLiteral => SyntaxKind::FLOAT_LITERAL,
            TokenKind::StringLiteral => SyntaxKind::STRING_LITERAL,

            TokenKind::Ident => SyntaxKind::IDENT,

            // Trivia
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Newline => SyntaxKind::NEWLINE,
            TokenKind::LineComment => SyntaxKind::LINE_COMMENT,
            TokenKind::BlockComment => SyntaxKind::BLOCK_COMMENT,

            // Special
            TokenKind::Eof => SyntaxKind::EOF,
            TokenKind::Error => SyntaxKind::ERROR,
        }
    }
}
