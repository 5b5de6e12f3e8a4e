//! Typed AST nodes for expressions.

use crate::ast::item::{CodeReference, ParameterList};
use crate::ast::{ast_node, child_node, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

/// Any expression node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Literal(Literal),
    ReferenceExpr(ReferenceExpr),
    ThisExpr(ThisExpr),
    SuperExpr(SuperExpr),
    CallExpr(CallExpr),
    NewExpr(NewExpr),
    Closure(Closure),
    Other(SyntaxNode),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let expr = match node.kind() {
            SyntaxKind::LITERAL => Expr::Literal(Literal { syntax: node }),
            SyntaxKind::REFERENCE_EXPR => Expr::ReferenceExpr(ReferenceExpr { syntax: node }),
            SyntaxKind::THIS_EXPR => Expr::ThisExpr(ThisExpr { syntax: node }),
            SyntaxKind::SUPER_EXPR => Expr::SuperExpr(SuperExpr { syntax: node }),
            SyntaxKind::CALL_EXPR => Expr::CallExpr(CallExpr { syntax: node }),
            SyntaxKind::NEW_EXPR => Expr::NewExpr(NewExpr { syntax: node }),
            SyntaxKind::CLOSURE => Expr::Closure(Closure { syntax: node }),
            SyntaxKind::INDEX_EXPR
            | SyntaxKind::LIST_EXPR
            | SyntaxKind::PAREN_EXPR
            | SyntaxKind::BINARY_EXPR
            | SyntaxKind::PREFIX_EXPR
            | SyntaxKind::ASSIGN_EXPR
            | SyntaxKind::TERNARY_EXPR => Expr::Other(node),
            _ => return None,
        };
        Some(expr)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Literal(it) => &it.syntax,
            Expr::ReferenceExpr(it) => &it.syntax,
            Expr::ThisExpr(it) => &it.syntax,
            Expr::SuperExpr(it) => &it.syntax,
            Expr::CallExpr(it) => &it.syntax,
            Expr::NewExpr(it) => &it.syntax,
            Expr::Closure(it) => &it.syntax,
            Expr::Other(node) => node,
        }
    }

    /// Whether `kind` is one of the expression node kinds.
    pub fn is_expr_kind(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::LITERAL
                | SyntaxKind::REFERENCE_EXPR
                | SyntaxKind::THIS_EXPR
                | SyntaxKind::SUPER_EXPR
                | SyntaxKind::CALL_EXPR
                | SyntaxKind::NEW_EXPR
                | SyntaxKind::CLOSURE
                | SyntaxKind::INDEX_EXPR
                | SyntaxKind::LIST_EXPR
                | SyntaxKind::PAREN_EXPR
                | SyntaxKind::BINARY_EXPR
                | SyntaxKind::PREFIX_EXPR
                | SyntaxKind::ASSIGN_EXPR
                | SyntaxKind::TERNARY_EXPR
        )
    }
}

ast_node!(Literal, LITERAL);

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }

    pub fn is_string(&self) -> bool {
        self.token()
            .is_some_and(|t| t.kind() == SyntaxKind::STRING_LITERAL)
    }
}

ast_node!(ReferenceExpr, REFERENCE_EXPR);

impl ReferenceExpr {
    /// `q` in `q.name`; `None` for a simple reference.
    pub fn qualifier(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    /// `q?.name`
    pub fn is_safe(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::SAFE_DOT).is_some()
    }
}

ast_node!(ThisExpr, THIS_EXPR);
ast_node!(SuperExpr, SUPER_EXPR);

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(NewExpr, NEW_EXPR);

impl NewExpr {
    pub fn code_reference(&self) -> Option<CodeReference> {
        child_node(&self.syntax)
    }

    /// `new T[n]` rather than `new T(...)`.
    pub fn is_array(&self) -> bool {
        self.syntax
            .children()
            .any(|n| n.kind() == SyntaxKind::ARRAY_DIMENSION)
    }
}

ast_node!(Closure, CLOSURE);

impl Closure {
    /// Always present; empty when the closure declares no parameters.
    pub fn parameter_list(&self) -> Option<ParameterList> {
        child_node(&self.syntax)
    }

    /// Whether the closure has an explicit `->`.
    pub fn has_arrow(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::ARROW).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn first<N: AstNode>(src: &str) -> N {
        parse(src).syntax().descendants().find_map(N::cast).unwrap()
    }

    #[test]
    fn qualified_reference_has_qualifier() {
        let reference: ReferenceExpr = first("foo.bar");
        // The outermost reference comes first in preorder.
        assert_eq!(reference.name().as_deref(), Some("bar"));
        match reference.qualifier() {
            Some(Expr::ReferenceExpr(q)) => assert_eq!(q.name().as_deref(), Some("foo")),
            other => panic!("expected reference qualifier, got {other:?}"),
        }
    }

    #[test]
    fn closure_always_has_parameter_list() {
        let closure: Closure = first("def c = { it.size() }");
        assert!(!closure.has_arrow());
        assert_eq!(closure.parameter_list().unwrap().parameters().count(), 0);

        let closure: Closure = first("def c = { String a, b -> a }");
        assert!(closure.has_arrow());
        assert_eq!(closure.parameter_list().unwrap().parameters().count(), 2);
    }

    #[test]
    fn new_expression_forms() {
        let new_expr: NewExpr = first("def x = new java.util.ArrayList<String>()");
        assert_eq!(new_expr.code_reference().unwrap().path(), "java.util.ArrayList");
        assert!(!new_expr.is_array());

        let new_expr: NewExpr = first("def x = new int[3][]");
        assert!(new_expr.is_array());
    }
}
