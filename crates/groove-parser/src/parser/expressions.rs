//! Pratt expression parser.
//!
//! Binding powers, lowest first: assignment (right associative), ternary,
//! `||`, `&&`, equality, relational / `instanceof` / `as`, additive,
//! multiplicative, prefix, then postfix (calls, member access, indexing).

use crate::syntax_kind::SyntaxKind;

use super::items::{self, type_element};
use super::{statement_list, MarkClosed, Parser};

const PREFIX_BP: u8 = 17;

/// Parse a full expression.
pub(crate) fn expr(p: &mut Parser) {
    expr_bp(p, 0);
}

/// Returns (left bp, right bp, node kind) for a binary operator.
fn infix_binding_power(kind: SyntaxKind) -> Option<(u8, u8, SyntaxKind)> {
    let bp = match kind {
        SyntaxKind::EQ => (2, 1, SyntaxKind::ASSIGN_EXPR),
        SyntaxKind::QUESTION => (3, 3, SyntaxKind::TERNARY_EXPR),
        SyntaxKind::PIPE_PIPE => (5, 6, SyntaxKind::BINARY_EXPR),
        SyntaxKind::AMP_AMP => (7, 8, SyntaxKind::BINARY_EXPR),
        SyntaxKind::EQ_EQ | SyntaxKind::NOT_EQ => (9, 10, SyntaxKind::BINARY_EXPR),
        SyntaxKind::LT
        | SyntaxKind::GT
        | SyntaxKind::LT_EQ
        | SyntaxKind::GT_EQ
        | SyntaxKind::INSTANCEOF_KW
        | SyntaxKind::AS_KW
        | SyntaxKind::IN_KW => (11, 12, SyntaxKind::BINARY_EXPR),
        SyntaxKind::PLUS | SyntaxKind::MINUS => (13, 14, SyntaxKind::BINARY_EXPR),
        SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => {
            (15, 16, SyntaxKind::BINARY_EXPR)
        }
        _ => return None,
    };
    Some(bp)
}

fn expr_bp(p: &mut Parser, min_bp: u8) -> Option<MarkClosed> {
    let mut lhs = prefix_or_postfix(p)?;

    loop {
        let op = p.current();
        let Some((l_bp, r_bp, kind)) = infix_binding_power(op) else {
            break;
        };
        if l_bp < min_bp {
            break;
        }
        let m = p.open_before(lhs);
        p.advance(); // operator
        p.eat_newlines();
        match op {
            SyntaxKind::INSTANCEOF_KW | SyntaxKind::AS_KW => type_element(p),
            SyntaxKind::QUESTION => {
                expr_bp(p, 0);
                p.eat_newlines();
                if p.expect(SyntaxKind::COLON) {
                    expr_bp(p, r_bp);
                }
            }
            _ => {
                if expr_bp(p, r_bp).is_none() {
                    p.error("expected expression after operator");
                }
            }
        }
        lhs = p.close(m, kind);
    }

    Some(lhs)
}

fn prefix_or_postfix(p: &mut Parser) -> Option<MarkClosed> {
    if p.at_any(&[SyntaxKind::BANG, SyntaxKind::MINUS, SyntaxKind::PLUS]) {
        let m = p.open();
        p.advance();
        if expr_bp(p, PREFIX_BP).is_none() {
            p.error("expected expression");
        }
        return Some(p.close(m, SyntaxKind::PREFIX_EXPR));
    }
    let atom = atom(p)?;
    Some(postfix(p, atom))
}

/// Calls, member access, indexing and trailing closures.
fn postfix(p: &mut Parser, mut lhs: MarkClosed) -> MarkClosed {
    loop {
        match p.current() {
            SyntaxKind::L_PAREN => {
                let m = p.open_before(lhs);
                arg_list(p);
                if p.at(SyntaxKind::L_BRACE) {
                    closure(p);
                }
                lhs = p.close(m, SyntaxKind::CALL_EXPR);
            }
            SyntaxKind::L_BRACE => {
                // `list.each { ... }`
                let m = p.open_before(lhs);
                closure(p);
                lhs = p.close(m, SyntaxKind::CALL_EXPR);
            }
            SyntaxKind::DOT | SyntaxKind::SAFE_DOT => {
                let m = p.open_before(lhs);
                p.advance(); // . or ?.
                p.eat_newlines();
                let kind = match p.current() {
                    SyntaxKind::IDENT => {
                        p.advance();
                        SyntaxKind::REFERENCE_EXPR
                    }
                    SyntaxKind::THIS_KW => {
                        p.advance();
                        SyntaxKind::THIS_EXPR
                    }
                    SyntaxKind::SUPER_KW => {
                        p.advance();
                        SyntaxKind::SUPER_EXPR
                    }
                    _ => {
                        p.error("expected member name");
                        SyntaxKind::REFERENCE_EXPR
                    }
                };
                lhs = p.close(m, kind);
            }
            SyntaxKind::L_BRACKET => {
                let m = p.open_before(lhs);
                p.advance(); // [
                expr(p);
                p.expect(SyntaxKind::R_BRACKET);
                lhs = p.close(m, SyntaxKind::INDEX_EXPR);
            }
            _ => return lhs,
        }
    }
}

fn atom(p: &mut Parser) -> Option<MarkClosed> {
    let kind = match p.current() {
        SyntaxKind::INT_LITERAL
        | SyntaxKind::FLOAT_LITERAL
        | SyntaxKind::STRING_LITERAL
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW
        | SyntaxKind::NULL_KW => SyntaxKind::LITERAL,
        SyntaxKind::IDENT => SyntaxKind::REFERENCE_EXPR,
        SyntaxKind::THIS_KW => SyntaxKind::THIS_EXPR,
        SyntaxKind::SUPER_KW => SyntaxKind::SUPER_EXPR,
        SyntaxKind::NEW_KW => return Some(new_expr(p)),
        SyntaxKind::L_BRACE => return Some(closure(p)),
        SyntaxKind::L_PAREN => {
            let m = p.open();
            p.advance();
            expr(p);
            p.expect(SyntaxKind::R_PAREN);
            return Some(p.close(m, SyntaxKind::PAREN_EXPR));
        }
        SyntaxKind::L_BRACKET => return Some(list_expr(p)),
        _ => {
            p.error("expected expression");
            return None;
        }
    };
    let m = p.open();
    p.advance();
    Some(p.close(m, kind))
}

/// `( expr (, expr)* )`; named arguments (`key: value`) are accepted.
pub(crate) fn arg_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (
    while !p.at_any(&[SyntaxKind::R_PAREN, SyntaxKind::EOF]) {
        if expr_bp(p, 0).is_none() {
            break;
        }
        if p.eat(SyntaxKind::COLON) {
            expr(p);
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::ARG_LIST);
}

/// `new T(args) { body }?` or `new T[n][]...`
fn new_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // new
    if p.current().is_primitive_type() {
        p.advance();
    } else if p.at(SyntaxKind::IDENT) {
        items::code_reference(p);
    } else {
        p.error("expected type after `new`");
        return p.close(m, SyntaxKind::NEW_EXPR);
    }

    if p.at(SyntaxKind::L_PAREN) {
        arg_list(p);
        if p.at(SyntaxKind::L_BRACE) {
            items::class_body(p, None);
        }
    } else if p.at(SyntaxKind::L_BRACKET) {
        while p.at(SyntaxKind::L_BRACKET) {
            let d = p.open();
            p.advance(); // [
            if !p.at(SyntaxKind::R_BRACKET) {
                expr(p);
            }
            p.expect(SyntaxKind::R_BRACKET);
            p.close(d, SyntaxKind::ARRAY_DIMENSION);
        }
    } else {
        p.error("expected `(` or `[` after type in `new` expression");
    }
    p.close(m, SyntaxKind::NEW_EXPR)
}

/// `{ params -> statements }`. The PARAMETER_LIST child is always present,
/// empty when the closure declares no parameters.
fn closure(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // {

    let has_params = closure_has_params(p);
    let params = p.open();
    if has_params {
        while !p.at_any(&[SyntaxKind::ARROW, SyntaxKind::EOF]) {
            let before = p.pos;
            items::parameter(p);
            if p.pos == before {
                p.advance_with_error("expected closure parameter");
            }
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
    }
    p.close(params, SyntaxKind::PARAMETER_LIST);
    if has_params {
        p.expect(SyntaxKind::ARROW);
    }

    statement_list(p, Some(SyntaxKind::R_BRACE));
    if !p.eat(SyntaxKind::R_BRACE) {
        p.error_with_related("expected `}`", open_span, "closure opened here");
    }
    p.close(m, SyntaxKind::CLOSURE)
}

/// Whether the tokens after `{` form a parameter list ending in `->`.
fn closure_has_params(p: &Parser) -> bool {
    let mut n = 0;
    loop {
        match p.nth(n) {
            SyntaxKind::ARROW => return true,
            SyntaxKind::IDENT
            | SyntaxKind::COMMA
            | SyntaxKind::DOT
            | SyntaxKind::LT
            | SyntaxKind::GT
            | SyntaxKind::QUESTION
            | SyntaxKind::L_BRACKET
            | SyntaxKind::R_BRACKET
            | SyntaxKind::EXTENDS_KW => {}
            kind if kind.is_primitive_type() || kind.is_modifier() => {}
            _ => return false,
        }
        n += 1;
    }
}

/// `[a, b, c]`
fn list_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // [
    while !p.at_any(&[SyntaxKind::R_BRACKET, SyntaxKind::EOF]) {
        if expr_bp(p, 0).is_none() {
            break;
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_BRACKET);
    p.close(m, SyntaxKind::LIST_EXPR)
}
