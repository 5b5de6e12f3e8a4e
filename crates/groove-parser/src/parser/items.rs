//! Declaration parsers: package, imports, classes, members, variables,
//! parameters and types.

use crate::syntax_kind::SyntaxKind;

use super::{block, expressions, MarkOpened, Parser};

// ── Lookahead ──────────────────────────────────────────────────────────

/// Number of significant tokens a type starting at `nth(start)` spans, or
/// `None` if no type starts there.
///
/// Accepts `prim`, `Name(.Name)*`, optional type arguments and trailing
/// `[]` pairs. Used to tell `Foo x` (declaration) from `foo x` (not valid)
/// and `foo.bar` (expression).
pub(crate) fn type_len(p: &Parser, start: usize) -> Option<usize> {
    let mut n = start;
    if p.nth(n).is_primitive_type() {
        n += 1;
    } else if p.nth(n) == SyntaxKind::IDENT {
        n += 1;
        while p.nth(n) == SyntaxKind::DOT && p.nth(n + 1) == SyntaxKind::IDENT {
            n += 2;
        }
        if p.nth(n) == SyntaxKind::LT {
            n = type_args_end(p, n)?;
        }
    } else {
        return None;
    }
    while p.nth(n) == SyntaxKind::L_BRACKET && p.nth(n + 1) == SyntaxKind::R_BRACKET {
        n += 2;
    }
    Some(n - start)
}

/// Index just past the `>` that closes the type argument list at `nth(lt)`.
fn type_args_end(p: &Parser, lt: usize) -> Option<usize> {
    let mut depth = 0u32;
    let mut n = lt;
    loop {
        match p.nth(n) {
            SyntaxKind::LT => depth += 1,
            SyntaxKind::GT => {
                depth -= 1;
                if depth == 0 {
                    return Some(n + 1);
                }
            }
            SyntaxKind::IDENT
            | SyntaxKind::DOT
            | SyntaxKind::COMMA
            | SyntaxKind::QUESTION
            | SyntaxKind::EXTENDS_KW
            | SyntaxKind::SUPER_KW
            | SyntaxKind::L_BRACKET
            | SyntaxKind::R_BRACKET => {}
            kind if kind.is_primitive_type() => {}
            _ => return None,
        }
        n += 1;
    }
}

/// Whether the statement at the cursor is a declaration rather than an
/// expression.
pub(crate) fn at_declaration_start(p: &Parser) -> bool {
    let current = p.current();
    if current.is_modifier() || current.is_class_keyword() || current == SyntaxKind::AT {
        return true;
    }
    matches!(type_len(p, 0), Some(n) if p.nth(n) == SyntaxKind::IDENT)
}

// ── Package and imports ────────────────────────────────────────────────

/// `package a.b.c`
pub(crate) fn package_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // package
    qualified_name(p);
    p.close(m, SyntaxKind::PACKAGE_DECL);
}

/// `import static? a.b.C (.*)? (as Alias)?`
pub(crate) fn import_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // import
    p.eat(SyntaxKind::STATIC_KW);
    qualified_name(p);
    if p.at(SyntaxKind::DOT) && p.nth(1) == SyntaxKind::STAR {
        p.advance();
        p.advance();
    } else if p.eat(SyntaxKind::AS_KW) {
        p.expect(SyntaxKind::IDENT);
    }
    p.close(m, SyntaxKind::IMPORT_DECL);
}

fn qualified_name(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::IDENT);
    while p.at(SyntaxKind::DOT) && p.nth(1) == SyntaxKind::IDENT {
        p.advance();
        p.advance();
    }
    p.close(m, SyntaxKind::QUALIFIED_NAME);
}

// ── Declarations ───────────────────────────────────────────────────────

/// Parse a class, method, constructor or variable declaration.
///
/// `class_name` is the enclosing class when parsing class members; it is
/// used to recognize constructors.
pub(crate) fn declaration(p: &mut Parser, class_name: Option<&str>) {
    let m = p.open();
    let has_modifiers = modifier_list(p);

    if p.current().is_class_keyword() {
        class_decl(p, m);
        return;
    }

    if let Some(name) = class_name {
        if p.at(SyntaxKind::IDENT) && p.current_text() == name && p.nth(1) == SyntaxKind::L_PAREN {
            p.advance(); // name
            method_rest(p, m, SyntaxKind::CONSTRUCTOR_DECL);
            return;
        }
    }

    let typed = matches!(type_len(p, 0), Some(n) if p.nth(n) == SyntaxKind::IDENT);
    let name_at = if typed { type_len(p, 0).unwrap_or(0) } else { 0 };
    let is_method = p.nth(name_at) == SyntaxKind::IDENT
        && p.nth(name_at + 1) == SyntaxKind::L_PAREN
        && (typed || has_modifiers || class_name.is_some());

    if typed {
        type_element(p);
    } else if class_name.is_some() && !has_modifiers && p.at(SyntaxKind::IDENT) && !is_method {
        // `Foo` alone in a class body: a type with the name still missing.
        type_element(p);
        p.error("expected variable name");
        p.close(m, SyntaxKind::VARIABLE_DECL);
        return;
    }

    if is_method {
        p.advance(); // name
        method_rest(p, m, SyntaxKind::METHOD_DECL);
        return;
    }

    variables(p);
    p.close(m, SyntaxKind::VARIABLE_DECL);
}

/// Parse leading modifiers and annotations into a MODIFIER_LIST.
/// Returns false (and emits no node) when there are none.
fn modifier_list(p: &mut Parser) -> bool {
    if !p.current().is_modifier() && !p.at(SyntaxKind::AT) {
        return false;
    }
    let m = p.open();
    loop {
        if p.current().is_modifier() {
            p.advance();
        } else if p.at(SyntaxKind::AT) {
            annotation(p);
            p.eat_newlines();
        } else {
            break;
        }
    }
    p.close(m, SyntaxKind::MODIFIER_LIST);
    true
}

/// `@Name` or `@Name(args)`, kept as tokens of the modifier list.
fn annotation(p: &mut Parser) {
    p.advance(); // @
    if p.at(SyntaxKind::IDENT) {
        code_reference(p);
    } else {
        p.error("expected annotation name");
    }
    if p.at(SyntaxKind::L_PAREN) {
        expressions::arg_list(p);
    }
}

/// `name (= init)? (, name (= init)?)*`
fn variables(p: &mut Parser) {
    loop {
        if !p.at(SyntaxKind::IDENT) {
            p.error("expected variable name");
            return;
        }
        let v = p.open();
        p.advance(); // name
        if p.eat(SyntaxKind::EQ) {
            p.eat_newlines();
            expressions::expr(p);
        }
        p.close(v, SyntaxKind::VARIABLE);
        if !p.eat(SyntaxKind::COMMA) {
            return;
        }
    }
}

/// Parameter list, throws clause and optional body after a method name.
fn method_rest(p: &mut Parser, m: MarkOpened, kind: SyntaxKind) {
    parameter_list(p);
    if p.at(SyntaxKind::THROWS_KW) {
        let t = p.open();
        p.advance();
        loop {
            if p.at(SyntaxKind::IDENT) {
                code_reference(p);
            } else {
                p.error("expected exception type");
                break;
            }
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        p.close(t, SyntaxKind::THROWS_CLAUSE);
    }
    if p.at(SyntaxKind::L_BRACE) {
        block(p);
    }
    p.close(m, kind);
}

/// `( param (, param)* )`
pub(crate) fn parameter_list(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::L_PAREN);
    while !p.at_any(&[SyntaxKind::R_PAREN, SyntaxKind::EOF, SyntaxKind::L_BRACE]) {
        let before = p.pos;
        parameter(p);
        if p.pos == before {
            p.advance_with_error("expected parameter");
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::PARAMETER_LIST);
}

/// `modifiers? Type? name (= default)?`
pub(crate) fn parameter(p: &mut Parser) {
    if !p.current().is_modifier()
        && !p.at(SyntaxKind::AT)
        && !p.at(SyntaxKind::IDENT)
        && !p.current().is_primitive_type()
    {
        return;
    }
    let m = p.open();
    modifier_list(p);
    if matches!(type_len(p, 0), Some(n) if p.nth(n) == SyntaxKind::IDENT) {
        type_element(p);
    }
    if !p.eat(SyntaxKind::IDENT) {
        p.error("expected parameter name");
    }
    if p.eat(SyntaxKind::EQ) {
        expressions::expr(p);
    }
    p.close(m, SyntaxKind::PARAMETER);
}

// ── Classes ────────────────────────────────────────────────────────────

/// Class-like declaration. `m` is the already-open node holding modifiers.
fn class_decl(p: &mut Parser, m: MarkOpened) {
    p.advance(); // class / interface / enum / trait
    let name = if p.at(SyntaxKind::IDENT) {
        let text = p.current_text();
        p.advance();
        Some(text)
    } else {
        p.error("expected class name");
        None
    };

    if p.at(SyntaxKind::LT) {
        // Type parameters are kept as plain tokens.
        type_args(p);
    }
    if p.at(SyntaxKind::EXTENDS_KW) {
        type_clause(p, SyntaxKind::EXTENDS_CLAUSE);
    }
    if p.at(SyntaxKind::IMPLEMENTS_KW) {
        type_clause(p, SyntaxKind::IMPLEMENTS_CLAUSE);
    }
    if p.at(SyntaxKind::L_BRACE) {
        class_body(p, name);
    } else {
        p.error("expected class body");
    }
    p.close(m, SyntaxKind::CLASS_DECL);
}

fn type_clause(p: &mut Parser, kind: SyntaxKind) {
    let m = p.open();
    p.advance(); // extends / implements
    loop {
        if p.at(SyntaxKind::IDENT) {
            type_element(p);
        } else {
            p.error("expected type");
            break;
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.close(m, kind);
}

/// `{ member* }`. Anonymous class bodies pass `None` as the name.
pub(crate) fn class_body(p: &mut Parser, class_name: Option<&str>) {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // {
    loop {
        p.eat_separators();
        if p.at_any(&[SyntaxKind::R_BRACE, SyntaxKind::EOF]) {
            break;
        }
        let before = p.pos;
        if p.at(SyntaxKind::L_BRACE) {
            block(p); // initializer
        } else if p.current().is_modifier()
            || p.current().is_class_keyword()
            || p.current().is_primitive_type()
            || p.at_any(&[SyntaxKind::IDENT, SyntaxKind::AT])
        {
            declaration(p, Some(class_name.unwrap_or("")));
        }
        if p.pos == before {
            p.advance_with_error("expected class member");
            continue;
        }
        if !p.at_statement_end() {
            p.error("expected newline or `;` after member");
        }
    }
    if !p.eat(SyntaxKind::R_BRACE) {
        p.error_with_related("expected `}`", open_span, "class body opened here");
    }
    p.close(m, SyntaxKind::CLASS_BODY);
}

// ── Types ──────────────────────────────────────────────────────────────

/// `prim` or code reference, followed by `[]` pairs.
pub(crate) fn type_element(p: &mut Parser) {
    let m = p.open();
    if p.current().is_primitive_type() {
        p.advance();
    } else if p.at(SyntaxKind::IDENT) {
        code_reference(p);
    } else {
        p.error("expected type");
    }
    while p.at(SyntaxKind::L_BRACKET) && p.nth(1) == SyntaxKind::R_BRACKET {
        p.advance();
        p.advance();
    }
    p.close(m, SyntaxKind::TYPE_ELEMENT);
}

/// `A(.B)*` with optional type arguments. Each qualified step wraps the
/// previous reference: `a.b.C` is `CODE_REFERENCE(CODE_REFERENCE(CODE_REFERENCE(a) . b) . C)`.
pub(crate) fn code_reference(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::IDENT);
    if p.at(SyntaxKind::LT) {
        type_args(p);
    }
    let mut done = p.close(m, SyntaxKind::CODE_REFERENCE);
    while p.at(SyntaxKind::DOT) && p.nth(1) == SyntaxKind::IDENT {
        let w = p.open_before(done);
        p.advance(); // .
        p.advance(); // name
        if p.at(SyntaxKind::LT) {
            type_args(p);
        }
        done = p.close(w, SyntaxKind::CODE_REFERENCE);
    }
}

/// `<A, ? extends B>` or the diamond `<>`.
fn type_args(p: &mut Parser) {
    let m = p.open();
    p.advance(); // <
    while !p.at_any(&[SyntaxKind::GT, SyntaxKind::EOF]) {
        if p.eat(SyntaxKind::QUESTION) {
            if p.at_any(&[SyntaxKind::EXTENDS_KW, SyntaxKind::SUPER_KW]) {
                p.advance();
                type_element(p);
            }
        } else if p.at(SyntaxKind::IDENT) || p.current().is_primitive_type() {
            type_element(p);
        } else {
            p.error("expected type argument");
            break;
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::GT);
    p.close(m, SyntaxKind::TYPE_ARG_LIST);
}
