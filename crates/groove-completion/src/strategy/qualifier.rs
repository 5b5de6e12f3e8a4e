use groove_parser::ast::expr::{Expr, ReferenceExpr};
use groove_parser::ast::AstNode;

use super::CandidateStrategy;
use crate::context::CompletionContext;
use crate::item::{Candidate, Symbol};
use crate::resolve::SymbolResolver;
use crate::sink::CompletionResultSink;

/// `Outer.this` and `Outer.super`, offered after a class name when the
/// position has an enclosing instance of that class.
pub struct QualifierKeywordCompletion;

impl CandidateStrategy for QualifierKeywordCompletion {
    fn name(&self) -> &'static str {
        "qualifier-keyword"
    }

    fn generate(
        &self,
        ctx: &CompletionContext,
        resolver: &dyn SymbolResolver,
        sink: &mut CompletionResultSink<'_>,
    ) {
        let position = ctx.position();
        let Some(qualifier) = position
            .parent()
            .and_then(ReferenceExpr::cast)
            .and_then(|reference| reference.qualifier())
        else {
            return;
        };
        if !matches!(qualifier, Expr::ReferenceExpr(_)) {
            return;
        }
        let Some(Symbol::Class(class)) = resolver.resolve_qualifier(qualifier.syntax()) else {
            return;
        };
        if resolver.has_enclosing_instance(&class, position, false) {
            sink.add_all(["this", "super"].map(Candidate::keyword));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Invocation;
    use crate::item::{CandidateKind, CompletionList};
    use crate::strategy::test_support::run;

    fn complete(source: &str) -> CompletionList {
        run(&QualifierKeywordCompletion, source, Invocation::Basic)
    }

    #[test]
    fn enclosing_class_gets_this_and_super() {
        let list = complete("class Outer { class Inner { void m() { Outer.<caret> } } }");
        assert_eq!(list.lookups(), vec!["super", "this"]);
        assert!(list.iter().all(|c| c.kind == CandidateKind::Keyword));
    }

    #[test]
    fn prefix_selects_one_keyword() {
        let list = complete("class Outer { void m() { Outer.th<caret> } }");
        assert_eq!(list.lookups(), vec!["this"]);
    }

    #[test]
    fn no_keywords_without_enclosing_instance() {
        assert!(complete("class Outer { static void m() { Outer.<caret> } }").is_empty());
        assert!(complete("class Outer {}\nclass Other { void k() { Outer.<caret> } }").is_empty());
        assert!(
            complete("class Outer { static class Nested { void m() { Outer.<caret> } } }")
                .is_empty()
        );
    }

    #[test]
    fn value_and_package_qualifiers_are_ignored() {
        assert!(complete("String s = ''\ns.<caret>").is_empty());
        assert!(complete("java.util.<caret>").is_empty());
    }
}
