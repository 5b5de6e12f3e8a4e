use groove_parser::ast::expr::ReferenceExpr;
use groove_parser::ast::item::CodeReference;
use groove_parser::ast::AstNode;
use groove_parser::SyntaxKind;
use tracing::trace;

use super::{class_candidate, constructor_candidate, qualified_members, symbol_candidate, CandidateStrategy};
use crate::context::CompletionContext;
use crate::item::Symbol;
use crate::resolve::{SymbolResolver, Symbols};
use crate::sink::CompletionResultSink;

/// Completes the reference the cursor is in: every symbol visible there, or
/// the members of its qualifier.
///
/// In the type part of a `new` expression only classes are offered, and
/// they insert a constructor call.
pub struct ReferenceCompletion;

impl CandidateStrategy for ReferenceCompletion {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn generate(
        &self,
        ctx: &CompletionContext,
        resolver: &dyn SymbolResolver,
        sink: &mut CompletionResultSink<'_>,
    ) {
        let position = ctx.position();
        let Some(parent) = position.parent() else {
            return;
        };
        let cancel = ctx.cancel();

        match parent.kind() {
            SyntaxKind::REFERENCE_EXPR => {
                let Some(reference) = ReferenceExpr::cast(parent) else {
                    return;
                };
                let symbols = match reference.qualifier() {
                    None => resolver.visible_symbols(position, cancel),
                    Some(qualifier) => {
                        let Some(target) = resolver.resolve_qualifier(qualifier.syntax()) else {
                            trace!(qualifier = %qualifier.syntax(), "unresolved qualifier");
                            return;
                        };
                        match qualified_members(resolver, &target, position, cancel) {
                            Some(members) => members,
                            None => return,
                        }
                    }
                };
                sink.add_all(symbols.map(|symbol| symbol_candidate(resolver, symbol)));
            }
            SyntaxKind::CODE_REFERENCE => {
                let Some(reference) = CodeReference::cast(parent) else {
                    return;
                };
                let in_new = reference
                    .outermost()
                    .syntax()
                    .parent()
                    .is_some_and(|p| p.kind() == SyntaxKind::NEW_EXPR);

                let symbols: Symbols<'_> = match reference.qualifier() {
                    None => Box::new(resolver.visible_types(position, cancel).map(Symbol::Class)),
                    Some(qualifier) => {
                        let Some(target) = resolver.resolve_qualifier(qualifier.syntax()) else {
                            trace!(qualifier = %qualifier.syntax(), "unresolved qualifier");
                            return;
                        };
                        match qualified_members(resolver, &target, position, cancel) {
                            Some(members) => members,
                            None => return,
                        }
                    }
                };
                // Type positions only name classes and the packages leading
                // to them.
                let candidates = symbols.filter_map(|symbol| match symbol {
                    Symbol::Class(class) if in_new => Some(constructor_candidate(resolver, &class)),
                    Symbol::Class(class) => Some(class_candidate(resolver, &class)),
                    package @ Symbol::Package(_) => Some(symbol_candidate(resolver, package)),
                    _ => None,
                });
                sink.add_all(candidates);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Invocation;
    use crate::item::{CandidateKind, InsertPayload};
    use crate::strategy::test_support::run;

    fn complete(source: &str) -> crate::item::CompletionList {
        run(&ReferenceCompletion, source, Invocation::Basic)
    }

    #[test]
    fn bare_reference_sees_locals_and_types() {
        let list = complete("def count = 1\nString name = 'x'\nprintln(cou<caret>)");
        assert_eq!(list.lookups(), vec!["count"]);
        let list = complete("def count = 1\nString name = 'x'\nprintln(<caret>)");
        let lookups = list.lookups();
        assert!(lookups.contains(&"count"), "{lookups:?}");
        assert!(lookups.contains(&"name"), "{lookups:?}");
        assert!(lookups.contains(&"ArrayList"), "{lookups:?}");
        assert!(!lookups.iter().any(|l| l.contains("Rulezzz")), "{lookups:?}");
    }

    #[test]
    fn instance_members_of_typed_variable() {
        let list = complete("String s = 'x'\ns.<caret>");
        let lookups = list.lookups();
        assert!(lookups.contains(&"length"), "{lookups:?}");
        assert!(lookups.contains(&"substring"), "{lookups:?}");
        assert!(lookups.contains(&"toString"), "{lookups:?}");

        let substring = list.find("substring").unwrap();
        assert_eq!(substring.kind, CandidateKind::Method);
        assert_eq!(substring.payload, InsertPayload::Call { has_params: true });
        assert_eq!(substring.tail.as_deref(), Some("(int)"));
        assert_eq!(substring.type_text.as_deref(), Some("String"));
    }

    #[test]
    fn static_members_of_class_qualifier() {
        let list = complete("String.<caret>");
        assert_eq!(list.lookups(), vec!["valueOf"]);
    }

    #[test]
    fn package_qualifier_lists_classes() {
        let list = complete("def x = java.util.Arr<caret>");
        assert_eq!(list.lookups(), vec!["ArrayList"]);
    }

    #[test]
    fn new_expression_offers_constructors() {
        let list = complete("def x = new Li<caret>");
        assert_eq!(list.lookups(), vec!["LinkedList", "List"]);
        let linked = list.find("LinkedList").unwrap();
        assert!(matches!(
            linked.payload,
            InsertPayload::Constructor {
                has_required_args: true,
                ..
            }
        ));
        assert_eq!(linked.tail.as_deref(), Some(" (java.util)"));
        assert_eq!(list.find("List").unwrap().kind, CandidateKind::Interface);
    }

    #[test]
    fn declaration_name_is_not_a_reference() {
        assert!(complete("private <caret>").is_empty());
    }
}
