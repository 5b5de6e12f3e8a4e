use groove_parser::ast::item::{Parameter, Variable};
use groove_parser::ast::AstNode;
use groove_parser::{SyntaxKind, SyntaxToken};

use super::{class_candidate, CandidateStrategy};
use crate::context::CompletionContext;
use crate::resolve::SymbolResolver;
use crate::sink::CompletionResultSink;

/// Class names where a declaration has modifiers but no type yet:
/// `private Str<caret>` or an untyped parameter. The parser reads the typed
/// word as the declared name.
pub struct DeclaredTypeCompletion;

impl CandidateStrategy for DeclaredTypeCompletion {
    fn name(&self) -> &'static str {
        "declared-type"
    }

    fn generate(
        &self,
        ctx: &CompletionContext,
        resolver: &dyn SymbolResolver,
        sink: &mut CompletionResultSink<'_>,
    ) {
        let position = ctx.position();
        if !is_first_element_after_modifiers(position) {
            return;
        }
        let types = resolver.visible_types(position, ctx.cancel());
        sink.add_all(types.map(|class| class_candidate(resolver, &class)));
    }
}

/// Whether `position` is the name of an untyped declaration and the only
/// thing after its modifiers.
fn is_first_element_after_modifiers(position: &SyntaxToken) -> bool {
    let Some(parent) = position.parent() else {
        return false;
    };
    match parent.kind() {
        SyntaxKind::VARIABLE => {
            let Some(variable) = Variable::cast(parent) else {
                return false;
            };
            let Some(decl) = variable.declaration() else {
                return false;
            };
            decl.type_element().is_none()
                && decl.variables().next().as_ref() == Some(&variable)
                && variable.name_token().as_ref() == Some(position)
        }
        SyntaxKind::PARAMETER => Parameter::cast(parent).is_some_and(|param| {
            param.type_element().is_none() && param.name_token().as_ref() == Some(position)
        }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Invocation;
    use crate::item::{CompletionList, InsertPayload};
    use crate::strategy::test_support::run;

    fn complete(source: &str) -> CompletionList {
        run(&DeclaredTypeCompletion, source, Invocation::Basic)
    }

    #[test]
    fn type_after_modifiers() {
        let list = complete("private Arr<caret>");
        assert_eq!(list.lookups(), vec!["ArrayList"]);
        assert!(matches!(
            list.items[0].payload,
            InsertPayload::Type { .. }
        ));
        assert_eq!(complete("static final Fi<caret>").lookups(), vec!["File"]);
    }

    #[test]
    fn untyped_parameter() {
        let list = complete("class A { void m(Li<caret>) {} }");
        assert_eq!(list.lookups(), vec!["LinkedList", "List"]);
    }

    #[test]
    fn typed_declarations_are_left_alone() {
        assert!(complete("String na<caret>").is_empty());
        assert!(complete("class A { void m(String na<caret>) {} }").is_empty());
        assert!(complete("na<caret>").is_empty());
    }
}
