use groove_parser::ast::item::Variable;
use groove_parser::ast::AstNode;
use tracing::{debug, trace};

use super::{constructor_candidate, CandidateStrategy};
use crate::context::CompletionContext;
use crate::item::{rank, Candidate, CandidateKind, InsertPayload, SymbolKey};
use crate::narrow::{narrow, ExpectedType};
use crate::pattern::super_parent;
use crate::resolve::SymbolResolver;
use crate::sink::CompletionResultSink;

/// Smart completion after `new` in a variable initializer: the declared
/// type and every inheritor that can be instantiated there.
pub struct NewExpressionCompletion;

impl CandidateStrategy for NewExpressionCompletion {
    fn name(&self) -> &'static str {
        "new-expression"
    }

    fn generate(
        &self,
        ctx: &CompletionContext,
        resolver: &dyn SymbolResolver,
        sink: &mut CompletionResultSink<'_>,
    ) {
        let position = ctx.position();
        let Some(variable) = super_parent(position, 3).and_then(Variable::cast) else {
            return;
        };
        // `def x = new ...` expects nothing in particular.
        let Some(declared) = variable.declaration().and_then(|d| d.type_element()) else {
            trace!("untyped declaration, no expected type");
            return;
        };
        let Some(expected) = resolver
            .resolve_type(&declared)
            .and_then(ExpectedType::from_type)
        else {
            debug!(ty = %declared.syntax(), "expected type does not resolve to a class");
            return;
        };

        match expected {
            ExpectedType::Class(class) => {
                let candidates = narrow(&class, resolver, position, ctx.cancel()).map(|found| {
                    let rank = if found == class {
                        rank::SMART_EXACT
                    } else {
                        rank::SMART_INHERITOR
                    };
                    constructor_candidate(resolver, &found).with_rank(rank)
                });
                sink.add_all(candidates);
            }
            ExpectedType::Array { element, dims } => {
                let brackets = "[]".repeat(dims as usize);
                let candidate = Candidate::new(
                    format!("{}{brackets}", element.short_text()),
                    CandidateKind::ArrayType,
                    SymbolKey::Array {
                        element: element.to_string(),
                        dims,
                    },
                )
                .with_display(format!("{element}{brackets}"))
                .with_rank(rank::SMART_EXACT)
                .with_payload(InsertPayload::Array {
                    element,
                    dims,
                    length: None,
                });
                sink.add(candidate);
            }
        }
    }
}
