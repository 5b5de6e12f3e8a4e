//! Candidate generation strategies.
//!
//! The classifier decides which strategies apply at a position; each one
//! then asks the resolver for symbols and pushes candidates into the sink.
//! Strategies share nothing but the read-only context, so their results
//! only meet in the sink.

mod declared_type;
mod new_expr;
mod qualifier;
mod reference;

pub use declared_type::DeclaredTypeCompletion;
pub use new_expr::NewExpressionCompletion;
pub use qualifier::QualifierKeywordCompletion;
pub use reference::ReferenceCompletion;

use crate::context::CompletionContext;
use crate::item::{rank, Candidate, CandidateKind, ClassRef, InsertPayload, Symbol};
use crate::resolve::{SymbolResolver, Symbols};
use crate::sink::CompletionResultSink;

use groove_parser::SyntaxToken;
use tokio_util::sync::CancellationToken;

pub trait CandidateStrategy: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn generate(
        &self,
        ctx: &CompletionContext,
        resolver: &dyn SymbolResolver,
        sink: &mut CompletionResultSink<'_>,
    );
}

/// ` (java.util)`, or nothing for the default package.
pub(crate) fn package_tail(class: &ClassRef) -> Option<String> {
    (!class.package.is_empty()).then(|| format!(" ({})", class.package))
}

pub(crate) fn class_kind(resolver: &dyn SymbolResolver, class: &ClassRef) -> CandidateKind {
    match resolver.class(class) {
        Some(info) if info.is_interface() => CandidateKind::Interface,
        _ => CandidateKind::Class,
    }
}

/// A class candidate that inserts its name as a type.
pub(crate) fn class_candidate(resolver: &dyn SymbolResolver, class: &ClassRef) -> Candidate {
    let mut candidate = Candidate::new(
        class.short_name(),
        class_kind(resolver, class),
        Symbol::Class(class.clone()).key(),
    )
    .with_rank(rank::CLASS)
    .with_payload(InsertPayload::Type {
        class: class.clone(),
    });
    if let Some(tail) = package_tail(class) {
        candidate = candidate.with_tail(tail);
    }
    candidate
}

/// A class candidate that inserts a constructor call.
pub(crate) fn constructor_candidate(resolver: &dyn SymbolResolver, class: &ClassRef) -> Candidate {
    let has_required_args = resolver
        .class(class)
        .is_some_and(|info| info.has_required_constructor_args());
    class_candidate(resolver, class).with_payload(InsertPayload::Constructor {
        class: class.clone(),
        has_required_args,
    })
}

/// The candidate for a symbol in an ordinary expression position.
pub(crate) fn symbol_candidate(resolver: &dyn SymbolResolver, symbol: Symbol) -> Candidate {
    let key = symbol.key();
    match symbol {
        Symbol::Class(class) => class_candidate(resolver, &class),
        Symbol::Field { name, ty, .. } => Candidate::new(name, CandidateKind::Field, key)
            .with_rank(rank::FIELD)
            .with_type_text(ty.short_text()),
        Symbol::Method {
            name, params, ret, ..
        } => {
            let signature = params
                .iter()
                .map(|p| p.short_text())
                .collect::<Vec<_>>()
                .join(", ");
            let mut candidate = Candidate::new(name, CandidateKind::Method, key)
                .with_rank(rank::METHOD)
                .with_tail(format!("({signature})"))
                .with_payload(InsertPayload::Call {
                    has_params: !params.is_empty(),
                });
            if let Some(ret) = ret {
                candidate = candidate.with_type_text(ret.short_text());
            }
            candidate
        }
        Symbol::Local { name, ty, .. } => {
            let candidate = Candidate::new(name, CandidateKind::Variable, key).with_rank(rank::LOCAL);
            match ty {
                Some(ty) => candidate.with_type_text(ty.short_text()),
                None => candidate,
            }
        }
        Symbol::Parameter { name, ty, .. } => {
            let candidate = Candidate::new(name, CandidateKind::Parameter, key).with_rank(rank::LOCAL);
            match ty {
                Some(ty) => candidate.with_type_text(ty.short_text()),
                None => candidate,
            }
        }
        Symbol::Package(package) => {
            let name = package.rsplit('.').next().unwrap_or(&package).to_string();
            Candidate::new(name, CandidateKind::Package, key).with_rank(rank::PACKAGE)
        }
    }
}

/// What can follow `qualifier.`: statics of a class, contents of a package,
/// instance members of a typed value.
pub(crate) fn qualified_members<'a>(
    resolver: &'a dyn SymbolResolver,
    qualifier: &Symbol,
    place: &SyntaxToken,
    cancel: &'a CancellationToken,
) -> Option<Symbols<'a>> {
    match qualifier {
        Symbol::Class(class) => Some(resolver.members_of(class, true, place, cancel)),
        Symbol::Package(package) => Some(resolver.package_members(package, cancel)),
        other => {
            let class = other.value_type()?.as_class()?;
            Some(resolver.members_of(class, false, place, cancel))
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::CompletionConfig;
    use crate::context::{CompletionContext, CompletionRequest, Invocation};
    use crate::index::{ClassIndex, FileResolver};
    use crate::item::CompletionList;
    use crate::patch::before_completion;
    use crate::sink::CompletionResultSink;

    use super::CandidateStrategy;

    pub const INDEX: &str = r#"{
        "classes": [
            { "fqn": "java.lang.Object", "methods": [{ "name": "toString", "returns": "java.lang.String" }] },
            { "fqn": "java.lang.String", "methods": [
                { "name": "length", "returns": "int" },
                { "name": "substring", "params": ["int"], "returns": "java.lang.String" },
                { "name": "valueOf", "params": ["int"], "returns": "java.lang.String", "static": true }
            ] },
            { "fqn": "java.lang.Runnable", "kind": "interface" },
            { "fqn": "java.util.List", "kind": "interface" },
            { "fqn": "java.util.AbstractList", "abstract": true, "supers": ["java.util.List"] },
            { "fqn": "java.util.ArrayList", "supers": ["java.util.AbstractList"] },
            { "fqn": "java.util.LinkedList", "supers": ["java.util.AbstractList"],
              "constructors": [{}, { "params": ["java.util.Collection"] }] },
            { "fqn": "java.util.Collection", "kind": "interface" },
            { "fqn": "java.io.File", "constructors": [{ "params": ["java.lang.String"] }] }
        ]
    }"#;

    /// Run one strategy at `<caret>` in `source`.
    pub fn run(
        strategy: &dyn CandidateStrategy,
        source: &str,
        invocation: Invocation,
    ) -> CompletionList {
        let offset = source.find("<caret>").unwrap() as u32;
        let text = source.replace("<caret>", "");
        let config = CompletionConfig::default();
        let request = CompletionRequest {
            invocation,
            ..CompletionRequest::basic(text.clone(), offset)
        };
        let patch = before_completion(&text, offset, invocation, &config.dummy_identifier);
        let ctx = CompletionContext::new(&request, patch).unwrap();
        let index = ClassIndex::from_json(INDEX).unwrap();
        let resolver = FileResolver::new(ctx.root(), &index, &config);
        let mut sink = CompletionResultSink::new(ctx.prefix(), &config, ctx.cancel())
            .exclude(&config.dummy_identifier);
        strategy.generate(&ctx, &resolver, &mut sink);
        sink.finish()
    }
}
