//! Narrowing an expected type down to the classes `new` can instantiate.

use groove_parser::SyntaxToken;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::item::{ClassRef, TypeRef};
use crate::resolve::SymbolResolver;

/// The statically expected type at a smart completion site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedType {
    Class(ClassRef),
    /// `element` is never itself an array.
    Array { element: TypeRef, dims: u32 },
}

impl ExpectedType {
    /// Primitive types expect nothing `new` could produce.
    pub fn from_type(ty: TypeRef) -> Option<Self> {
        match ty {
            TypeRef::Primitive(_) => None,
            TypeRef::Class(class) => Some(ExpectedType::Class(class)),
            TypeRef::Array(element) => {
                let mut element = *element;
                let mut dims = 1;
                while let TypeRef::Array(inner) = element {
                    element = *inner;
                    dims += 1;
                }
                Some(ExpectedType::Array { element, dims })
            }
        }
    }
}

/// The expected class and its inheritors that can be instantiated at
/// `place`, in resolver order.
///
/// Lazy: each class is checked as it is pulled, and enumeration stops once
/// `cancel` fires.
pub fn narrow<'a>(
    expected: &ClassRef,
    resolver: &'a dyn SymbolResolver,
    place: &'a SyntaxToken,
    cancel: &'a CancellationToken,
) -> impl Iterator<Item = ClassRef> + 'a {
    std::iter::once(expected.clone())
        .chain(resolver.inheritors_of(expected, place, cancel))
        .take_while(move |_| !cancel.is_cancelled())
        .filter(move |class| is_instantiable(resolver, class, place))
}

/// Whether `new Class()` is legal at `place`.
pub fn is_instantiable(
    resolver: &dyn SymbolResolver,
    class: &ClassRef,
    place: &SyntaxToken,
) -> bool {
    let Some(info) = resolver.class(class) else {
        trace!(%class, "unresolved inheritor");
        return false;
    };
    if !info.is_concrete() {
        trace!(%class, "skipping abstract type");
        return false;
    }
    if !resolver.has_accessible_constructor(class, place) {
        trace!(%class, "no accessible constructor");
        return false;
    }
    if info.is_inner() {
        let reachable = class
            .outer()
            .is_some_and(|outer| resolver.has_enclosing_instance(&outer, place, true));
        if !reachable {
            trace!(%class, "inner class without enclosing instance");
            return false;
        }
    }
    resolver.is_class_accessible(class, place)
}
