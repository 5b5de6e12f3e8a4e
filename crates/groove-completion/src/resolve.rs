//! The symbol-resolution seam between the completion core and whatever
//! knows the program's classes and scopes.
//!
//! Strategies and the expected-type narrower only talk to a
//! [`SymbolResolver`]. The reference implementation is
//! [`FileResolver`](crate::index::FileResolver); tests and hosts may supply
//! their own.

use groove_parser::ast::item::TypeElement;
use groove_parser::{SyntaxNode, SyntaxToken};
use tokio_util::sync::CancellationToken;

use crate::index::{ClassInfo, Visibility};
use crate::item::{ClassRef, Symbol, TypeRef};

/// Lazily enumerated resolver results.
pub type Symbols<'a> = Box<dyn Iterator<Item = Symbol> + 'a>;
pub type Classes<'a> = Box<dyn Iterator<Item = ClassRef> + 'a>;

/// Queries the completion strategies make about the program.
///
/// `place` is always a token of the tree being completed (the completion
/// position or a node around it). Enumerating methods stop yielding once
/// `cancel` is cancelled.
pub trait SymbolResolver {
    /// Locals, parameters, members of enclosing classes and visible types.
    fn visible_symbols<'a>(&'a self, place: &SyntaxToken, cancel: &'a CancellationToken)
        -> Symbols<'a>;

    /// Classes that can be named by their short name at `place`.
    fn visible_types<'a>(&'a self, place: &SyntaxToken, cancel: &'a CancellationToken)
        -> Classes<'a>;

    /// What a qualifier expression or code reference refers to.
    fn resolve_qualifier(&self, qualifier: &SyntaxNode) -> Option<Symbol>;

    /// Fields, methods and nested classes of `class` and its supertypes that
    /// are accessible from `place`.
    fn members_of<'a>(
        &'a self,
        class: &ClassRef,
        statics_only: bool,
        place: &SyntaxToken,
        cancel: &'a CancellationToken,
    ) -> Symbols<'a>;

    /// Classes and sub-packages directly inside `package`.
    fn package_members<'a>(&'a self, package: &str, cancel: &'a CancellationToken) -> Symbols<'a>;

    /// The type a type element denotes.
    fn resolve_type(&self, ty: &TypeElement) -> Option<TypeRef>;

    fn class(&self, class: &ClassRef) -> Option<&ClassInfo>;

    /// Transitive subtypes of `class`, excluding `class` itself, breadth
    /// first.
    fn inheritors_of<'a>(
        &'a self,
        class: &ClassRef,
        place: &SyntaxToken,
        cancel: &'a CancellationToken,
    ) -> Classes<'a>;

    /// Whether code at `place` has an instance of `class` (or, with
    /// `accept_super`, of a subclass) as an enclosing `this`.
    fn has_enclosing_instance(&self, class: &ClassRef, place: &SyntaxToken, accept_super: bool)
        -> bool;

    /// Whether `sub` is `sup` or one of its transitive subtypes.
    fn is_subtype(&self, sub: &ClassRef, sup: &ClassRef) -> bool;

    /// Whether a member of `owner` with `visibility` can be used at `place`.
    fn can_access(&self, owner: &ClassRef, visibility: Visibility, place: &SyntaxToken) -> bool;

    /// Whether `class` itself (and every class it is nested in) is
    /// accessible at `place`.
    fn is_class_accessible(&self, class: &ClassRef, place: &SyntaxToken) -> bool {
        let Some(info) = self.class(class) else {
            return false;
        };
        if !self.can_access(class, info.visibility, place) {
            return false;
        }
        match class.outer() {
            Some(outer) => self.is_class_accessible(&outer, place),
            None => true,
        }
    }

    /// Whether `new` on `class` can pick a constructor accessible at
    /// `place`.
    fn has_accessible_constructor(&self, class: &ClassRef, place: &SyntaxToken) -> bool {
        let Some(info) = self.class(class) else {
            return false;
        };
        info.constructors.is_empty()
            || info
                .constructors
                .iter()
                .any(|c| self.can_access(class, c.visibility, place))
    }
}
