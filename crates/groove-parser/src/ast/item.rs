//! Typed AST nodes for declarations.
//!
//! Covers: SourceFile, PackageDecl, ImportDecl, QualifiedName, ClassDecl,
//! ClassBody, MethodDecl, ConstructorDecl, ParameterList, Parameter,
//! ModifierList, VariableDecl, Variable, TypeElement, CodeReference.

use crate::ast::expr::Expr;
use crate::ast::{ast_node, child_node, child_nodes, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

// ── Source File ──────────────────────────────────────────────────────────

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn package(&self) -> Option<PackageDecl> {
        child_node(&self.syntax)
    }

    pub fn imports(&self) -> impl Iterator<Item = ImportDecl> + '_ {
        child_nodes(&self.syntax)
    }

    /// Top-level class declarations (nested classes are reached through
    /// [`ClassBody`]).
    pub fn classes(&self) -> impl Iterator<Item = ClassDecl> + '_ {
        child_nodes(&self.syntax)
    }
}

// ── Package / imports ────────────────────────────────────────────────────

ast_node!(PackageDecl, PACKAGE_DECL);

impl PackageDecl {
    /// Dotted package name, e.g. `com.example`.
    pub fn name(&self) -> Option<String> {
        child_node::<QualifiedName>(&self.syntax).map(|q| q.text())
    }
}

ast_node!(ImportDecl, IMPORT_DECL);

impl ImportDecl {
    pub fn qualified_name(&self) -> Option<QualifiedName> {
        child_node(&self.syntax)
    }

    /// The dotted path as written, without a trailing `.*`.
    pub fn path(&self) -> Option<String> {
        self.qualified_name().map(|q| q.text())
    }

    pub fn is_static(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::STATIC_KW).is_some()
    }

    /// `import a.b.*`
    pub fn is_on_demand(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::STAR).is_some()
    }

    /// `import a.b.C as D` yields `D`.
    pub fn alias(&self) -> Option<String> {
        child_token(&self.syntax, SyntaxKind::IDENT).map(|t| t.text().to_string())
    }
}

ast_node!(QualifiedName, QUALIFIED_NAME);

impl QualifiedName {
    pub fn segments(&self) -> impl Iterator<Item = String> + '_ {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
    }

    pub fn text(&self) -> String {
        self.segments().collect::<Vec<_>>().join(".")
    }
}

// ── Classes ──────────────────────────────────────────────────────────────

/// The flavour of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKeyword {
    Class,
    Interface,
    Enum,
    Trait,
}

ast_node!(ClassDecl, CLASS_DECL);

impl ClassDecl {
    pub fn modifier_list(&self) -> Option<ModifierList> {
        child_node(&self.syntax)
    }

    pub fn has_modifier(&self, kind: SyntaxKind) -> bool {
        self.modifier_list().is_some_and(|m| m.has(kind))
    }

    pub fn keyword(&self) -> Option<ClassKeyword> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find_map(|t| match t.kind() {
                SyntaxKind::CLASS_KW => Some(ClassKeyword::Class),
                SyntaxKind::INTERFACE_KW => Some(ClassKeyword::Interface),
                SyntaxKind::ENUM_KW => Some(ClassKeyword::Enum),
                SyntaxKind::TRAIT_KW => Some(ClassKeyword::Trait),
                _ => None,
            })
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    /// Types listed after `extends`.
    pub fn extends(&self) -> Vec<TypeElement> {
        self.syntax
            .children()
            .filter(|n| n.kind() == SyntaxKind::EXTENDS_CLAUSE)
            .flat_map(|n| n.children().filter_map(TypeElement::cast).collect::<Vec<_>>())
            .collect()
    }

    /// Types listed after `implements`.
    pub fn implements(&self) -> Vec<TypeElement> {
        self.syntax
            .children()
            .filter(|n| n.kind() == SyntaxKind::IMPLEMENTS_CLAUSE)
            .flat_map(|n| n.children().filter_map(TypeElement::cast).collect::<Vec<_>>())
            .collect()
    }

    pub fn body(&self) -> Option<ClassBody> {
        child_node(&self.syntax)
    }
}

ast_node!(ClassBody, CLASS_BODY);

impl ClassBody {
    pub fn fields(&self) -> impl Iterator<Item = VariableDecl> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDecl> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn constructors(&self) -> impl Iterator<Item = ConstructorDecl> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn classes(&self) -> impl Iterator<Item = ClassDecl> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(MethodDecl, METHOD_DECL);

impl MethodDecl {
    pub fn modifier_list(&self) -> Option<ModifierList> {
        child_node(&self.syntax)
    }

    pub fn has_modifier(&self, kind: SyntaxKind) -> bool {
        self.modifier_list().is_some_and(|m| m.has(kind))
    }

    /// Declared return type; `None` for `def` methods.
    pub fn return_type(&self) -> Option<TypeElement> {
        child_node(&self.syntax)
    }

    pub fn name(&self) -> Option<String> {
        child_token(&self.syntax, SyntaxKind::IDENT).map(|t| t.text().to_string())
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        child_node(&self.syntax)
    }
}

ast_node!(ConstructorDecl, CONSTRUCTOR_DECL);

impl ConstructorDecl {
    pub fn modifier_list(&self) -> Option<ModifierList> {
        child_node(&self.syntax)
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        child_node(&self.syntax)
    }
}

ast_node!(ParameterList, PARAMETER_LIST);

impl ParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = Parameter> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Parameter, PARAMETER);

impl Parameter {
    pub fn modifier_list(&self) -> Option<ModifierList> {
        child_node(&self.syntax)
    }

    pub fn type_element(&self) -> Option<TypeElement> {
        child_node(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    /// Whether the parameter has a default value (`int x = 1`).
    pub fn has_default(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::EQ).is_some()
    }
}

ast_node!(ModifierList, MODIFIER_LIST);

impl ModifierList {
    pub fn modifiers(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind().is_modifier())
    }

    pub fn has(&self, kind: SyntaxKind) -> bool {
        self.modifiers().any(|t| t.kind() == kind)
    }
}

// ── Variables ────────────────────────────────────────────────────────────

ast_node!(VariableDecl, VARIABLE_DECL);

impl VariableDecl {
    pub fn modifier_list(&self) -> Option<ModifierList> {
        child_node(&self.syntax)
    }

    pub fn has_modifier(&self, kind: SyntaxKind) -> bool {
        self.modifier_list().is_some_and(|m| m.has(kind))
    }

    pub fn type_element(&self) -> Option<TypeElement> {
        child_node(&self.syntax)
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Variable, VARIABLE);

impl Variable {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    pub fn initializer(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    /// The enclosing declaration, which carries modifiers and type.
    pub fn declaration(&self) -> Option<VariableDecl> {
        self.syntax.parent().and_then(VariableDecl::cast)
    }
}

// ── Types ────────────────────────────────────────────────────────────────

ast_node!(TypeElement, TYPE_ELEMENT);

impl TypeElement {
    /// The primitive keyword, when this is a primitive (or primitive array) type.
    pub fn primitive(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind().is_primitive_type())
    }

    pub fn code_reference(&self) -> Option<CodeReference> {
        child_node(&self.syntax)
    }

    /// Number of `[]` pairs.
    pub fn array_dimensions(&self) -> u32 {
        self.syntax
            .children_with_tokens()
            .filter(|it| it.kind() == SyntaxKind::L_BRACKET)
            .count() as u32
    }
}

ast_node!(CodeReference, CODE_REFERENCE);

impl CodeReference {
    /// The qualifying reference: `a.b` for `a.b.C`.
    pub fn qualifier(&self) -> Option<CodeReference> {
        child_node(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    /// The full dotted path, e.g. `java.util.List`.
    pub fn path(&self) -> String {
        let name = self.name().unwrap_or_default();
        match self.qualifier() {
            Some(q) => format!("{}.{}", q.path(), name),
            None => name,
        }
    }

    pub fn has_type_args(&self) -> bool {
        self.syntax
            .children()
            .any(|n| n.kind() == SyntaxKind::TYPE_ARG_LIST)
    }

    /// Outermost code reference this one is (transitively) the qualifier of.
    pub fn outermost(&self) -> CodeReference {
        let mut current = self.clone();
        while let Some(parent) = current.syntax.parent().and_then(CodeReference::cast) {
            current = parent;
        }
        current
    }
}
