use std::collections::VecDeque;

use groove_parser::ast::expr::{Closure, ReferenceExpr};
use groove_parser::ast::item::{
    ClassDecl, ClassKeyword, CodeReference, ConstructorDecl, ImportDecl, MethodDecl,
    ModifierList, ParameterList, SourceFile, TypeElement, VariableDecl,
};
use groove_parser::ast::AstNode;
use groove_parser::{SyntaxKind, SyntaxNode, SyntaxToken};
use rowan::TextSize;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio_util::sync::CancellationToken;

use crate::config::CompletionConfig;
use crate::index::{
    ClassIndex, ClassInfo, ClassKind, ConstructorInfo, FieldInfo, MethodInfo, Visibility,
};
use crate::item::{ClassRef, Symbol, TypeRef};
use crate::resolve::{Classes, SymbolResolver, Symbols};

/// Owner of methods declared at the top level of a script.
const SCRIPT_CLASS: &str = "Script";

#[derive(Debug, Clone)]
enum Import {
    Class { path: String, alias: Option<String> },
    OnDemand(String),
    StaticMember { class: String, member: String },
    StaticOnDemand(String),
}

impl Import {
    fn from_decl(decl: &ImportDecl) -> Option<Self> {
        let path = decl.path()?;
        let import = match (decl.is_static(), decl.is_on_demand()) {
            (false, false) => Import::Class {
                path,
                alias: decl.alias(),
            },
            (false, true) => Import::OnDemand(path),
            (true, true) => Import::StaticOnDemand(path),
            (true, false) => {
                let (class, member) = path.rsplit_once('.')?;
                Import::StaticMember {
                    class: class.to_string(),
                    member: member.to_string(),
                }
            }
        };
        Some(import)
    }
}

/// Resolves names in one source file against its own declarations, its
/// imports and a [`ClassIndex`].
///
/// Built from the (patched) tree of a completion request and dropped with
/// it.
pub struct FileResolver<'i> {
    index: &'i ClassIndex,
    package: String,
    imports: Vec<Import>,
    /// Classes declared in this file, keyed by fully qualified name.
    classes: FxHashMap<String, ClassInfo>,
    default_imports: Vec<String>,
    inheritor_limit: usize,
}

impl<'i> FileResolver<'i> {
    pub fn new(root: &SyntaxNode, index: &'i ClassIndex, config: &CompletionConfig) -> Self {
        let file = SourceFile::cast(root.clone());
        let package = file
            .as_ref()
            .and_then(|f| f.package())
            .and_then(|p| p.name())
            .unwrap_or_default();
        let imports = file
            .as_ref()
            .map(|f| f.imports().filter_map(|i| Import::from_decl(&i)).collect())
            .unwrap_or_default();

        let mut resolver = Self {
            index,
            package,
            imports,
            classes: FxHashMap::default(),
            default_imports: config.default_imports().map(str::to_string).collect(),
            inheritor_limit: config.inheritor_limit,
        };

        // Declarations first, so that supertypes and member types can refer
        // to any class in the file regardless of order.
        let decls: Vec<ClassDecl> = root.descendants().filter_map(ClassDecl::cast).collect();
        for decl in &decls {
            if let Some(info) = resolver.declared_shell(decl) {
                resolver.classes.insert(info.class.fqn(), info);
            }
        }
        for decl in &decls {
            let Some(class) = resolver.declared_class(decl) else {
                continue;
            };
            let members = resolver.declared_members(decl);
            if let Some(info) = resolver.classes.get_mut(&class.fqn()) {
                let (supers, constructors, fields, methods) = members;
                info.supers = supers;
                info.constructors = constructors;
                info.fields = fields;
                info.methods = methods;
            }
        }
        resolver
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Classes declared in the file.
    pub fn declared_classes(&self) -> impl Iterator<Item = &ClassInfo> + '_ {
        self.classes.values()
    }

    // ── Declarations ─────────────────────────────────────────────────────

    /// The class a declaration in this file defines.
    pub fn declared_class(&self, decl: &ClassDecl) -> Option<ClassRef> {
        let mut names = vec![decl.name()?];
        for outer in decl.syntax().ancestors().skip(1).filter_map(ClassDecl::cast) {
            names.push(outer.name()?);
        }
        names.reverse();
        Some(ClassRef::new(self.package.clone(), names.join(".")))
    }

    fn declared_shell(&self, decl: &ClassDecl) -> Option<ClassInfo> {
        let class = self.declared_class(decl)?;
        let kind = match decl.keyword() {
            Some(ClassKeyword::Interface) => ClassKind::Interface,
            Some(ClassKeyword::Enum) => ClassKind::Enum,
            Some(ClassKeyword::Trait) => ClassKind::Trait,
            Some(ClassKeyword::Class) | None => ClassKind::Class,
        };
        let outer_is_interface = decl
            .syntax()
            .ancestors()
            .skip(1)
            .find_map(ClassDecl::cast)
            .is_some_and(|outer| outer.keyword() == Some(ClassKeyword::Interface));
        let mut info = ClassInfo::new(class, kind);
        info.visibility = visibility(decl.modifier_list());
        info.is_abstract = decl.has_modifier(SyntaxKind::ABSTRACT_KW);
        info.is_static = info.class.is_nested()
            && (decl.has_modifier(SyntaxKind::STATIC_KW)
                || kind != ClassKind::Class
                || outer_is_interface);
        Some(info)
    }

    #[allow(clippy::type_complexity)]
    fn declared_members(
        &self,
        decl: &ClassDecl,
    ) -> (Vec<ClassRef>, Vec<ConstructorInfo>, Vec<FieldInfo>, Vec<MethodInfo>) {
        let scope = decl.syntax();
        let supers = decl
            .extends()
            .iter()
            .chain(decl.implements().iter())
            .filter_map(|te| te.code_reference())
            .filter_map(|r| self.resolve_class_name(&r.path(), scope))
            .collect();

        let Some(body) = decl.body() else {
            return (supers, Vec::new(), Vec::new(), Vec::new());
        };
        let is_interface = decl.keyword() == Some(ClassKeyword::Interface);

        let constructors = body
            .constructors()
            .map(|c: ConstructorDecl| ConstructorInfo {
                visibility: visibility(c.modifier_list()),
                params: self.parameter_types(c.parameter_list()),
            })
            .collect();

        let mut fields = Vec::new();
        for field in body.fields() {
            let ty = field
                .type_element()
                .and_then(|te| self.resolve_type(&te))
                .unwrap_or_else(TypeRef::object);
            let is_static = is_interface || field.has_modifier(SyntaxKind::STATIC_KW);
            let visibility = visibility(field.modifier_list());
            fields.extend(field.variables().filter_map(|v| {
                Some(FieldInfo {
                    name: v.name()?,
                    ty: ty.clone(),
                    visibility,
                    is_static,
                })
            }));
        }

        let methods = body
            .methods()
            .filter_map(|m| self.method_info(&m))
            .collect();

        (supers, constructors, fields, methods)
    }

    fn method_info(&self, method: &MethodDecl) -> Option<MethodInfo> {
        Some(MethodInfo {
            name: method.name()?,
            params: self.parameter_types(method.parameter_list()),
            ret: match method.return_type() {
                Some(te) => self.resolve_type(&te),
                None => Some(TypeRef::object()),
            },
            visibility: visibility(method.modifier_list()),
            is_static: method.has_modifier(SyntaxKind::STATIC_KW),
        })
    }

    fn parameter_types(&self, params: Option<ParameterList>) -> Vec<TypeRef> {
        params
            .map(|list| {
                list.parameters()
                    .map(|p| {
                        p.type_element()
                            .and_then(|te| self.resolve_type(&te))
                            .unwrap_or_else(TypeRef::object)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    // ── Name resolution ──────────────────────────────────────────────────

    fn exists(&self, class: &ClassRef) -> bool {
        self.classes.contains_key(&class.fqn()) || self.index.contains(class)
    }

    fn is_package(&self, package: &str) -> bool {
        self.index.has_package(package)
            || self.package == package
            || self
                .package
                .strip_prefix(package)
                .is_some_and(|rest| rest.starts_with('.'))
    }

    /// Find the class a fully qualified (possibly nested) name denotes.
    fn resolve_fqn(&self, path: &str) -> Option<ClassRef> {
        self.classes
            .get(path)
            .or_else(|| self.index.get(path))
            .map(|info| info.class.clone())
    }

    /// Resolve a dotted type name as written at `scope`.
    fn resolve_class_name(&self, path: &str, scope: &SyntaxNode) -> Option<ClassRef> {
        let (first, rest) = match path.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (path, None),
        };
        if let Some(head) = self.resolve_simple_name(first, scope) {
            let class = match rest {
                Some(rest) => rest.split('.').fold(head, |class, seg| class.nested(seg)),
                None => head,
            };
            if self.exists(&class) || rest.is_none() {
                return Some(class);
            }
        }
        rest.and_then(|_| self.resolve_fqn(path))
    }

    fn resolve_simple_name(&self, name: &str, scope: &SyntaxNode) -> Option<ClassRef> {
        for class in self.enclosing_classes_of(scope) {
            if class.short_name() == name {
                return Some(class);
            }
            if let Some(nested) = self.member_class(&class, name) {
                return Some(nested);
            }
        }

        let local = ClassRef::new(self.package.clone(), name);
        if self.classes.contains_key(&local.fqn()) {
            return Some(local);
        }

        for import in &self.imports {
            if let Import::Class { path, alias } = import {
                let imported_name = alias
                    .as_deref()
                    .unwrap_or_else(|| path.rsplit('.').next().unwrap_or(path));
                if imported_name == name {
                    return Some(self.resolve_fqn(path).unwrap_or_else(|| ClassRef::parse(path)));
                }
            }
        }

        if self.index.contains(&local) {
            return Some(local);
        }

        for import in &self.imports {
            if let Import::OnDemand(target) = import {
                if let Some(class) = self.on_demand_class(target, name) {
                    return Some(class);
                }
            }
        }

        self.default_imports
            .iter()
            .find_map(|target| self.on_demand_class(target, name))
    }

    /// `name` as seen through an on-demand import or default import of
    /// `target` (a package, a class whose nested classes are imported, or a
    /// single default-imported class).
    fn on_demand_class(&self, target: &str, name: &str) -> Option<ClassRef> {
        if target.rsplit('.').next() == Some(name) && !self.is_package(target) {
            return self.resolve_fqn(target);
        }
        let in_package = ClassRef::new(target, name);
        if self.exists(&in_package) {
            return Some(in_package);
        }
        let nested = self.resolve_fqn(target)?.nested(name);
        self.exists(&nested).then_some(nested)
    }

    /// A nested class named `name` declared in `class` or inherited from one
    /// of its supertypes.
    fn member_class(&self, class: &ClassRef, name: &str) -> Option<ClassRef> {
        self.supertype_closure(class)
            .into_iter()
            .map(|c| c.nested(name))
            .find(|nested| self.exists(nested))
    }

    /// `class` followed by all of its transitive supertypes, breadth first.
    fn supertype_closure(&self, class: &ClassRef) -> Vec<ClassRef> {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([class.clone()]);
        let mut out = Vec::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(info) = self.class(&current) {
                queue.extend(info.supertypes());
            }
            out.push(current);
        }
        out
    }

    fn nested_classes_of(&self, class: &ClassRef) -> Vec<ClassRef> {
        let mut out: Vec<ClassRef> = self
            .classes
            .values()
            .filter(|info| info.class.outer().as_ref() == Some(class))
            .map(|info| info.class.clone())
            .collect();
        out.extend(
            self.index
                .nested_classes(class)
                .map(|info| info.class.clone())
                .filter(|c| !self.classes.contains_key(&c.fqn())),
        );
        out
    }

    fn direct_subtypes(&self, class: &ClassRef) -> Vec<ClassRef> {
        let mut out: Vec<ClassRef> = self
            .classes
            .values()
            .filter(|info| info.supertypes().any(|s| s == *class))
            .map(|info| info.class.clone())
            .collect();
        out.extend(
            self.index
                .direct_subtypes(class)
                .map(|info| info.class.clone())
                .filter(|c| !self.classes.contains_key(&c.fqn())),
        );
        out
    }

    // ── Scopes ───────────────────────────────────────────────────────────

    /// Classes declared around `node`, innermost first.
    fn enclosing_classes_of(&self, node: &SyntaxNode) -> Vec<ClassRef> {
        node.ancestors()
            .filter_map(ClassDecl::cast)
            .filter_map(|decl| self.declared_class(&decl))
            .collect()
    }

    /// Locals, parameters and members visible at `offset` inside `start`,
    /// inner declarations shadowing outer ones.
    fn scope_symbols(&self, start: &SyntaxNode, offset: TextSize) -> Vec<Symbol> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        let mut push = |symbol: Symbol, out: &mut Vec<Symbol>| {
            if matches!(symbol, Symbol::Method { .. }) || seen.insert(symbol.name().to_string()) {
                out.push(symbol);
            }
        };
        let mut static_context = false;

        for node in start.ancestors() {
            match node.kind() {
                SyntaxKind::BLOCK | SyntaxKind::SOURCE_FILE | SyntaxKind::CLOSURE => {
                    for symbol in self.block_locals(&node, offset) {
                        push(symbol, &mut out);
                    }
                    if let Some(closure) = Closure::cast(node.clone()) {
                        for symbol in self.parameters(closure.parameter_list()) {
                            push(symbol, &mut out);
                        }
                        if !closure.has_arrow() {
                            push(
                                Symbol::Parameter {
                                    name: "it".to_string(),
                                    ty: None,
                                    declared_at: node.text_range().start().into(),
                                },
                                &mut out,
                            );
                        }
                    }
                    if node.kind() == SyntaxKind::SOURCE_FILE {
                        let owner = ClassRef::new(self.package.clone(), SCRIPT_CLASS);
                        for method in node.children().filter_map(MethodDecl::cast) {
                            if let Some(info) = self.method_info(&method) {
                                push(method_symbol(&owner, &info), &mut out);
                            }
                        }
                        for symbol in self.statically_imported() {
                            push(symbol, &mut out);
                        }
                    }
                }
                SyntaxKind::METHOD_DECL => {
                    if let Some(method) = MethodDecl::cast(node.clone()) {
                        static_context |= method.has_modifier(SyntaxKind::STATIC_KW);
                        for symbol in self.parameters(method.parameter_list()) {
                            push(symbol, &mut out);
                        }
                    }
                }
                SyntaxKind::CONSTRUCTOR_DECL => {
                    if let Some(ctor) = ConstructorDecl::cast(node.clone()) {
                        for symbol in self.parameters(ctor.parameter_list()) {
                            push(symbol, &mut out);
                        }
                    }
                }
                SyntaxKind::VARIABLE_DECL => {
                    // A field initializer.
                    let is_field = node
                        .parent()
                        .is_some_and(|p| p.kind() == SyntaxKind::CLASS_BODY);
                    if is_field && VariableDecl::cast(node.clone())
                        .is_some_and(|d| d.has_modifier(SyntaxKind::STATIC_KW))
                    {
                        static_context = true;
                    }
                }
                SyntaxKind::CLASS_DECL => {
                    let Some(class) = ClassDecl::cast(node.clone())
                        .and_then(|decl| self.declared_class(&decl))
                    else {
                        continue;
                    };
                    for symbol in self.class_members(&class, static_context, |owner, vis| {
                        self.can_access_from(owner, vis, start)
                    }) {
                        push(symbol, &mut out);
                    }
                    if self.class(&class).is_some_and(|info| info.is_static) {
                        static_context = true;
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Public static members brought in by `import static`.
    fn statically_imported(&self) -> Vec<Symbol> {
        let public = |_: &ClassRef, vis: Visibility| vis == Visibility::Public;
        let mut out = Vec::new();
        for import in &self.imports {
            match import {
                Import::StaticMember { class, member } => {
                    if let Some(class) = self.resolve_fqn(class) {
                        out.extend(
                            self.class_members(&class, true, public)
                                .into_iter()
                                .filter(|s| s.name() == member),
                        );
                    }
                }
                Import::StaticOnDemand(class) => {
                    if let Some(class) = self.resolve_fqn(class) {
                        out.extend(self.class_members(&class, true, public));
                    }
                }
                Import::Class { .. } | Import::OnDemand(_) => {}
            }
        }
        out
    }

    /// Variables declared by statements of `block` that end before `offset`.
    fn block_locals(&self, block: &SyntaxNode, offset: TextSize) -> Vec<Symbol> {
        let mut out = Vec::new();
        for child in block.children() {
            if child.text_range().start() >= offset {
                break;
            }
            let Some(decl) = VariableDecl::cast(child) else {
                continue;
            };
            let ty = decl.type_element().and_then(|te| self.resolve_type(&te));
            for var in decl.variables() {
                if var.syntax().text_range().end() > offset {
                    continue;
                }
                if let Some(name) = var.name_token() {
                    out.push(Symbol::Local {
                        name: name.text().to_string(),
                        ty: ty.clone(),
                        declared_at: name.text_range().start().into(),
                    });
                }
            }
        }
        out
    }

    fn parameters(&self, list: Option<ParameterList>) -> Vec<Symbol> {
        let Some(list) = list else {
            return Vec::new();
        };
        list.parameters()
            .filter_map(|p| {
                let name = p.name_token()?;
                Some(Symbol::Parameter {
                    name: name.text().to_string(),
                    ty: p.type_element().and_then(|te| self.resolve_type(&te)),
                    declared_at: name.text_range().start().into(),
                })
            })
            .collect()
    }

    /// Fields and methods of `class` and its supertypes passing `accessible`.
    fn class_members(
        &self,
        class: &ClassRef,
        statics_only: bool,
        accessible: impl Fn(&ClassRef, Visibility) -> bool,
    ) -> Vec<Symbol> {
        let mut out = Vec::new();
        let mut field_names = FxHashSet::default();
        for owner in self.supertype_closure(class) {
            let Some(info) = self.class(&owner) else {
                continue;
            };
            for field in &info.fields {
                if (statics_only && !field.is_static) || !accessible(&owner, field.visibility) {
                    continue;
                }
                if field_names.insert(field.name.clone()) {
                    out.push(Symbol::Field {
                        owner: owner.clone(),
                        name: field.name.clone(),
                        ty: field.ty.clone(),
                        is_static: field.is_static,
                    });
                }
            }
            for method in &info.methods {
                if (statics_only && !method.is_static) || !accessible(&owner, method.visibility) {
                    continue;
                }
                out.push(method_symbol(&owner, method));
            }
        }
        out
    }

    fn resolve_simple_reference(&self, name: &str, node: &SyntaxNode) -> Option<Symbol> {
        let offset = node.text_range().start();
        let value = self.scope_symbols(node, offset).into_iter().find(|s| {
            s.name() == name
                && matches!(
                    s,
                    Symbol::Local { .. } | Symbol::Parameter { .. } | Symbol::Field { .. }
                )
        });
        if value.is_some() {
            return value;
        }
        if let Some(class) = self.resolve_simple_name(name, node) {
            return Some(Symbol::Class(class));
        }
        self.is_package(name).then(|| Symbol::Package(name.to_string()))
    }

    /// `name` selected from what a qualifier resolved to.
    fn select(&self, qualifier: Symbol, name: &str) -> Option<Symbol> {
        match qualifier {
            Symbol::Package(package) => {
                let class = ClassRef::new(package.clone(), name);
                if self.exists(&class) {
                    return Some(Symbol::Class(class));
                }
                let sub = format!("{package}.{name}");
                self.is_package(&sub).then_some(Symbol::Package(sub))
            }
            Symbol::Class(class) => {
                let nested = class.nested(name);
                if self.exists(&nested) {
                    return Some(Symbol::Class(nested));
                }
                self.field_of(&class, name, true)
            }
            other => {
                let class = other.value_type()?.as_class()?.clone();
                self.field_of(&class, name, false)
            }
        }
    }

    fn field_of(&self, class: &ClassRef, name: &str, statics_only: bool) -> Option<Symbol> {
        self.class_members(class, statics_only, |_, _| true)
            .into_iter()
            .find(|s| matches!(s, Symbol::Field { .. }) && s.name() == name)
    }

    fn can_access_from(&self, owner: &ClassRef, visibility: Visibility, node: &SyntaxNode) -> bool {
        match visibility {
            Visibility::Public => true,
            Visibility::Private => self
                .enclosing_classes_of(node)
                .last()
                .is_some_and(|outermost| outermost.outermost() == owner.outermost()),
            Visibility::Package => owner.package == self.package,
            Visibility::Protected => {
                owner.package == self.package
                    || self
                        .enclosing_classes_of(node)
                        .iter()
                        .any(|c| self.is_subtype(c, owner))
            }
        }
    }

    fn place_node(place: &SyntaxToken) -> Option<SyntaxNode> {
        place.parent()
    }
}

fn visibility(modifiers: Option<ModifierList>) -> Visibility {
    let Some(modifiers) = modifiers else {
        return Visibility::Public;
    };
    if modifiers.has(SyntaxKind::PRIVATE_KW) {
        Visibility::Private
    } else if modifiers.has(SyntaxKind::PROTECTED_KW) {
        Visibility::Protected
    } else {
        Visibility::Public
    }
}

fn method_symbol(owner: &ClassRef, method: &MethodInfo) -> Symbol {
    Symbol::Method {
        owner: owner.clone(),
        name: method.name.clone(),
        params: method.params.clone(),
        ret: method.ret.clone(),
        is_static: method.is_static,
    }
}

/// Breadth-first walk over the transitive subtypes of a class.
struct Inheritors<'a, 'i> {
    resolver: &'a FileResolver<'i>,
    queue: VecDeque<ClassRef>,
    seen: FxHashSet<ClassRef>,
    remaining: usize,
    cancel: &'a CancellationToken,
}

impl Iterator for Inheritors<'_, '_> {
    type Item = ClassRef;

    fn next(&mut self) -> Option<ClassRef> {
        if self.remaining == 0 || self.cancel.is_cancelled() {
            return None;
        }
        let next = self.queue.pop_front()?;
        for sub in self.resolver.direct_subtypes(&next) {
            if self.seen.insert(sub.clone()) {
                self.queue.push_back(sub);
            }
        }
        self.remaining -= 1;
        Some(next)
    }
}

impl SymbolResolver for FileResolver<'_> {
    fn visible_symbols<'a>(
        &'a self,
        place: &SyntaxToken,
        cancel: &'a CancellationToken,
    ) -> Symbols<'a> {
        let scoped = match Self::place_node(place) {
            Some(node) => self.scope_symbols(&node, place.text_range().start()),
            None => Vec::new(),
        };
        let types = self.visible_types(place, cancel).map(Symbol::Class);
        Box::new(
            scoped
                .into_iter()
                .chain(types)
                .take_while(move |_| !cancel.is_cancelled()),
        )
    }

    fn visible_types<'a>(
        &'a self,
        place: &SyntaxToken,
        cancel: &'a CancellationToken,
    ) -> Classes<'a> {
        let Some(node) = Self::place_node(place) else {
            return Box::new(std::iter::empty());
        };

        let mut eager = Vec::new();
        for class in self.enclosing_classes_of(&node) {
            eager.extend(self.nested_classes_of(&class));
            eager.push(class);
        }
        eager.extend(
            self.classes
                .values()
                .filter(|info| !info.class.is_nested())
                .map(|info| info.class.clone()),
        );

        let mut packages = vec![self.package.clone()];
        for import in &self.imports {
            match import {
                Import::Class { path, .. } => eager.extend(self.resolve_fqn(path)),
                Import::OnDemand(target) if self.is_package(target) => {
                    packages.push(target.clone());
                }
                Import::OnDemand(target) => {
                    if let Some(class) = self.resolve_fqn(target) {
                        eager.extend(self.nested_classes_of(&class));
                    }
                }
                Import::StaticMember { .. } | Import::StaticOnDemand(_) => {}
            }
        }
        for target in &self.default_imports {
            if self.is_package(target) {
                packages.push(target.clone());
            } else {
                eager.extend(self.resolve_fqn(target));
            }
        }

        let index = self.index;
        let from_packages = packages
            .into_iter()
            .flat_map(move |package| index.classes_in(&package).map(|info| info.class.clone()));
        let place = place.clone();
        Box::new(
            eager
                .into_iter()
                .chain(from_packages)
                .take_while(move |_| !cancel.is_cancelled())
                .filter(move |class| self.is_class_accessible(class, &place)),
        )
    }

    fn resolve_qualifier(&self, qualifier: &SyntaxNode) -> Option<Symbol> {
        match qualifier.kind() {
            SyntaxKind::REFERENCE_EXPR => {
                let reference = ReferenceExpr::cast(qualifier.clone())?;
                let name = reference.name()?;
                match reference.qualifier() {
                    None => self.resolve_simple_reference(&name, qualifier),
                    Some(inner) => {
                        let inner = self.resolve_qualifier(inner.syntax())?;
                        self.select(inner, &name)
                    }
                }
            }
            SyntaxKind::CODE_REFERENCE => {
                let reference = CodeReference::cast(qualifier.clone())?;
                let name = reference.name()?;
                match reference.qualifier() {
                    None => self
                        .resolve_simple_name(&name, qualifier)
                        .map(Symbol::Class)
                        .or_else(|| self.is_package(&name).then(|| Symbol::Package(name))),
                    Some(inner) => {
                        let inner = self.resolve_qualifier(inner.syntax())?;
                        self.select(inner, &name)
                    }
                }
            }
            SyntaxKind::THIS_EXPR => {
                let class = self.enclosing_classes_of(qualifier).into_iter().next()?;
                Some(Symbol::Local {
                    name: "this".to_string(),
                    ty: Some(TypeRef::Class(class)),
                    declared_at: qualifier.text_range().start().into(),
                })
            }
            _ => None,
        }
    }

    fn members_of<'a>(
        &'a self,
        class: &ClassRef,
        statics_only: bool,
        place: &SyntaxToken,
        cancel: &'a CancellationToken,
    ) -> Symbols<'a> {
        let Some(node) = Self::place_node(place) else {
            return Box::new(std::iter::empty());
        };
        let mut out: Vec<Symbol> = self
            .nested_classes_of(class)
            .into_iter()
            .filter(|nested| self.is_class_accessible(nested, place))
            .map(Symbol::Class)
            .collect();
        out.extend(self.class_members(class, statics_only, |owner, vis| {
            self.can_access_from(owner, vis, &node)
        }));
        Box::new(out.into_iter().take_while(move |_| !cancel.is_cancelled()))
    }

    fn package_members<'a>(&'a self, package: &str, cancel: &'a CancellationToken) -> Symbols<'a> {
        let mut out: Vec<Symbol> = self
            .index
            .subpackages(package)
            .into_iter()
            .map(Symbol::Package)
            .collect();
        if let Some(rest) = self
            .package
            .strip_prefix(package)
            .and_then(|rest| rest.strip_prefix('.'))
        {
            let own = format!("{package}.{}", rest.split('.').next().unwrap_or(rest));
            if !out.iter().any(|s| *s == Symbol::Package(own.clone())) {
                out.push(Symbol::Package(own));
            }
        }
        if package == self.package {
            out.extend(
                self.classes
                    .values()
                    .filter(|info| !info.class.is_nested())
                    .map(|info| Symbol::Class(info.class.clone())),
            );
        }
        let classes = self
            .index
            .classes_in(package)
            .filter(|info| info.visibility == Visibility::Public)
            .map(|info| Symbol::Class(info.class.clone()));
        Box::new(
            out.into_iter()
                .chain(classes)
                .take_while(move |_| !cancel.is_cancelled()),
        )
    }

    fn resolve_type(&self, ty: &TypeElement) -> Option<TypeRef> {
        let base = match ty.primitive() {
            Some(token) => TypeRef::Primitive(token.text().to_string()),
            None => {
                let reference = ty.code_reference()?;
                TypeRef::Class(self.resolve_class_name(&reference.path(), ty.syntax())?)
            }
        };
        Some((0..ty.array_dimensions()).fold(base, |t, _| TypeRef::Array(Box::new(t))))
    }

    fn class(&self, class: &ClassRef) -> Option<&ClassInfo> {
        self.classes
            .get(&class.fqn())
            .or_else(|| self.index.class(class))
    }

    fn inheritors_of<'a>(
        &'a self,
        class: &ClassRef,
        _place: &SyntaxToken,
        cancel: &'a CancellationToken,
    ) -> Classes<'a> {
        let mut seen = FxHashSet::default();
        seen.insert(class.clone());
        let queue = self
            .direct_subtypes(class)
            .into_iter()
            .filter(|sub| seen.insert(sub.clone()))
            .collect();
        Box::new(Inheritors {
            resolver: self,
            queue,
            seen,
            remaining: self.inheritor_limit,
            cancel,
        })
    }

    fn has_enclosing_instance(
        &self,
        class: &ClassRef,
        place: &SyntaxToken,
        accept_super: bool,
    ) -> bool {
        for node in place.parent_ancestors() {
            match node.kind() {
                SyntaxKind::CLASS_DECL => {
                    let Some(decl) = ClassDecl::cast(node) else {
                        continue;
                    };
                    let Some(this) = self.declared_class(&decl) else {
                        continue;
                    };
                    if this == *class || (accept_super && self.is_subtype(&this, class)) {
                        return true;
                    }
                    if self.class(&this).is_some_and(|info| info.is_static) {
                        return false;
                    }
                }
                SyntaxKind::METHOD_DECL => {
                    if MethodDecl::cast(node).is_some_and(|m| m.has_modifier(SyntaxKind::STATIC_KW))
                    {
                        return false;
                    }
                }
                SyntaxKind::VARIABLE_DECL => {
                    if VariableDecl::cast(node)
                        .is_some_and(|d| d.has_modifier(SyntaxKind::STATIC_KW))
                    {
                        return false;
                    }
                }
                _ => {}
            }
        }
        false
    }

    fn is_subtype(&self, sub: &ClassRef, sup: &ClassRef) -> bool {
        self.supertype_closure(sub).iter().any(|c| c == sup)
    }

    fn can_access(&self, owner: &ClassRef, visibility: Visibility, place: &SyntaxToken) -> bool {
        match Self::place_node(place) {
            Some(node) => self.can_access_from(owner, visibility, &node),
            None => visibility == Visibility::Public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_parser::parse;

    const INDEX: &str = r#"{
        "classes": [
            { "fqn": "java.lang.Object", "methods": [{ "name": "toString", "returns": "java.lang.String" }] },
            { "fqn": "java.lang.String", "methods": [
                { "name": "length", "returns": "int" },
                { "name": "valueOf", "params": ["int"], "returns": "java.lang.String", "static": true }
            ] },
            { "fqn": "java.util.List", "kind": "interface" },
            { "fqn": "java.util.ArrayList", "supers": ["java.util.List"] },
            { "fqn": "java.util.LinkedList", "supers": ["java.util.List"] },
            { "fqn": "java.util.Map", "kind": "interface" },
            { "fqn": "java.util.Map.Entry", "kind": "interface", "static": true },
            { "fqn": "java.awt.List" },
            { "fqn": "org.demo.Hidden", "visibility": "package" }
        ]
    }"#;

    fn index() -> ClassIndex {
        ClassIndex::from_json(INDEX).unwrap()
    }

    /// The identifier token named `name` in `root`.
    fn token(root: &SyntaxNode, name: &str) -> SyntaxToken {
        root.descendants_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::IDENT && t.text() == name)
            .unwrap()
    }

    fn visible_names(source: &str, at: &str) -> Vec<String> {
        let index = index();
        let root = parse(source).syntax();
        let resolver = FileResolver::new(&root, &index, &CompletionConfig::default());
        let cancel = CancellationToken::new();
        resolver
            .visible_symbols(&token(&root, at), &cancel)
            .map(|s| s.name().to_string())
            .collect()
    }

    #[test]
    fn locals_declared_before_the_place_are_visible() {
        let names = visible_names("def a = 1\ndef b = 2\nHERE\ndef c = 3", "HERE");
        assert!(names.contains(&"a".to_string()));
        assert!(names.contains(&"b".to_string()));
        assert!(!names.contains(&"c".to_string()));
    }

    #[test]
    fn parameters_and_fields_of_enclosing_class() {
        let source = "class A {\n  int count\n  private String name\n  void m(int arg) {\n    HERE\n  }\n}";
        let names = visible_names(source, "HERE");
        for expected in ["arg", "count", "name", "m", "toString", "A"] {
            assert!(names.contains(&expected.to_string()), "missing {expected}: {names:?}");
        }
    }

    #[test]
    fn static_method_sees_only_static_members() {
        let source = "class A {\n  int count\n  static int total\n  static void m() {\n    HERE\n  }\n}";
        let names = visible_names(source, "HERE");
        assert!(names.contains(&"total".to_string()));
        assert!(!names.contains(&"count".to_string()));
    }

    #[test]
    fn closure_has_implicit_it() {
        let names = visible_names("[1].each { HERE }", "HERE");
        assert!(names.contains(&"it".to_string()));
        let names = visible_names("[1].each { x -> HERE }", "HERE");
        assert!(names.contains(&"x".to_string()));
        assert!(!names.contains(&"it".to_string()));
    }

    #[test]
    fn default_imports_and_package_visibility() {
        let names = visible_names("package app\nHERE", "HERE");
        assert!(names.contains(&"ArrayList".to_string()));
        assert!(names.contains(&"String".to_string()));
        assert!(!names.contains(&"Hidden".to_string()));
        let names = visible_names("package org.demo\nHERE", "HERE");
        assert!(names.contains(&"Hidden".to_string()));
    }

    #[test]
    fn explicit_import_wins_over_default_package() {
        let index = index();
        let root = parse("import java.awt.List\nList xs").syntax();
        let resolver = FileResolver::new(&root, &index, &CompletionConfig::default());
        let te = root.descendants().find_map(TypeElement::cast).unwrap();
        assert_eq!(
            resolver.resolve_type(&te),
            Some(TypeRef::Class(ClassRef::parse("java.awt.List")))
        );
    }

    #[test]
    fn nested_and_array_types_resolve() {
        let index = index();
        let root = parse("Map.Entry[] entries").syntax();
        let resolver = FileResolver::new(&root, &index, &CompletionConfig::default());
        let te = root.descendants().find_map(TypeElement::cast).unwrap();
        assert_eq!(
            resolver.resolve_type(&te).map(|t| t.to_string()),
            Some("java.util.Map.Entry[]".to_string())
        );
    }

    #[test]
    fn file_classes_join_the_hierarchy() {
        let index = index();
        let source = "package app\nclass Mine implements List {}\nclass Sub extends Mine {}\nHERE";
        let root = parse(source).syntax();
        let resolver = FileResolver::new(&root, &index, &CompletionConfig::default());
        let cancel = CancellationToken::new();
        let list = ClassRef::parse("java.util.List");
        let mut inheritors: Vec<String> = resolver
            .inheritors_of(&list, &token(&root, "HERE"), &cancel)
            .map(|c| c.fqn())
            .collect();
        inheritors.sort();
        assert_eq!(
            inheritors,
            vec!["app.Mine", "app.Sub", "java.util.ArrayList", "java.util.LinkedList"]
        );
        assert!(resolver.is_subtype(&ClassRef::parse("app.Sub"), &list));
    }

    #[test]
    fn inheritor_enumeration_stops_when_cancelled() {
        let index = index();
        let root = parse("HERE").syntax();
        let resolver = FileResolver::new(&root, &index, &CompletionConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let place = token(&root, "HERE");
        let list = ClassRef::parse("java.util.List");
        assert_eq!(resolver.inheritors_of(&list, &place, &cancel).count(), 0);
        assert_eq!(resolver.visible_types(&place, &cancel).count(), 0);
    }

    #[test]
    fn qualifier_resolution() {
        let index = index();
        let source = "String s = ''\ns.HERE\nString.valueOf\njava.util.HERE";
        let root = parse(source).syntax();
        let resolver = FileResolver::new(&root, &index, &CompletionConfig::default());
        let qualifiers: Vec<SyntaxNode> = root
            .descendants()
            .filter_map(ReferenceExpr::cast)
            .filter_map(|r| r.qualifier())
            .map(|q| q.syntax().clone())
            .collect();
        let resolved: Vec<Option<Symbol>> =
            qualifiers.iter().map(|q| resolver.resolve_qualifier(q)).collect();
        assert!(matches!(
            &resolved[0],
            Some(Symbol::Local { name, ty: Some(TypeRef::Class(c)), .. })
                if name == "s" && c.name == "String"
        ));
        assert!(matches!(&resolved[1], Some(Symbol::Class(c)) if c.name == "String"));
        // Qualifiers in preorder: `s`, `String`, `java.util`, `java`.
        assert_eq!(resolved[2], Some(Symbol::Package("java.util".to_string())));
        assert_eq!(resolved[3], Some(Symbol::Package("java".to_string())));
    }

    #[test]
    fn enclosing_instance_stops_at_static_boundary() {
        let index = index();
        let source = "class Outer {\n  class Inner {\n    void m() { A }\n  }\n  static class Nested {\n    void m() { B }\n  }\n  static void s() { C }\n}";
        let root = parse(source).syntax();
        let resolver = FileResolver::new(&root, &index, &CompletionConfig::default());
        let outer = ClassRef::new("", "Outer");
        assert!(resolver.has_enclosing_instance(&outer, &token(&root, "A"), false));
        assert!(!resolver.has_enclosing_instance(&outer, &token(&root, "B"), false));
        assert!(!resolver.has_enclosing_instance(&outer, &token(&root, "C"), false));
    }
}
