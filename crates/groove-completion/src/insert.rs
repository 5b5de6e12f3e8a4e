//! Insertion handlers: turn a chosen candidate into edits of the real,
//! unpatched document.
//!
//! Handlers are pure functions of the document text, the candidate and the
//! range being replaced. They never see the patched copy, so nothing they
//! produce can contain the dummy identifier.

use groove_common::span::Span;
use groove_parser::ast::item::{ClassDecl, SourceFile};
use groove_parser::ast::AstNode;
use serde::Serialize;
use tracing::trace;

use crate::config::{CompletionConfig, QualifyPolicy};
use crate::item::{Candidate, ClassRef, InsertPayload, TypeRef};

/// Replace `span` of the document with `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub span: Span,
    pub text: String,
}

impl TextEdit {
    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self {
            span: Span::empty(offset),
            text: text.into(),
        }
    }

    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }

    fn delta(&self) -> i64 {
        self.text.len() as i64 - i64::from(self.span.len())
    }
}

/// The result of applying a handler.
///
/// `edits[0]` replaces the completed identifier; further edits (an import)
/// never overlap it. `caret` is an offset in the document after all edits
/// are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentEdit {
    pub edits: Vec<TextEdit>,
    pub caret: u32,
    pub trigger_signature_help: bool,
}

impl DocumentEdit {
    /// `caret` is relative to the start of the primary edit's text.
    fn new(primary: TextEdit, caret: u32, extra: Option<TextEdit>) -> Self {
        let shift: i64 = extra
            .iter()
            .filter(|e| e.span.end <= primary.span.start)
            .map(TextEdit::delta)
            .sum();
        let caret = (i64::from(primary.span.start) + shift + i64::from(caret)) as u32;
        let mut edits = vec![primary];
        edits.extend(extra);
        Self {
            edits,
            caret,
            trigger_signature_help: false,
        }
    }

    fn with_signature_help(mut self, trigger: bool) -> Self {
        self.trigger_signature_help = trigger;
        self
    }

    pub fn primary(&self) -> &TextEdit {
        &self.edits[0]
    }

    /// Caret position inside the primary edit's text.
    pub fn caret_in_primary(&self) -> u32 {
        let primary = self.primary();
        let shift: i64 = self.edits[1..]
            .iter()
            .filter(|e| e.span.end <= primary.span.start)
            .map(TextEdit::delta)
            .sum();
        (i64::from(self.caret) - shift - i64::from(primary.span.start)) as u32
    }

    /// Apply every edit to `document`.
    pub fn apply_to(&self, document: &str) -> String {
        let mut edits: Vec<&TextEdit> = self.edits.iter().collect();
        edits.sort_by_key(|e| std::cmp::Reverse((e.span.start, e.span.end)));
        let mut out = document.to_string();
        for edit in edits {
            out.replace_range(edit.span.start as usize..edit.span.end as usize, &edit.text);
        }
        out
    }
}

/// The range a chosen candidate replaces: the identifier characters typed
/// before `offset`.
pub fn replace_range(document: &str, offset: u32) -> Span {
    let before = &document[..offset as usize];
    let start = before
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_ident_char(c))
        .last()
        .map_or(offset, |(i, _)| i as u32);
    Span::new(start, offset)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[derive(Debug, Clone)]
struct ImportLine {
    path: String,
    alias: Option<String>,
    on_demand: bool,
}

impl ImportLine {
    /// The simple name this import makes visible.
    fn visible_name(&self) -> &str {
        self.alias
            .as_deref()
            .unwrap_or_else(|| self.path.rsplit('.').next().unwrap_or(&self.path))
    }
}

#[derive(Debug, Clone, Copy)]
enum ImportAnchor {
    AfterImports(u32),
    AfterPackage(u32),
    FileStart,
}

/// What the handlers need to know about the document: its package, its
/// imports and the classes it declares.
pub struct InsertContext<'d> {
    document: &'d str,
    package: String,
    imports: Vec<ImportLine>,
    declared: Vec<ClassRef>,
    default_imports: Vec<String>,
    policy: QualifyPolicy,
    anchor: ImportAnchor,
}

impl<'d> InsertContext<'d> {
    pub fn new(document: &'d str, config: &CompletionConfig) -> Self {
        let root = groove_parser::parse(document).syntax();
        let file = SourceFile::cast(root.clone());
        let package_decl = file.as_ref().and_then(|f| f.package());
        let package = package_decl
            .as_ref()
            .and_then(|p| p.name())
            .unwrap_or_default();

        let mut imports = Vec::new();
        let mut last_import = None;
        for decl in file.iter().flat_map(|f| f.imports()) {
            last_import = Some(u32::from(decl.syntax().text_range().end()));
            if decl.is_static() {
                continue;
            }
            if let Some(path) = decl.path() {
                imports.push(ImportLine {
                    path,
                    alias: decl.alias(),
                    on_demand: decl.is_on_demand(),
                });
            }
        }
        let anchor = match (last_import, &package_decl) {
            (Some(end), _) => ImportAnchor::AfterImports(end),
            (None, Some(decl)) => {
                ImportAnchor::AfterPackage(u32::from(decl.syntax().text_range().end()))
            }
            (None, None) => ImportAnchor::FileStart,
        };

        let declared = root
            .descendants()
            .filter_map(ClassDecl::cast)
            .filter_map(|decl| {
                let mut names = vec![decl.name()?];
                for outer in decl.syntax().ancestors().skip(1).filter_map(ClassDecl::cast) {
                    names.push(outer.name()?);
                }
                names.reverse();
                Some(ClassRef::new(package.clone(), names.join(".")))
            })
            .collect();

        Self {
            document,
            package,
            imports,
            declared,
            default_imports: config.default_imports().map(str::to_string).collect(),
            policy: config.qualify,
            anchor,
        }
    }

    pub fn document(&self) -> &str {
        self.document
    }

    /// Whether `class` can already be named by its short name.
    fn is_visible(&self, class: &ClassRef) -> bool {
        if class.package == self.package && self.declared.contains(&class.outermost()) {
            return true;
        }
        let fqn = class.fqn();
        let single = |i: &ImportLine| !i.on_demand && i.alias.is_none() && i.path == fqn;
        match class.outer() {
            Some(outer) => {
                let outer = outer.fqn();
                self.imports
                    .iter()
                    .any(|i| single(i) || (i.on_demand && i.path == outer))
            }
            None => {
                class.package == self.package
                    || self
                        .default_imports
                        .iter()
                        .any(|d| *d == class.package || *d == fqn)
                    || self
                        .imports
                        .iter()
                        .any(|i| single(i) || (i.on_demand && i.path == class.package))
            }
        }
    }

    /// Whether importing `class` would clash with a name already in use.
    fn has_conflict(&self, class: &ClassRef) -> bool {
        let short = class.short_name();
        let fqn = class.fqn();
        self.imports
            .iter()
            .any(|i| !i.on_demand && i.visible_name() == short && i.path != fqn)
            || self
                .declared
                .iter()
                .any(|d| d.short_name() == short && d != class)
    }

    fn alias_for(&self, class: &ClassRef) -> Option<&str> {
        let fqn = class.fqn();
        self.imports
            .iter()
            .find(|i| !i.on_demand && i.path == fqn)
            .and_then(|i| i.alias.as_deref())
    }

    fn import_edit(&self, class: &ClassRef) -> TextEdit {
        let fqn = class.fqn();
        match self.anchor {
            ImportAnchor::AfterImports(end) => TextEdit::insert(end, format!("\nimport {fqn}")),
            ImportAnchor::AfterPackage(end) => TextEdit::insert(end, format!("\n\nimport {fqn}")),
            ImportAnchor::FileStart => TextEdit::insert(0, format!("import {fqn}\n\n")),
        }
    }

    /// Text that names `class` at `replace`, plus the import it needs.
    fn class_reference(&self, class: &ClassRef, replace: Span) -> (String, Option<TextEdit>) {
        let short = class.short_name().to_string();
        if self.document[..replace.start as usize].ends_with('.') {
            return (short, None);
        }
        if let Some(alias) = self.alias_for(class) {
            return (alias.to_string(), None);
        }
        if self.is_visible(class) {
            return (short, None);
        }
        match self.policy {
            QualifyPolicy::Never => (short, Some(self.import_edit(class))),
            QualifyPolicy::Always => (class.fqn(), None),
            QualifyPolicy::OnConflict if self.has_conflict(class) => {
                trace!(%class, "short name taken, inserting qualified name");
                (class.fqn(), None)
            }
            QualifyPolicy::OnConflict => (short, Some(self.import_edit(class))),
        }
    }

    fn type_text(&self, ty: &TypeRef, replace: Span) -> (String, Option<TextEdit>) {
        match ty {
            TypeRef::Primitive(name) => (name.clone(), None),
            TypeRef::Class(class) => self.class_reference(class, replace),
            TypeRef::Array(element) => {
                let (text, import) = self.type_text(element, replace);
                (format!("{text}[]"), import)
            }
        }
    }

    /// Offset of a `(` following `offset`, ignoring spaces and tabs.
    fn paren_after(&self, offset: u32) -> Option<u32> {
        let rest = &self.document[offset as usize..];
        let skipped = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        rest[skipped..]
            .starts_with('(')
            .then_some(offset + skipped as u32)
    }
}

/// Apply `candidate`'s handler, replacing `replace` in the document.
pub fn apply(candidate: &Candidate, cx: &InsertContext<'_>, replace: Span) -> DocumentEdit {
    match &candidate.payload {
        InsertPayload::Identity => {
            let text = candidate.lookup.clone();
            let caret = text.len() as u32;
            DocumentEdit::new(TextEdit::replace(replace, text), caret, None)
        }
        InsertPayload::Type { class } => {
            let (text, import) = cx.class_reference(class, replace);
            let caret = text.len() as u32;
            DocumentEdit::new(TextEdit::replace(replace, text), caret, import)
        }
        InsertPayload::Constructor {
            class,
            has_required_args,
        } => {
            let (name, import) = cx.class_reference(class, replace);
            let edit = match cx.paren_after(replace.end) {
                // Keep the existing parentheses; the caret goes inside.
                Some(paren) => {
                    let between = &cx.document[replace.end as usize..=paren as usize];
                    let text = format!("{name}{between}");
                    let caret = text.len() as u32;
                    let span = Span::new(replace.start, paren + 1);
                    DocumentEdit::new(TextEdit::replace(span, text), caret, import)
                }
                None => {
                    let caret = name.len() as u32 + 1;
                    DocumentEdit::new(TextEdit::replace(replace, format!("{name}()")), caret, import)
                }
            };
            edit.with_signature_help(*has_required_args)
        }
        InsertPayload::Array {
            element,
            dims,
            length,
        } => {
            let (name, import) = cx.type_text(element, replace);
            let rest = "[]".repeat(dims.saturating_sub(1) as usize);
            let (text, caret) = match length {
                Some(n) => {
                    let text = format!("{name}[{n}]{rest}");
                    let caret = text.len() as u32;
                    (text, caret)
                }
                None => (format!("{name}[]{rest}"), name.len() as u32 + 1),
            };
            DocumentEdit::new(TextEdit::replace(replace, text), caret, import)
        }
        InsertPayload::Call { has_params } => {
            let name = candidate.lookup.clone();
            if cx.paren_after(replace.end).is_some() {
                let caret = name.len() as u32;
                return DocumentEdit::new(TextEdit::replace(replace, name), caret, None);
            }
            let caret = if *has_params {
                name.len() as u32 + 1
            } else {
                name.len() as u32 + 2
            };
            DocumentEdit::new(TextEdit::replace(replace, format!("{name}()")), caret, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{CandidateKind, SymbolKey};

    fn class_candidate(fqn: &str, payload: InsertPayload) -> Candidate {
        let class = ClassRef::parse(fqn);
        Candidate::new(class.short_name(), CandidateKind::Class, SymbolKey::Class(fqn.to_string()))
            .with_payload(payload)
    }

    fn constructor(fqn: &str, has_required_args: bool) -> Candidate {
        class_candidate(
            fqn,
            InsertPayload::Constructor {
                class: ClassRef::parse(fqn),
                has_required_args,
            },
        )
    }

    fn type_of(fqn: &str) -> Candidate {
        class_candidate(
            fqn,
            InsertPayload::Type {
                class: ClassRef::parse(fqn),
            },
        )
    }

    /// Apply at `<caret>` and render the result with the caret marked.
    fn applied(source: &str, candidate: &Candidate, config: &CompletionConfig) -> (String, bool) {
        let offset = source.find("<caret>").unwrap() as u32;
        let document = source.replace("<caret>", "");
        let cx = InsertContext::new(&document, config);
        let edit = apply(candidate, &cx, replace_range(&document, offset));
        let mut out = edit.apply_to(&document);
        out.insert_str(edit.caret as usize, "<caret>");
        (out, edit.trigger_signature_help)
    }

    fn render(source: &str, candidate: &Candidate) -> String {
        applied(source, candidate, &CompletionConfig::default()).0
    }

    #[test]
    fn constructor_appends_parentheses() {
        let (out, signature_help) = applied(
            "List x = new Arr<caret>",
            &constructor("java.util.ArrayList", false),
            &CompletionConfig::default(),
        );
        assert_eq!(out, "List x = new ArrayList(<caret>)");
        assert!(!signature_help);
    }

    #[test]
    fn constructor_reuses_existing_parentheses() {
        let (out, signature_help) = applied(
            "def f = new Fi<caret> (path)",
            &constructor("java.io.File", true),
            &CompletionConfig::default(),
        );
        assert_eq!(out, "def f = new File (<caret>path)");
        assert!(signature_help);
    }

    #[test]
    fn constructor_imports_class_outside_default_packages() {
        assert_eq!(
            render(
                "package app\n\nQueue q = new <caret>",
                &constructor("java.util.concurrent.ArrayBlockingQueue", true)
            ),
            "package app\n\nimport java.util.concurrent.ArrayBlockingQueue\n\nQueue q = new ArrayBlockingQueue(<caret>)"
        );
        assert_eq!(
            render("import a.B\nX x = new <caret>", &constructor("c.D", false)),
            "import a.B\nimport c.D\nX x = new D(<caret>)"
        );
        assert_eq!(
            render("X x = new <caret>", &constructor("c.D", false)),
            "import c.D\n\nX x = new D(<caret>)"
        );
    }

    #[test]
    fn no_import_when_already_visible() {
        for (source, fqn) in [
            ("package c\nX x = new <caret>", "c.D"),
            ("import c.D\nX x = new <caret>", "c.D"),
            ("import c.*\nX x = new <caret>", "c.D"),
            ("class D {}\nX x = new <caret>", "D"),
        ] {
            let expected = source.replace("new <caret>", "new D(<caret>)");
            assert_eq!(render(source, &constructor(fqn, false)), expected, "{source}");
        }
        assert_eq!(
            render("def x = new <caret>", &constructor("java.math.BigDecimal", true)),
            "def x = new BigDecimal(<caret>)"
        );
    }

    #[test]
    fn aliased_import_is_used() {
        assert_eq!(
            render("import c.D as Dee\nX x = new <caret>", &constructor("c.D", false)),
            "import c.D as Dee\nX x = new Dee(<caret>)"
        );
    }

    #[test]
    fn qualify_policies() {
        let source = "import java.awt.List\nx = <caret>";
        let list = type_of("java.util.concurrent.CopyOnWriteArrayList");
        let conflicting = type_of("com.acme.List");

        let on_conflict = CompletionConfig::default();
        assert_eq!(
            applied(source, &conflicting, &on_conflict).0,
            "import java.awt.List\nx = com.acme.List<caret>"
        );
        assert_eq!(
            applied(source, &list, &on_conflict).0,
            "import java.awt.List\nimport java.util.concurrent.CopyOnWriteArrayList\nx = CopyOnWriteArrayList<caret>"
        );

        let always = CompletionConfig {
            qualify: QualifyPolicy::Always,
            ..CompletionConfig::default()
        };
        assert_eq!(
            applied(source, &list, &always).0,
            "import java.awt.List\nx = java.util.concurrent.CopyOnWriteArrayList<caret>"
        );

        let never = CompletionConfig {
            qualify: QualifyPolicy::Never,
            ..CompletionConfig::default()
        };
        assert_eq!(
            applied(source, &conflicting, &never).0,
            "import java.awt.List\nimport com.acme.List\nx = List<caret>"
        );
    }

    #[test]
    fn qualified_position_inserts_short_name() {
        assert_eq!(
            render(
                "x = java.util.concurrent.Arr<caret>",
                &type_of("java.util.concurrent.ArrayBlockingQueue")
            ),
            "x = java.util.concurrent.ArrayBlockingQueue<caret>"
        );
    }

    #[test]
    fn array_handler() {
        let unknown = class_candidate(
            "java.lang.String",
            InsertPayload::Array {
                element: TypeRef::parse("java.lang.String"),
                dims: 2,
                length: None,
            },
        );
        assert_eq!(
            render("String[][] s = new <caret>", &unknown),
            "String[][] s = new String[<caret>][]"
        );

        let known = class_candidate(
            "int",
            InsertPayload::Array {
                element: TypeRef::parse("int"),
                dims: 1,
                length: Some(4),
            },
        );
        assert_eq!(render("int[] s = new <caret>", &known), "int[] s = new int[4]<caret>");
    }

    #[test]
    fn call_handler() {
        let with_params = Candidate::new(
            "substring",
            CandidateKind::Method,
            SymbolKey::Keyword("substring".into()),
        )
        .with_payload(InsertPayload::Call { has_params: true });
        let without = Candidate::new("size", CandidateKind::Method, SymbolKey::Keyword("size".into()))
            .with_payload(InsertPayload::Call { has_params: false });

        assert_eq!(render("s.sub<caret>", &with_params), "s.substring(<caret>)");
        assert_eq!(render("s.si<caret>", &without), "s.size()<caret>");
        assert_eq!(render("s.sub<caret>(1)", &with_params), "s.substring<caret>(1)");
    }

    #[test]
    fn identity_handler_replaces_prefix_only() {
        let keyword = Candidate::keyword("this");
        assert_eq!(render("Outer.th<caret>", &keyword), "Outer.this<caret>");
        assert_eq!(replace_range("foo.bar", 7), Span::new(4, 7));
        assert_eq!(replace_range("foo.", 4), Span::new(4, 4));
    }

    #[test]
    fn caret_in_primary_ignores_import_shift() {
        let document = "X x = new ";
        let cx = InsertContext::new(document, &CompletionConfig::default());
        let edit = apply(&constructor("c.D", false), &cx, replace_range(document, 10));
        assert_eq!(edit.primary().text, "D()");
        assert_eq!(edit.caret_in_primary(), 2);
        assert_eq!(edit.caret, "import c.D\n\n".len() as u32 + 12);
    }
}
