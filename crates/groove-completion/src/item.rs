//! Candidate vocabulary: class and type references, resolved symbols, and the
//! completion candidates built from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to a class by package and (possibly dotted, for nested classes)
/// name.
///
/// Serialized as the fully qualified name. When parsing a fully qualified
/// name the package is taken to be the leading lowercase segments, which
/// holds for every Java and Groovy library class the engine indexes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ClassRef {
    pub package: String,
    pub name: String,
}

impl ClassRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Split a fully qualified name into package and class name.
    pub fn parse(fqn: &str) -> Self {
        let segments: Vec<&str> = fqn.split('.').collect();
        let last = segments.len().saturating_sub(1);
        let split = segments[..last]
            .iter()
            .position(|s| s.starts_with(|c: char| c.is_uppercase()))
            .unwrap_or(last);
        Self::new(segments[..split].join("."), segments[split..].join("."))
    }

    pub fn fqn(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    /// Innermost simple name: `Entry` for `java.util.Map.Entry`.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// The containing class of a nested class.
    pub fn outer(&self) -> Option<ClassRef> {
        let (outer, _) = self.name.rsplit_once('.')?;
        Some(ClassRef::new(self.package.clone(), outer))
    }

    /// The top-level class this class is (or is nested in).
    pub fn outermost(&self) -> ClassRef {
        match self.name.split_once('.') {
            Some((top, _)) => ClassRef::new(self.package.clone(), top),
            None => self.clone(),
        }
    }

    pub fn nested(&self, inner: &str) -> ClassRef {
        ClassRef::new(self.package.clone(), format!("{}.{}", self.name, inner))
    }

    pub fn is_nested(&self) -> bool {
        self.name.contains('.')
    }
}

impl From<String> for ClassRef {
    fn from(fqn: String) -> Self {
        ClassRef::parse(&fqn)
    }
}

impl From<ClassRef> for String {
    fn from(class: ClassRef) -> Self {
        class.fqn()
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqn())
    }
}

pub const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// A declared type: primitive, class, or array of either.
///
/// Serialized as source text (`int`, `java.lang.String`, `java.io.File[][]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeRef {
    Primitive(String),
    Class(ClassRef),
    Array(Box<TypeRef>),
}

impl TypeRef {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(element) = text.strip_suffix("[]") {
            return TypeRef::Array(Box::new(TypeRef::parse(element)));
        }
        if PRIMITIVE_TYPES.contains(&text) {
            TypeRef::Primitive(text.to_string())
        } else {
            TypeRef::Class(ClassRef::parse(text))
        }
    }

    pub fn object() -> Self {
        TypeRef::Class(ClassRef::new("java.lang", "Object"))
    }

    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            TypeRef::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Text as written in source without qualification: `String[]`.
    pub fn short_text(&self) -> String {
        match self {
            TypeRef::Primitive(name) => name.clone(),
            TypeRef::Class(class) => class.short_name().to_string(),
            TypeRef::Array(element) => format!("{}[]", element.short_text()),
        }
    }
}

impl From<String> for TypeRef {
    fn from(text: String) -> Self {
        TypeRef::parse(&text)
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(name) => f.write_str(name),
            TypeRef::Class(class) => write!(f, "{class}"),
            TypeRef::Array(element) => write!(f, "{element}[]"),
        }
    }
}

/// Something a resolver can enumerate at a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Class(ClassRef),
    Field {
        owner: ClassRef,
        name: String,
        ty: TypeRef,
        is_static: bool,
    },
    Method {
        owner: ClassRef,
        name: String,
        params: Vec<TypeRef>,
        ret: Option<TypeRef>,
        is_static: bool,
    },
    /// A local variable; `declared_at` is the start offset of its name.
    Local {
        name: String,
        ty: Option<TypeRef>,
        declared_at: u32,
    },
    Parameter {
        name: String,
        ty: Option<TypeRef>,
        declared_at: u32,
    },
    Package(String),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Class(class) => class.short_name(),
            Symbol::Field { name, .. }
            | Symbol::Method { name, .. }
            | Symbol::Local { name, .. }
            | Symbol::Parameter { name, .. } => name,
            Symbol::Package(package) => package.rsplit('.').next().unwrap_or(package),
        }
    }

    /// Declared type of a value symbol.
    pub fn value_type(&self) -> Option<&TypeRef> {
        match self {
            Symbol::Field { ty, .. } => Some(ty),
            Symbol::Local { ty, .. } | Symbol::Parameter { ty, .. } => ty.as_ref(),
            _ => None,
        }
    }

    pub fn key(&self) -> SymbolKey {
        match self {
            Symbol::Class(class) => SymbolKey::Class(class.fqn()),
            Symbol::Field { owner, name, .. } => SymbolKey::Field {
                owner: owner.fqn(),
                name: name.clone(),
            },
            Symbol::Method {
                owner,
                name,
                params,
                ..
            } => SymbolKey::Method {
                owner: owner.fqn(),
                name: name.clone(),
                signature: params
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            },
            Symbol::Local {
                name, declared_at, ..
            }
            | Symbol::Parameter {
                name, declared_at, ..
            } => SymbolKey::Local {
                name: name.clone(),
                declared_at: *declared_at,
            },
            Symbol::Package(package) => SymbolKey::Package(package.clone()),
        }
    }
}

/// Identity of the program element behind a candidate. The result sink
/// deduplicates on this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKey {
    Class(String),
    Array { element: String, dims: u32 },
    Field { owner: String, name: String },
    Method { owner: String, name: String, signature: String },
    Local { name: String, declared_at: u32 },
    Keyword(String),
    Package(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Class,
    Interface,
    Method,
    Field,
    Variable,
    Parameter,
    Keyword,
    ArrayType,
    Package,
}

/// What the insertion handler does once a candidate is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "handler", rename_all = "snake_case")]
pub enum InsertPayload {
    /// Insert the lookup string as is.
    Identity,
    /// Class name followed by a constructor call.
    Constructor {
        class: ClassRef,
        has_required_args: bool,
    },
    /// Array type with one `[]` per dimension.
    Array {
        element: TypeRef,
        dims: u32,
        length: Option<u32>,
    },
    /// Class name in type position, imported when needed.
    Type { class: ClassRef },
    /// Method name followed by a call's parentheses.
    Call { has_params: bool },
}

/// Relative ordering weights; higher sorts first.
pub mod rank {
    pub const SMART_EXACT: u32 = 100;
    pub const KEYWORD: u32 = 95;
    pub const LOCAL: u32 = 90;
    pub const FIELD: u32 = 80;
    pub const METHOD: u32 = 70;
    pub const SMART_INHERITOR: u32 = 60;
    pub const CLASS: u32 = 50;
    pub const PACKAGE: u32 = 40;
}

/// A single completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Text matched against the prefix and inserted by default.
    pub lookup: String,
    /// Text shown in the popup.
    pub display: String,
    /// Grey text after the display: a package, a signature.
    pub tail: Option<String>,
    /// Type shown on the right of the popup.
    pub type_text: Option<String>,
    pub kind: CandidateKind,
    pub rank: u32,
    pub symbol: SymbolKey,
    pub payload: InsertPayload,
}

impl Candidate {
    pub fn new(lookup: impl Into<String>, kind: CandidateKind, symbol: SymbolKey) -> Self {
        let lookup = lookup.into();
        Self {
            display: lookup.clone(),
            lookup,
            tail: None,
            type_text: None,
            kind,
            rank: 0,
            symbol,
            payload: InsertPayload::Identity,
        }
    }

    pub fn keyword(keyword: &str) -> Self {
        let mut candidate = Self::new(
            keyword,
            CandidateKind::Keyword,
            SymbolKey::Keyword(keyword.to_string()),
        );
        candidate.rank = rank::KEYWORD;
        candidate
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    pub fn with_type_text(mut self, type_text: impl Into<String>) -> Self {
        self.type_text = Some(type_text.into());
        self
    }

    pub fn with_payload(mut self, payload: InsertPayload) -> Self {
        self.payload = payload;
        self
    }
}

/// Ordered result of one completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompletionList {
    pub prefix: String,
    pub items: Vec<Candidate>,
    /// Set when the list was cut short by cancellation or `max_results`.
    pub incomplete: bool,
}

impl CompletionList {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.items.iter()
    }

    pub fn lookups(&self) -> Vec<&str> {
        self.items.iter().map(|c| c.lookup.as_str()).collect()
    }

    pub fn find(&self, lookup: &str) -> Option<&Candidate> {
        self.items.iter().find(|c| c.lookup == lookup)
    }
}

impl<'a> IntoIterator for &'a CompletionList {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for CompletionList {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
