//! Library class model and the reference [`SymbolResolver`] built on it.
//!
//! A [`ClassIndex`] holds compiled classes (the JDK, the Groovy runtime, a
//! project's dependencies) as plain data loaded from JSON. A
//! [`FileResolver`] layers the declarations of the file being edited on top
//! of an index and answers the resolver queries the strategies make.
//!
//! [`SymbolResolver`]: crate::resolve::SymbolResolver

mod file;

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GrooveError;
use crate::item::{ClassRef, TypeRef};

pub use file::FileResolver;

const BUNDLED_INDEX: &str = include_str!("../../data/jdk.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
    Trait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstructorInfo {
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub params: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub params: Vec<TypeRef>,
    #[serde(default, rename = "returns")]
    pub ret: Option<TypeRef>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

/// Everything the engine knows about one class.
///
/// An empty `constructors` list means the class has the implicit public
/// no-argument constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    #[serde(rename = "fqn")]
    pub class: ClassRef,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Only meaningful for nested classes.
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Superclass and implemented interfaces.
    #[serde(default)]
    pub supers: Vec<ClassRef>,
    #[serde(default)]
    pub constructors: Vec<ConstructorInfo>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    pub fn new(class: ClassRef, kind: ClassKind) -> Self {
        Self {
            class,
            kind,
            visibility: Visibility::Public,
            is_abstract: false,
            is_static: false,
            supers: Vec::new(),
            constructors: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(
            self.kind,
            ClassKind::Interface | ClassKind::Annotation | ClassKind::Trait
        )
    }

    /// Whether `new` can create an instance of exactly this class.
    pub fn is_concrete(&self) -> bool {
        self.kind == ClassKind::Class && !self.is_abstract
    }

    /// A non-static nested class: instances need an enclosing instance.
    pub fn is_inner(&self) -> bool {
        self.class.is_nested() && self.kind == ClassKind::Class && !self.is_static
    }

    pub fn has_required_constructor_args(&self) -> bool {
        self.constructors.iter().any(|c| !c.params.is_empty())
    }

    /// Supertypes, with `java.lang.Object` standing in for a class that
    /// names none.
    pub fn supertypes(&self) -> impl Iterator<Item = ClassRef> + '_ {
        let implicit = (self.supers.is_empty() && self.class.fqn() != OBJECT_FQN)
            .then(|| ClassRef::parse(OBJECT_FQN));
        self.supers.iter().cloned().chain(implicit)
    }
}

pub(crate) const OBJECT_FQN: &str = "java.lang.Object";

#[derive(Debug, Deserialize)]
struct IndexFile {
    classes: Vec<ClassInfo>,
}

/// In-memory library class model, keyed by fully qualified name.
#[derive(Debug, Default)]
pub struct ClassIndex {
    classes: FxHashMap<String, ClassInfo>,
    /// Top-level classes by package.
    by_package: FxHashMap<String, Vec<String>>,
    /// Nested classes by outer class.
    nested: FxHashMap<String, Vec<String>>,
    /// Direct subtypes by supertype.
    subtypes: FxHashMap<String, Vec<String>>,
    packages: FxHashSet<String>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The index shipped with the engine: core JDK and Groovy classes.
    pub fn bundled() -> Self {
        match Self::from_json(BUNDLED_INDEX) {
            Ok(index) => index,
            Err(e) => {
                warn!("bundled class index is invalid: {e}");
                Self::default()
            }
        }
    }

    /// Parse an index from `{"classes": [...]}` JSON.
    pub fn from_json(text: &str) -> Result<Self, GrooveError> {
        let file: IndexFile = serde_json::from_str(text)?;
        Ok(Self::from_classes(file.classes))
    }

    pub fn from_file(path: &Path) -> Result<Self, GrooveError> {
        let text = std::fs::read_to_string(path).map_err(|e| GrooveError::io(path, e))?;
        let index = Self::from_json(&text)?;
        debug!(path = %path.display(), classes = index.len(), "loaded class index");
        Ok(index)
    }

    pub fn from_classes(classes: impl IntoIterator<Item = ClassInfo>) -> Self {
        let mut index = Self::default();
        index.extend(classes);
        index
    }

    /// Add classes, replacing any already indexed under the same name.
    pub fn extend(&mut self, classes: impl IntoIterator<Item = ClassInfo>) {
        for info in classes {
            let fqn = info.class.fqn();
            if let Some(old) = self.classes.remove(&fqn) {
                self.unlink(&old);
            }
            self.link(&info);
            self.classes.insert(fqn, info);
        }
    }

    /// Merge another index into this one.
    pub fn merge(&mut self, other: ClassIndex) {
        self.extend(other.classes.into_values());
    }

    fn link(&mut self, info: &ClassInfo) {
        let fqn = info.class.fqn();
        match info.class.outer() {
            Some(outer) => self.nested.entry(outer.fqn()).or_default().push(fqn.clone()),
            None => self
                .by_package
                .entry(info.class.package.clone())
                .or_default()
                .push(fqn.clone()),
        }
        for sup in info.supertypes() {
            self.subtypes.entry(sup.fqn()).or_default().push(fqn.clone());
        }
        let mut package = info.class.package.as_str();
        while !package.is_empty() && self.packages.insert(package.to_string()) {
            package = package.rsplit_once('.').map_or("", |(parent, _)| parent);
        }
    }

    fn unlink(&mut self, info: &ClassInfo) {
        let fqn = info.class.fqn();
        let lists = match info.class.outer() {
            Some(outer) => self.nested.get_mut(&outer.fqn()),
            None => self.by_package.get_mut(&info.class.package),
        };
        if let Some(list) = lists {
            list.retain(|c| *c != fqn);
        }
        for sup in info.supertypes() {
            if let Some(list) = self.subtypes.get_mut(&sup.fqn()) {
                list.retain(|c| *c != fqn);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, fqn: &str) -> Option<&ClassInfo> {
        self.classes.get(fqn)
    }

    pub fn class(&self, class: &ClassRef) -> Option<&ClassInfo> {
        self.classes.get(&class.fqn())
    }

    pub fn contains(&self, class: &ClassRef) -> bool {
        self.classes.contains_key(&class.fqn())
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.packages.contains(package)
    }

    /// Top-level classes of `package`, in no particular order.
    pub fn classes_in<'a>(&'a self, package: &str) -> impl Iterator<Item = &'a ClassInfo> + 'a {
        self.by_package
            .get(package)
            .into_iter()
            .flatten()
            .filter_map(|fqn| self.classes.get(fqn))
    }

    /// Direct child packages of `package`, sorted.
    pub fn subpackages(&self, package: &str) -> Vec<String> {
        let mut children: Vec<String> = self
            .packages
            .iter()
            .filter(|p| match p.rsplit_once('.') {
                Some((parent, _)) => parent == package,
                None => package.is_empty(),
            })
            .cloned()
            .collect();
        children.sort();
        children
    }

    pub fn nested_classes<'a>(&'a self, outer: &ClassRef) -> impl Iterator<Item = &'a ClassInfo> + 'a {
        self.nested
            .get(&outer.fqn())
            .into_iter()
            .flatten()
            .filter_map(|fqn| self.classes.get(fqn))
    }

    /// Direct subclasses and implementors of `class`.
    pub fn direct_subtypes<'a>(&'a self, class: &ClassRef) -> impl Iterator<Item = &'a ClassInfo> + 'a {
        self.subtypes
            .get(&class.fqn())
            .into_iter()
            .flatten()
            .filter_map(|fqn| self.classes.get(fqn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "classes": [
            { "fqn": "java.lang.Object" },
            { "fqn": "java.util.List", "kind": "interface" },
            { "fqn": "java.util.AbstractList", "abstract": true, "supers": ["java.util.List"] },
            { "fqn": "java.util.ArrayList", "supers": ["java.util.AbstractList"],
              "constructors": [{ "params": [] }, { "params": ["int"] }] },
            { "fqn": "java.util.Map.Entry", "kind": "interface", "static": true }
        ]
    }"#;

    #[test]
    fn load_from_json() {
        let index = ClassIndex::from_json(SAMPLE).unwrap();
        assert_eq!(index.len(), 5);
        let list = index.get("java.util.ArrayList").unwrap();
        assert!(list.is_concrete());
        assert!(list.has_required_constructor_args());
        assert!(index.has_package("java"));
        assert!(index.has_package("java.util"));
        assert_eq!(index.subpackages("java"), vec!["java.lang", "java.util"]);
    }

    #[test]
    fn subtype_links() {
        let index = ClassIndex::from_json(SAMPLE).unwrap();
        let subs: Vec<String> = index
            .direct_subtypes(&ClassRef::parse("java.util.List"))
            .map(|c| c.class.fqn())
            .collect();
        assert_eq!(subs, vec!["java.util.AbstractList"]);
        // Classes without supertypes hang off Object.
        assert!(index
            .direct_subtypes(&ClassRef::parse("java.lang.Object"))
            .any(|c| c.class.name == "List"));
    }

    #[test]
    fn nested_classes_are_not_top_level() {
        let index = ClassIndex::from_json(SAMPLE).unwrap();
        assert!(!index.classes_in("java.util").any(|c| c.class.name == "Map.Entry"));
        let nested: Vec<_> = index
            .nested_classes(&ClassRef::parse("java.util.Map"))
            .map(|c| c.class.short_name().to_string())
            .collect();
        assert_eq!(nested, vec!["Entry"]);
    }

    #[test]
    fn extend_replaces_existing_class() {
        let mut index = ClassIndex::from_json(SAMPLE).unwrap();
        let mut replacement = ClassInfo::new(ClassRef::parse("java.util.ArrayList"), ClassKind::Class);
        replacement.supers = vec![ClassRef::parse("java.util.List")];
        index.extend([replacement]);
        assert_eq!(index.len(), 5);
        assert!(!index
            .direct_subtypes(&ClassRef::parse("java.util.AbstractList"))
            .any(|c| c.class.name == "ArrayList"));
        assert!(index
            .direct_subtypes(&ClassRef::parse("java.util.List"))
            .any(|c| c.class.name == "ArrayList"));
    }

    #[test]
    fn bundled_index_loads() {
        let index = ClassIndex::bundled();
        assert!(index.get("java.util.ArrayList").is_some());
        assert!(index.get("groovy.lang.Closure").is_some());
    }

    #[test]
    fn invalid_json_is_an_index_error() {
        let err = ClassIndex::from_json("{").unwrap_err();
        assert!(matches!(err, GrooveError::Index(_)));
    }
}
