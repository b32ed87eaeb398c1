//! Records handed from one pipeline stage to the next.
//!
//! Everything here is plain owned data (no `syn` trees), so records can move
//! across worker threads and are never mutated after the stage that built
//! them completes.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

/// Position of a declaration in its compilation unit (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location referring to a whole file rather than a declaration in it.
    pub fn file(file: impl Into<PathBuf>) -> Self {
        Self::new(file, 0, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file.display())
        } else {
            write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
        }
    }
}

/// Kind of a declared generic parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GenericKind {
    Type,
    Lifetime,
    Const { ty: String },
}

/// A generic parameter declared on an annotated struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenericParam {
    /// Name as written (`T`, `'a`, `N`).
    pub name: String,
    pub kind: GenericKind,
    /// Bounds as written, including those folded in from the where clause
    /// and from the impl block declaring the constructor.
    pub bounds: Vec<String>,
    /// Bounds with every generic parameter renamed to its position, so
    /// definitions that spell their parameters differently compare equal.
    #[serde(skip)]
    pub canonical_bounds: BTreeSet<String>,
}

impl GenericParam {
    /// Declaration form, e.g. `T: Number + Copy` or `const N: usize`.
    pub fn declaration(&self) -> String {
        match &self.kind {
            GenericKind::Const { ty } => format!("const {}: {}", self.name, ty),
            GenericKind::Type | GenericKind::Lifetime if self.bounds.is_empty() => {
                self.name.clone()
            }
            GenericKind::Type | GenericKind::Lifetime => {
                format!("{}: {}", self.name, self.bounds.join(" + "))
            }
        }
    }

    /// Whether any argument satisfying `self` also satisfies `other`.
    ///
    /// Bounds are compared syntactically: `other` may only require bounds
    /// that `self` requires too.
    pub fn admits(&self, other: &GenericParam) -> bool {
        match (&self.kind, &other.kind) {
            (GenericKind::Type, GenericKind::Type)
            | (GenericKind::Lifetime, GenericKind::Lifetime) => {
                other.canonical_bounds.is_subset(&self.canonical_bounds)
            }
            (GenericKind::Const { ty: a }, GenericKind::Const { ty: b }) => a == b,
            _ => false,
        }
    }
}

/// Shape of one constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParamShape {
    /// A concrete type; `canonical` has generic parameters renamed by position.
    Concrete {
        ty: String,
        #[serde(skip)]
        canonical: String,
    },
    /// Exactly one of the struct's generic type parameters.
    Generic { position: usize, ty: String },
}

/// One constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorParam {
    pub name: String,
    pub shape: ParamShape,
}

impl ConstructorParam {
    /// Type as written, using the struct's generic parameter names.
    pub fn ty(&self) -> &str {
        match &self.shape {
            ParamShape::Concrete { ty, .. } | ParamShape::Generic { ty, .. } => ty,
        }
    }
}

/// A property the definition exposes: an exported named field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub name: String,
    pub ty: String,
    /// Initializer the constructor assigns, when it builds `Self { .. }`.
    pub value: Option<String>,
}

/// One scanned declaration carrying the merge attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedDefinition {
    /// Logical group key.
    pub name: String,
    pub priority: i64,
    /// Absolute Rust path of the annotated struct, e.g. `crate::flavor::Widget`.
    pub type_path: String,
    pub constructor: String,
    pub constructor_shape: Vec<ConstructorParam>,
    pub generics: Vec<GenericParam>,
    /// Where-clause predicates (struct or constructor impl) that are not
    /// plain `T: Bound` bounds.
    pub where_predicates: Vec<String>,
    pub overridden_properties: IndexMap<String, Property>,
    pub source_location: SourceLocation,
}

/// All definitions sharing one logical name.
///
/// Built by [`crate::group`]; never empty and free of duplicate priorities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionGroup {
    name: String,
    members: Vec<AnnotatedDefinition>,
}

impl DefinitionGroup {
    pub(crate) fn new(name: String, members: Vec<AnnotatedDefinition>) -> Self {
        debug_assert!(!members.is_empty());
        Self { name, members }
    }

    pub(crate) fn into_parts(self) -> (String, Vec<AnnotatedDefinition>) {
        (self.name, self.members)
    }
}

/// Outcome of resolving one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDefinition {
    pub name: String,
    /// Every member, highest priority first. The first entry is the winner.
    pub chain: Vec<AnnotatedDefinition>,
}

impl ResolvedDefinition {
    pub fn winner(&self) -> &AnnotatedDefinition {
        &self.chain[0]
    }
}

/// Rendered forwarding declaration for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub name: String,
    pub file_name: String,
    #[serde(skip)]
    pub contents: String,
}
