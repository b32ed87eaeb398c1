//! Generation errors.
//!
//! Every error is fatal to the whole generation pass: the generated
//! artifacts are consumed by a separate compilation step, so emitting some
//! of them while skipping a broken group would only move the failure
//! somewhere harder to read.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::model::SourceLocation;

/// Pipeline result type
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal generation errors
#[derive(Debug, Error)]
pub enum Error {
    /// A declaration carries the merge attribute but cannot be forwarded to.
    #[error("scan error at {location}: {defect}")]
    Scan {
        location: SourceLocation,
        defect: ScanDefect,
    },

    /// Two definitions in one group share a priority.
    #[error("duplicate priority {priority} in group `{name}`: {first} and {second}")]
    DuplicatePriority {
        name: String,
        priority: i64,
        first: SourceLocation,
        second: SourceLocation,
    },

    /// Two definitions in one group have incompatible constructor shapes.
    #[error(
        "signature mismatch in group `{name}`: {mismatch} (winner at {winner}, offending definition at {offending})"
    )]
    SignatureMismatch {
        name: String,
        winner: SourceLocation,
        offending: SourceLocation,
        mismatch: ShapeMismatch,
    },

    /// Resolved output could not be written to the generated-output area.
    #[error("failed to emit {}: {source}", path.display())]
    Emission {
        group: Option<String>,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error category, as reported to the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Scan,
    DuplicatePriority,
    SignatureMismatch,
    Emission,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Scan => "scan",
            ErrorKind::DuplicatePriority => "duplicate-priority",
            ErrorKind::SignatureMismatch => "signature-mismatch",
            ErrorKind::Emission => "emission",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub(crate) fn scan(location: SourceLocation, defect: ScanDefect) -> Self {
        Error::Scan { location, defect }
    }

    pub(crate) fn emission(group: Option<&str>, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Emission {
            group: group.map(str::to_string),
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Scan { .. } => ErrorKind::Scan,
            Error::DuplicatePriority { .. } => ErrorKind::DuplicatePriority,
            Error::SignatureMismatch { .. } => ErrorKind::SignatureMismatch,
            Error::Emission { .. } => ErrorKind::Emission,
        }
    }

    /// Logical name of the offending group, when the failing stage knows it.
    pub fn group(&self) -> Option<&str> {
        match self {
            Error::Scan { .. } => None,
            Error::DuplicatePriority { name, .. } | Error::SignatureMismatch { name, .. } => {
                Some(name)
            }
            Error::Emission { group, .. } => group.as_deref(),
        }
    }

    /// Source locations of the offending declarations.
    pub fn locations(&self) -> Vec<&SourceLocation> {
        match self {
            Error::Scan { location, .. } => vec![location],
            Error::DuplicatePriority { first, second, .. } => vec![first, second],
            Error::SignatureMismatch {
                winner, offending, ..
            } => vec![winner, offending],
            Error::Emission { .. } => Vec::new(),
        }
    }
}

/// Why an annotated declaration cannot be scanned into a definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanDefect {
    #[error("cannot read source: {0}")]
    Unreadable(String),

    #[error("cannot parse source: {0}")]
    Syntax(String),

    #[error("invalid `#[{attribute}]` arguments: {message}")]
    InvalidAttribute { attribute: String, message: String },

    #[error("`#[{attribute}]` appears more than once on `{ty}`")]
    RepeatedAttribute { attribute: String, ty: String },

    #[error("`#[{attribute}]` can only be applied to structs, found {item}")]
    NotAStruct { attribute: String, item: String },

    #[error("`{ty}` must be declared `pub` or `pub(crate)` to be forwarded to")]
    PrivateType { ty: String },

    #[error("`{ty}` is a tuple struct; positional fields cannot be forwarded as properties")]
    TupleStruct { ty: String },

    #[error("`{ty}` has no non-private `{constructor}` constructor in an inherent impl of the same module")]
    MissingConstructor { ty: String, constructor: String },

    #[error("`{ty}::{constructor}` is declared in more than one impl block")]
    AmbiguousConstructor { ty: String, constructor: String },

    #[error("`{ty}::{constructor}` takes `self` and cannot construct the type")]
    ConstructorReceiver { ty: String, constructor: String },

    #[error("`{ty}::{constructor}` is async")]
    AsyncConstructor { ty: String, constructor: String },

    #[error("`{ty}::{constructor}` declares its own generic parameters")]
    GenericConstructor { ty: String, constructor: String },

    #[error("`{ty}::{constructor}` must return `Self`")]
    ConstructorReturn { ty: String, constructor: String },

    #[error("the impl declaring `{ty}::{constructor}` does not cover every instantiation of `{ty}`")]
    ImplNotGeneric { ty: String, constructor: String },

    #[error("parameter {index} of `{ty}::{constructor}` must bind a plain identifier")]
    PatternParameter {
        ty: String,
        constructor: String,
        index: usize,
    },

    #[error("parameter {index} of `{ty}::{constructor}` mentions `Self`")]
    SelfParameter {
        ty: String,
        constructor: String,
        index: usize,
    },

    #[error("property `{property}` of `{ty}` collides with a generated accessor")]
    ReservedProperty { ty: String, property: String },

    #[error("`{name}` names both this crate-root struct and the forwarding type generated next to it")]
    NameCollision { name: String },
}

/// First structural divergence between a group member and the winner.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ShapeMismatch {
    #[error("constructor takes {found} parameter(s) but the winning definition takes {expected}")]
    ParameterCount { expected: usize, found: usize },

    #[error("parameter {index}: `{found}` is not assignable to `{expected}`")]
    Parameter {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("declares {found} generic parameter(s) but the winning definition declares {expected}")]
    GenericCount { expected: usize, found: usize },

    #[error("generic parameter {index}: `{found}` is not compatible with `{expected}`")]
    GenericParameter {
        index: usize,
        expected: String,
        found: String,
    },
}
