//! Generator configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attribute::DEFAULT_ATTRIBUTE;

/// Default constructor name looked up on annotated structs.
pub const DEFAULT_CONSTRUCTOR: &str = "new";

/// Default name of the index file listing every generated artifact.
pub const DEFAULT_INDEX_FILE: &str = "variant_merge.rs";

/// A directory (or single file) scanned as part of one variant source set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRoot {
    pub path: PathBuf,
    /// Module the root is mounted at, e.g. `crate` or `crate::flavor`.
    pub module: String,
}

impl SourceRoot {
    pub fn new(path: impl Into<PathBuf>, module: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            module: module.into(),
        }
    }
}

/// Parses `DIR` or `DIR=MODULE`; the module defaults to `crate`.
impl FromStr for SourceRoot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, module) = match s.split_once('=') {
            Some((path, module)) => (path, module),
            None => (s, "crate"),
        };
        if path.is_empty() {
            return Err(format!("source root `{}` has an empty path", s));
        }
        if module.is_empty() || module.split("::").any(|segment| segment.trim().is_empty()) {
            return Err(format!("source root `{}` has an invalid module path", s));
        }
        Ok(SourceRoot::new(path, module))
    }
}

impl fmt::Display for SourceRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.path.display(), self.module)
    }
}

/// Scanner settings derived from [`GeneratorConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Attribute name, matched against the last segment of the attribute path.
    pub attribute: String,
    pub constructor: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            constructor: DEFAULT_CONSTRUCTOR.to_string(),
        }
    }
}

/// Configuration for one generation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Source roots visible to this build.
    pub roots: Vec<SourceRoot>,

    /// Generated-output area. Empty means "not configured"; build scripts
    /// fill it from `OUT_DIR`.
    pub out_dir: PathBuf,

    /// Merge attribute name
    pub attribute: String,

    /// Constructor name
    pub constructor: String,

    /// Index file name, written next to the artifacts
    pub index_file: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            out_dir: PathBuf::new(),
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            constructor: DEFAULT_CONSTRUCTOR.to_string(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            ..Self::default()
        }
    }

    pub fn root(mut self, path: impl Into<PathBuf>, module: impl Into<String>) -> Self {
        self.roots.push(SourceRoot::new(path, module));
        self
    }

    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    pub fn constructor(mut self, constructor: impl Into<String>) -> Self {
        self.constructor = constructor.into();
        self
    }

    pub fn index_file(mut self, index_file: impl Into<String>) -> Self {
        self.index_file = index_file.into();
        self
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            attribute: self.attribute.clone(),
            constructor: self.constructor.clone(),
        }
    }
}
