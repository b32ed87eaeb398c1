//! Compilation units and source-root discovery.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::SourceRoot;
use crate::error::{Error, Result, ScanDefect};
use crate::model::SourceLocation;

/// One source file and the module path it is mounted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub path: PathBuf,
    /// Module path segments, e.g. `["crate", "flavor"]`.
    pub module_path: Vec<String>,
    pub source: String,
}

impl CompilationUnit {
    pub fn new(path: impl Into<PathBuf>, module: &str, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            module_path: split_module(module),
            source: source.into(),
        }
    }
}

pub(crate) fn split_module(module: &str) -> Vec<String> {
    module
        .split("::")
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads every `.rs` file under the given roots.
///
/// Files are returned sorted by path so that scanning is deterministic. A
/// file reachable from two overlapping roots is read once, under the first
/// root that reaches it.
pub fn discover(roots: &[SourceRoot]) -> Result<Vec<CompilationUnit>> {
    let mut units = Vec::new();
    let mut seen = HashSet::new();

    for root in roots {
        let base = split_module(&root.module);
        for (path, module_path) in root_files(&root.path, &base)? {
            if !seen.insert(path.clone()) {
                warn!(path = %path.display(), "file reached from more than one source root");
                continue;
            }
            let source = fs::read_to_string(&path).map_err(|e| {
                Error::scan(
                    SourceLocation::file(&path),
                    ScanDefect::Unreadable(e.to_string()),
                )
            })?;
            debug!(path = %path.display(), module = %module_path.join("::"), "compilation unit");
            units.push(CompilationUnit {
                path,
                module_path,
                source,
            });
        }
    }

    units.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(units)
}

fn root_files(root: &Path, base: &[String]) -> Result<Vec<(PathBuf, Vec<String>)>> {
    let unreadable = |message: String| {
        Error::scan(SourceLocation::file(root), ScanDefect::Unreadable(message))
    };

    if root.is_file() {
        return Ok(vec![(root.to_path_buf(), base.to_vec())]);
    }
    if !root.is_dir() {
        return Err(unreadable("source root does not exist".to_string()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| unreadable(format!("directory traversal error: {}", e)))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        files.push((path.to_path_buf(), module_for(relative, base)));
    }
    Ok(files)
}

/// Module path of a file relative to its source root.
///
/// `lib.rs`, `main.rs` and `mod.rs` at the root map to the root module;
/// `mod.rs` elsewhere maps to its directory; any other file adds its stem.
fn module_for(relative: &Path, base: &[String]) -> Vec<String> {
    let mut module = base.to_vec();
    let components: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let Some((file, dirs)) = components.split_last() else {
        return module;
    };
    module.extend(dirs.iter().cloned());

    let stem = file.trim_end_matches(".rs");
    let is_root_file = dirs.is_empty() && matches!(stem, "lib" | "main");
    if stem != "mod" && !is_root_file {
        module.push(stem.to_string());
    }
    module
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(relative: &str) -> String {
        module_for(Path::new(relative), &split_module("crate")).join("::")
    }

    #[test]
    fn test_root_files_map_to_root_module() {
        assert_eq!(module("lib.rs"), "crate");
        assert_eq!(module("main.rs"), "crate");
        assert_eq!(module("mod.rs"), "crate");
    }

    #[test]
    fn test_nested_files_extend_module() {
        assert_eq!(module("flavor.rs"), "crate::flavor");
        assert_eq!(module("flavor/mod.rs"), "crate::flavor");
        assert_eq!(module("flavor/widgets.rs"), "crate::flavor::widgets");
        assert_eq!(module("flavor/lib.rs"), "crate::flavor::lib");
    }

    #[test]
    fn test_discover_sorts_and_mounts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("flavor")).unwrap();
        fs::write(dir.path().join("lib.rs"), "pub mod flavor;").unwrap();
        fs::write(dir.path().join("flavor/mod.rs"), "pub struct A;").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let roots = vec![SourceRoot::new(dir.path(), "crate")];
        let units = discover(&roots).unwrap();

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].module_path, vec!["crate", "flavor"]);
        assert_eq!(units[1].module_path, vec!["crate"]);
    }

    #[test]
    fn test_overlapping_roots_read_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("flavor")).unwrap();
        fs::write(dir.path().join("flavor/mod.rs"), "pub struct A;").unwrap();

        let roots = vec![
            SourceRoot::new(dir.path().join("flavor"), "crate::flavor"),
            SourceRoot::new(dir.path(), "crate"),
        ];
        let units = discover(&roots).unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].module_path, vec!["crate", "flavor"]);
    }

    #[test]
    fn test_missing_root_is_scan_error() {
        let dir = tempfile::tempdir().unwrap();
        let roots = vec![SourceRoot::new(dir.path().join("absent"), "crate")];
        let err = discover(&roots).unwrap_err();
        assert!(matches!(
            err,
            Error::Scan {
                defect: ScanDefect::Unreadable(_),
                ..
            }
        ));
    }
}
