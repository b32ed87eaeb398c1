//! Writes rendered artifacts into the generated-output area.
//!
//! A pass either replaces every changed file or none of them: all files are
//! staged next to their destination as `<file>.tmp` first and only renamed
//! into place once every stage write succeeded. Each replaced file is moved
//! aside to `<file>.bak` before its rename; when a later rename fails, the
//! files already renamed are rolled back from those backups. Files whose
//! contents did not change are left untouched so cargo does not see them as
//! modified.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::emit::render_index;
use crate::error::{Error, Result};
use crate::model::GeneratedArtifact;

/// Outcome of one write pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

struct Pending<'a> {
    group: Option<&'a str>,
    path: PathBuf,
    contents: &'a str,
}

/// Writes every artifact plus the index file into `out_dir`.
#[instrument(skip_all, name = "write", fields(out_dir = %out_dir.display()))]
pub fn write_artifacts(
    out_dir: &Path,
    index_file: &str,
    artifacts: &[GeneratedArtifact],
) -> Result<WriteSummary> {
    if out_dir.as_os_str().is_empty() {
        return Err(Error::emission(
            None,
            out_dir,
            io::Error::new(io::ErrorKind::InvalidInput, "no output directory configured"),
        ));
    }
    fs::create_dir_all(out_dir).map_err(|e| Error::emission(None, out_dir, e))?;

    let index = render_index(artifacts);
    let mut files: Vec<Pending<'_>> = artifacts
        .iter()
        .map(|artifact| Pending {
            group: Some(&artifact.name),
            path: out_dir.join(&artifact.file_name),
            contents: &artifact.contents,
        })
        .collect();
    files.push(Pending {
        group: None,
        path: out_dir.join(index_file),
        contents: &index,
    });

    let mut summary = WriteSummary::default();
    let mut staged: Vec<(&Pending<'_>, PathBuf)> = Vec::new();
    for file in &files {
        if fs::read(&file.path).is_ok_and(|existing| existing == file.contents.as_bytes()) {
            debug!(path = %file.path.display(), "unchanged");
            summary.unchanged.push(file.path.clone());
            continue;
        }
        let tmp = staging_path(&file.path);
        if let Err(e) = fs::write(&tmp, file.contents) {
            discard(&tmp);
            discard_all(&staged);
            return Err(Error::emission(file.group, &tmp, e));
        }
        staged.push((file, tmp));
    }

    let mut committed: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(staged.len());
    for (position, (file, tmp)) in staged.iter().enumerate() {
        match commit(&file.path, tmp) {
            Ok(backup) => committed.push((file.path.as_path(), backup)),
            Err(e) => {
                rollback(&committed);
                discard_all(&staged[position..]);
                return Err(Error::emission(file.group, &file.path, e));
            }
        }
    }

    for (path, backup) in committed {
        if let Some(backup) = backup {
            discard(&backup);
        }
        debug!(path = %path.display(), "written");
        summary.written.push(path.to_path_buf());
    }

    info!(
        written = summary.written.len(),
        unchanged = summary.unchanged.len(),
        "wrote generated files"
    );
    Ok(summary)
}

/// Renames `tmp` onto `path`, moving an existing file at `path` aside first.
/// Returns the backup location, if there was a file to back up.
fn commit(path: &Path, tmp: &Path) -> io::Result<Option<PathBuf>> {
    let backup = if fs::metadata(path).is_ok_and(|meta| meta.is_file()) {
        let backup = sibling(path, ".bak");
        fs::rename(path, &backup)?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = fs::rename(tmp, path) {
        if let Some(backup) = &backup {
            restore(backup, path);
        }
        return Err(e);
    }
    Ok(backup)
}

/// Undoes committed renames, newest first.
fn rollback(committed: &[(&Path, Option<PathBuf>)]) {
    for (path, backup) in committed.iter().rev() {
        match backup {
            Some(backup) => restore(backup, path),
            None => discard(path),
        }
    }
}

fn restore(backup: &Path, path: &Path) {
    if let Err(e) = fs::rename(backup, path) {
        warn!(path = %path.display(), error = %e, "failed to restore previous file");
    }
}

fn staging_path(path: &Path) -> PathBuf {
    sibling(path, ".tmp")
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = OsString::from(path.as_os_str());
    sibling.push(suffix);
    PathBuf::from(sibling)
}

fn discard_all(staged: &[(&Pending<'_>, PathBuf)]) {
    for (_, tmp) in staged {
        discard(tmp);
    }
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "failed to remove file");
    }
}
