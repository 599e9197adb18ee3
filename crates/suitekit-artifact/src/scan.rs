//! Folder scanning for testcase and API definition files
//!
//! Collects every `.json`, `.yaml` and `.yml` file under one or more roots.
//! Within a directory its own files come first, sorted by name, followed by
//! its subdirectories in name order.

use crate::error::{ArtifactError, ArtifactResult};
use indexmap::IndexSet;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Extensions collected by the scanner, matched case-sensitively
pub const SCANNED_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// List artifact files under `root`
///
/// A missing root yields an empty list. With `recursive == false` only the
/// root's immediate files are returned.
///
/// # Errors
/// `ArtifactError::Io` if a directory cannot be read during the walk.
pub fn load_folder_files(root: impl AsRef<Path>, recursive: bool) -> ArtifactResult<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(files_before_dirs);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            ArtifactError::io_error(path, source)
        })?;

        let path = entry.path();
        if path.is_file() && is_scanned(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// List artifact files under several roots, visiting each distinct root once
///
/// # Errors
/// See [`load_folder_files`].
pub fn load_folders_files<I, P>(roots: I, recursive: bool) -> ArtifactResult<Vec<PathBuf>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let unique: IndexSet<PathBuf> = roots
        .into_iter()
        .map(|p| p.as_ref().to_path_buf())
        .collect();

    let mut files = Vec::new();
    for root in unique {
        files.extend(load_folder_files(&root, recursive)?);
    }
    Ok(files)
}

fn is_scanned(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCANNED_EXTENSIONS.contains(&ext))
}

fn files_before_dirs(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.path().is_dir();
    let b_dir = b.path().is_dir();
    a_dir
        .cmp(&b_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}
