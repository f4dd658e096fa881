//! Reads `.dsy` files from disk into [`SourceFile`]s.

use std::path::Path;

use thiserror::Error;

use crate::base::{constants, FileId, FileTable};
use crate::syntax::source_file::SourceFile;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: expected .{ext} extension", ext = constants::SOURCE_EXTENSION)]
    WrongExtension { path: String },
}

pub fn validate_extension(path: &Path) -> Result<(), LoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext == constants::SOURCE_EXTENSION => Ok(()),
        _ => Err(LoadError::WrongExtension {
            path: path.display().to_string(),
        }),
    }
}

/// Read one `.dsy` file and normalize it into a [`SourceFile`].
pub fn load(files: &mut FileTable, path: &Path) -> Result<SourceFile, LoadError> {
    validate_extension(path)?;
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let id = files.intern(path);
    Ok(SourceFile::new(id, &raw))
}

/// Recursively collect every `.dsy` file under `root`, depth-first, in a
/// stable order (directory entries are sorted before recursing).
pub fn collect_dsy_files(root: &Path) -> std::io::Result<Vec<std::path::PathBuf>> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut entries: Vec<_> = std::fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .collect();
        entries.sort_by_key(|e| e.path());
        for entry in entries {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some(constants::SOURCE_EXTENSION)
            {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

pub fn file_path<'a>(files: &'a FileTable, id: FileId) -> &'a Path {
    files.path(id)
}
