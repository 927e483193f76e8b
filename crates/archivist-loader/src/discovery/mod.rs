//! Enumeration of candidate archive files.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Lists candidate archive files in a directory.
///
/// A missing directory must surface as [`io::ErrorKind::NotFound`]; the
/// loader treats that case as "no plugins" rather than a failure.
pub trait FileEnumerator {
    /// Lists the files in `directory` whose extension is `extension`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while listing the directory.
    fn list_files(&self, directory: &Path, extension: &str) -> io::Result<Vec<PathBuf>>;
}

/// [`FileEnumerator`] backed by [`std::fs::read_dir`].
///
/// Only the top level of the directory is scanned. Extensions compare
/// case-insensitively and results are sorted by path.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileEnumerator;

impl FileEnumerator for StdFileEnumerator {
    fn list_files(&self, directory: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for dir_entry in fs::read_dir(directory)? {
            let entry = dir_entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if has_extension(&path, extension) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests;
