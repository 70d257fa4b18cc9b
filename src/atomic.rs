//! Write-temp-then-rename helpers
//!
//! Concurrent runs must observe either the previous or the complete new state
//! of a record or a downloaded file, never a partial one. Install directories
//! are never renamed over each other: every install gets its own directory and
//! the record write switches between them.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically replace `path` with `contents`
pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = parent_dir(path);
    fs::create_dir_all(&parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a fresh directory `<parent>/<prefix><random>` for a new install
///
/// The directory is removed when dropped. A finished install keeps it with
/// [`tempfile::TempDir::keep`]; it only becomes visible to other runs once an
/// install record pointing into it has been written with [`write_file`].
pub fn staging_dir(parent: &Path, prefix: &str) -> io::Result<tempfile::TempDir> {
    fs::create_dir_all(parent)?;
    tempfile::Builder::new().prefix(prefix).tempdir_in(parent)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
