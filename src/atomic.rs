use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Replaces the file at `path` with `contents`.
///
/// The bytes go to a `.tmp` sibling first and are renamed into place, so a
/// reader sees either the old file or the new one. Missing parent
/// directories are created.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = temp_path(path);
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)
}

pub fn temp_path(path: &Path) -> PathBuf {
    path.with_extension("tmp")
}
