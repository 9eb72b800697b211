use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{Result, TuneGraphError};
use crate::result_line::{format_line, parse_line};
use crate::types::{ResolvedRecord, ResultFormat};

/// Append-only store of result lines.
///
/// On open, every existing line is read back to recover the idempotency keys
/// already written, so a resumed run can skip those records.
pub struct ResultStore {
    path: PathBuf,
    format: ResultFormat,
    written: HashSet<String>,
    /// The file ends in a partial line that must be terminated before appending.
    needs_newline: bool,
}

impl ResultStore {
    /// Opens the store at `path`, creating an empty file if none exists.
    pub fn open(path: &Path, format: ResultFormat) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| storage_error(parent, "failed to create directory", e))?;
            }
        }

        let mut written = HashSet::new();
        let mut needs_newline = false;

        if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(|e| storage_error(path, "failed to read result store", e))?;
            for (idx, line) in contents.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(line) {
                    Some(record) => {
                        written.insert(record.key);
                    }
                    None => warn!(
                        path = %path.display(),
                        line = idx + 1,
                        "unreadable line in result store"
                    ),
                }
            }
            needs_newline = !contents.is_empty() && !contents.ends_with('\n');
        } else {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| storage_error(path, "failed to create result store", e))?;
        }

        debug!(path = %path.display(), existing = written.len(), "opened result store");

        Ok(Self {
            path: path.to_path_buf(),
            format,
            written,
            needs_newline,
        })
    }

    /// Returns `true` if a line with this idempotency key has been written.
    pub fn contains(&self, key: &str) -> bool {
        self.written.contains(key)
    }

    /// Number of distinct keys in the store.
    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ResultFormat {
        self.format
    }

    /// Opens the file for appending one batch. The file is closed when the
    /// returned writer is finished or dropped.
    pub fn begin_batch(&mut self) -> Result<BatchWriter<'_>> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| storage_error(&self.path, "failed to open result store", e))?;

        if self.needs_newline {
            file.write_all(b"\n")
                .map_err(|e| storage_error(&self.path, "failed to append to result store", e))?;
            self.needs_newline = false;
        }

        Ok(BatchWriter {
            file,
            path: &self.path,
            format: self.format,
            written: &mut self.written,
            appended: 0,
        })
    }
}

/// Scoped append handle for one batch.
pub struct BatchWriter<'s> {
    file: File,
    path: &'s Path,
    format: ResultFormat,
    written: &'s mut HashSet<String>,
    appended: usize,
}

impl BatchWriter<'_> {
    /// Appends one complete line and flushes it to the file immediately.
    pub fn append(&mut self, record: &ResolvedRecord) -> Result<()> {
        let mut line = format_line(record, self.format)?;
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|e| storage_error(self.path, "failed to append to result store", e))?;
        self.written.insert(record.key.clone());
        self.appended += 1;
        Ok(())
    }

    /// Syncs the batch to disk and closes the file, returning the number of
    /// lines appended.
    pub fn finish(self) -> Result<usize> {
        self.file
            .sync_data()
            .map_err(|e| storage_error(self.path, "failed to sync result store", e))?;
        Ok(self.appended)
    }
}

fn storage_error(path: &Path, what: &str, e: std::io::Error) -> TuneGraphError {
    TuneGraphError::Storage {
        message: format!("{what}: {e}"),
        path: path.display().to_string(),
    }
}
