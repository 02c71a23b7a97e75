use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Result of a write-once attempt. Both variants are success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    AlreadyExists(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Written(path) | WriteOutcome::AlreadyExists(path) => path,
        }
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Writes artifacts into one directory, never replacing an existing file.
///
/// An existing target is a finished artifact from an earlier run: the write is
/// reported as [`WriteOutcome::AlreadyExists`] and the bytes on disk are kept.
#[derive(Debug, Clone)]
pub struct FileWriter {
    dir: PathBuf,
}

impl FileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `filename` if it is already present.
    pub fn existing(&self, filename: &str) -> Option<PathBuf> {
        let target = self.dir.join(filename);
        target.is_file().then_some(target)
    }

    pub fn write_new(&self, filename: &str, content: &[u8]) -> Result<WriteOutcome, PersistError> {
        if let Some(path) = self.existing(filename) {
            return Ok(WriteOutcome::AlreadyExists(path));
        }
        fs::create_dir_all(&self.dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;

        let target = self.dir.join(filename);
        let tmp = write_temp(&self.dir, content)?;
        match tmp.persist_noclobber(&target) {
            Ok(_) => Ok(WriteOutcome::Written(target)),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                Ok(WriteOutcome::AlreadyExists(target))
            }
            Err(err) => Err(PersistError::Io(err.error)),
        }
    }
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
/// Replaces an existing file; used for per-run outputs like the manifest.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let tmp = write_temp(&self.dir, content.as_bytes())?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

fn write_temp(dir: &Path, content: &[u8]) -> Result<NamedTempFile, PersistError> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    Ok(tmp)
}
