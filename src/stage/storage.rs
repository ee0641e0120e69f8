//! File-backed storage stage
//!
//! The innermost stage. Its contract is text: a payload must be valid
//! UTF-8 or the write is rejected before the disk is touched.
//!
//! Writes are atomic:
//! 1. Write to a uniquely named temp file next to the target
//! 2. fsync the temp file
//! 3. Rename temp over the target
//!
//! A failed write leaves the previous contents untouched.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::errors::{StageError, StageResult};
use super::{Stage, StageKind};
use crate::observability::Logger;

/// Persists payloads verbatim to a single file
#[derive(Debug)]
pub struct StorageStage {
    path: PathBuf,
}

impl StorageStage {
    /// Create a storage stage backed by `path`. Nothing is opened until the
    /// first `write` or `read`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "stackfile".to_string());
        let temp_name = format!(".{}.{}.tmp", name, Uuid::new_v4().simple());
        match self.path.parent() {
            Some(parent) => parent.join(temp_name),
            None => PathBuf::from(temp_name),
        }
    }

    fn path_details(&self) -> String {
        format!("path: {}", self.path.display())
    }

    fn write_temp(temp_path: &Path, payload: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp_path)?;
        file.write_all(payload)?;
        file.sync_all()
    }
}

impl Stage for StorageStage {
    fn write(&self, payload: &[u8]) -> StageResult<()> {
        if let Err(e) = std::str::from_utf8(payload) {
            return Err(StageError::io_rejected(format!(
                "payload is not valid text at byte {}",
                e.valid_up_to()
            ))
            .with_details(self.path_details()));
        }

        let temp_path = self.temp_path();
        if let Err(e) = Self::write_temp(&temp_path, payload) {
            let _ = fs::remove_file(&temp_path);
            return Err(
                StageError::io_failure("failed to write temp file", e)
                    .with_details(self.path_details()),
            );
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(
                StageError::io_failure("failed to replace backing file", e)
                    .with_details(self.path_details()),
            );
        }

        // fsync the directory so the rename is durable
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Logger::trace(
            "STORAGE_WRITE",
            &[
                ("bytes", payload.len().to_string().as_str()),
                ("path", self.path.display().to_string().as_str()),
            ],
        );
        Ok(())
    }

    fn read(&self) -> StageResult<Vec<u8>> {
        let data = fs::read(&self.path).map_err(|e| {
            let message = if e.kind() == io::ErrorKind::NotFound {
                "backing file does not exist"
            } else {
                "failed to read backing file"
            };
            StageError::io_failure(message, e).with_details(self.path_details())
        })?;

        Logger::trace(
            "STORAGE_READ",
            &[
                ("bytes", data.len().to_string().as_str()),
                ("path", self.path.display().to_string().as_str()),
            ],
        );
        Ok(data)
    }

    fn kind(&self) -> StageKind {
        StageKind::Storage
    }

    fn inner(&self) -> Option<&dyn Stage> {
        None
    }
}
