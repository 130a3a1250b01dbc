//! Backing file for the document
//!
//! The durable copy of the store is a single JSON file holding the document
//! verbatim. Loading is strict (a file that does not parse, or whose root is
//! not an object or array, is fatal); writing is atomic via temp file and
//! rename.

use cantrip_core::{Error, Result, Value};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Handle to the JSON file backing a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    path: PathBuf,
}

impl DocumentFile {
    /// Wrap a path without touching the filesystem
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DocumentFile { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the temp file used for atomic writes
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Load the document, creating the file with `{}` if it is absent
    ///
    /// # Errors
    ///
    /// [`Error::CorruptDocument`] if the file exists but is not a JSON object
    /// or array; [`Error::Io`] on filesystem failures.
    pub fn open(&self) -> Result<Value> {
        if !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let empty = Value::Object(Default::default());
            self.write(&empty)?;
            info!(path = %self.path.display(), "Created empty document file");
            return Ok(empty);
        }
        self.load()
    }

    /// Load and parse an existing file
    pub fn load(&self) -> Result<Value> {
        let content = fs::read_to_string(&self.path)?;
        let value: Value = serde_json::from_str(&content).map_err(|e| Error::CorruptDocument {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        if !(value.is_object() || value.is_array()) {
            return Err(Error::CorruptDocument {
                path: self.path.clone(),
                reason: "document root must be an object or an array".to_string(),
            });
        }
        debug!(path = %self.path.display(), bytes = content.len(), "Loaded document file");
        Ok(value)
    }

    /// Write the document atomically
    ///
    /// 1. Remove a stale temp file left by an earlier failed write
    /// 2. Write pretty-printed JSON (tab indentation) to the temp file and sync it
    /// 3. Rename the temp file over the target (atomic on POSIX)
    ///
    /// If any step fails, the temp file is cleaned up.
    pub fn write(&self, document: &Value) -> Result<()> {
        let temp_path = self.temp_path();

        if temp_path.exists() {
            warn!(path = %temp_path.display(), "Removing stale temp file");
            let _ = fs::remove_file(&temp_path);
        }

        let bytes = encode_pretty(document)?;
        if let Err(e) = write_synced(&temp_path, &bytes) {
            warn!(
                temp_path = %temp_path.display(),
                error = %e,
                "Write failed, cleaning up temp file"
            );
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            warn!(
                temp_path = %temp_path.display(),
                error = %e,
                "Rename failed, cleaning up temp file"
            );
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "Document written");
        Ok(())
    }
}

fn encode_pretty(document: &Value) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    document.serialize(&mut serializer)?;
    Ok(bytes)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
