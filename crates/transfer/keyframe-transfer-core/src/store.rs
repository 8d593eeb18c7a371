//! Persistence ports for the single current snapshot document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use crate::data::Snapshot;
use crate::error::{Result, TransferError};
use crate::stored_snapshot::{parse_snapshot_json, snapshot_to_json};

/// Holds at most one snapshot; every save replaces the previous one.
pub trait SnapshotStore {
    /// Persist `snapshot`, overwriting any previous document. Empty or structurally
    /// invalid snapshots are refused and the previous document is kept.
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// The current snapshot, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<Snapshot>>;
}

fn ensure_savable(snapshot: &Snapshot) -> Result<()> {
    if snapshot.is_empty() {
        return Err(TransferError::EmptySnapshot);
    }
    snapshot
        .validate_basic()
        .map_err(TransferError::invalid_snapshot)
}

/// Snapshot document at a fixed path on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        ensure_savable(snapshot)?;
        let text = snapshot_to_json(snapshot)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, text)?;
        debug!("saved snapshot to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        parse_snapshot_json(&text).map(Some)
    }
}

/// In-process store. Keeps the serialized document so loads go through the codec.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw document text, if any.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn clear(&mut self) {
        self.document = None;
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        ensure_savable(snapshot)?;
        self.document = Some(snapshot_to_json(snapshot)?);
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        self.document
            .as_deref()
            .map(parse_snapshot_json)
            .transpose()
    }
}
