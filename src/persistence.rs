// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Where registry snapshots live.
//!
//! The registry only sees the [`SnapshotStore`] contract.  Two stores are
//! provided: an in-memory one holding raw JSON (handy for tests and for
//! hosts that keep their own storage) and a JSON file on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::registry::RegistrySnapshot;

/// Load/save contract for registry state.
pub trait SnapshotStore {
    /// The stored snapshot, or `None` if nothing has been saved yet.
    ///
    /// Malformed content is reported as
    /// [`CorruptSnapshot`](crate::GeochronError::CorruptSnapshot).
    fn load(&self) -> Result<Option<RegistrySnapshot>>;

    /// Replace the stored snapshot.
    fn save(&mut self, snapshot: &RegistrySnapshot) -> Result<()>;
}

// ── in memory ─────────────────────────────────────────────────────────────

/// Keeps the snapshot as a JSON string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    raw: Option<String>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with arbitrary (possibly invalid) JSON.
    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            raw: Some(json.into()),
        }
    }

    /// The stored JSON, if any.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<RegistrySnapshot>> {
        self.raw
            .as_deref()
            .map(RegistrySnapshot::from_json)
            .transpose()
    }

    fn save(&mut self, snapshot: &RegistrySnapshot) -> Result<()> {
        self.raw = Some(snapshot.to_json()?);
        Ok(())
    }
}

// ── on disk ───────────────────────────────────────────────────────────────

/// A JSON file.  A missing file reads as "nothing saved".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// A store backed by `path`; the file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<RegistrySnapshot>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %self.path.display(), "loading registry snapshot");
        RegistrySnapshot::from_json(&text).map(Some)
    }

    fn save(&mut self, snapshot: &RegistrySnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, snapshot.to_json()?)?;
        debug!(path = %self.path.display(), clocks = snapshot.clocks.len(), "registry snapshot saved");
        Ok(())
    }
}
