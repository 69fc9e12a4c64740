//! Disk snapshots of the in-memory store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Ride, RideRequest};

use super::error::StoreError;

/// Full contents of a store at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    pub requests: Vec<RideRequest>,
    pub rides: Vec<Ride>,
    /// Highest request id handed out so far.
    pub next_request_id: u64,
    /// Highest ride id handed out so far.
    pub next_ride_id: u64,
}

/// A JSON snapshot file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the snapshot.
    ///
    /// Returns `Ok(None)` if the file does not exist yet; a file that exists
    /// but cannot be parsed is an error rather than silently discarded.
    pub fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Snapshot {
                    message: format!("failed to read {}: {}", self.path.display(), e),
                });
            }
        };

        let snapshot = serde_json::from_str(&contents).map_err(|e| StoreError::Snapshot {
            message: format!("failed to parse {}: {}", self.path.display(), e),
        })?;

        Ok(Some(snapshot))
    }

    /// Write the snapshot.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Snapshot {
                message: format!("failed to create snapshot directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::Snapshot {
            message: format!("failed to serialize snapshot: {}", e),
        })?;

        std::fs::write(&self.path, json).map_err(|e| StoreError::Snapshot {
            message: format!("failed to write snapshot file: {}", e),
        })?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, NewRideRequest, RiderId};
    use crate::store::{MemoryStore, RequestStore};
    use tempfile::tempdir;

    fn populated_store() -> MemoryStore {
        let store = MemoryStore::new();
        for rider in 1..=3 {
            store
                .insert_request(NewRideRequest::new(
                    RiderId(rider),
                    Coordinate::new(40.72, -73.80),
                    Coordinate::new(40.64, -73.78),
                ))
                .unwrap();
        }
        store
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("absent.json"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("store.json"));
        let snapshot = populated_store().snapshot().unwrap();

        file.save(&snapshot).unwrap();
        let loaded = file.load().unwrap().unwrap();

        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("store.json");
        let file = SnapshotFile::new(&path);

        file.save(&populated_store().snapshot().unwrap()).unwrap();

        assert!(path.exists());
        assert_eq!(file.path(), path.as_path());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json {{{").unwrap();

        let err = SnapshotFile::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Snapshot { .. }));
    }
}
