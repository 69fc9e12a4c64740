//! Application state for the web layer.

use std::sync::Arc;

use tracing::warn;

use crate::matching::Matcher;
use crate::store::{MemoryStore, SnapshotFile};

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Matcher over the shared store and lock registry
    pub matcher: Matcher<MemoryStore>,

    /// Where to write a snapshot after each change, if anywhere
    pub snapshot: Option<Arc<SnapshotFile>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(matcher: Matcher<MemoryStore>, snapshot: Option<SnapshotFile>) -> Self {
        Self {
            matcher,
            snapshot: snapshot.map(Arc::new),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        self.matcher.store()
    }

    /// Write the current store to the snapshot file.
    ///
    /// Failures are logged, not returned: the in-memory change has already
    /// happened and the next successful save catches up.
    pub fn save_snapshot(&self) {
        let Some(file) = &self.snapshot else {
            return;
        };
        let result = self
            .store()
            .snapshot()
            .and_then(|snapshot| file.save(&snapshot));
        if let Err(e) = result {
            warn!(path = %file.path().display(), error = %e, "failed to save snapshot");
        }
    }
}
