//! In-process snapshot backend.

use super::{decode_snapshot, encode_snapshot, SnapshotResult, SnapshotStore};
use crate::model::Project;

/// Keeps the latest encoded snapshot in memory.
///
/// Goes through the same codec as the on-disk backends, so a session without
/// persistence still enforces the snapshot invariants.
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshotStore {
    bytes: Option<Vec<u8>>,
    saves: usize,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing encoded snapshot.
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes),
            saves: 0,
        }
    }

    /// Latest encoded snapshot, if any save happened.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// Number of successful saves since construction.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> SnapshotResult<Option<Vec<Project>>> {
        self.bytes.as_deref().map(decode_snapshot).transpose()
    }

    fn save(&mut self, projects: &[Project]) -> SnapshotResult<()> {
        self.bytes = Some(encode_snapshot(projects)?);
        self.saves += 1;
        Ok(())
    }
}
