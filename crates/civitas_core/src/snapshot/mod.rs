//! Whole-store snapshot codec and storage backends.
//!
//! # Responsibility
//! - Encode/decode the full project collection as a JSON array.
//! - Define the `SnapshotStore` contract used by `ProjectStore`.
//!
//! # Invariants
//! - Encoding validates every project first; invalid state is never written.
//! - Decoding rejects invalid persisted state instead of masking it.
//! - Absent storage loads as `Ok(None)`, which callers treat as an empty store.
//! - Dates are `YYYY-MM-DD`; timestamps are RFC 3339 in UTC.

mod json_file;
mod memory;
mod sqlite;

pub use json_file::JsonFileSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use sqlite::SqliteSnapshotStore;

use crate::db::DbError;
use crate::model::Project;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Snapshot read/write failure.
#[derive(Debug)]
pub enum SnapshotError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Encode(serde_json::Error),
    Decode(serde_json::Error),
    /// State that cannot be represented or violates a model invariant.
    Invalid(String),
    Db(DbError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "snapshot io failed at `{}`: {source}", path.display())
            }
            Self::Encode(err) => write!(f, "snapshot encode failed: {err}"),
            Self::Decode(err) => write!(f, "snapshot decode failed: {err}"),
            Self::Invalid(message) => write!(f, "invalid snapshot: {message}"),
            Self::Db(err) => write!(f, "snapshot database failed: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) | Self::Decode(err) => Some(err),
            Self::Invalid(_) => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for SnapshotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SnapshotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for whole-store snapshots.
pub trait SnapshotStore {
    /// Short backend name used in log events.
    fn backend_name(&self) -> &'static str;
    /// Returns `Ok(None)` when no snapshot has ever been written.
    fn load(&self) -> SnapshotResult<Option<Vec<Project>>>;
    /// Persists the full collection, replacing the previous snapshot.
    fn save(&mut self, projects: &[Project]) -> SnapshotResult<()>;
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for Box<T> {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn load(&self) -> SnapshotResult<Option<Vec<Project>>> {
        (**self).load()
    }

    fn save(&mut self, projects: &[Project]) -> SnapshotResult<()> {
        (**self).save(projects)
    }
}

/// Serializes the full project collection.
pub fn encode_snapshot(projects: &[Project]) -> SnapshotResult<Vec<u8>> {
    encode_snapshot_text(projects).map(String::into_bytes)
}

/// Parses and validates a snapshot produced by [`encode_snapshot`].
pub fn decode_snapshot(bytes: &[u8]) -> SnapshotResult<Vec<Project>> {
    let projects: Vec<Project> = serde_json::from_slice(bytes).map_err(SnapshotError::Decode)?;
    check_collection(&projects)?;
    Ok(projects)
}

pub(crate) fn encode_snapshot_text(projects: &[Project]) -> SnapshotResult<String> {
    check_collection(projects)?;
    serde_json::to_string_pretty(projects).map_err(SnapshotError::Encode)
}

fn check_collection(projects: &[Project]) -> SnapshotResult<()> {
    let mut ids = HashSet::new();
    for project in projects {
        project
            .validate()
            .map_err(|err| SnapshotError::Invalid(format!("project `{}`: {err}", project.id)))?;
        if !ids.insert(project.id.as_str()) {
            return Err(SnapshotError::Invalid(format!(
                "project id `{}` appears more than once",
                project.id
            )));
        }
    }
    Ok(())
}
