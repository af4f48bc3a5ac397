//! SQLite snapshot backend.
//!
//! Each save inserts one row holding the encoded snapshot and prunes rows
//! beyond the retention window, inside a single transaction.

use super::{decode_snapshot, encode_snapshot_text, SnapshotResult, SnapshotStore};
use crate::db::{open_db, open_db_in_memory};
use crate::model::Project;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteSnapshotStore {
    conn: Connection,
    retain: u32,
}

impl SqliteSnapshotStore {
    /// Opens (or creates) a snapshot database keeping the newest `retain` rows.
    pub fn open(path: impl AsRef<Path>, retain: u32) -> SnapshotResult<Self> {
        Ok(Self::from_connection(open_db(path)?, retain))
    }

    pub fn open_in_memory(retain: u32) -> SnapshotResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?, retain))
    }

    /// Wraps an already migrated connection. `retain` is raised to at least 1.
    pub fn from_connection(conn: Connection, retain: u32) -> Self {
        Self {
            conn,
            retain: retain.max(1),
        }
    }

    /// Number of snapshot rows currently kept.
    pub fn snapshot_count(&self) -> SnapshotResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM snapshots;", [], |row| row.get::<_, i64>(0))?;
        Ok(count)
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn load(&self) -> SnapshotResult<Option<Vec<Project>>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM snapshots ORDER BY seq DESC LIMIT 1;",
                [],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|text| decode_snapshot(text.as_bytes())).transpose()
    }

    fn save(&mut self, projects: &[Project]) -> SnapshotResult<()> {
        let body = encode_snapshot_text(projects)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO snapshots (saved_at, project_count, body) VALUES (?1, ?2, ?3);",
            params![Utc::now().timestamp_millis(), projects.len() as i64, body],
        )?;
        tx.execute(
            "DELETE FROM snapshots
             WHERE seq NOT IN (
                SELECT seq FROM snapshots ORDER BY seq DESC LIMIT ?1
             );",
            [i64::from(self.retain)],
        )?;
        tx.commit()?;
        Ok(())
    }
}
