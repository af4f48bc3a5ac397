//! JSON file snapshot backend.
//!
//! # Invariants
//! - Saves write and fsync a sibling temp file, then rename it over the
//!   target. Readers never observe a half-written snapshot.
//! - A missing snapshot file loads as `Ok(None)`.

use super::{decode_snapshot, encode_snapshot, SnapshotError, SnapshotResult, SnapshotStore};
use crate::model::Project;
use log::{debug, warn};
use std::ffi::OsString;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("snapshot"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(path: &Path, source: std::io::Error) -> SnapshotError {
        SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "json_file"
    }

    fn load(&self) -> SnapshotResult<Option<Vec<Project>>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    "event=snapshot_load module=snapshot status=absent backend=json_file path={}",
                    self.path.display()
                );
                return Ok(None);
            }
            Err(err) => return Err(Self::io_error(&self.path, err)),
        };
        decode_snapshot(&bytes).map(Some)
    }

    fn save(&mut self, projects: &[Project]) -> SnapshotResult<()> {
        let bytes = encode_snapshot(projects)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| Self::io_error(parent, err))?;
        }

        let temp = self.temp_path();
        write_synced(&temp, &bytes).map_err(|err| Self::io_error(&temp, err))?;
        if let Err(err) = std::fs::rename(&temp, &self.path) {
            if std::fs::remove_file(&temp).is_err() {
                warn!(
                    "event=snapshot_save module=snapshot status=warn backend=json_file reason=temp_cleanup_failed path={}",
                    temp.display()
                );
            }
            return Err(Self::io_error(&self.path, err));
        }
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
