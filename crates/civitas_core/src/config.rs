//! Store configuration.
//!
//! # Responsibility
//! - Describe which elements new projects track, the claimable value basis,
//!   and where snapshots live.
//! - Load and validate configuration from JSON files.
//!
//! # Invariants
//! - `elements` is non-empty and free of duplicates.
//! - A fixed value basis is finite and non-negative.

use crate::model::{Element, Project};
use crate::snapshot::{
    JsonFileSnapshotStore, MemorySnapshotStore, SnapshotResult, SnapshotStore,
    SqliteSnapshotStore,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Project value used by the dashboard before per-project budgets existed.
pub const DEFAULT_FIXED_BASIS: f64 = 100_000.0;

const DEFAULT_SQLITE_RETAIN: u32 = 20;

/// Value each element's completion percentage is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueBasis {
    /// Same amount for every project.
    Fixed(f64),
    /// The project's own `budget`.
    ProjectBudget,
}

impl ValueBasis {
    pub fn resolve(self, project: &Project) -> f64 {
        match self {
            Self::Fixed(amount) => amount,
            Self::ProjectBudget => project.budget,
        }
    }
}

impl Default for ValueBasis {
    fn default() -> Self {
        Self::Fixed(DEFAULT_FIXED_BASIS)
    }
}

/// Snapshot backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum SnapshotConfig {
    /// Nothing outlives the process.
    #[default]
    Memory,
    JsonFile {
        path: PathBuf,
    },
    Sqlite {
        path: PathBuf,
        #[serde(default = "default_retain")]
        retain: u32,
    },
}

fn default_retain() -> u32 {
    DEFAULT_SQLITE_RETAIN
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Elements every newly registered project starts tracking.
    pub elements: Vec<Element>,
    pub value_basis: ValueBasis,
    pub snapshot: SnapshotConfig,
    /// Falls back to `logging::default_log_level()` when unset.
    pub log_level: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            elements: Element::ALL.to_vec(),
            value_basis: ValueBasis::default(),
            snapshot: SnapshotConfig::default(),
            log_level: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl StoreConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses and validates JSON config text. Missing keys take defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elements.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one element must be tracked".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.elements.iter().find(|element| !seen.insert(**element)) {
            return Err(ConfigError::Invalid(format!(
                "element `{duplicate}` is listed more than once"
            )));
        }
        if let ValueBasis::Fixed(amount) = self.value_basis {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "fixed value basis must be a non-negative amount, got {amount}"
                )));
            }
        }
        if let SnapshotConfig::Sqlite { retain: 0, .. } = self.snapshot {
            return Err(ConfigError::Invalid(
                "sqlite retain must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builds the snapshot backend described by `config`.
pub fn open_backend(config: &SnapshotConfig) -> SnapshotResult<Box<dyn SnapshotStore>> {
    Ok(match config {
        SnapshotConfig::Memory => Box::new(MemorySnapshotStore::new()),
        SnapshotConfig::JsonFile { path } => Box::new(JsonFileSnapshotStore::new(path)),
        SnapshotConfig::Sqlite { path, retain } => {
            Box::new(SqliteSnapshotStore::open(path, *retain)?)
        }
    })
}
