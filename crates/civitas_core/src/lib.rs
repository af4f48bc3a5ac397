//! Core domain logic for the Civitas construction dashboard.
//! This crate is the single source of truth for project invariants.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod snapshot;
pub mod store;
pub mod summary;

pub use auth::{AuthError, CredentialVerifier, IdentityGate, PasswordRegistry, Role, Session};
pub use config::{open_backend, ConfigError, SnapshotConfig, StoreConfig, ValueBasis};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::{
    Claim, ClaimId, ClaimIndex, ClaimKey, ClaimStatus, DocumentCategory, DocumentId, DocumentKey,
    DocumentRef, Element, NewClaim, NewDocument, NewProject, NewTask, ProgressEntry, Project,
    ProjectId, Task, TaskId, TaskKey, TaskPriority, TaskStatus, ValidationError,
    DEFAULT_CLAIM_NOTES,
};
pub use snapshot::{
    decode_snapshot, encode_snapshot, JsonFileSnapshotStore, MemorySnapshotStore, SnapshotError,
    SnapshotStore, SqliteSnapshotStore,
};
pub use store::{NotFound, ProjectStore, StoreError, StoreResult};
pub use summary::{ElementClaim, Financials, ProjectSummary, TaskCounts};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
