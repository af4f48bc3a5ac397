//! Project data model.
//!
//! # Responsibility
//! - Define the project aggregate and the records it owns exclusively.
//! - Keep record-level invariants next to the types they constrain.
//!
//! # Invariants
//! - Nested collections are never shared across projects.
//! - Tasks, documents and claims are addressed by per-project surrogate ids.

pub mod claim;
pub mod document;
pub mod element;
pub mod project;
pub mod task;

pub use claim::{Claim, ClaimId, ClaimIndex, ClaimKey, ClaimStatus, NewClaim, DEFAULT_CLAIM_NOTES};
pub use document::{DocumentCategory, DocumentId, DocumentKey, DocumentRef, NewDocument};
pub use element::{Element, ProgressEntry};
pub use project::{NewProject, Project, ProjectId, ValidationError};
pub use task::{NewTask, Task, TaskId, TaskKey, TaskPriority, TaskStatus};
