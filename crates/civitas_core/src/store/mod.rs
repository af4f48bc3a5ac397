//! Project store: the single owner of all project state.
//!
//! # Responsibility
//! - Apply validated mutations to projects and their nested records.
//! - Persist every successful mutation through a `SnapshotStore`.
//! - Serve derived figures computed from current state.
//!
//! # Invariants
//! - A mutation is staged on a copy, persisted, and only then committed to
//!   memory. A failed save leaves memory exactly as it was.
//! - Rejected input never reaches the snapshot backend.
//! - Project ids are unique; task names are unique per project.

pub mod filter;

use crate::config::{ConfigError, StoreConfig};
use crate::model::claim::normalize_notes;
use crate::model::element::is_valid_percent;
use crate::model::project::{require_amount, require_text};
use crate::model::{
    Claim, ClaimId, ClaimIndex, ClaimKey, ClaimStatus, DocumentId, DocumentKey, DocumentRef,
    Element, NewClaim, NewDocument, NewProject, NewTask, Project, ProjectId, ProgressEntry, Task,
    TaskId, TaskKey, TaskStatus, ValidationError,
};
use crate::snapshot::{encode_snapshot, SnapshotError, SnapshotStore};
use crate::summary::{self, Financials, ProjectSummary};
use chrono::Utc;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub use filter::{filter_claims, filter_tasks};

pub type StoreResult<T> = Result<T, StoreError>;

/// Which record a lookup failed to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    Project(ProjectId),
    Task { project: ProjectId, key: TaskKey },
    Claim { project: ProjectId, id: ClaimId },
    Document { project: ProjectId, key: DocumentKey },
}

impl Display for NotFound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project not found: {id}"),
            Self::Task { project, key } => write!(f, "task {key} not found in project {project}"),
            Self::Claim { project, id } => write!(f, "claim #{id} not found in project {project}"),
            Self::Document { project, key } => {
                write!(f, "document {key} not found in project {project}")
            }
        }
    }
}

/// Error returned by every store operation.
#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    NotFound(NotFound),
    /// Claim position outside the claim sequence.
    OutOfRange { index: usize, len: usize },
    Persistence(SnapshotError),
    Config(ConfigError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(err) => write!(f, "{err}"),
            Self::OutOfRange { index, len } => {
                write!(f, "claim index {index} is out of range for {len} claim(s)")
            }
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) | Self::OutOfRange { .. } => None,
            Self::Persistence(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<NotFound> for StoreError {
    fn from(value: NotFound) -> Self {
        Self::NotFound(value)
    }
}

impl From<SnapshotError> for StoreError {
    fn from(value: SnapshotError) -> Self {
        Self::Persistence(value)
    }
}

impl From<ConfigError> for StoreError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// In-memory project collection bound to one snapshot backend.
pub struct ProjectStore<S: SnapshotStore> {
    projects: Vec<Project>,
    config: StoreConfig,
    backend: S,
}

impl<S: SnapshotStore> ProjectStore<S> {
    /// Loads the current snapshot from `backend`.
    ///
    /// Absent storage is the defined empty state, not an error.
    pub fn open(config: StoreConfig, backend: S) -> StoreResult<Self> {
        config.validate()?;
        let started_at = Instant::now();
        let projects = match backend.load() {
            Ok(loaded) => loaded.unwrap_or_default(),
            Err(err) => {
                error!(
                    "event=store_open module=store status=error backend={} error={}",
                    backend.backend_name(),
                    err
                );
                return Err(err.into());
            }
        };
        info!(
            "event=store_open module=store status=ok backend={} project_count={} duration_ms={}",
            backend.backend_name(),
            projects.len(),
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            projects,
            config,
            backend,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// All projects in registration order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == *id)
    }

    /// Replaces in-memory state with the backend's current snapshot.
    pub fn reload(&mut self) -> StoreResult<()> {
        self.projects = self.backend.load()?.unwrap_or_default();
        info!(
            "event=store_reload module=store status=ok backend={} project_count={}",
            self.backend.backend_name(),
            self.projects.len()
        );
        Ok(())
    }

    /// Encodes current state exactly as the backend would store it.
    pub fn snapshot_bytes(&self) -> StoreResult<Vec<u8>> {
        Ok(encode_snapshot(&self.projects)?)
    }

    // ---- projects -------------------------------------------------------

    /// Registers a project tracking the configured elements.
    pub fn create_project(&mut self, input: &NewProject) -> StoreResult<ProjectId> {
        const EVENT: &str = "project_create";
        let started_at = Instant::now();

        let project = Project::register(input, &self.config.elements)
            .map_err(|err| reject(EVENT, input.id.trim(), err.into()))?;
        if self.project(&project.id).is_some() {
            let err = ValidationError::DuplicateProjectId(project.id.clone());
            return Err(reject(EVENT, project.id.as_str(), err.into()));
        }

        let id = project.id.clone();
        self.projects.push(project);
        if let Err(err) = self.backend.save(&self.projects) {
            self.projects.pop();
            return Err(persist_failed(EVENT, id.as_str(), err));
        }
        committed(EVENT, id.as_str(), started_at);
        Ok(id)
    }

    pub fn delete_project(&mut self, id: &ProjectId) -> StoreResult<()> {
        const EVENT: &str = "project_delete";
        let started_at = Instant::now();

        let index = self
            .index_of(id)
            .map_err(|err| reject(EVENT, id.as_str(), err))?;
        let removed = self.projects.remove(index);
        if let Err(err) = self.backend.save(&self.projects) {
            self.projects.insert(index, removed);
            return Err(persist_failed(EVENT, id.as_str(), err));
        }
        committed(EVENT, id.as_str(), started_at);
        Ok(())
    }

    /// Starts tracking an additional element. Elements are never untracked.
    pub fn track_element(&mut self, id: &ProjectId, element: Element) -> StoreResult<()> {
        self.mutate_project("element_track", id, |project| {
            if project.progress_by_element.contains_key(&element) {
                return Err(ValidationError::DuplicateElement(element).into());
            }
            project
                .progress_by_element
                .insert(element, ProgressEntry::unset());
            Ok(())
        })
    }

    // ---- progress -------------------------------------------------------

    /// Sets an element's completion and stamps it with the current time.
    ///
    /// Writing the same percent twice keeps the value; only the stamp moves.
    pub fn update_progress(
        &mut self,
        id: &ProjectId,
        element: Element,
        percent: f64,
    ) -> StoreResult<()> {
        self.mutate_project("progress_update", id, |project| {
            if !is_valid_percent(percent) {
                return Err(ValidationError::PercentOutOfRange(percent).into());
            }
            let entry = project
                .progress_by_element
                .get_mut(&element)
                .ok_or(ValidationError::UnknownElement(element))?;
            entry.record(percent, Utc::now());
            Ok(())
        })
    }

    pub fn compute_overall_progress(&self, id: &ProjectId) -> StoreResult<f64> {
        Ok(summary::overall_progress(self.require(id)?))
    }

    /// Claimable amounts against the configured value basis.
    pub fn compute_financials(&self, id: &ProjectId) -> StoreResult<Financials> {
        let project = self.require(id)?;
        Ok(summary::financials(
            project,
            self.config.value_basis.resolve(project),
        ))
    }

    pub fn summary(&self, id: &ProjectId) -> StoreResult<ProjectSummary> {
        let project = self.require(id)?;
        Ok(summary::summarize(
            project,
            self.config.value_basis.resolve(project),
        ))
    }

    pub fn summaries(&self) -> Vec<ProjectSummary> {
        self.projects
            .iter()
            .map(|project| summary::summarize(project, self.config.value_basis.resolve(project)))
            .collect()
    }

    // ---- tasks ----------------------------------------------------------

    /// Appends a `Pending` task. Fails if the name is already used.
    pub fn add_task(&mut self, id: &ProjectId, input: &NewTask) -> StoreResult<TaskId> {
        self.mutate_project("task_add", id, |project| {
            require_text("task name", &input.name)?;
            let name = input.name.trim();
            if project.has_task_named(name) {
                return Err(ValidationError::DuplicateTaskName(name.to_string()).into());
            }
            let task_id = project.allocate_id()?;
            project.tasks.push(Task {
                id: task_id,
                name: name.to_string(),
                assigned_to: input.assigned_to.trim().to_string(),
                priority: input.priority,
                deadline: input.deadline,
                status: TaskStatus::Pending,
                description: input.description.clone(),
                comments: Vec::new(),
            });
            Ok(task_id)
        })
    }

    pub fn update_task_status(
        &mut self,
        id: &ProjectId,
        key: impl Into<TaskKey>,
        status: TaskStatus,
    ) -> StoreResult<()> {
        let key = key.into();
        self.mutate_project("task_status_update", id, |project| {
            find_task(project, &key)?.status = status;
            Ok(())
        })
    }

    /// Appends a comment; existing comments are never edited.
    pub fn add_task_comment(
        &mut self,
        id: &ProjectId,
        key: impl Into<TaskKey>,
        comment: &str,
    ) -> StoreResult<()> {
        let key = key.into();
        self.mutate_project("task_comment_add", id, |project| {
            require_text("comment", comment)?;
            find_task(project, &key)?
                .comments
                .push(comment.trim().to_string());
            Ok(())
        })
    }

    /// Changes a task's display name, keeping names unique.
    pub fn rename_task(
        &mut self,
        id: &ProjectId,
        key: impl Into<TaskKey>,
        new_name: &str,
    ) -> StoreResult<()> {
        let key = key.into();
        self.mutate_project("task_rename", id, |project| {
            require_text("task name", new_name)?;
            let new_name = new_name.trim();
            let task_id = find_task(project, &key)?.id;
            if project
                .tasks
                .iter()
                .any(|task| task.id != task_id && task.name == new_name)
            {
                return Err(ValidationError::DuplicateTaskName(new_name.to_string()).into());
            }
            find_task(project, &TaskKey::Id(task_id))?.name = new_name.to_string();
            Ok(())
        })
    }

    pub fn remove_task(&mut self, id: &ProjectId, key: impl Into<TaskKey>) -> StoreResult<Task> {
        let key = key.into();
        self.mutate_project("task_remove", id, |project| {
            let position = project
                .tasks
                .iter()
                .position(|task| key.matches(task))
                .ok_or_else(|| task_not_found(project, &key))?;
            Ok(project.tasks.remove(position))
        })
    }

    pub fn filter_tasks(&self, id: &ProjectId, query: &str) -> StoreResult<Vec<&Task>> {
        Ok(filter::filter_tasks(self.require(id)?, query))
    }

    // ---- documents ------------------------------------------------------

    /// Stores an opaque document payload on the project.
    pub fn upload_document(
        &mut self,
        id: &ProjectId,
        input: NewDocument,
    ) -> StoreResult<DocumentId> {
        self.mutate_project("document_upload", id, |project| {
            require_text("document filename", &input.filename)?;
            require_text("document mime type", &input.mime_type)?;
            let document_id = project.allocate_id()?;
            project.documents.push(DocumentRef {
                id: document_id,
                filename: input.filename.trim().to_string(),
                mime_type: input.mime_type.trim().to_string(),
                title: non_blank(input.title),
                description: non_blank(input.description),
                category: input.category,
                content: input.content,
            });
            Ok(document_id)
        })
    }

    pub fn delete_document(
        &mut self,
        id: &ProjectId,
        key: impl Into<DocumentKey>,
    ) -> StoreResult<DocumentRef> {
        let key = key.into();
        self.mutate_project("document_delete", id, |project| {
            let position = project
                .documents
                .iter()
                .position(|document| key.matches(document))
                .ok_or_else(|| NotFound::Document {
                    project: project.id.clone(),
                    key: key.clone(),
                })?;
            Ok(project.documents.remove(position))
        })
    }

    // ---- claims ---------------------------------------------------------

    /// Appends a claim and returns its position in the claim sequence.
    pub fn add_claim(&mut self, id: &ProjectId, input: &NewClaim) -> StoreResult<ClaimIndex> {
        self.mutate_project("claim_add", id, |project| {
            require_amount("claim amount", input.amount)?;
            let claim_id = project.allocate_id()?;
            project.interim_claims.push(Claim {
                id: claim_id,
                amount: input.amount,
                status: input.status,
                payment_schedule: input.payment_schedule,
                notes: normalize_notes(input.notes.as_deref()),
            });
            Ok(project.interim_claims.len() - 1)
        })
    }

    /// Sets a claim's status and, when `new_notes` is given, its notes.
    ///
    /// Blank notes are stored as the default notes text.
    pub fn update_claim(
        &mut self,
        id: &ProjectId,
        key: ClaimKey,
        new_status: ClaimStatus,
        new_notes: Option<&str>,
    ) -> StoreResult<()> {
        self.mutate_project("claim_update", id, |project| {
            let claim = find_claim(project, key)?;
            claim.status = new_status;
            if let Some(notes) = new_notes {
                claim.notes = normalize_notes(Some(notes));
            }
            Ok(())
        })
    }

    pub fn remove_claim(&mut self, id: &ProjectId, claim_id: ClaimId) -> StoreResult<Claim> {
        self.mutate_project("claim_remove", id, |project| {
            let position = project
                .interim_claims
                .iter()
                .position(|claim| claim.id == claim_id)
                .ok_or_else(|| NotFound::Claim {
                    project: project.id.clone(),
                    id: claim_id,
                })?;
            Ok(project.interim_claims.remove(position))
        })
    }

    pub fn filter_claims(&self, id: &ProjectId, query: &str) -> StoreResult<Vec<&Claim>> {
        Ok(filter::filter_claims(self.require(id)?, query))
    }

    // ---- internals ------------------------------------------------------

    fn index_of(&self, id: &ProjectId) -> StoreResult<usize> {
        self.projects
            .iter()
            .position(|project| project.id == *id)
            .ok_or_else(|| NotFound::Project(id.clone()).into())
    }

    fn require(&self, id: &ProjectId) -> StoreResult<&Project> {
        self.project(id)
            .ok_or_else(|| NotFound::Project(id.clone()).into())
    }

    /// Stages `apply` on a copy of one project, persists, then commits.
    fn mutate_project<T>(
        &mut self,
        event: &'static str,
        id: &ProjectId,
        apply: impl FnOnce(&mut Project) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let index = self
            .index_of(id)
            .map_err(|err| reject(event, id.as_str(), err))?;

        let mut staged = self.projects[index].clone();
        let output = apply(&mut staged)
            .and_then(|output| {
                staged.validate()?;
                Ok(output)
            })
            .map_err(|err| reject(event, id.as_str(), err))?;

        let previous = std::mem::replace(&mut self.projects[index], staged);
        if let Err(err) = self.backend.save(&self.projects) {
            self.projects[index] = previous;
            return Err(persist_failed(event, id.as_str(), err));
        }
        committed(event, id.as_str(), started_at);
        Ok(output)
    }
}

fn find_task<'a>(project: &'a mut Project, key: &TaskKey) -> StoreResult<&'a mut Task> {
    let missing = task_not_found(project, key);
    project
        .tasks
        .iter_mut()
        .find(|task| key.matches(task))
        .ok_or_else(|| missing.into())
}

fn task_not_found(project: &Project, key: &TaskKey) -> NotFound {
    NotFound::Task {
        project: project.id.clone(),
        key: key.clone(),
    }
}

fn find_claim(project: &mut Project, key: ClaimKey) -> StoreResult<&mut Claim> {
    let len = project.interim_claims.len();
    let project_id = project.id.clone();
    match key {
        ClaimKey::Index(index) => project
            .interim_claims
            .get_mut(index)
            .ok_or(StoreError::OutOfRange { index, len }),
        ClaimKey::Id(claim_id) => project
            .interim_claims
            .iter_mut()
            .find(|claim| claim.id == claim_id)
            .ok_or_else(|| {
                NotFound::Claim {
                    project: project_id,
                    id: claim_id,
                }
                .into()
            }),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn reject(event: &'static str, project_id: &str, err: StoreError) -> StoreError {
    warn!("event={event} module=store status=rejected project_id={project_id} error={err}");
    err
}

fn persist_failed(event: &'static str, project_id: &str, err: SnapshotError) -> StoreError {
    error!(
        "event={event} module=store status=error project_id={project_id} error_code=snapshot_save_failed error={err}"
    );
    StoreError::Persistence(err)
}

fn committed(event: &'static str, project_id: &str, started_at: Instant) {
    info!(
        "event={event} module=store status=ok project_id={project_id} duration_ms={}",
        started_at.elapsed().as_millis()
    );
}
