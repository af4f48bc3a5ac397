//! Project aggregate and its validation rules.
//!
//! # Responsibility
//! - Own every nested collection of one construction project.
//! - Allocate surrogate ids for tasks, documents and claims.
//! - Re-check all record invariants on demand (`Project::validate`).
//!
//! # Invariants
//! - `end_date >= start_date`.
//! - Monetary amounts are finite and never negative.
//! - Task names are unique within a project.
//! - Child ids are unique, come from `next_seq`, and are never reused.

use super::claim::Claim;
use super::document::DocumentRef;
use super::element::{is_valid_percent, Element, ProgressEntry};
use super::task::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-supplied project identifier (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Builds an id from caller input, trimming surrounding whitespace.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField("id"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Field-level validation failures for model records.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field is empty after trimming.
    EmptyField(&'static str),
    EndBeforeStart {
        start: NaiveDate,
        end: NaiveDate,
    },
    NegativeAmount {
        field: &'static str,
        value: f64,
    },
    PercentOutOfRange(f64),
    /// Element is not tracked by the project.
    UnknownElement(Element),
    DuplicateElement(Element),
    DuplicateProjectId(ProjectId),
    DuplicateTaskName(String),
    /// Persisted or staged state that breaks a structural invariant.
    InvalidState(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::EndBeforeStart { start, end } => {
                write!(f, "end date {end} is before start date {start}")
            }
            Self::NegativeAmount { field, value } => {
                write!(f, "{field} must be a non-negative amount, got {value}")
            }
            Self::PercentOutOfRange(value) => {
                write!(f, "completion percent must be within 0..=100, got {value}")
            }
            Self::UnknownElement(element) => {
                write!(f, "element `{element}` is not tracked by this project")
            }
            Self::DuplicateElement(element) => {
                write!(f, "element `{element}` is already tracked")
            }
            Self::DuplicateProjectId(id) => write!(f, "project id `{id}` already exists"),
            Self::DuplicateTaskName(name) => {
                write!(f, "task name `{name}` already exists in this project")
            }
            Self::InvalidState(message) => write!(f, "invalid project state: {message}"),
        }
    }
}

impl Error for ValidationError {}

/// Caller input for `create_project`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub id: String,
    pub name: String,
    pub client: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
}

/// A registered construction project and everything it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub client: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub progress_by_element: BTreeMap<Element, ProgressEntry>,
    /// Insertion order is display order.
    pub tasks: Vec<Task>,
    pub documents: Vec<DocumentRef>,
    pub interim_claims: Vec<Claim>,
    /// Next surrogate id handed to a task, document or claim.
    pub next_seq: u64,
}

impl Project {
    /// Builds a validated project tracking `elements`, all unset.
    pub fn register(input: &NewProject, elements: &[Element]) -> Result<Self, ValidationError> {
        let id = ProjectId::parse(&input.id)?;
        let project = Self {
            id,
            name: input.name.trim().to_string(),
            client: input.client.trim().to_string(),
            description: input.description.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            budget: input.budget,
            progress_by_element: elements
                .iter()
                .map(|element| (*element, ProgressEntry::unset()))
                .collect(),
            tasks: Vec::new(),
            documents: Vec::new(),
            interim_claims: Vec::new(),
            next_seq: 1,
        };
        project.validate()?;
        Ok(project)
    }

    /// Hands out the next surrogate id for a child record.
    pub(crate) fn allocate_id(&mut self) -> Result<u64, ValidationError> {
        let id = self.next_seq;
        self.next_seq = id.checked_add(1).ok_or_else(|| {
            ValidationError::InvalidState(format!(
                "project {} has no child ids left to allocate",
                self.id
            ))
        })?;
        Ok(id)
    }

    /// Elements tracked by this project in canonical order.
    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.progress_by_element.keys().copied()
    }

    pub fn has_task_named(&self, name: &str) -> bool {
        let name = name.trim();
        self.tasks.iter().any(|task| task.name == name)
    }

    /// Checks every record invariant of the project and its children.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.as_str().trim().is_empty() || self.id.as_str().trim() != self.id.as_str() {
            return Err(ValidationError::EmptyField("id"));
        }
        require_text("name", &self.name)?;
        require_text("client", &self.client)?;
        if self.end_date < self.start_date {
            return Err(ValidationError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        require_amount("budget", self.budget)?;

        for (element, entry) in &self.progress_by_element {
            if !is_valid_percent(entry.completion_percent) {
                return Err(ValidationError::PercentOutOfRange(entry.completion_percent));
            }
            if entry.last_updated.is_none() && entry.completion_percent != 0.0 {
                return Err(ValidationError::InvalidState(format!(
                    "element `{element}` has progress but no update stamp"
                )));
            }
        }

        let mut child_ids = HashSet::new();
        let mut task_names = HashSet::new();
        for task in &self.tasks {
            require_text("task name", &task.name)?;
            if !task_names.insert(task.name.as_str()) {
                return Err(ValidationError::DuplicateTaskName(task.name.clone()));
            }
            self.check_child_id("task", task.id, &mut child_ids)?;
        }
        for document in &self.documents {
            require_text("document filename", &document.filename)?;
            require_text("document mime type", &document.mime_type)?;
            self.check_child_id("document", document.id, &mut child_ids)?;
        }
        for claim in &self.interim_claims {
            require_amount("claim amount", claim.amount)?;
            require_text("claim notes", &claim.notes)?;
            self.check_child_id("claim", claim.id, &mut child_ids)?;
        }

        Ok(())
    }

    fn check_child_id(
        &self,
        kind: &str,
        id: u64,
        seen: &mut HashSet<u64>,
    ) -> Result<(), ValidationError> {
        if id == 0 || id >= self.next_seq {
            return Err(ValidationError::InvalidState(format!(
                "{kind} id {id} was not allocated by this project (next_seq={})",
                self.next_seq
            )));
        }
        if !seen.insert(id) {
            return Err(ValidationError::InvalidState(format!(
                "{kind} id {id} is used more than once"
            )));
        }
        Ok(())
    }
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

pub(crate) fn require_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::NegativeAmount { field, value });
    }
    Ok(())
}
