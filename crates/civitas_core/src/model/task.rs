//! Task records owned by a project.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Surrogate task id, unique within the owning project.
pub type TaskId = u64;

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Task workflow state.
///
/// Transitions are unrestricted: any state may be set from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Initial state for new tasks.
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

/// A unit of site work tracked on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Stable id; survives renames and removal of sibling tasks.
    pub id: TaskId,
    /// Unique within the project (case-sensitive after trimming).
    pub name: String,
    pub assigned_to: String,
    pub priority: TaskPriority,
    pub deadline: NaiveDate,
    pub status: TaskStatus,
    pub description: String,
    /// Append-only.
    pub comments: Vec<String>,
}

/// Caller input for `add_task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub assigned_to: String,
    pub priority: TaskPriority,
    pub deadline: NaiveDate,
    pub description: String,
}

/// Lookup key for a task inside one project.
///
/// `Name` keeps the dashboard's name-based addressing working; `Id` is the
/// stable handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKey {
    Id(TaskId),
    Name(String),
}

impl TaskKey {
    pub(crate) fn matches(&self, task: &Task) -> bool {
        match self {
            Self::Id(id) => task.id == *id,
            Self::Name(name) => task.name == name.trim(),
        }
    }
}

impl Display for TaskKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Name(name) => write!(f, "`{name}`"),
        }
    }
}

impl From<TaskId> for TaskKey {
    fn from(value: TaskId) -> Self {
        Self::Id(value)
    }
}

impl From<&str> for TaskKey {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for TaskKey {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}
