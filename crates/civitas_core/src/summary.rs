//! Derived project figures.
//!
//! Everything here is a pure function of current project state. Results are
//! recomputed on every call and never written back into the model.

use crate::model::{ClaimStatus, Element, Project, ProjectId, TaskStatus};

/// Claimable amount attributed to one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementClaim {
    pub element: Element,
    pub completion_percent: f64,
    pub claimable: f64,
}

/// Per-element claimable amounts and their sum.
#[derive(Debug, Clone, PartialEq)]
pub struct Financials {
    /// Value every element's completion is applied to.
    pub basis: f64,
    pub per_element: Vec<ElementClaim>,
    pub total_claimable: f64,
}

impl Financials {
    pub fn claimable_for(&self, element: Element) -> Option<f64> {
        self.per_element
            .iter()
            .find(|item| item.element == element)
            .map(|item| item.claimable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

/// Dashboard numbers for one project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub project_id: ProjectId,
    pub name: String,
    pub overall_progress: f64,
    pub total_claimable: f64,
    pub remaining_budget: f64,
    pub task_counts: TaskCounts,
    pub claim_count: usize,
}

/// Unweighted mean completion across the project's tracked elements.
///
/// Returns `0.0` for a project that tracks no elements.
pub fn overall_progress(project: &Project) -> f64 {
    let count = project.progress_by_element.len();
    if count == 0 {
        return 0.0;
    }
    let sum: f64 = project
        .progress_by_element
        .values()
        .map(|entry| entry.completion_percent)
        .sum();
    sum / count as f64
}

/// `claimable = completion_percent / 100 * basis` for every tracked element.
pub fn financials(project: &Project, basis: f64) -> Financials {
    let per_element: Vec<ElementClaim> = project
        .progress_by_element
        .iter()
        .map(|(element, entry)| ElementClaim {
            element: *element,
            completion_percent: entry.completion_percent,
            claimable: entry.completion_percent / 100.0 * basis,
        })
        .collect();
    let total_claimable = per_element.iter().map(|item| item.claimable).sum();

    Financials {
        basis,
        per_element,
        total_claimable,
    }
}

/// Budget left after approved claims. Negative when over-claimed.
pub fn remaining_budget(project: &Project) -> f64 {
    let approved: f64 = project
        .interim_claims
        .iter()
        .filter(|claim| claim.status == ClaimStatus::Approved)
        .map(|claim| claim.amount)
        .sum();
    project.budget - approved
}

pub fn task_counts(project: &Project) -> TaskCounts {
    project
        .tasks
        .iter()
        .fold(TaskCounts::default(), |mut counts, task| {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
            }
            counts
        })
}

pub fn summarize(project: &Project, basis: f64) -> ProjectSummary {
    ProjectSummary {
        project_id: project.id.clone(),
        name: project.name.clone(),
        overall_progress: overall_progress(project),
        total_claimable: financials(project, basis).total_claimable,
        remaining_budget: remaining_budget(project),
        task_counts: task_counts(project),
        claim_count: project.interim_claims.len(),
    }
}
