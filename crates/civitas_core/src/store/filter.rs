//! Read-only search over a project's tasks and claims.

use crate::model::{Claim, Project, Task};

/// Tasks whose name contains `query`, ignoring case, in display order.
///
/// A blank query matches every task.
pub fn filter_tasks<'a>(project: &'a Project, query: &str) -> Vec<&'a Task> {
    let needle = query.trim().to_lowercase();
    project
        .tasks
        .iter()
        .filter(|task| task.name.to_lowercase().contains(&needle))
        .collect()
}

/// Claims whose notes or status label contain `query`, ignoring case.
pub fn filter_claims<'a>(project: &'a Project, query: &str) -> Vec<&'a Claim> {
    let needle = query.trim().to_lowercase();
    project
        .interim_claims
        .iter()
        .filter(|claim| {
            claim.notes.to_lowercase().contains(&needle)
                || claim.status.label().to_lowercase().contains(&needle)
        })
        .collect()
}
