//! Interim claim records owned by a project.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Surrogate claim id, unique within the owning project.
pub type ClaimId = u64;

/// Position of a claim in its project's claim sequence.
pub type ClaimIndex = usize;

/// Notes stored when a claim is submitted without any.
pub const DEFAULT_CLAIM_NOTES: &str = "No notes provided";

/// Claim approval state. Transitions are unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// A billing request submitted against project progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    /// Non-negative amount in project currency.
    pub amount: f64,
    pub status: ClaimStatus,
    pub payment_schedule: NaiveDate,
    pub notes: String,
}

/// Caller input for `add_claim`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClaim {
    pub amount: f64,
    pub status: ClaimStatus,
    pub payment_schedule: NaiveDate,
    /// Blank or missing notes are stored as [`DEFAULT_CLAIM_NOTES`].
    pub notes: Option<String>,
}

/// Lookup key for a claim inside one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKey {
    /// Current position; shifts when earlier claims are removed.
    Index(ClaimIndex),
    Id(ClaimId),
}

/// Resolves optional caller notes to the stored value.
pub(crate) fn normalize_notes(notes: Option<&str>) -> String {
    match notes.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => DEFAULT_CLAIM_NOTES.to_string(),
    }
}
