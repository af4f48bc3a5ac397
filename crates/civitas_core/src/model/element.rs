//! Building elements and per-element progress entries.
//!
//! # Responsibility
//! - Name the construction phases tracked for completion.
//! - Hold the completion record written by progress updates.
//!
//! # Invariants
//! - `completion_percent` stays within `0..=100`.
//! - `last_updated` is set iff `completion_percent` was written at least once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A construction phase tracked independently for completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Foundation,
    Substructure,
    Superstructure,
    Finishes,
    Roofing,
    ElectricalWork,
}

impl Element {
    /// Every known element in canonical display order.
    pub const ALL: [Element; 6] = [
        Element::Foundation,
        Element::Substructure,
        Element::Superstructure,
        Element::Finishes,
        Element::Roofing,
        Element::ElectricalWork,
    ];

    /// Human-readable label used by dashboards and filters.
    pub fn label(self) -> &'static str {
        match self {
            Self::Foundation => "Foundation",
            Self::Substructure => "Substructure",
            Self::Superstructure => "Superstructure",
            Self::Finishes => "Finishes",
            Self::Roofing => "Roofing",
            Self::ElectricalWork => "Electrical Work",
        }
    }

    /// Parses a label or serialized name, ignoring case and separators.
    ///
    /// `"Electrical Work"`, `"electrical_work"` and `"ELECTRICAL-WORK"` all
    /// resolve to [`Element::ElectricalWork`].
    pub fn parse(value: &str) -> Option<Element> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| !matches!(*ch, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        Self::ALL.into_iter().find(|element| {
            element
                .label()
                .chars()
                .filter(|ch| *ch != ' ')
                .flat_map(char::to_lowercase)
                .eq(normalized.chars())
        })
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Completion record for one element of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Percent complete, `0.0..=100.0`.
    pub completion_percent: f64,
    /// `None` means "never updated".
    pub last_updated: Option<DateTime<Utc>>,
}

impl ProgressEntry {
    /// Entry for an element that has never been reported on.
    pub fn unset() -> Self {
        Self {
            completion_percent: 0.0,
            last_updated: None,
        }
    }

    /// Returns whether a progress update has ever been recorded.
    pub fn is_set(&self) -> bool {
        self.last_updated.is_some()
    }

    /// Records a new completion value stamped with `at`.
    pub(crate) fn record(&mut self, percent: f64, at: DateTime<Utc>) {
        self.completion_percent = percent;
        self.last_updated = Some(at);
    }
}

impl Default for ProgressEntry {
    fn default() -> Self {
        Self::unset()
    }
}

/// Returns whether `percent` is a finite value inside `0..=100`.
pub fn is_valid_percent(percent: f64) -> bool {
    percent.is_finite() && (0.0..=100.0).contains(&percent)
}
