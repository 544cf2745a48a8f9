use serde::{Deserialize, Serialize};

use crate::model::Assignment;

/// Why a booking cannot proceed. One normalized taxonomy — callers render
/// `message` verbatim and branch on `kind` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConflictKind {
    /// Temporal/schedule ineligibility: no period, closed day, outside hours, break.
    Period,
    /// Insufficient fungible capacity on a resource pool.
    Resource,
    /// Unexpected resolution failure, e.g. a rate naming an unknown resource.
    Capacity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub message: String,
}

impl Conflict {
    pub fn period(message: impl Into<String>) -> Self {
        Self { kind: ConflictKind::Period, message: message.into() }
    }

    pub fn resource(message: impl Into<String>) -> Self {
        Self { kind: ConflictKind::Resource, message: message.into() }
    }

    pub fn capacity(message: impl Into<String>) -> Self {
        Self { kind: ConflictKind::Capacity, message: message.into() }
    }
}

/// Outcome of one availability check. Boolean, never partial: either the
/// whole request fits (with its proposed assignments) or it does not (with
/// every conflict found).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub is_available: bool,
    pub conflicts: Vec<Conflict>,
    pub assignments: Vec<Assignment>,
}

impl AvailabilityResult {
    pub fn available(assignments: Vec<Assignment>) -> Self {
        Self { is_available: true, conflicts: Vec::new(), assignments }
    }

    pub fn rejected(conflicts: Vec<Conflict>) -> Self {
        debug_assert!(!conflicts.is_empty(), "rejection must carry a conflict");
        Self { is_available: false, conflicts, assignments: Vec::new() }
    }

    /// Join every conflict message for error display.
    pub fn conflict_summary(&self) -> String {
        self.conflicts
            .iter()
            .map(|c| c.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
