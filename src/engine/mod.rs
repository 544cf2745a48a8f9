mod availability;
mod conflict;
mod error;
mod mutations;
mod queries;
mod requirements;
mod schedule;
mod store;

pub use availability::{allocate_aggregate, allocate_units, remaining_capacity};
pub use conflict::{AvailabilityResult, Conflict, ConflictKind};
pub use error::EngineError;
pub use requirements::resolve_requirements;
pub use schedule::validate_window;
pub use store::ReservationStore;

use std::sync::Arc;

use tokio::sync::Mutex;
use ulid::Ulid;

use crate::catalog::{
    ActivityRepository, FormulaRepository, InMemoryCatalog, PeriodRepository, ResourceRepository,
};
use crate::limits::*;
use crate::model::*;
use crate::notify::NotifyHub;

/// The availability orchestrator. Validates the requested window against the
/// operating periods, resolves resource requirements, allocates units, and
/// owns the only mutable state — the reservation store.
///
/// Catalog repositories are read-only collaborators; the engine never writes
/// to them. A check that cannot proceed is a normal `AvailabilityResult`,
/// not an error.
pub struct Engine {
    activities: Arc<dyn ActivityRepository>,
    formulas: Arc<dyn FormulaRepository>,
    resources: Arc<dyn ResourceRepository>,
    periods: Arc<dyn PeriodRepository>,
    pub store: ReservationStore,
    pub notify: Arc<NotifyHub>,
    /// Serializes every "recompute availability + commit" sequence, so two
    /// near-simultaneous bookings can never both pass the same check.
    pub(super) commit_lock: Mutex<()>,
}

impl Engine {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        formulas: Arc<dyn FormulaRepository>,
        resources: Arc<dyn ResourceRepository>,
        periods: Arc<dyn PeriodRepository>,
        notify: Arc<NotifyHub>,
    ) -> Self {
        Self {
            activities,
            formulas,
            resources,
            periods,
            store: ReservationStore::new(),
            notify,
            commit_lock: Mutex::new(()),
        }
    }

    /// Wire every repository seam to one in-memory catalog.
    pub fn with_catalog(catalog: Arc<InMemoryCatalog>, notify: Arc<NotifyHub>) -> Self {
        Self::new(
            catalog.clone(),
            catalog.clone(),
            catalog.clone(),
            catalog,
            notify,
        )
    }

    pub(super) async fn fetch_activity(&self, id: Ulid) -> Result<Activity, EngineError> {
        let activity = self
            .activities
            .get_by_id(id)
            .await
            .ok_or(EngineError::NotFound(id))?;
        if !activity.is_active {
            return Err(EngineError::Inactive(id));
        }
        Ok(activity)
    }

    pub(super) async fn fetch_formula(&self, id: Ulid) -> Result<Formula, EngineError> {
        self.formulas
            .get_by_id(id)
            .await
            .ok_or(EngineError::NotFound(id))
    }

    pub(super) async fn all_periods(&self) -> Vec<Period> {
        self.periods.get_all().await
    }

    pub(super) async fn fetch_resource(&self, id: Ulid) -> Option<Resource> {
        self.resources.get_by_id(id).await
    }

    /// Input sanity, checked before any gating.
    pub(super) fn validate_request(window: &Span, participants: u32) -> Result<(), EngineError> {
        if window.start >= window.end {
            return Err(EngineError::InvalidRequest("window must start before it ends"));
        }
        if participants == 0 {
            return Err(EngineError::InvalidRequest("participants must be at least 1"));
        }
        if participants > MAX_PARTICIPANTS {
            return Err(EngineError::LimitExceeded("too many participants"));
        }
        Ok(())
    }
}
