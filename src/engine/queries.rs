use chrono::NaiveDate;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::availability::{allocate_aggregate, allocate_units, remaining_capacity};
use super::conflict::{AvailabilityResult, Conflict};
use super::requirements::resolve_requirements;
use super::schedule::validate_window;
use super::{Engine, EngineError};

impl Engine {
    /// The one availability entry point: with a formula the check allocates
    /// units per the formula's rates; without one it runs the aggregate
    /// capacity check against the activity's own pools.
    ///
    /// Unavailability is a normal result carrying typed conflicts. Errors are
    /// reserved for malformed requests and dangling ids.
    pub async fn check_availability(
        &self,
        activity_id: Ulid,
        formula_id: Option<Ulid>,
        date: NaiveDate,
        window: Span,
        quantity: u32,
    ) -> Result<AvailabilityResult, EngineError> {
        let started = std::time::Instant::now();
        let result = self
            .evaluate(activity_id, formula_id, date, window, quantity)
            .await;
        metrics::histogram!(observability::CHECK_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        match &result {
            Ok(outcome) if outcome.is_available => {
                metrics::counter!(observability::CHECKS_TOTAL, "outcome" => "available")
                    .increment(1);
            }
            Ok(outcome) => {
                metrics::counter!(observability::CHECKS_TOTAL, "outcome" => "rejected")
                    .increment(1);
                tracing::debug!(
                    activity = %activity_id,
                    %date,
                    conflicts = outcome.conflicts.len(),
                    "availability check rejected: {}",
                    outcome.conflict_summary()
                );
            }
            Err(e) => {
                metrics::counter!(observability::CHECKS_TOTAL, "outcome" => "error").increment(1);
                tracing::debug!(activity = %activity_id, %date, "availability check failed: {e}");
            }
        }
        result
    }

    /// Check pipeline: input sanity → period gating → requirement resolution
    /// → per-pool allocation → aggregation. Shared verbatim by
    /// `create_reservation`, which re-runs it under the commit lock.
    pub(super) async fn evaluate(
        &self,
        activity_id: Ulid,
        formula_id: Option<Ulid>,
        date: NaiveDate,
        window: Span,
        quantity: u32,
    ) -> Result<AvailabilityResult, EngineError> {
        Self::validate_request(&window, quantity)?;
        let activity = self.fetch_activity(activity_id).await?;

        // Period gating strictly precedes resource gating.
        let periods = self.all_periods().await;
        if let Some(conflict) = validate_window(&periods, activity.id, date, &window) {
            return Ok(AvailabilityResult::rejected(vec![conflict]));
        }

        let formula = match formula_id {
            Some(id) => Some(self.fetch_formula(id).await?),
            None => None,
        };
        let needed = resolve_requirements(formula.as_ref(), quantity);
        let day = self.store.on_date(date).await;

        if needed.is_empty() {
            // A formula with no rates consumes nothing; so does an activity
            // without resource pools.
            if formula.is_some() || activity.resource_ids.is_empty() {
                return Ok(AvailabilityResult::available(Vec::new()));
            }
            return Ok(self
                .evaluate_aggregate(&activity, quantity, date, &window, &day)
                .await);
        }

        let mut conflicts = Vec::new();
        let mut assignments = Vec::new();
        for (&resource_id, &pool_quantity) in &needed {
            if pool_quantity > MAX_REQUIRED_PER_RESOURCE {
                return Err(EngineError::LimitExceeded("required quantity too large"));
            }
            let Some(resource) = self.fetch_resource(resource_id).await else {
                conflicts.push(Conflict::capacity(format!(
                    "rate requires unknown resource {resource_id}"
                )));
                continue;
            };
            if resource.total_quantity > MAX_UNITS_PER_RESOURCE {
                return Err(EngineError::LimitExceeded("resource pool too large"));
            }
            match allocate_units(&resource, pool_quantity, date, &window, &day) {
                Ok(mut pool_assignments) => assignments.append(&mut pool_assignments),
                Err(conflict) => conflicts.push(conflict),
            }
        }

        // Any failing pool rejects the whole check; tentative assignments
        // from the pools that did fit are discarded, nothing is reserved.
        if conflicts.is_empty() {
            Ok(AvailabilityResult::available(assignments))
        } else {
            Ok(AvailabilityResult::rejected(conflicts))
        }
    }

    async fn evaluate_aggregate(
        &self,
        activity: &Activity,
        quantity: u32,
        date: NaiveDate,
        window: &Span,
        day: &[Reservation],
    ) -> AvailabilityResult {
        let mut conflicts = Vec::new();
        let mut assignments = Vec::new();
        for &resource_id in &activity.resource_ids {
            let Some(resource) = self.fetch_resource(resource_id).await else {
                conflicts.push(Conflict::capacity(format!(
                    "activity references unknown resource {resource_id}"
                )));
                continue;
            };
            match allocate_aggregate(&resource, quantity, date, window, day) {
                Ok(assignment) => assignments.push(assignment),
                Err(conflict) => conflicts.push(conflict),
            }
        }
        if conflicts.is_empty() {
            AvailabilityResult::available(assignments)
        } else {
            AvailabilityResult::rejected(conflicts)
        }
    }

    /// Units of one pool still free for the window. Recomputed from the
    /// reservation list on every call.
    pub async fn remaining_availability(
        &self,
        resource_id: Ulid,
        date: NaiveDate,
        window: Span,
    ) -> Result<u32, EngineError> {
        let resource = self
            .fetch_resource(resource_id)
            .await
            .ok_or(EngineError::NotFound(resource_id))?;
        let day = self.store.on_date(date).await;
        Ok(remaining_capacity(&resource, date, &window, &day))
    }

    /// Bookable headroom of an activity for the window: the minimum remaining
    /// capacity across its pools. `None` when no pool constrains the activity.
    pub async fn available_capacity(
        &self,
        activity_id: Ulid,
        date: NaiveDate,
        window: Span,
    ) -> Result<Option<u32>, EngineError> {
        let activity = self.fetch_activity(activity_id).await?;
        let day = self.store.on_date(date).await;
        let mut headroom: Option<u32> = None;
        for &resource_id in &activity.resource_ids {
            let resource = self
                .fetch_resource(resource_id)
                .await
                .ok_or(EngineError::NotFound(resource_id))?;
            let remaining = remaining_capacity(&resource, date, &window, &day);
            headroom = Some(headroom.map_or(remaining, |h| h.min(remaining)));
        }
        Ok(headroom)
    }

    pub async fn get_reservation(&self, id: Ulid) -> Option<Reservation> {
        self.store.get(id).await
    }

    pub async fn reservations_on(&self, date: NaiveDate) -> Vec<Reservation> {
        self.store.on_date(date).await
    }
}
