use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;
use ulid::Ulid;

use crate::model::*;
use crate::observability;

use super::{Engine, EngineError};

impl Engine {
    /// Book the window or fail loudly.
    ///
    /// Re-runs the full availability pipeline and commits only on success,
    /// holding the commit lock across both steps — the check and the commit
    /// are one atomic unit, so concurrent callers serialize instead of
    /// double-booking. Asked to commit an unavailable window, this returns
    /// `EngineError::Unavailable` carrying every conflict found.
    pub async fn create_reservation(
        &self,
        activity_id: Ulid,
        formula_id: Option<Ulid>,
        date: NaiveDate,
        window: Span,
        participants: u32,
    ) -> Result<Reservation, EngineError> {
        let _commit = self.commit_lock.lock().await;

        let outcome = self
            .evaluate(activity_id, formula_id, date, window, participants)
            .await?;
        if !outcome.is_available {
            metrics::counter!(observability::RESERVATIONS_REJECTED_TOTAL).increment(1);
            return Err(EngineError::Unavailable(outcome.conflicts));
        }

        // Group the unit assignments back into per-pool totals.
        let mut totals: BTreeMap<Ulid, u32> = BTreeMap::new();
        for assignment in &outcome.assignments {
            *totals.entry(assignment.resource_id).or_insert(0) += assignment.quantity;
        }

        let reservation = Reservation {
            id: Ulid::new(),
            activity_id,
            formula_id,
            date,
            span: window,
            participants,
            resources: totals
                .into_iter()
                .map(|(resource_id, quantity)| ResourceDemand { resource_id, quantity })
                .collect(),
            assignments: outcome.assignments,
        };

        self.store.add(reservation.clone()).await?;

        for demand in &reservation.resources {
            self.notify.send(
                demand.resource_id,
                &Event::ReservationCreated {
                    id: reservation.id,
                    resource_id: demand.resource_id,
                    date,
                    span: window,
                    quantity: demand.quantity,
                },
            );
        }

        info!(
            reservation = %reservation.id,
            activity = %activity_id,
            %date,
            start = %window.start,
            end = %window.end,
            participants,
            "reservation created"
        );
        metrics::counter!(observability::RESERVATIONS_CREATED_TOTAL).increment(1);
        metrics::gauge!(observability::RESERVATIONS_ACTIVE).increment(1.0);

        Ok(reservation)
    }

    /// Remove a committed reservation, restoring its whole footprint at
    /// once. Unknown ids are a no-op and return `None`.
    pub async fn cancel_reservation(&self, id: Ulid) -> Option<Reservation> {
        let _commit = self.commit_lock.lock().await;

        let removed = self.store.remove(id).await?;

        for demand in &removed.resources {
            self.notify.send(
                demand.resource_id,
                &Event::ReservationCancelled {
                    id: removed.id,
                    resource_id: demand.resource_id,
                },
            );
        }

        info!(reservation = %removed.id, date = %removed.date, "reservation cancelled");
        metrics::counter!(observability::RESERVATIONS_CANCELLED_TOTAL).increment(1);
        metrics::gauge!(observability::RESERVATIONS_ACTIVE).decrement(1.0);

        Some(removed)
    }
}
