use chrono::NaiveDate;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::limits::MAX_RESERVATIONS;
use crate::model::Reservation;

use super::error::EngineError;

/// The authoritative list of committed bookings.
///
/// Constructed explicitly and injected into the engine — one per test or
/// session, or wrapped by a transactional layer in production. Occupancy is
/// always recomputed from a snapshot of this list; no counters are cached.
pub struct ReservationStore {
    reservations: RwLock<Vec<Reservation>>,
}

impl Default for ReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationStore {
    pub fn new() -> Self {
        Self {
            reservations: RwLock::new(Vec::new()),
        }
    }

    /// Every committed reservation, in commit order.
    pub async fn snapshot(&self) -> Vec<Reservation> {
        self.reservations.read().await.clone()
    }

    /// Committed reservations on one date.
    pub async fn on_date(&self, date: NaiveDate) -> Vec<Reservation> {
        self.reservations
            .read()
            .await
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: Ulid) -> Option<Reservation> {
        self.reservations
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Only called after allocation succeeded across every required pool.
    pub async fn add(&self, reservation: Reservation) -> Result<(), EngineError> {
        let mut guard = self.reservations.write().await;
        if guard.len() >= MAX_RESERVATIONS {
            return Err(EngineError::LimitExceeded("too many reservations"));
        }
        guard.push(reservation);
        Ok(())
    }

    /// Cancellation is immediate and total: the whole footprint disappears
    /// from subsequent overlap computations. Unknown ids are a no-op.
    pub async fn remove(&self, id: Ulid) -> Option<Reservation> {
        let mut guard = self.reservations.write().await;
        let pos = guard.iter().position(|r| r.id == id)?;
        Some(guard.remove(pos))
    }

    pub async fn len(&self) -> usize {
        self.reservations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reservations.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Span, TimeOfDay};

    fn reservation(date: NaiveDate) -> Reservation {
        Reservation {
            id: Ulid::new(),
            activity_id: Ulid::new(),
            formula_id: None,
            date,
            span: Span::new(TimeOfDay::from_hm(10, 0), TimeOfDay::from_hm(12, 0)),
            participants: 2,
            resources: vec![],
            assignments: vec![],
        }
    }

    #[tokio::test]
    async fn add_get_remove_round_trip() {
        let store = ReservationStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let r = reservation(date);
        let id = r.id;

        store.add(r.clone()).await.unwrap();
        assert_eq!(store.get(id).await, Some(r));
        assert_eq!(store.len().await, 1);

        let removed = store.remove(id).await;
        assert!(removed.is_some());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn remove_unknown_is_noop() {
        let store = ReservationStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        store.add(reservation(date)).await.unwrap();

        assert!(store.remove(Ulid::new()).await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn on_date_filters() {
        let store = ReservationStore::new();
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        store.add(reservation(monday)).await.unwrap();
        store.add(reservation(monday)).await.unwrap();
        store.add(reservation(tuesday)).await.unwrap();

        assert_eq!(store.on_date(monday).await.len(), 2);
        assert_eq!(store.on_date(tuesday).await.len(), 1);
    }
}
