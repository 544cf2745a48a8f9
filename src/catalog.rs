//! Read-only collaborators: the activity/formula/resource/period catalogs.
//!
//! The engine never mutates these records; it only asks for the current
//! snapshot. Backing storage is the implementor's business — the in-memory
//! variant below is what tests and single-process deployments use.

use async_trait::async_trait;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::{Activity, Formula, Period, Resource};

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn get_all(&self) -> Vec<Activity>;
    async fn get_by_id(&self, id: Ulid) -> Option<Activity>;
}

#[async_trait]
pub trait FormulaRepository: Send + Sync {
    async fn get_all(&self) -> Vec<Formula>;
    async fn get_by_id(&self, id: Ulid) -> Option<Formula>;
}

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn get_all(&self) -> Vec<Resource>;
    async fn get_by_id(&self, id: Ulid) -> Option<Resource>;
}

#[async_trait]
pub trait PeriodRepository: Send + Sync {
    async fn get_all(&self) -> Vec<Period>;
    async fn get_by_id(&self, id: Ulid) -> Option<Period>;
}

/// In-memory catalog backing all four repository traits.
#[derive(Default)]
pub struct InMemoryCatalog {
    activities: DashMap<Ulid, Activity>,
    formulas: DashMap<Ulid, Formula>,
    resources: DashMap<Ulid, Resource>,
    periods: DashMap<Ulid, Period>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_activity(&self, activity: Activity) {
        self.activities.insert(activity.id, activity);
    }

    pub fn insert_formula(&self, formula: Formula) {
        self.formulas.insert(formula.id, formula);
    }

    pub fn insert_resource(&self, resource: Resource) {
        self.resources.insert(resource.id, resource);
    }

    pub fn insert_period(&self, period: Period) {
        self.periods.insert(period.id, period);
    }

    pub fn remove_activity(&self, id: &Ulid) -> Option<Activity> {
        self.activities.remove(id).map(|(_, v)| v)
    }

    pub fn remove_formula(&self, id: &Ulid) -> Option<Formula> {
        self.formulas.remove(id).map(|(_, v)| v)
    }

    pub fn remove_resource(&self, id: &Ulid) -> Option<Resource> {
        self.resources.remove(id).map(|(_, v)| v)
    }

    pub fn remove_period(&self, id: &Ulid) -> Option<Period> {
        self.periods.remove(id).map(|(_, v)| v)
    }
}

#[async_trait]
impl ActivityRepository for InMemoryCatalog {
    async fn get_all(&self) -> Vec<Activity> {
        self.activities.iter().map(|e| e.value().clone()).collect()
    }

    async fn get_by_id(&self, id: Ulid) -> Option<Activity> {
        self.activities.get(&id).map(|e| e.value().clone())
    }
}

#[async_trait]
impl FormulaRepository for InMemoryCatalog {
    async fn get_all(&self) -> Vec<Formula> {
        self.formulas.iter().map(|e| e.value().clone()).collect()
    }

    async fn get_by_id(&self, id: Ulid) -> Option<Formula> {
        self.formulas.get(&id).map(|e| e.value().clone())
    }
}

#[async_trait]
impl ResourceRepository for InMemoryCatalog {
    async fn get_all(&self) -> Vec<Resource> {
        self.resources.iter().map(|e| e.value().clone()).collect()
    }

    async fn get_by_id(&self, id: Ulid) -> Option<Resource> {
        self.resources.get(&id).map(|e| e.value().clone())
    }
}

#[async_trait]
impl PeriodRepository for InMemoryCatalog {
    async fn get_all(&self) -> Vec<Period> {
        self.periods.iter().map(|e| e.value().clone()).collect()
    }

    async fn get_by_id(&self, id: Ulid) -> Option<Period> {
        self.periods.get(&id).map(|e| e.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn catalog_snapshot_round_trip() {
        let catalog = InMemoryCatalog::new();
        let resource = Resource {
            id: Ulid::new(),
            name: "double kayak".into(),
            total_quantity: 5,
            is_active: true,
        };
        catalog.insert_resource(resource.clone());

        let fetched = ResourceRepository::get_by_id(&catalog, resource.id).await;
        assert_eq!(fetched, Some(resource.clone()));
        assert_eq!(ResourceRepository::get_all(&catalog).await.len(), 1);

        catalog.remove_resource(&resource.id);
        assert!(ResourceRepository::get_by_id(&catalog, resource.id).await.is_none());
    }
}
