use std::collections::BTreeMap;

use ulid::Ulid;

use crate::model::Formula;

/// Total quantity needed per resource pool for `participants` people.
///
/// No formula, or a formula with no rates, consumes nothing — the check is
/// then an activity-level capacity question, not a unit allocation. Rates
/// accumulate additively: two rates each asking 1 kayak per participant
/// need 2 kayaks per participant in total. The map is ordered so the
/// orchestrator visits pools deterministically.
pub fn resolve_requirements(formula: Option<&Formula>, participants: u32) -> BTreeMap<Ulid, u32> {
    let mut needed: BTreeMap<Ulid, u32> = BTreeMap::new();
    let Some(formula) = formula else {
        return needed;
    };
    for rate in &formula.rates {
        for demand in &rate.resources {
            if demand.quantity == 0 {
                continue;
            }
            *needed.entry(demand.resource_id).or_insert(0) += demand.quantity * participants;
        }
    }
    needed
}
