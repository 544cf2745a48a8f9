use chrono::NaiveDate;

use crate::model::{Assignment, Reservation, Resource, Span};

use super::conflict::Conflict;

// ── Allocation Algorithm ──────────────────────────────────────────

/// Per-slot occupancy for one pool on one date, derived from the committed
/// reservation list on every call — never cached.
struct SlotLoads {
    /// Slot holds an assignment overlapping the requested window.
    busy: Vec<bool>,
    /// Bookings touching the slot anywhere on the date (load-balance key).
    day_bookings: Vec<u32>,
    /// Quantity held by overlapping aggregate (slot-less) assignments.
    aggregate_held: u32,
}

fn slot_loads(
    resource: &Resource,
    date: NaiveDate,
    window: &Span,
    reservations: &[Reservation],
) -> SlotLoads {
    let total = resource.total_quantity as usize;
    let mut loads = SlotLoads {
        busy: vec![false; total],
        day_bookings: vec![0; total],
        aggregate_held: 0,
    };
    for reservation in reservations.iter().filter(|r| r.date == date) {
        for assignment in reservation
            .assignments
            .iter()
            .filter(|a| a.resource_id == resource.id)
        {
            match assignment.unit {
                Some(slot) => {
                    let slot = slot as usize;
                    // The pool may have shrunk since this booking was committed.
                    if slot >= total {
                        continue;
                    }
                    loads.day_bookings[slot] += 1;
                    if assignment.span.overlaps(window) {
                        loads.busy[slot] = true;
                    }
                }
                None => {
                    if assignment.span.overlaps(window) {
                        loads.aggregate_held += assignment.quantity;
                    }
                }
            }
        }
    }
    loads
}

/// Pick `needed` free slots of `resource` for `window`, one `Assignment` per
/// slot, spreading usage across the pool: slots free for the window are
/// ranked by how few bookings they already carry on the date, then by index.
/// All-or-nothing — insufficiency returns a conflict, never a partial list.
pub fn allocate_units(
    resource: &Resource,
    needed: u32,
    date: NaiveDate,
    window: &Span,
    reservations: &[Reservation],
) -> Result<Vec<Assignment>, Conflict> {
    if !resource.is_active || resource.total_quantity == 0 {
        return Err(Conflict::resource(format!(
            "resource \"{}\" has no bookable units",
            resource.name
        )));
    }
    if needed == 0 {
        return Ok(Vec::new());
    }

    let loads = slot_loads(resource, date, window, reservations);

    // Busy slots are excluded outright; the ranking below therefore can
    // never select one, whatever its day load.
    let mut candidates: Vec<u32> = (0..resource.total_quantity)
        .filter(|&slot| !loads.busy[slot as usize])
        .collect();
    candidates.sort_by_key(|&slot| (loads.day_bookings[slot as usize], slot));

    // Aggregate assignments consume quantity without pinning slots; keep
    // that many candidates unallocated so their capacity stays honored.
    let usable = (candidates.len() as u32).saturating_sub(loads.aggregate_held);
    if usable < needed {
        return Err(Conflict::resource("not enough continuous resources available"));
    }

    Ok(candidates
        .into_iter()
        .take(needed as usize)
        .map(|slot| Assignment {
            resource_id: resource.id,
            unit: Some(slot),
            quantity: 1,
            span: *window,
        })
        .collect())
}

/// Remaining aggregate capacity of a pool for a window: `total_quantity`
/// minus the quantity held by every overlapping reservation on that date.
pub fn remaining_capacity(
    resource: &Resource,
    date: NaiveDate,
    window: &Span,
    reservations: &[Reservation],
) -> u32 {
    let occupied: u32 = reservations
        .iter()
        .filter(|r| r.date == date && r.span.overlaps(window))
        .map(|r| r.quantity_for(resource.id))
        .sum();
    resource.total_quantity.saturating_sub(occupied)
}

/// Pool-level variant for formula-less checks: a single assignment covering
/// the whole requested quantity against the aggregate pool, no slot pinning.
pub fn allocate_aggregate(
    resource: &Resource,
    needed: u32,
    date: NaiveDate,
    window: &Span,
    reservations: &[Reservation],
) -> Result<Assignment, Conflict> {
    if !resource.is_active || resource.total_quantity == 0 {
        return Err(Conflict::resource(format!(
            "resource \"{}\" has no bookable units",
            resource.name
        )));
    }
    if remaining_capacity(resource, date, window, reservations) < needed {
        return Err(Conflict::resource("not enough continuous resources available"));
    }
    Ok(Assignment {
        resource_id: resource.id,
        unit: None,
        quantity: needed,
        span: *window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResourceDemand, TimeOfDay};
    use ulid::Ulid;

    fn hm(h: u16, m: u16) -> TimeOfDay {
        TimeOfDay::from_hm(h, m)
    }

    fn window(sh: u16, eh: u16) -> Span {
        Span::new(hm(sh, 0), hm(eh, 0))
    }

    fn kayaks(total: u32) -> Resource {
        Resource {
            id: Ulid::new(),
            name: "double kayak".into(),
            total_quantity: total,
            is_active: true,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    /// Committed reservation pinning the given slots of `resource` for `span`.
    fn booked_units(resource: &Resource, span: Span, slots: &[u32]) -> Reservation {
        Reservation {
            id: Ulid::new(),
            activity_id: Ulid::new(),
            formula_id: Some(Ulid::new()),
            date: date(),
            span,
            participants: slots.len() as u32,
            resources: vec![ResourceDemand {
                resource_id: resource.id,
                quantity: slots.len() as u32,
            }],
            assignments: slots
                .iter()
                .map(|&slot| Assignment {
                    resource_id: resource.id,
                    unit: Some(slot),
                    quantity: 1,
                    span,
                })
                .collect(),
        }
    }

    /// Committed aggregate reservation (no pinned slots).
    fn booked_aggregate(resource: &Resource, span: Span, quantity: u32) -> Reservation {
        Reservation {
            id: Ulid::new(),
            activity_id: Ulid::new(),
            formula_id: None,
            date: date(),
            span,
            participants: quantity,
            resources: vec![ResourceDemand { resource_id: resource.id, quantity }],
            assignments: vec![Assignment {
                resource_id: resource.id,
                unit: None,
                quantity,
                span,
            }],
        }
    }

    #[test]
    fn empty_pool_allocates_lowest_slots() {
        let pool = kayaks(5);
        let got = allocate_units(&pool, 3, date(), &window(10, 12), &[]).unwrap();
        let slots: Vec<u32> = got.iter().map(|a| a.unit.unwrap()).collect();
        assert_eq!(slots, vec![0, 1, 2]);
        assert!(got.iter().all(|a| a.quantity == 1));
    }

    #[test]
    fn busy_slots_are_never_selected() {
        let pool = kayaks(3);
        let existing = booked_units(&pool, window(10, 12), &[0, 1]);
        let got = allocate_units(&pool, 1, date(), &window(11, 13), &[existing]).unwrap();
        assert_eq!(got[0].unit, Some(2));
    }

    #[test]
    fn allocation_spreads_across_the_pool() {
        let pool = kayaks(3);
        // Slot 0 already worked two morning trips; slots 1 and 2 one each.
        let history = vec![
            booked_units(&pool, window(8, 9), &[0, 1]),
            booked_units(&pool, window(9, 10), &[0, 2]),
        ];
        let got = allocate_units(&pool, 1, date(), &window(14, 16), &history).unwrap();
        assert_eq!(got[0].unit, Some(1)); // least-booked slot, index breaks the tie with 2
    }

    #[test]
    fn load_balance_ties_break_by_slot_index() {
        let pool = kayaks(4);
        let got = allocate_units(&pool, 2, date(), &window(10, 12), &[]).unwrap();
        assert_eq!(got[0].unit, Some(0));
        assert_eq!(got[1].unit, Some(1));
    }

    #[test]
    fn insufficiency_is_all_or_nothing() {
        let pool = kayaks(5);
        let existing = booked_units(&pool, window(10, 12), &[0, 1, 2]);
        let err = allocate_units(&pool, 3, date(), &window(10, 12), &[existing.clone()]);
        assert!(err.is_err()); // only 2 remain
        let got = allocate_units(&pool, 2, date(), &window(10, 12), &[existing]).unwrap();
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn back_to_back_windows_share_slots() {
        let pool = kayaks(5);
        let morning = booked_units(&pool, window(10, 12), &[0, 1, 2, 3, 4]);
        let got = allocate_units(&pool, 5, date(), &window(12, 14), &[morning]).unwrap();
        assert_eq!(got.len(), 5);
    }

    #[test]
    fn other_dates_do_not_count() {
        let pool = kayaks(2);
        let mut other_day = booked_units(&pool, window(10, 12), &[0, 1]);
        other_day.date = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        let got = allocate_units(&pool, 2, date(), &window(10, 12), &[other_day]).unwrap();
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn aggregate_holds_shrink_the_pool() {
        let pool = kayaks(5);
        let held = booked_aggregate(&pool, window(10, 12), 3);
        let err = allocate_units(&pool, 3, date(), &window(11, 13), &[held.clone()]);
        assert!(err.is_err()); // 5 slots, 3 held in aggregate, only 2 usable
        let got = allocate_units(&pool, 2, date(), &window(11, 13), &[held]).unwrap();
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn inactive_resource_rejected() {
        let mut pool = kayaks(5);
        pool.is_active = false;
        let err = allocate_units(&pool, 1, date(), &window(10, 12), &[]).unwrap_err();
        assert!(err.message.contains("no bookable units"));
    }

    #[test]
    fn empty_need_yields_no_assignments() {
        let pool = kayaks(5);
        let got = allocate_units(&pool, 0, date(), &window(10, 12), &[]).unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn remaining_capacity_recomputes_from_reservations() {
        let pool = kayaks(5);
        let booked = booked_units(&pool, window(10, 18), &[0, 1, 2]);
        let inside = window(14, 16);
        assert_eq!(remaining_capacity(&pool, date(), &inside, &[booked.clone()]), 2);
        assert_eq!(remaining_capacity(&pool, date(), &inside, &[]), 5);
        // Touching window sees the full pool.
        let after = window(18, 20);
        assert_eq!(remaining_capacity(&pool, date(), &after, &[booked]), 5);
    }

    #[test]
    fn aggregate_allocation_covers_whole_quantity() {
        let pool = kayaks(5);
        let got = allocate_aggregate(&pool, 4, date(), &window(10, 12), &[]).unwrap();
        assert_eq!(got.unit, None);
        assert_eq!(got.quantity, 4);
        let held = booked_aggregate(&pool, window(10, 12), 4);
        let err = allocate_aggregate(&pool, 2, date(), &window(10, 12), &[held]);
        assert!(err.is_err());
    }

    #[test]
    fn unit_and_aggregate_bookings_share_one_budget() {
        let pool = kayaks(4);
        let pinned = booked_units(&pool, window(10, 12), &[0, 1]);
        let held = booked_aggregate(&pool, window(10, 12), 1);
        let existing = vec![pinned, held];
        // 2 pinned + 1 aggregate = 3 of 4 consumed.
        assert_eq!(remaining_capacity(&pool, date(), &window(10, 12), &existing), 1);
        let got = allocate_units(&pool, 1, date(), &window(10, 12), &existing).unwrap();
        assert_eq!(got.len(), 1);
        assert!(allocate_units(&pool, 2, date(), &window(10, 12), &existing).is_err());
    }
}
