use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Minutes in a day; `TimeOfDay` may equal this to express a midnight close.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Minute-of-day clock value. `"HH:MM"` at the serde boundary, an integer
/// everywhere else. `24:00` is allowed as an exclusive end-of-day bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_minutes(minutes: u16) -> Self {
        debug_assert!(minutes <= MINUTES_PER_DAY, "minute-of-day out of range");
        Self(minutes)
    }

    pub fn from_hm(hours: u16, minutes: u16) -> Self {
        Self::from_minutes(hours * 60 + minutes)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Clock arithmetic wrapping within a 24h day.
    pub fn add_minutes(self, minutes: u32) -> Self {
        Self(((self.0 as u32 + minutes) % MINUTES_PER_DAY as u32) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseTimeError;

impl fmt::Display for ParseTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid time of day, expected \"HH:MM\"")
    }
}

impl std::error::Error for ParseTimeError {}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s.split_once(':').ok_or(ParseTimeError)?;
        let h: u16 = h.parse().map_err(|_| ParseTimeError)?;
        let m: u16 = m.parse().map_err(|_| ParseTimeError)?;
        if m >= 60 || h > 24 || (h == 24 && m != 0) {
            return Err(ParseTimeError);
        }
        Ok(Self(h * 60 + m))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Half-open window `[start, end)` within one day. Bookings never cross midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl Span {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    /// Window starting at `start` and running for `duration_min` minutes.
    pub fn with_duration(start: TimeOfDay, duration_min: u16) -> Self {
        Self::new(start, start.add_minutes(duration_min as u32))
    }

    pub fn duration_min(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

// ── Catalog records (configured out-of-band, read-only to the engine) ──

/// A pool of interchangeable physical units (e.g. "5 double kayaks").
/// Units are anonymous; they exist only as slot indices `0..total_quantity`
/// during allocation bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Ulid,
    pub name: String,
    pub total_quantity: u32,
    pub is_active: bool,
}

/// Opening hours for one weekday, with an optional mid-day break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub opens: TimeOfDay,
    pub closes: TimeOfDay,
    pub break_window: Option<Span>,
    pub is_active: bool,
}

impl DaySchedule {
    pub fn open_span(&self) -> Span {
        Span::new(self.opens, self.closes)
    }
}

/// Per-weekday schedules, Monday-first. A missing day means closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSchedule {
    days: [Option<DaySchedule>; 7],
}

impl WeekSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, weekday: Weekday, schedule: DaySchedule) -> Self {
        self.days[weekday.num_days_from_monday() as usize] = Some(schedule);
        self
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DaySchedule> {
        self.days[weekday.num_days_from_monday() as usize].as_ref()
    }
}

/// An operating window `[starts_on, ends_on]` with its weekly schedule and
/// the activities it applies to (empty list = all activities).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: Ulid,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub activity_ids: Vec<Ulid>,
    pub is_active: bool,
    pub week: WeekSchedule,
}

impl Period {
    /// Date-only containment; time-of-day plays no part.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.starts_on <= date && date <= self.ends_on
    }

    pub fn applies_to(&self, activity_id: Ulid) -> bool {
        self.activity_ids.is_empty() || self.activity_ids.contains(&activity_id)
    }
}

/// Per-participant consumption of one resource pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDemand {
    pub resource_id: Ulid,
    pub quantity: u32,
}

/// One price point of a formula, carrying its resource requirement list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub id: Ulid,
    pub name: String,
    pub resources: Vec<ResourceDemand>,
}

/// A sellable variant of an activity with a fixed duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub id: Ulid,
    pub name: String,
    pub duration_min: u16,
    pub rates: Vec<Rate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Ulid,
    pub name: String,
    pub resource_ids: Vec<Ulid>,
    pub formula_ids: Vec<Ulid>,
    pub is_active: bool,
}

/// A concrete unit-to-window binding proposed by the allocator. `unit` is a
/// slot index within the pool; `None` marks an aggregate assignment that
/// consumes quantity without pinning specific slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub resource_id: Ulid,
    pub unit: Option<u32>,
    pub quantity: u32,
    pub span: Span,
}

/// A committed booking. `resources` holds the per-pool totals; `assignments`
/// keeps the unit-level footprint used by future overlap checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub activity_id: Ulid,
    pub formula_id: Option<Ulid>,
    pub date: NaiveDate,
    pub span: Span,
    pub participants: u32,
    pub resources: Vec<ResourceDemand>,
    pub assignments: Vec<Assignment>,
}

impl Reservation {
    /// Total quantity this reservation holds on one resource pool.
    pub fn quantity_for(&self, resource_id: Ulid) -> u32 {
        self.resources
            .iter()
            .filter(|d| d.resource_id == resource_id)
            .map(|d| d.quantity)
            .sum()
    }
}

/// Per-resource notification payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    ReservationCreated {
        id: Ulid,
        resource_id: Ulid,
        date: NaiveDate,
        span: Span,
        quantity: u32,
    },
    ReservationCancelled {
        id: Ulid,
        resource_id: Ulid,
    },
}
