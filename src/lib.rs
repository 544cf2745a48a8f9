//! Availability & resource allocation engine for activity-rental
//! businesses (kayaks, tennis courts, paddle boards).
//!
//! Given an activity, an optional priced formula, a date, a time window and
//! a participant count, the engine decides whether a booking can be accepted
//! and which interchangeable units of each resource pool it occupies. It is
//! consumed as a library: operating periods, resource pools and formulas are
//! read through repository seams, committed bookings live in an injected
//! [`engine::ReservationStore`], and unavailability is a typed result —
//! never an error.

pub mod catalog;
pub mod engine;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;

pub use engine::{
    AvailabilityResult, Conflict, ConflictKind, Engine, EngineError, ReservationStore,
};
