//! Hard input limits. Requests beyond these are rejected up front with
//! `EngineError::LimitExceeded` rather than handed to the allocator.

/// Max participants / units in a single availability check or booking.
pub const MAX_PARTICIPANTS: u32 = 1_000;

/// Max physical units a single resource pool may declare.
pub const MAX_UNITS_PER_RESOURCE: u32 = 10_000;

/// Max total quantity a single check may require from one resource pool.
pub const MAX_REQUIRED_PER_RESOURCE: u32 = 10_000;

/// Max committed reservations held by one store.
pub const MAX_RESERVATIONS: usize = 100_000;
