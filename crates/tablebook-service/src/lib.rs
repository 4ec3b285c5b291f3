//! # tablebook-service
//!
//! The reservation capacity engine. [`ReservationService`] validates
//! requests, checks per-area occupancy and persists changes through a
//! [`tablebook_database::ReservationStore`], all inside one store
//! transaction per write.
//!
//! Services follow constructor injection: the store, the user directory,
//! and the clock are provided at construction time via `Arc` references.

pub mod clock;
pub mod context;
pub mod reservation;

pub use clock::{FixedClock, SystemClock};
pub use context::RequestContext;
pub use reservation::{
    BucketOccupancy, CapacityLedger, ReservationAccess, ReservationError, ReservationRequest,
    ReservationService, ReservationValidator, ValidatedSlot,
};
