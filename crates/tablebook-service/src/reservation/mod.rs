//! Reservation capacity engine and its collaborators.

pub mod access;
pub mod error;
pub mod ledger;
pub mod service;
pub mod validator;

pub use access::ReservationAccess;
pub use error::ReservationError;
pub use ledger::{BucketOccupancy, CapacityLedger};
pub use service::ReservationService;
pub use validator::{ReservationRequest, ReservationValidator, ValidatedSlot};
