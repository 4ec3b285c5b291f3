//! Table reservation domain entities.

pub mod area;
pub mod model;

pub use area::Area;
pub use model::{Bucket, NewReservation, Reservation};
