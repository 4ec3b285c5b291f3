//! Time source for every time-based business rule.

use chrono::NaiveDateTime;

/// Supplies the current restaurant-local date and time.
///
/// Reservations carry a calendar date and a wall-clock time with no zone,
/// so "now" is expressed the same way. The engine reads the clock once per
/// operation; tests substitute a fixed clock.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current local date and time.
    fn now(&self) -> NaiveDateTime;
}
