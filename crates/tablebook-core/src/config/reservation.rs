//! Reservation business-rule configuration.
//!
//! Seat ceilings, service windows, party-size bounds, and the
//! advance-notice period are configuration, not state: they are read once
//! at startup and never mutated by the engine.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Business rules applied by the reservation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConfig {
    /// Maximum aggregate seats per area and date.
    #[serde(default)]
    pub capacity: AreaCapacityConfig,
    /// Allowed party sizes.
    #[serde(default)]
    pub party_size: PartySizeConfig,
    /// Time-of-day windows in which a reservation may start.
    #[serde(default = "default_service_windows")]
    pub service_windows: Vec<ServiceWindowConfig>,
    /// Hours before the reservation after which it can no longer be
    /// modified or cancelled.
    #[serde(default = "default_advance_notice_hours")]
    pub advance_notice_hours: u32,
    /// How many times a write aborted by a concurrent conflict is re-run.
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            capacity: AreaCapacityConfig::default(),
            party_size: PartySizeConfig::default(),
            service_windows: default_service_windows(),
            advance_notice_hours: default_advance_notice_hours(),
            conflict_retries: default_conflict_retries(),
        }
    }
}

/// Seat ceiling per seating area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaCapacityConfig {
    /// Seats available in the indoor dining room.
    #[serde(default = "default_indoor_capacity")]
    pub indoor: u32,
    /// Seats available outdoors.
    #[serde(default = "default_outdoor_capacity")]
    pub outdoor: u32,
}

impl Default for AreaCapacityConfig {
    fn default() -> Self {
        Self {
            indoor: default_indoor_capacity(),
            outdoor: default_outdoor_capacity(),
        }
    }
}

/// Inclusive bounds on the number of guests in one reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySizeConfig {
    /// Smallest accepted party.
    #[serde(default = "default_min_party")]
    pub min: u32,
    /// Largest accepted party.
    #[serde(default = "default_max_party")]
    pub max: u32,
}

impl Default for PartySizeConfig {
    fn default() -> Self {
        Self {
            min: default_min_party(),
            max: default_max_party(),
        }
    }
}

/// A service window such as lunch or dinner.
///
/// The start is always inclusive. The end is exclusive unless
/// `end_inclusive` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceWindowConfig {
    /// Display name of the window.
    pub name: String,
    /// First accepted time.
    pub start: NaiveTime,
    /// Closing boundary.
    pub end: NaiveTime,
    /// Whether `end` itself is accepted.
    #[serde(default)]
    pub end_inclusive: bool,
}

impl ServiceWindowConfig {
    /// Whether `time` falls inside this window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if time < self.start {
            return false;
        }
        if self.end_inclusive {
            time <= self.end
        } else {
            time < self.end
        }
    }
}

fn default_service_windows() -> Vec<ServiceWindowConfig> {
    vec![
        ServiceWindowConfig {
            name: "lunch".to_string(),
            start: on_the_hour(12),
            end: on_the_hour(15),
            end_inclusive: false,
        },
        ServiceWindowConfig {
            name: "dinner".to_string(),
            start: on_the_hour(19),
            end: on_the_hour(23),
            end_inclusive: true,
        },
    ]
}

/// Hours below 24 always form a valid time.
fn on_the_hour(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_indoor_capacity() -> u32 {
    60
}

fn default_outdoor_capacity() -> u32 {
    40
}

fn default_min_party() -> u32 {
    1
}

fn default_max_party() -> u32 {
    20
}

fn default_advance_notice_hours() -> u32 {
    24
}

fn default_conflict_retries() -> u32 {
    1
}
