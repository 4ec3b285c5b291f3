//! Seating area enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use tablebook_core::config::AreaCapacityConfig;

/// A seating zone with its own fixed seat ceiling.
///
/// The set is closed; the ordering (indoor before outdoor) is the order in
/// which bucket locks are taken.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "reservation_area", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Area {
    /// The indoor dining room.
    Indoor,
    /// The terrace.
    Outdoor,
}

impl Area {
    /// Every area, in lock order.
    pub const ALL: [Area; 2] = [Area::Indoor, Area::Outdoor];

    /// Return the area as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indoor => "INDOOR",
            Self::Outdoor => "OUTDOOR",
        }
    }

    /// Seat ceiling for this area under the given configuration.
    pub fn capacity(&self, config: &AreaCapacityConfig) -> u32 {
        match self {
            Self::Indoor => config.indoor,
            Self::Outdoor => config.outdoor,
        }
    }

    /// Stable small integer used to derive per-bucket lock keys.
    pub fn ordinal(&self) -> i32 {
        match self {
            Self::Indoor => 0,
            Self::Outdoor => 1,
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Area {
    type Err = tablebook_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INDOOR" => Ok(Self::Indoor),
            "OUTDOOR" => Ok(Self::Outdoor),
            _ => Err(tablebook_core::AppError::validation(format!(
                "Unknown area: '{s}'. Expected one of: INDOOR, OUTDOOR"
            ))),
        }
    }
}
