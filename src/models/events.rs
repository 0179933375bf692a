//! Event categories used as keys into the stay/spillover profile tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of event categories recognized by the attribution model.
///
/// Category is purely a lookup key into the profile store; the free-text
/// event names on a forecast day are mapped to a category by
/// [`crate::services::classifier::classify`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Multi-day destination festivals (Lollapalooza-class).
    MegaFestival,
    /// Professional sports fixtures, mostly single-day attendance.
    Sports,
    /// Symphony, opera, theater and similar performances.
    Cultural,
    /// Generic festivals, concerts and shows.
    WeekendEvent,
    /// No recognized event; regular weekday traffic.
    Baseline,
}

impl EventCategory {
    /// Every category, in declaration order. Used to verify that the
    /// profile tables cover the whole enum at startup.
    pub const ALL: [EventCategory; 5] = [
        EventCategory::MegaFestival,
        EventCategory::Sports,
        EventCategory::Cultural,
        EventCategory::WeekendEvent,
        EventCategory::Baseline,
    ];

    /// Stable snake_case name matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::MegaFestival => "mega_festival",
            EventCategory::Sports => "sports",
            EventCategory::Cultural => "cultural",
            EventCategory::WeekendEvent => "weekend_event",
            EventCategory::Baseline => "baseline",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mega_festival" => Ok(EventCategory::MegaFestival),
            "sports" => Ok(EventCategory::Sports),
            "cultural" => Ok(EventCategory::Cultural),
            "weekend_event" => Ok(EventCategory::WeekendEvent),
            "baseline" => Ok(EventCategory::Baseline),
            other => Err(format!("unknown event category '{}'", other)),
        }
    }
}
