//! Stay/spillover profile configuration.
//!
//! This module is the profile store for the attribution engine: per-category
//! stay-length distributions, the global departure multiplier table, and
//! per-category spillover decay coefficients. The tables are configuration
//! data tuned externally; the engine treats them as constants during a run.
//!
//! Configuration is validated once, when the engine is constructed. A missing
//! category or malformed coefficient is fatal at that point, never per-day.

use crate::models::EventCategory;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Longest stay the model distributes revenue over, in days.
pub const MAX_STAY_LENGTH: u32 = 4;

/// How many days after an event spillover is applied.
pub const SPILLOVER_WINDOW: u32 = 3;

/// Result type for configuration loading and validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal configuration errors, detected before any day is processed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing stay-length profile for category '{0}'")]
    MissingStayProfile(EventCategory),

    #[error("missing spillover profile for category '{0}'")]
    MissingSpillover(EventCategory),

    #[error("unknown event category '{0}' in profile configuration")]
    UnknownCategory(String),

    #[error(
        "stay probability {value} for {stay_length}-day stays in '{category}' \
         must be within [0, 1]"
    )]
    InvalidProbability {
        category: EventCategory,
        stay_length: u32,
        value: f64,
    },

    #[error("departure multiplier {value} for {stay_length}-day stays must be >= 1.0")]
    InvalidMultiplier { stay_length: u32, value: f64 },

    #[error(
        "spillover coefficient {value} for day {offset} after '{category}' \
         events must be within [0, 1)"
    )]
    InvalidSpillover {
        category: EventCategory,
        offset: u32,
        value: f64,
    },

    #[error("failed to read profile configuration from '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile configuration")]
    Parse(#[from] toml::de::Error),
}

/// Probability distribution over stay lengths for one event category.
///
/// Probabilities for a category should sum to 1.0; this is a configuration
/// invariant checked in tests, not enforced at runtime.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct StayLengthProfile {
    #[serde(rename = "1_day")]
    pub one_day: f64,
    #[serde(rename = "2_day")]
    pub two_day: f64,
    #[serde(rename = "3_day")]
    pub three_day: f64,
    #[serde(rename = "4_day")]
    pub four_day: f64,
}

impl StayLengthProfile {
    /// `(stay_length, probability)` pairs in ascending stay-length order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> {
        [
            (1, self.one_day),
            (2, self.two_day),
            (3, self.three_day),
            (4, self.four_day),
        ]
        .into_iter()
    }

    /// Total probability mass across all stay lengths.
    pub fn total(&self) -> f64 {
        self.one_day + self.two_day + self.three_day + self.four_day
    }
}

/// Global departure-day multiplier table: a longer stay pays proportionally
/// more on its departure day.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartureMultipliers {
    #[serde(rename = "1_day")]
    pub one_day: f64,
    #[serde(rename = "2_day")]
    pub two_day: f64,
    #[serde(rename = "3_day")]
    pub three_day: f64,
    #[serde(rename = "4_day")]
    pub four_day: f64,
}

impl DepartureMultipliers {
    /// Multiplier for a given stay length in days.
    ///
    /// # Panics
    ///
    /// Panics if `stay_length` is outside `1..=MAX_STAY_LENGTH`; the engine
    /// only iterates lengths produced by [`StayLengthProfile::iter`].
    pub fn for_length(&self, stay_length: u32) -> f64 {
        match stay_length {
            1 => self.one_day,
            2 => self.two_day,
            3 => self.three_day,
            4 => self.four_day,
            other => panic!("unsupported stay length: {}", other),
        }
    }

    /// `(stay_length, multiplier)` pairs in ascending stay-length order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> {
        [
            (1, self.one_day),
            (2, self.two_day),
            (3, self.three_day),
            (4, self.four_day),
        ]
        .into_iter()
    }
}

/// Fraction of a source day's pre-redistribution revenue that leaks into the
/// following 1st/2nd/3rd day.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpilloverProfile {
    pub day_1_after: f64,
    pub day_2_after: f64,
    pub day_3_after: f64,
}

impl SpilloverProfile {
    /// Coefficient for `offset` days after the source event day.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is outside `1..=SPILLOVER_WINDOW`.
    pub fn for_offset(&self, offset: u32) -> f64 {
        match offset {
            1 => self.day_1_after,
            2 => self.day_2_after,
            3 => self.day_3_after,
            other => panic!("unsupported spillover offset: {}", other),
        }
    }

    /// `(offset, coefficient)` pairs in ascending offset order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> {
        [
            (1, self.day_1_after),
            (2, self.day_2_after),
            (3, self.day_3_after),
        ]
        .into_iter()
    }
}

/// What happens to departure mass whose departure day falls past the end of
/// the forecast window.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationPolicy {
    /// Drop the mass silently (the historical behavior). The dropped total is
    /// still reported on the run summary.
    #[default]
    Truncate,
    /// Fold the dropped mass back into the final in-window day so the window
    /// total is preserved.
    Reconcile,
}

/// Immutable profile configuration injected into the attribution engine.
///
/// Constructed from embedded calibrated defaults ([`Default`]), a TOML string
/// or a TOML file, and validated once via [`AttributionConfig::validate`].
/// Never mutated after load.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionConfig {
    pub stay_profiles: HashMap<EventCategory, StayLengthProfile>,
    pub multipliers: DepartureMultipliers,
    pub spillover: HashMap<EventCategory, SpilloverProfile>,
    pub truncation: TruncationPolicy,
}

/// On-disk form of [`AttributionConfig`]: category tables are keyed by the
/// snake_case category names, so a typo in a config file surfaces as
/// [`ConfigError::UnknownCategory`] instead of a silent skip.
#[derive(Debug, Serialize, Deserialize)]
struct RawConfig {
    stay_profiles: BTreeMap<String, StayLengthProfile>,
    multipliers: DepartureMultipliers,
    spillover: BTreeMap<String, SpilloverProfile>,
    #[serde(default)]
    truncation: TruncationPolicy,
}

fn typed_keys<T: Copy>(
    raw: &BTreeMap<String, T>,
) -> ConfigResult<HashMap<EventCategory, T>> {
    raw.iter()
        .map(|(name, value)| {
            let category = name
                .parse::<EventCategory>()
                .map_err(|_| ConfigError::UnknownCategory(name.clone()))?;
            Ok((category, *value))
        })
        .collect()
}

fn string_keys<T: Copy>(typed: &HashMap<EventCategory, T>) -> BTreeMap<String, T> {
    typed
        .iter()
        .map(|(category, value)| (category.as_str().to_string(), *value))
        .collect()
}

impl Default for AttributionConfig {
    /// Calibrated tables from the Lollapalooza 2025 spillover analysis.
    fn default() -> Self {
        let stay_profiles = HashMap::from([
            (
                EventCategory::MegaFestival,
                StayLengthProfile {
                    one_day: 0.20,
                    two_day: 0.25,
                    three_day: 0.30,
                    four_day: 0.25,
                },
            ),
            (
                EventCategory::Sports,
                StayLengthProfile {
                    one_day: 0.70,
                    two_day: 0.25,
                    three_day: 0.05,
                    four_day: 0.00,
                },
            ),
            (
                EventCategory::Cultural,
                StayLengthProfile {
                    one_day: 0.60,
                    two_day: 0.30,
                    three_day: 0.10,
                    four_day: 0.00,
                },
            ),
            (
                EventCategory::WeekendEvent,
                StayLengthProfile {
                    one_day: 0.50,
                    two_day: 0.40,
                    three_day: 0.10,
                    four_day: 0.00,
                },
            ),
            (
                EventCategory::Baseline,
                StayLengthProfile {
                    one_day: 0.95,
                    two_day: 0.05,
                    three_day: 0.00,
                    four_day: 0.00,
                },
            ),
        ]);

        let spillover = HashMap::from([
            (
                EventCategory::MegaFestival,
                SpilloverProfile {
                    day_1_after: 0.398,
                    day_2_after: 0.080,
                    day_3_after: 0.040,
                },
            ),
            (
                EventCategory::Sports,
                SpilloverProfile {
                    day_1_after: 0.500,
                    day_2_after: 0.100,
                    day_3_after: 0.050,
                },
            ),
            (
                EventCategory::Cultural,
                SpilloverProfile {
                    day_1_after: 0.500,
                    day_2_after: 0.100,
                    day_3_after: 0.050,
                },
            ),
            (
                EventCategory::WeekendEvent,
                SpilloverProfile {
                    day_1_after: 0.500,
                    day_2_after: 0.100,
                    day_3_after: 0.050,
                },
            ),
            (
                EventCategory::Baseline,
                SpilloverProfile {
                    day_1_after: 0.05,
                    day_2_after: 0.00,
                    day_3_after: 0.00,
                },
            ),
        ]);

        Self {
            stay_profiles,
            multipliers: DepartureMultipliers {
                one_day: 1.0,
                two_day: 1.8,
                three_day: 2.5,
                four_day: 3.2,
            },
            spillover,
            truncation: TruncationPolicy::default(),
        }
    }
}

impl AttributionConfig {
    /// Parse a configuration from a TOML string.
    ///
    /// Parsing does not validate; call [`AttributionConfig::validate`] (or
    /// hand the value to the engine, which validates on construction).
    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        let raw: RawConfig = toml::from_str(input)?;
        Ok(Self {
            stay_profiles: typed_keys(&raw.stay_profiles)?,
            multipliers: raw.multipliers,
            spillover: typed_keys(&raw.spillover)?,
            truncation: raw.truncation,
        })
    }

    /// Load a configuration from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Serialize the configuration to TOML, so calibrated tables can be
    /// exported and reloaded.
    pub fn to_toml_str(&self) -> Result<String, toml::ser::Error> {
        let raw = RawConfig {
            stay_profiles: string_keys(&self.stay_profiles),
            multipliers: self.multipliers,
            spillover: string_keys(&self.spillover),
            truncation: self.truncation,
        };
        toml::to_string_pretty(&raw)
    }

    /// Check the configuration for structural errors.
    ///
    /// Every category in [`EventCategory::ALL`] must have a stay-length and a
    /// spillover profile; probabilities must lie in `[0, 1]`, multipliers
    /// must be at least 1.0, and spillover coefficients must lie in `[0, 1)`.
    /// Probability sums are deliberately not checked here (tuning data may be
    /// mid-calibration); tests assert the sum-to-one invariant for the
    /// shipped defaults.
    pub fn validate(&self) -> ConfigResult<()> {
        for category in EventCategory::ALL {
            let profile = self
                .stay_profiles
                .get(&category)
                .ok_or(ConfigError::MissingStayProfile(category))?;
            for (stay_length, value) in profile.iter() {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::InvalidProbability {
                        category,
                        stay_length,
                        value,
                    });
                }
            }

            let spillover = self
                .spillover
                .get(&category)
                .ok_or(ConfigError::MissingSpillover(category))?;
            for (offset, value) in spillover.iter() {
                if !value.is_finite() || !(0.0..1.0).contains(&value) {
                    return Err(ConfigError::InvalidSpillover {
                        category,
                        offset,
                        value,
                    });
                }
            }
        }

        for (stay_length, value) in self.multipliers.iter() {
            if !value.is_finite() || value < 1.0 {
                return Err(ConfigError::InvalidMultiplier { stay_length, value });
            }
        }

        Ok(())
    }
}

static DEFAULT_CONFIG: Lazy<AttributionConfig> = Lazy::new(|| {
    let config = AttributionConfig::default();
    config
        .validate()
        .expect("embedded default profile tables must be valid");
    config
});

/// Process-wide read-only default configuration, initialized on first use.
pub fn default_config() -> &'static AttributionConfig {
    &DEFAULT_CONFIG
}
