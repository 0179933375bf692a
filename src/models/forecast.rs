//! Forecast day records: engine input and enriched output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque confidence metadata carried on each forecast day.
///
/// The attribution engine copies this through untouched; the fields are only
/// meaningful to the upstream baseline model and the report layer. Unknown
/// keys are preserved via the flattened `extra` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_accuracy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One calendar day within a bounded forecast window, as supplied by the
/// external baseline layer.
///
/// Dates are unique and ascending within a window; the engine treats the
/// position in the slice as the day index. Missing numeric fields default to
/// zero contribution rather than failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// Baseline revenue estimate for this date; immutable input.
    #[serde(default)]
    pub base_revenue: f64,
    /// Free-text event names, possibly empty.
    #[serde(default)]
    pub events: Vec<String>,
    /// Garage name -> fraction of total revenue (fractions sum to 1.0 +/- eps).
    /// Absent when no garage breakdown is configured for the day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub garage_shares: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub confidence: ConfidenceMetadata,
}

impl ForecastDay {
    /// Convenience constructor for a day with no events and no garage split.
    pub fn new(date: NaiveDate, base_revenue: f64) -> Self {
        Self {
            date,
            base_revenue,
            events: Vec::new(),
            garage_shares: None,
            confidence: ConfidenceMetadata::default(),
        }
    }
}

/// How a day's final revenue value was derived.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueMethod {
    /// Untouched baseline estimate.
    Original,
    /// Replaced by accumulated departure-day contributions.
    DepartureDay,
    /// Departure or original value plus spillover from preceding event days.
    DepartureDayWithSpillover,
}

/// A forecast day enriched with departure-day attribution results.
///
/// Produced by [`crate::services::attribution::AttributionEngine::attribute`]
/// as a fresh value; the input [`ForecastDay`] is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedDay {
    pub date: NaiveDate,
    pub events: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garage_shares: Option<HashMap<String, f64>>,
    pub confidence: ConfidenceMetadata,
    /// Copy of the baseline estimate at entry, kept for comparison.
    pub original_revenue: f64,
    /// Revenue attributed to this day as a departure day, 0 if none.
    pub departure_revenue: f64,
    /// Revenue added from preceding event days, 0 if none.
    pub spillover_revenue: f64,
    /// Final value: departure or original, plus spillover.
    pub revenue: f64,
    pub revenue_method: RevenueMethod,
    /// Garage name -> revenue, recomputed as `garage_shares * revenue`.
    /// Absent when the input day carried no garage shares.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garages: Option<HashMap<String, f64>>,
}
