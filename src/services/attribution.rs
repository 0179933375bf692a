//! Two-pass departure-day revenue attribution.
//!
//! Pass A walks the window forward and redistributes each event day's
//! baseline revenue onto the days its visitors depart, weighted by the
//! stay-length probabilities and departure multipliers for the day's event
//! category. Pass B then assigns the accumulated departure totals, layers
//! decayed spillover from the preceding event days on top, and recomputes
//! the per-garage breakdown so it stays consistent with the new totals.

use serde::Serialize;

use super::classifier::classify;
use crate::config::{AttributionConfig, ConfigResult, TruncationPolicy, SPILLOVER_WINDOW};
use crate::models::{AttributedDay, ForecastDay, RevenueMethod};

/// Output of one attribution run over a forecast window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionRun {
    /// Enriched days, same order and length as the input window.
    pub days: Vec<AttributedDay>,
    /// Departure mass whose departure day fell past the end of the window.
    ///
    /// Under [`TruncationPolicy::Truncate`] this revenue is lost (a known
    /// boundary limitation of a bounded forecast horizon); under
    /// [`TruncationPolicy::Reconcile`] it was folded back into the final
    /// in-window day. Either way the counter records how much mass was
    /// affected.
    pub truncated_revenue: f64,
}

/// Departure-day revenue attribution engine.
///
/// Holds an immutable, validated profile configuration. Each call to
/// [`AttributionEngine::attribute`] is an independent pure transform; there
/// is no state shared across invocations.
#[derive(Debug, Clone)]
pub struct AttributionEngine {
    config: AttributionConfig,
}

impl AttributionEngine {
    /// Build an engine around the given profile configuration.
    ///
    /// Fails fast on structural configuration problems (missing category,
    /// malformed coefficient) so that no per-day processing ever has to deal
    /// with an incomplete profile store.
    pub fn new(config: AttributionConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &AttributionConfig {
        &self.config
    }

    /// Redistribute a forecast window's revenue onto departure days and
    /// apply post-event spillover.
    ///
    /// Returns a fresh enriched window; the input is never mutated. Per-day
    /// data gaps (no events, no garage shares) degrade gracefully and never
    /// fail the run.
    pub fn attribute(&self, days: &[ForecastDay]) -> AttributionRun {
        let departure = self.redistribute(days);
        self.assemble(days, departure)
    }

    /// Pass A: forward stay-length redistribution.
    ///
    /// Days with an empty event list are left alone; their visitors are
    /// already captured by the baseline model and redistributing them would
    /// perturb event-free windows.
    fn redistribute(&self, days: &[ForecastDay]) -> DepartureAccumulator {
        let mut accumulator = DepartureAccumulator::new(days.len());

        for (i, day) in days.iter().enumerate() {
            if day.events.is_empty() {
                continue;
            }

            let category = classify(&day.events);
            // Presence for every category is validated in new().
            let profile = &self.config.stay_profiles[&category];

            for (stay_length, probability) in profile.iter() {
                if probability <= 0.0 {
                    continue;
                }
                let contribution =
                    day.base_revenue * probability * self.config.multipliers.for_length(stay_length);
                let departure_index = i + stay_length as usize - 1;

                if departure_index < days.len() {
                    accumulator.add(departure_index, contribution);
                } else {
                    accumulator.truncated += contribution;
                    log::debug!(
                        "departure revenue {:.2} from {} truncated: {}-day stays depart past the window",
                        contribution,
                        day.date,
                        stay_length
                    );
                }
            }
        }

        if accumulator.truncated > 0.0 && self.config.truncation == TruncationPolicy::Reconcile {
            let truncated = accumulator.truncated;
            if let Some(last_index) = days.len().checked_sub(1) {
                accumulator.add(last_index, truncated);
            }
        }

        accumulator
    }

    /// Pass B: assignment, backward spillover and garage recomputation.
    fn assemble(&self, days: &[ForecastDay], departure: DepartureAccumulator) -> AttributionRun {
        let mut enriched = Vec::with_capacity(days.len());

        for (j, day) in days.iter().enumerate() {
            let original_revenue = day.base_revenue;

            let (mut revenue, departure_revenue, mut revenue_method) = match departure.get(j) {
                Some(amount) => (amount, amount, RevenueMethod::DepartureDay),
                None => (original_revenue, 0.0, RevenueMethod::Original),
            };

            let spillover_revenue = self.spillover_into(days, j);
            if spillover_revenue > 0.0 {
                revenue += spillover_revenue;
                revenue_method = RevenueMethod::DepartureDayWithSpillover;
            }

            // Per-garage values must always sum to the day's revenue, no
            // matter how many redistribution/spillover steps touched it.
            let garages = day.garage_shares.as_ref().map(|shares| {
                shares
                    .iter()
                    .map(|(garage, share)| (garage.clone(), revenue * share))
                    .collect()
            });

            enriched.push(AttributedDay {
                date: day.date,
                events: day.events.clone(),
                garage_shares: day.garage_shares.clone(),
                confidence: day.confidence.clone(),
                original_revenue,
                departure_revenue,
                spillover_revenue,
                revenue,
                revenue_method,
                garages,
            });
        }

        AttributionRun {
            days: enriched,
            truncated_revenue: departure.truncated,
        }
    }

    /// Spillover flowing into day `j` from the up-to-three preceding event
    /// days, computed from their pre-redistribution revenue. Never looks
    /// back before the window start.
    fn spillover_into(&self, days: &[ForecastDay], j: usize) -> f64 {
        let mut spillover = 0.0;

        for offset in 1..=SPILLOVER_WINDOW {
            let Some(source_index) = j.checked_sub(offset as usize) else {
                break;
            };
            let source = &days[source_index];
            if source.events.is_empty() {
                continue;
            }

            let category = classify(&source.events);
            let coefficient = self.config.spillover[&category].for_offset(offset);
            spillover += source.base_revenue * coefficient;
        }

        spillover
    }
}

/// Per-departure-day revenue accumulator for Pass A.
///
/// Distinguishes "no contribution landed here" (the day keeps its original
/// revenue) from an accumulated zero.
struct DepartureAccumulator {
    slots: Vec<Option<f64>>,
    truncated: f64,
}

impl DepartureAccumulator {
    fn new(window_len: usize) -> Self {
        Self {
            slots: vec![None; window_len],
            truncated: 0.0,
        }
    }

    fn add(&mut self, index: usize, amount: f64) {
        *self.slots[index].get_or_insert(0.0) += amount;
    }

    fn get(&self, index: usize) -> Option<f64> {
        self.slots[index]
    }
}
