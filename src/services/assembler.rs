//! Result assembly: before/after comparison of a forecast window.
//!
//! This is reporting, not part of the numeric contract. The comparison is
//! computed as a structured value; rendering it to text is a pure formatting
//! step with no side effects.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;

use super::attribution::AttributionRun;
use super::classifier::classify;
use crate::config::AttributionConfig;
use crate::models::{EventCategory, ForecastDay, RevenueMethod};

/// Known actual revenue for one date, used to score the attributed forecast
/// after the fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActualObservation {
    pub date: NaiveDate,
    pub revenue: f64,
}

/// One day of the before/after comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub date: NaiveDate,
    pub weekday: String,
    pub original: f64,
    pub departure: f64,
    pub spillover: f64,
    pub final_revenue: f64,
    pub change: f64,
    pub method: RevenueMethod,
}

/// Accuracy of the attributed forecast against one known actual value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationEntry {
    pub date: NaiveDate,
    pub actual: f64,
    pub forecast: f64,
    /// `(1 - |forecast - actual| / actual) * 100`; absent when the actual
    /// value is zero.
    pub accuracy_pct: Option<f64>,
}

/// Stay-length distribution for a category that appeared in the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StayPatternSummary {
    pub category: EventCategory,
    /// `(stay_length, probability)` pairs with non-zero probability.
    pub stays: Vec<(u32, f64)>,
}

/// Before/after comparison of an attribution run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueComparison {
    pub rows: Vec<ComparisonRow>,
    pub original_total: f64,
    pub attributed_total: f64,
    pub net_redistribution: f64,
    pub truncated_revenue: f64,
    /// Stay patterns for the event categories observed in the window, in
    /// enum declaration order.
    pub stay_patterns: Vec<StayPatternSummary>,
    pub validation: Option<ValidationEntry>,
}

/// Merge the original window and an attribution run into a comparison.
///
/// `original` and `run.days` are positionally aligned (same order, same
/// length, per the engine's output contract). If the caller supplies a known
/// actual value for a date that is not in the window, the validation entry
/// is omitted and a warning is logged.
pub fn compare(
    original: &[ForecastDay],
    run: &AttributionRun,
    config: &AttributionConfig,
    actual: Option<ActualObservation>,
) -> RevenueComparison {
    let rows: Vec<ComparisonRow> = original
        .iter()
        .zip(&run.days)
        .map(|(before, after)| ComparisonRow {
            date: after.date,
            weekday: after.date.format("%a").to_string(),
            original: before.base_revenue,
            departure: after.departure_revenue,
            spillover: after.spillover_revenue,
            final_revenue: after.revenue,
            change: after.revenue - before.base_revenue,
            method: after.revenue_method,
        })
        .collect();

    let original_total: f64 = rows.iter().map(|r| r.original).sum();
    let attributed_total: f64 = rows.iter().map(|r| r.final_revenue).sum();

    let stay_patterns = observed_stay_patterns(original, config);

    let validation = actual.and_then(|observation| {
        let row = rows.iter().find(|r| r.date == observation.date);
        match row {
            Some(row) => Some(ValidationEntry {
                date: observation.date,
                actual: observation.revenue,
                forecast: row.final_revenue,
                accuracy_pct: (observation.revenue != 0.0).then(|| {
                    (1.0 - (row.final_revenue - observation.revenue).abs()
                        / observation.revenue.abs())
                        * 100.0
                }),
            }),
            None => {
                log::warn!(
                    "validation date {} is outside the forecast window",
                    observation.date
                );
                None
            }
        }
    });

    RevenueComparison {
        rows,
        original_total,
        attributed_total,
        net_redistribution: attributed_total - original_total,
        truncated_revenue: run.truncated_revenue,
        stay_patterns,
        validation,
    }
}

/// Stay patterns for the categories that actually occur in the window.
fn observed_stay_patterns(
    days: &[ForecastDay],
    config: &AttributionConfig,
) -> Vec<StayPatternSummary> {
    EventCategory::ALL
        .into_iter()
        .filter(|category| {
            days.iter()
                .any(|d| !d.events.is_empty() && classify(&d.events) == *category)
        })
        .filter_map(|category| {
            let profile = config.stay_profiles.get(&category)?;
            Some(StayPatternSummary {
                category,
                stays: profile.iter().filter(|(_, p)| *p > 0.0).collect(),
            })
        })
        .collect()
}

impl RevenueComparison {
    /// Render the comparison as a plain-text report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "DEPARTURE-DAY REVENUE ATTRIBUTION");
        let _ = writeln!(out, "{}", "=".repeat(80));
        let _ = writeln!(out);

        let _ = writeln!(out, "REVENUE REDISTRIBUTION SUMMARY");
        let _ = writeln!(out, "{}", "-".repeat(50));
        let _ = writeln!(out, "Original model total:   ${:.0}", self.original_total);
        let _ = writeln!(out, "Attributed total:       ${:.0}", self.attributed_total);
        let _ = writeln!(
            out,
            "Net redistribution:     ${:+.0}",
            self.net_redistribution
        );
        if self.truncated_revenue > 0.0 {
            let _ = writeln!(
                out,
                "Truncated at window end: ${:.0}",
                self.truncated_revenue
            );
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "DAILY REVENUE REDISTRIBUTION");
        let _ = writeln!(out, "{}", "-".repeat(90));
        let _ = writeln!(
            out,
            "{:<12} {:<5} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "Date", "Day", "Original", "Departure", "Spillover", "Final", "Change"
        );
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<12} {:<5} {:>12.0} {:>12.0} {:>12.0} {:>12.0} {:>+12.0}",
                row.date.format("%Y-%m-%d"),
                row.weekday,
                row.original,
                row.departure,
                row.spillover,
                row.final_revenue,
                row.change
            );
        }
        let _ = writeln!(out);

        if !self.stay_patterns.is_empty() {
            let _ = writeln!(out, "EVENT STAY PATTERNS");
            let _ = writeln!(out, "{}", "-".repeat(50));
            for pattern in &self.stay_patterns {
                let _ = writeln!(out, "{}:", pattern.category);
                for (stay_length, probability) in &pattern.stays {
                    let _ = writeln!(
                        out,
                        "  {}-day stays: {:.0}%",
                        stay_length,
                        probability * 100.0
                    );
                }
            }
            let _ = writeln!(out);
        }

        if let Some(validation) = &self.validation {
            let _ = writeln!(out, "MODEL VALIDATION ({})", validation.date);
            let _ = writeln!(out, "{}", "-".repeat(40));
            let _ = writeln!(out, "Actual revenue:   ${:.2}", validation.actual);
            let _ = writeln!(out, "Attributed model: ${:.0}", validation.forecast);
            if let Some(accuracy) = validation.accuracy_pct {
                let _ = writeln!(out, "Accuracy: {:.1}%", accuracy);
            }
        }

        out
    }
}
