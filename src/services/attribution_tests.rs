#[cfg(test)]
mod tests {
    use crate::config::{AttributionConfig, ConfigError, TruncationPolicy};
    use crate::models::{ConfidenceMetadata, EventCategory, ForecastDay, RevenueMethod};
    use crate::services::attribution::AttributionEngine;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn date(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 5).unwrap() + chrono::Days::new(offset)
    }

    /// Window of `len` consecutive days with the same base revenue and no
    /// events.
    fn quiet_window(len: usize, base_revenue: f64) -> Vec<ForecastDay> {
        (0..len)
            .map(|i| ForecastDay::new(date(i as u64), base_revenue))
            .collect()
    }

    fn with_events(mut day: ForecastDay, events: &[&str]) -> ForecastDay {
        day.events = events.iter().map(|s| s.to_string()).collect();
        day
    }

    fn engine() -> AttributionEngine {
        AttributionEngine::new(AttributionConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_window() {
        let run = engine().attribute(&[]);
        assert!(run.days.is_empty());
        assert_eq!(run.truncated_revenue, 0.0);
    }

    #[test]
    fn test_no_event_window_is_untouched() {
        let days = quiet_window(7, 50_000.0);
        let run = engine().attribute(&days);

        assert_eq!(run.days.len(), 7);
        assert_eq!(run.truncated_revenue, 0.0);
        for day in &run.days {
            assert_eq!(day.revenue, 50_000.0);
            assert_eq!(day.original_revenue, 50_000.0);
            assert_eq!(day.departure_revenue, 0.0);
            assert_eq!(day.spillover_revenue, 0.0);
            assert_eq!(day.revenue_method, RevenueMethod::Original);
        }
    }

    #[test]
    fn test_single_mega_festival_redistribution() {
        // Day 0 hosts the festival; days 1-3 are quiet. Default profile:
        // stays {1: 0.20, 2: 0.25, 3: 0.30, 4: 0.25},
        // multipliers {1: 1.0, 2: 1.8, 3: 2.5, 4: 3.2}.
        let base = 49_013.0;
        let mut days = quiet_window(4, base);
        days[0] = with_events(days[0].clone(), &["Lollapalooza"]);

        let run = engine().attribute(&days);

        let expected_departure = [
            base * 0.20 * 1.0,
            base * 0.25 * 1.8,
            base * 0.30 * 2.5,
            base * 0.25 * 3.2,
        ];
        for (day, expected) in run.days.iter().zip(expected_departure) {
            assert!(
                (day.departure_revenue - expected).abs() < 1e-6,
                "departure on {}: expected {}, got {}",
                day.date,
                expected,
                day.departure_revenue
            );
        }

        // Day 0 is its own departure day for 1-day stays and sees no
        // spillover (nothing precedes it).
        assert_eq!(run.days[0].revenue_method, RevenueMethod::DepartureDay);
        assert_eq!(run.days[0].spillover_revenue, 0.0);
        assert!((run.days[0].revenue - base * 0.20).abs() < 1e-6);

        // Days 1-3 carry departure mass plus decayed spillover from day 0.
        let spillover = [0.398, 0.080, 0.040];
        for k in 1..=3 {
            let day = &run.days[k];
            assert_eq!(day.revenue_method, RevenueMethod::DepartureDayWithSpillover);
            assert!((day.spillover_revenue - base * spillover[k - 1]).abs() < 1e-6);
            assert!(
                (day.revenue - (expected_departure[k] + base * spillover[k - 1])).abs() < 1e-6
            );
        }

        // Every stay departs inside a 4-day window.
        assert_eq!(run.truncated_revenue, 0.0);
    }

    #[test]
    fn test_spillover_decay_window() {
        // Sports event on day 0, nothing else: spillover reaches days 1-3
        // (coefficients 0.50 / 0.10 / 0.05) and day 4 receives none.
        let base = 30_000.0;
        let mut days = quiet_window(5, base);
        days[0] = with_events(days[0].clone(), &["Bulls vs Lakers"]);

        let run = engine().attribute(&days);

        let expected = [base * 0.50, base * 0.10, base * 0.05];
        for k in 1..=3 {
            assert!(
                (run.days[k].spillover_revenue - expected[k - 1]).abs() < 1e-6,
                "day {} spillover",
                k
            );
        }
        assert_eq!(run.days[4].spillover_revenue, 0.0);
        assert_eq!(run.days[4].revenue_method, RevenueMethod::Original);
        assert_eq!(run.days[4].revenue, base);

        // Day 3 gets no departure mass (sports 4-day probability is zero)
        // but the spillover alone upgrades its method.
        assert_eq!(run.days[3].departure_revenue, 0.0);
        assert_eq!(
            run.days[3].revenue_method,
            RevenueMethod::DepartureDayWithSpillover
        );
        assert!((run.days[3].revenue - (base + base * 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_tail_truncation_drops_mass() {
        // Festival on the last day: 2/3/4-day stays depart past the window.
        let base = 49_013.0;
        let mut days = quiet_window(3, base);
        days[2] = with_events(days[2].clone(), &["Lollapalooza"]);

        let run = engine().attribute(&days);
        assert_eq!(run.days.len(), 3);

        let kept = base * 0.20 * 1.0;
        let dropped = base * (0.25 * 1.8 + 0.30 * 2.5 + 0.25 * 3.2);
        assert!((run.days[2].departure_revenue - kept).abs() < 1e-6);
        assert!((run.truncated_revenue - dropped).abs() < 1e-6);
    }

    #[test]
    fn test_tail_truncation_reconcile_policy() {
        let base = 49_013.0;
        let mut days = quiet_window(3, base);
        days[2] = with_events(days[2].clone(), &["Lollapalooza"]);

        let config = AttributionConfig {
            truncation: TruncationPolicy::Reconcile,
            ..AttributionConfig::default()
        };
        let run = AttributionEngine::new(config).unwrap().attribute(&days);

        let kept = base * 0.20 * 1.0;
        let dropped = base * (0.25 * 1.8 + 0.30 * 2.5 + 0.25 * 3.2);
        // The out-of-window mass is folded into the final day, and the
        // counter still reports how much was affected.
        assert!((run.days[2].departure_revenue - (kept + dropped)).abs() < 1e-6);
        assert!((run.truncated_revenue - dropped).abs() < 1e-6);
    }

    #[test]
    fn test_departure_contributions_accumulate() {
        // Two overlapping festival days: day 1's departures include day 0's
        // 2-day stays and day 1's own 1-day stays.
        let mut days = quiet_window(4, 10_000.0);
        days[0] = with_events(days[0].clone(), &["Lollapalooza Day 1"]);
        days[1] = with_events(days[1].clone(), &["Lollapalooza Day 2"]);

        let run = engine().attribute(&days);

        let expected_day1 = 10_000.0 * 0.25 * 1.8 + 10_000.0 * 0.20 * 1.0;
        assert!((run.days[1].departure_revenue - expected_day1).abs() < 1e-6);
    }

    #[test]
    fn test_garages_recomputed_from_shares() {
        let shares = HashMap::from([
            ("Grant Park North".to_string(), 0.318),
            ("Grant Park South".to_string(), 0.113),
            ("Millennium".to_string(), 0.179),
            ("Lakeside".to_string(), 0.091),
            ("Online".to_string(), 0.299),
        ]);

        let mut days = quiet_window(4, 49_013.0);
        days[0] = with_events(days[0].clone(), &["Lollapalooza"]);
        for day in &mut days {
            day.garage_shares = Some(shares.clone());
        }

        let run = engine().attribute(&days);
        for day in &run.days {
            let garages = day.garages.as_ref().expect("shares were configured");
            assert_eq!(garages.len(), shares.len());
            let total: f64 = garages.values().sum();
            assert!(
                (total - day.revenue).abs() <= day.revenue.abs() * 1e-9 + 1e-9,
                "garage totals on {} diverge: {} vs {}",
                day.date,
                total,
                day.revenue
            );
        }
    }

    #[test]
    fn test_missing_garage_shares_leaves_garages_absent() {
        let mut days = quiet_window(2, 20_000.0);
        days[0] = with_events(days[0].clone(), &["Cubs game"]);

        let run = engine().attribute(&days);
        assert!(run.days.iter().all(|d| d.garages.is_none()));
    }

    #[test]
    fn test_confidence_metadata_passes_through() {
        let mut days = quiet_window(2, 40_000.0);
        days[0] = with_events(days[0].clone(), &["Lollapalooza"]);
        days[0].confidence = ConfidenceMetadata {
            score: Some(82.0),
            level: Some("HIGH".to_string()),
            expected_accuracy: Some("5-10%".to_string()),
            notes: Some("validated run".to_string()),
            extra: serde_json::Map::new(),
        };

        let run = engine().attribute(&days);
        assert_eq!(run.days[0].confidence, days[0].confidence);
        assert_eq!(run.days[1].confidence, ConfidenceMetadata::default());
    }

    #[test]
    fn test_zero_base_revenue_contributes_nothing() {
        let mut days = quiet_window(4, 0.0);
        days[0] = with_events(days[0].clone(), &["Lollapalooza"]);

        let run = engine().attribute(&days);
        for day in &run.days {
            assert_eq!(day.revenue, 0.0);
            assert_eq!(day.spillover_revenue, 0.0);
        }
    }

    #[test]
    fn test_unclassified_event_uses_baseline_profile() {
        // An event that matches no keyword group still redistributes, just
        // with the near-single-day baseline profile.
        let base = 10_000.0;
        let mut days = quiet_window(3, base);
        days[0] = with_events(days[0].clone(), &["Corporate Gala"]);

        let run = engine().attribute(&days);
        assert!((run.days[0].departure_revenue - base * 0.95).abs() < 1e-6);
        assert!((run.days[1].departure_revenue - base * 0.05 * 1.8).abs() < 1e-6);
        // Baseline spillover: 5% onto the next day only.
        assert!((run.days[1].spillover_revenue - base * 0.05).abs() < 1e-6);
        assert_eq!(run.days[2].spillover_revenue, 0.0);
    }

    #[test]
    fn test_engine_rejects_broken_config() {
        let mut config = AttributionConfig::default();
        config.stay_profiles.remove(&EventCategory::Sports);

        match AttributionEngine::new(config) {
            Err(ConfigError::MissingStayProfile(EventCategory::Sports)) => {}
            other => panic!("expected fail-fast config error, got {:?}", other),
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Property-based tests
    // ────────────────────────────────────────────────────────────────────

    fn event_pool() -> Vec<Vec<String>> {
        vec![
            vec![],
            vec!["Lollapalooza".to_string()],
            vec!["Bears vs Packers".to_string()],
            vec!["Symphony Night".to_string()],
            vec!["Summer Festival".to_string()],
            vec!["Unlisted Gala".to_string()],
        ]
    }

    proptest! {
        #[test]
        fn prop_garage_sums_match_revenue(
            revenues in proptest::collection::vec(0.0..200_000.0f64, 1..30),
            event_picks in proptest::collection::vec(0usize..6, 1..30),
            weights in proptest::collection::vec(0.1..10.0f64, 3),
        ) {
            let pool = event_pool();
            let weight_total: f64 = weights.iter().sum();
            let shares: HashMap<String, f64> = weights
                .iter()
                .enumerate()
                .map(|(i, w)| (format!("garage_{}", i), w / weight_total))
                .collect();

            let days: Vec<ForecastDay> = revenues
                .iter()
                .enumerate()
                .map(|(i, &revenue)| {
                    let mut day = ForecastDay::new(date(i as u64), revenue);
                    day.events = pool[event_picks[i % event_picks.len()]].clone();
                    day.garage_shares = Some(shares.clone());
                    day
                })
                .collect();

            let run = engine().attribute(&days);
            prop_assert_eq!(run.days.len(), days.len());

            for day in &run.days {
                let garages = day.garages.as_ref().unwrap();
                let total: f64 = garages.values().sum();
                prop_assert!(
                    (total - day.revenue).abs() <= day.revenue.abs() * 1e-6 + 1e-6,
                    "garage sum {} diverges from revenue {}",
                    total,
                    day.revenue
                );
            }
        }

        #[test]
        fn prop_output_preserves_order_and_originals(
            revenues in proptest::collection::vec(0.0..100_000.0f64, 1..20),
        ) {
            let days: Vec<ForecastDay> = revenues
                .iter()
                .enumerate()
                .map(|(i, &revenue)| {
                    let mut day = ForecastDay::new(date(i as u64), revenue);
                    if i % 3 == 0 {
                        day.events = vec!["Lollapalooza".to_string()];
                    }
                    day
                })
                .collect();

            let run = engine().attribute(&days);
            for (input, output) in days.iter().zip(&run.days) {
                prop_assert_eq!(input.date, output.date);
                prop_assert_eq!(input.base_revenue, output.original_revenue);
            }
        }
    }
}
