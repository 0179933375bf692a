//! Event classification: free-text event names to profile categories.

use crate::models::EventCategory;

/// Ordered keyword rules, first match wins. Matching is case-insensitive
/// substring search over the joined event text, so descriptive suffixes
/// ("Lollapalooza Day 2 - Main Stage") still classify correctly.
///
/// The table is data-driven so new categories are additive: append a row,
/// never grow a conditional chain.
const KEYWORD_RULES: &[(EventCategory, &[&str])] = &[
    (EventCategory::MegaFestival, &["lollapalooza", "lolla"]),
    (
        EventCategory::Sports,
        &["bears", "bulls", "cubs", "sox", "blackhawks", "dolphins"],
    ),
    (
        EventCategory::Cultural,
        &["symphony", "opera", "broadway", "bell", "tchaikovsky"],
    ),
    (
        EventCategory::WeekendEvent,
        &["festival", "concert", "performance", "show"],
    ),
];

/// Classify a day's event list into a stay-pattern category.
///
/// Pure function with no error conditions: an empty or unmatched event list
/// always yields [`EventCategory::Baseline`].
pub fn classify(events: &[String]) -> EventCategory {
    if events.is_empty() {
        return EventCategory::Baseline;
    }

    let event_text = events.join(" ").to_lowercase();

    for (category, keywords) in KEYWORD_RULES {
        if keywords.iter().any(|kw| event_text.contains(kw)) {
            return *category;
        }
    }

    EventCategory::Baseline
}
