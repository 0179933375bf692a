//! # Parkcast
//!
//! Departure-day revenue attribution engine for a multi-garage parking
//! operation.
//!
//! This crate takes a bounded window of per-day baseline revenue forecasts
//! (produced externally from bookings, weather and seasonal models) and
//! re-distributes each day's expected revenue onto the days on which
//! multi-day visitors actually depart and pay. It then adds decayed
//! "spillover" contributions to the days following an event, and recomputes
//! the per-garage breakdown so it stays consistent with the new totals.
//!
//! ## Architecture
//!
//! The crate is organized into three logical modules:
//!
//! - [`models`]: Forecast records, event categories and attribution output
//! - [`config`]: Stay-length, multiplier and spillover profile tables with
//!   embedded calibrated defaults and TOML loading
//! - [`services`]: Event classification, the two-pass attribution engine and
//!   the before/after comparison assembler
//!
//! ## Usage
//!
//! ```no_run
//! use parkcast::config::AttributionConfig;
//! use parkcast::services::attribution::AttributionEngine;
//!
//! let engine = AttributionEngine::new(AttributionConfig::default()).unwrap();
//! let days = vec![]; // ForecastDay records from the baseline layer
//! let run = engine.attribute(&days);
//! assert_eq!(run.days.len(), days.len());
//! ```
//!
//! The engine is a pure transform: it never mutates its input, never performs
//! I/O, and never fails for per-day data gaps. Only structural configuration
//! problems are fatal, and those are caught when the engine is constructed.

pub mod config;
pub mod models;
pub mod services;
