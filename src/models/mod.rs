//! Data model for forecast windows and attribution output.
//!
//! All types derive Serialize/Deserialize so forecast records can move
//! between the engine and the surrounding CSV/report layers as JSON.

pub mod events;
pub mod forecast;

pub use events::EventCategory;
pub use forecast::{AttributedDay, ConfidenceMetadata, ForecastDay, RevenueMethod};
