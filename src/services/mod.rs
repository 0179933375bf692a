//! Service layer: event classification, attribution and reporting.
//!
//! Services implement the business logic over the data model. The flow is
//! one way: a window of forecast days passes through the classifier and the
//! attribution engine, and the assembler merges the results into the
//! before/after comparison consumed by the report layer.

pub mod assembler;

pub mod attribution;

pub mod classifier;

#[cfg(test)]
mod attribution_tests;

pub use assembler::{compare, ActualObservation, RevenueComparison};
pub use attribution::{AttributionEngine, AttributionRun};
pub use classifier::classify;
