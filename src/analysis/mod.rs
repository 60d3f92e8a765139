//! Run-level bookkeeping that sits beside the search itself.
pub mod telemetry;

pub use telemetry::{SearchTelemetry, TelemetryReport, TierStats};
