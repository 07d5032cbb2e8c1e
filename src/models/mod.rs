//! Data models for decoded aerodrome reports
//!
//! This module contains the output value types organized by concern:
//! - Observation: single point-in-time report and its header
//! - Forecast: partial fragments, change groups and the hourly timeline
//! - Display: canonical coded strings shared by both

pub mod display;
pub mod forecast;
pub mod observation;

// Re-export all public types for convenient access
pub use display::DisplayStrings;
pub use forecast::{
    ChangeGroup, ChangeKind, ForecastFragment, ForecastHeader, ForecastRecord, ForecastState,
    ListUpdate, TemperatureExtreme, TemperatureForecast, TimelineSegment, TimelineSlot,
};
pub use observation::{
    MAX_VISIBILITY_M, Observation, ObservationHeader, ObservationRecord, Qnh, Temperature,
    Visibility, WindShear,
};
