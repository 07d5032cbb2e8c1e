//! `AeroWx` - Aerodrome weather report decoding
//!
//! This library decodes coded aerodrome observations (METAR) and forecasts
//! (TAF) delivered as XML documents into normalized records, and
//! synthesizes an hourly timeline from a forecast's base state and its
//! change groups. Every parse is a pure function of its input.

pub mod config;
pub mod decode;
pub mod document;
pub mod error;
pub mod metar;
pub mod models;
pub mod parse;
pub mod taf;
pub mod telemetry;

// Re-export core types for public API
pub use config::AeroWxConfig;
pub use decode::{CloudLayer, WeatherToken, Wind, WindBarb, ceiling_ft, decode_weather_code};
pub use document::{Node, XmlElement};
pub use error::AeroWxError;
pub use metar::assemble_observation;
pub use models::{ForecastRecord, ObservationRecord, TimelineSlot};
pub use parse::{parse_metar_xml, parse_taf_xml};
pub use taf::{TimelineOptions, assemble_forecast, segment_timeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AeroWxError>;
