//! Field decoders
//!
//! Leaf decoders turning tree nodes into typed values. None of them fail:
//! malformed or missing input degrades to `None` or to a documented default.

pub mod cloud;
pub mod header;
pub mod values;
pub mod weather_code;
pub mod wind;

pub use cloud::{CloudLayer, FEET_PER_METRE, ceiling_ft, decode_cloud_layer, format_cloud_base};
pub use header::{ValidPeriod, airport_icao, airport_name, time_instant};
pub use values::{
    format_number, last_token, node_number, number, parse_timestamp, resolve_day_hour,
    signed_temperature, temperature_token, whole,
};
pub use weather_code::{
    Descriptor, Intensity, Phenomenon, WeatherCategory, WeatherToken, decode_weather_code,
    primary_icon, resolve_icon_key,
};
pub use wind::{Wind, WindBarb, decode_wind, normalize_speed_unit};

use crate::document::Node;

/// Nil reason marking a field as "nothing of operational significance"
const NOTHING_SIGNIFICANT: &str = "nothingofoperationalsignificance";

/// Whether a node is nilled as "nothing of operational significance"
#[must_use]
pub fn is_nothing_significant(node: &dyn Node) -> bool {
    node.attribute("nilReason")
        .is_some_and(|reason| reason.to_ascii_lowercase().contains(NOTHING_SIGNIFICANT))
}

/// Decode a weather list entry from its code-list reference or text
#[must_use]
pub fn decode_weather_node(node: &dyn Node) -> Option<WeatherToken> {
    node.attribute("xlink:href")
        .filter(|href| !href.trim().is_empty())
        .or_else(|| node.text())
        .and_then(decode_weather_code)
}
