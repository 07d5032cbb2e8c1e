//! Surface wind decoder and wind barb derivation

use serde::{Deserialize, Serialize};

use super::values::{node_number, whole};
use crate::document::Node;

/// Canonical unit used when a report carries no unit
pub const DEFAULT_SPEED_UNIT: &str = "KT";

/// Decoded surface wind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wind {
    /// Canonical coded token (`24015G25KT`, `VRB03KT`, `00000KT`)
    pub raw: String,
    /// Degrees true, 0 when variable or unknown
    pub direction: u16,
    pub speed: u32,
    pub gust: Option<u32>,
    pub unit: String,
    pub variable: bool,
    pub barb: WindBarb,
}

/// Graphical wind barb descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindBarb {
    /// Rounded speed as a string, or `calm`
    pub barb_key: String,
    /// Rotation in degrees, 0 for calm or variable wind
    pub rotation: u16,
    /// 50-unit flags
    pub pennants: u32,
    /// 10-unit bars
    pub long_barbs: u32,
    /// 5-unit bars
    pub short_barbs: u32,
}

impl WindBarb {
    #[must_use]
    pub fn calm() -> Self {
        Self {
            barb_key: "calm".to_string(),
            rotation: 0,
            pennants: 0,
            long_barbs: 0,
            short_barbs: 0,
        }
    }

    /// Derive the barb for a speed and direction. Speeds up to 2 units are
    /// calm; otherwise the speed is rounded to the nearest 5 units and split
    /// into pennants, long and short bars.
    #[must_use]
    pub fn for_speed(speed: u32, direction: u16, variable: bool) -> Self {
        if speed <= 2 {
            return Self::calm();
        }

        let rounded = speed.saturating_add(2) / 5 * 5;
        let pennants = rounded / 50;
        let long_barbs = rounded % 50 / 10;
        let short_barbs = rounded % 10 / 5;

        Self {
            barb_key: rounded.to_string(),
            rotation: if variable { 0 } else { direction },
            pennants,
            long_barbs,
            short_barbs,
        }
    }
}

impl Wind {
    /// Calm wind in knots, used when an observation carries no wind block
    #[must_use]
    pub fn calm() -> Self {
        Self::new(0, 0, None, DEFAULT_SPEED_UNIT.to_string(), false)
    }

    /// Build a wind value, synthesizing the raw token and the barb
    #[must_use]
    pub fn new(direction: u16, speed: u32, gust: Option<u32>, unit: String, variable: bool) -> Self {
        let raw = format_wind_raw(direction, speed, gust, &unit, variable);
        let direction = if variable { 0 } else { direction };
        let barb = if is_calm(direction, speed, gust, variable) {
            WindBarb::calm()
        } else {
            WindBarb::for_speed(speed, direction, variable)
        };

        Self {
            raw,
            direction,
            speed,
            gust,
            unit,
            variable,
            barb,
        }
    }
}

fn is_calm(direction: u16, speed: u32, gust: Option<u32>, variable: bool) -> bool {
    speed == 0 && direction == 0 && gust.unwrap_or(0) == 0 && !variable
}

/// Decode a wind block (`AerodromeSurfaceWind` or its forecast variant).
///
/// Direction, speed and gust fall back across synonym element names.
/// Missing or malformed direction and speed decode as 0.
#[must_use]
pub fn decode_wind(node: &dyn Node) -> Wind {
    let direction_node = node.first_child(&["iwxxm:meanWindDirection", "iwxxm:windDirection"]);
    let speed_node = node.first_child(&["iwxxm:meanWindSpeed", "iwxxm:windSpeed"]);
    let gust_node = node.first_child(&["iwxxm:windGustSpeed", "iwxxm:gustSpeed"]);

    let raw_unit = speed_node
        .and_then(|n| n.attribute("uom"))
        .or_else(|| gust_node.and_then(|n| n.attribute("uom")))
        .or_else(|| node.attribute("uom"));

    let direction = node_number(direction_node)
        .and_then(whole)
        .and_then(|d| u16::try_from(d).ok())
        .unwrap_or(0);
    let speed = node_number(speed_node).and_then(whole).unwrap_or(0);
    let gust = node_number(gust_node).and_then(whole);

    Wind::new(
        direction,
        speed,
        gust,
        normalize_speed_unit(raw_unit),
        node.flag("variableWindDirection"),
    )
}

/// Map unit-of-measure codes to the coded speed unit.
/// Unrecognised units pass through unchanged; a missing unit is knots.
#[must_use]
pub fn normalize_speed_unit(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|u| !u.is_empty()) else {
        return DEFAULT_SPEED_UNIT.to_string();
    };

    match raw.to_ascii_lowercase().as_str() {
        "[kn_i]" | "kt" | "knot" | "kn" => DEFAULT_SPEED_UNIT.to_string(),
        "m/s" | "mps" => "MPS".to_string(),
        "km/h" | "kmh" => "KMH".to_string(),
        _ => raw.to_string(),
    }
}

/// Canonical coded token: `DDDSS[GGG]UNIT`, `VRB` for variable direction,
/// all zeros for calm
#[must_use]
pub fn format_wind_raw(
    direction: u16,
    speed: u32,
    gust: Option<u32>,
    unit: &str,
    variable: bool,
) -> String {
    if is_calm(direction, speed, gust, variable) {
        return format!("00000{unit}");
    }

    let direction_token = if variable {
        "VRB".to_string()
    } else {
        format!("{direction:03}")
    };
    let gust_token = gust.map(|g| format!("G{g:02}")).unwrap_or_default();

    format!("{direction_token}{speed:02}{gust_token}{unit}")
}
