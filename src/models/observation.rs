//! Observation (METAR) record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DisplayStrings;
use crate::decode::{CloudLayer, WeatherToken, Wind, format_number};

/// Visibility reported for CAVOK and the "10 km or more" case
pub const MAX_VISIBILITY_M: u32 = 9999;

/// Prevailing visibility in metres
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visibility {
    pub value: Option<u32>,
    pub cavok: bool,
}

impl Visibility {
    /// Visibility forced by CAVOK
    #[must_use]
    pub fn cavok() -> Self {
        Self {
            value: Some(MAX_VISIBILITY_M),
            cavok: true,
        }
    }

    /// Coded rendering, `//` when unknown
    #[must_use]
    pub fn display(&self) -> String {
        self.value
            .map_or_else(|| "//".to_string(), |value| value.to_string())
    }
}

/// Air and dewpoint temperature in degrees Celsius
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct Temperature {
    pub air: Option<f64>,
    pub dewpoint: Option<f64>,
}

/// Altimeter setting
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Qnh {
    pub value: Option<f64>,
    /// Unit of measure, `hPa` unless the report says otherwise
    pub unit: String,
}

impl Qnh {
    #[must_use]
    pub fn display(&self) -> Option<String> {
        self.value.map(|value| format!("Q{}", format_number(value)))
    }
}

/// Wind shear warning
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WindShear {
    pub all_runways: bool,
    /// Affected runway designators, `None` for all runways or when unlisted
    pub runways: Option<Vec<String>>,
}

/// Decoded observation body
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Observation {
    pub wind: Wind,
    pub visibility: Visibility,
    pub weather: Vec<WeatherToken>,
    pub clouds: Vec<CloudLayer>,
    pub temperature: Temperature,
    pub qnh: Qnh,
    pub wind_shear: Option<WindShear>,
    pub display: DisplayStrings,
}

/// Station and timing metadata of an observation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ObservationHeader {
    pub icao: String,
    pub airport_name: Option<String>,
    pub issue_time: Option<DateTime<Utc>>,
    pub observation_time: Option<DateTime<Utc>>,
    /// Report produced without human intervention
    pub automated: bool,
}

/// One decoded aerodrome observation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ObservationRecord {
    pub header: ObservationHeader,
    pub observation: Observation,
    pub cavok_flag: bool,
    pub nsc_flag: bool,
}
