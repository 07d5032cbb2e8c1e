//! Forecast (TAF) model: partial fragments, change groups and the resolved
//! hourly timeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DisplayStrings, MAX_VISIBILITY_M, Visibility};
use crate::decode::{CloudLayer, ValidPeriod, WeatherToken, Wind};

/// How a fragment affects a list field.
///
/// A change group that does not mention weather leaves the current list
/// alone, while one that reports "no significant weather" clears it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum ListUpdate<T> {
    /// Field not mentioned
    Untouched,
    /// Field explicitly stated as empty
    Cleared,
    /// Field replaced by a non-empty list
    Replace(Vec<T>),
}

impl<T> Default for ListUpdate<T> {
    fn default() -> Self {
        Self::Untouched
    }
}

impl<T: Clone> ListUpdate<T> {
    /// Touched update from a decoded list
    #[must_use]
    pub fn from_list(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Cleared
        } else {
            Self::Replace(items)
        }
    }

    #[must_use]
    pub fn is_touched(&self) -> bool {
        !matches!(self, Self::Untouched)
    }

    /// Resulting list when the update is applied to nothing
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            Self::Replace(items) => items.clone(),
            Self::Untouched | Self::Cleared => Vec::new(),
        }
    }
}

/// Forecast conditions as stated in one block of the report.
///
/// Fields left `None`/[`ListUpdate::Untouched`] were not mentioned by the
/// block.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ForecastFragment {
    pub wind: Option<Wind>,
    /// Visibility in metres
    pub visibility: Option<u32>,
    pub weather: ListUpdate<WeatherToken>,
    pub clouds: ListUpdate<CloudLayer>,
    pub cavok: bool,
    pub nsc: bool,
}

/// Fully resolved forecast conditions for one hour
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ForecastState {
    pub wind: Option<Wind>,
    pub visibility: Option<u32>,
    pub weather: Vec<WeatherToken>,
    pub clouds: Vec<CloudLayer>,
    pub cavok: bool,
    pub nsc: bool,
}

impl ForecastState {
    /// Base state from the base forecast block; every field counts as stated
    #[must_use]
    pub fn from_base(base: &ForecastFragment) -> Self {
        Self {
            wind: base.wind.clone(),
            visibility: base.visibility,
            weather: base.weather.to_vec(),
            clouds: base.clouds.to_vec(),
            cavok: base.cavok,
            nsc: base.nsc,
        }
    }

    /// Collapse to ceiling and visibility OK
    pub fn reset_to_cavok(&mut self) {
        self.cavok = true;
        self.nsc = false;
        self.visibility = Some(MAX_VISIBILITY_M);
        self.weather.clear();
        self.clouds.clear();
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        Visibility {
            value: self.visibility,
            cavok: self.cavok,
        }
    }
}

/// Change group type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    #[serde(rename = "BECMG")]
    Becoming,
    #[serde(rename = "TEMPO")]
    Temporary,
    #[serde(rename = "PROB30")]
    Probability30,
    #[serde(rename = "PROB40")]
    Probability40,
    #[serde(rename = "PROB30_TEMPO")]
    Probability30Temporary,
    #[serde(rename = "PROB40_TEMPO")]
    Probability40Temporary,
    /// Unmapped indicator kept as an opaque label
    #[serde(untagged)]
    Other(String),
}

impl ChangeKind {
    /// Map a change indicator, long (`TEMPORARY_FLUCTUATIONS`) or short
    /// (`TEMPO`), optionally given as a code-list reference
    #[must_use]
    pub fn from_indicator(raw: &str) -> Self {
        let token = crate::decode::last_token(raw).to_uppercase();
        match token.as_str() {
            "BECOMING" | "BECMG" => Self::Becoming,
            "TEMPORARY_FLUCTUATIONS" | "TEMPO" => Self::Temporary,
            "PROBABILITY_30" | "PROB30" => Self::Probability30,
            "PROBABILITY_40" | "PROB40" => Self::Probability40,
            "PROBABILITY_30_TEMPORARY_FLUCTUATIONS" | "PROB30_TEMPO" => {
                Self::Probability30Temporary
            }
            "PROBABILITY_40_TEMPORARY_FLUCTUATIONS" | "PROB40_TEMPO" => {
                Self::Probability40Temporary
            }
            _ => Self::Other(token),
        }
    }

    /// Changes that persist from their start onward
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Becoming)
    }

    /// Changes bounded to their own window
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            Self::Temporary
                | Self::Probability30
                | Self::Probability40
                | Self::Probability30Temporary
                | Self::Probability40Temporary
        )
    }

    /// Short coded label
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Becoming => "BECMG",
            Self::Temporary => "TEMPO",
            Self::Probability30 => "PROB30",
            Self::Probability40 => "PROB40",
            Self::Probability30Temporary => "PROB30_TEMPO",
            Self::Probability40Temporary => "PROB40_TEMPO",
            Self::Other(label) => label.as_str(),
        }
    }
}

/// Time-bounded modification of the base forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChangeGroup {
    pub kind: ChangeKind,
    pub period: ValidPeriod,
    pub fragment: ForecastFragment,
}

impl ChangeGroup {
    /// Whether the group affects the hour starting at `time`
    #[must_use]
    pub fn applies_at(&self, time: DateTime<Utc>) -> bool {
        if self.kind.is_persistent() {
            self.period.start.is_some_and(|start| start <= time)
        } else if self.kind.is_temporary() {
            self.period.contains(time)
        } else {
            false
        }
    }
}

/// One resolved hour of the forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TimelineSlot {
    pub time: DateTime<Utc>,
    pub wind: Option<Wind>,
    pub visibility: Visibility,
    pub weather: Vec<WeatherToken>,
    pub clouds: Vec<CloudLayer>,
    pub display: DisplayStrings,
}

impl TimelineSlot {
    #[must_use]
    pub fn from_state(time: DateTime<Utc>, state: ForecastState) -> Self {
        let visibility = state.visibility();
        let display = DisplayStrings::render(
            state.wind.as_ref(),
            &visibility,
            &state.weather,
            &state.clouds,
            state.nsc,
        );

        Self {
            time,
            wind: state.wind,
            visibility,
            weather: state.weather,
            clouds: state.clouds,
            display,
        }
    }
}

/// Forecast extreme temperature and its expected time
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct TemperatureExtreme {
    pub value: Option<f64>,
    pub time: Option<DateTime<Utc>>,
}

/// Forecast maximum and minimum temperature
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct TemperatureForecast {
    pub max: TemperatureExtreme,
    pub min: TemperatureExtreme,
}

/// Station and validity metadata of a forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastHeader {
    pub icao: String,
    pub airport_name: Option<String>,
    pub issued: Option<DateTime<Utc>>,
    pub valid_start: Option<DateTime<Utc>>,
    pub valid_end: Option<DateTime<Utc>>,
    pub temperatures: TemperatureForecast,
}

/// One decoded aerodrome forecast with its hourly timeline
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastRecord {
    pub header: ForecastHeader,
    pub timeline: Vec<TimelineSlot>,
}

/// Run of consecutive timeline slots sharing a derived value
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TimelineSegment<K> {
    pub value: K,
    pub start_index: usize,
    pub hour_count: usize,
}
