//! Weather phenomenon grammar decoder
//!
//! Decodes coded present/forecast weather tokens such as `+TSRA`, `VCFG` or
//! `-SHSN` into intensity, descriptor and phenomena, and ranks decoded
//! tokens to pick the primary display icon.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::values::last_token;

/// Weather intensity or proximity qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intensity {
    /// `-` prefix
    Light,
    /// No prefix
    Moderate,
    /// `+` prefix
    Heavy,
    /// `VC` prefix
    Vicinity,
}

/// Two-letter descriptor qualifying the phenomena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Descriptor {
    #[serde(rename = "MI")]
    Shallow,
    #[serde(rename = "BC")]
    Patches,
    #[serde(rename = "PR")]
    Partial,
    #[serde(rename = "DR")]
    LowDrifting,
    #[serde(rename = "BL")]
    Blowing,
    #[serde(rename = "SH")]
    Showers,
    #[serde(rename = "TS")]
    Thunderstorm,
    #[serde(rename = "FZ")]
    Freezing,
}

impl Descriptor {
    /// Match order used by the decoder
    pub const ALL: [Descriptor; 8] = [
        Descriptor::Shallow,
        Descriptor::Patches,
        Descriptor::Partial,
        Descriptor::LowDrifting,
        Descriptor::Blowing,
        Descriptor::Showers,
        Descriptor::Thunderstorm,
        Descriptor::Freezing,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Descriptor::Shallow => "MI",
            Descriptor::Patches => "BC",
            Descriptor::Partial => "PR",
            Descriptor::LowDrifting => "DR",
            Descriptor::Blowing => "BL",
            Descriptor::Showers => "SH",
            Descriptor::Thunderstorm => "TS",
            Descriptor::Freezing => "FZ",
        }
    }
}

/// Two-letter weather phenomenon code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phenomenon {
    #[serde(rename = "RA")]
    Rain,
    #[serde(rename = "DZ")]
    Drizzle,
    #[serde(rename = "SN")]
    Snow,
    #[serde(rename = "SG")]
    SnowGrains,
    #[serde(rename = "IC")]
    IceCrystals,
    #[serde(rename = "PL")]
    IcePellets,
    #[serde(rename = "GR")]
    Hail,
    #[serde(rename = "GS")]
    SmallHail,
    #[serde(rename = "UP")]
    UnknownPrecipitation,
    #[serde(rename = "FG")]
    Fog,
    #[serde(rename = "BR")]
    Mist,
    #[serde(rename = "HZ")]
    Haze,
    #[serde(rename = "FU")]
    Smoke,
    #[serde(rename = "VA")]
    VolcanicAsh,
    #[serde(rename = "DU")]
    Dust,
    #[serde(rename = "SA")]
    Sand,
    #[serde(rename = "PY")]
    Spray,
    #[serde(rename = "PO")]
    DustWhirls,
    #[serde(rename = "SQ")]
    Squalls,
    #[serde(rename = "FC")]
    FunnelCloud,
    #[serde(rename = "SS")]
    Sandstorm,
    #[serde(rename = "DS")]
    Duststorm,
}

impl Phenomenon {
    pub const ALL: [Phenomenon; 22] = [
        Phenomenon::Rain,
        Phenomenon::Drizzle,
        Phenomenon::Snow,
        Phenomenon::SnowGrains,
        Phenomenon::IceCrystals,
        Phenomenon::IcePellets,
        Phenomenon::Hail,
        Phenomenon::SmallHail,
        Phenomenon::UnknownPrecipitation,
        Phenomenon::Fog,
        Phenomenon::Mist,
        Phenomenon::Haze,
        Phenomenon::Smoke,
        Phenomenon::VolcanicAsh,
        Phenomenon::Dust,
        Phenomenon::Sand,
        Phenomenon::Spray,
        Phenomenon::DustWhirls,
        Phenomenon::Squalls,
        Phenomenon::FunnelCloud,
        Phenomenon::Sandstorm,
        Phenomenon::Duststorm,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Phenomenon::Rain => "RA",
            Phenomenon::Drizzle => "DZ",
            Phenomenon::Snow => "SN",
            Phenomenon::SnowGrains => "SG",
            Phenomenon::IceCrystals => "IC",
            Phenomenon::IcePellets => "PL",
            Phenomenon::Hail => "GR",
            Phenomenon::SmallHail => "GS",
            Phenomenon::UnknownPrecipitation => "UP",
            Phenomenon::Fog => "FG",
            Phenomenon::Mist => "BR",
            Phenomenon::Haze => "HZ",
            Phenomenon::Smoke => "FU",
            Phenomenon::VolcanicAsh => "VA",
            Phenomenon::Dust => "DU",
            Phenomenon::Sand => "SA",
            Phenomenon::Spray => "PY",
            Phenomenon::DustWhirls => "PO",
            Phenomenon::Squalls => "SQ",
            Phenomenon::FunnelCloud => "FC",
            Phenomenon::Sandstorm => "SS",
            Phenomenon::Duststorm => "DS",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }
}

/// A decoded weather token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherToken {
    /// Normalised source token (`+TSRA`)
    pub raw: String,
    pub intensity: Intensity,
    pub descriptor: Option<Descriptor>,
    /// Recognised phenomena in source order
    pub phenomena: Vec<Phenomenon>,
    /// Display icon key, see [`resolve_icon_key`]
    pub icon_key: String,
}

impl WeatherToken {
    /// The implied mist token used when visibility is reduced without
    /// reported weather
    #[must_use]
    pub fn mist() -> Self {
        Self {
            raw: "BR".to_string(),
            intensity: Intensity::Moderate,
            descriptor: None,
            phenomena: vec![Phenomenon::Mist],
            icon_key: Phenomenon::Mist.code().to_string(),
        }
    }

    /// Display category of this token
    #[must_use]
    pub fn category(&self) -> WeatherCategory {
        WeatherCategory::of_icon_key(&self.icon_key)
    }
}

impl fmt::Display for WeatherToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Decode a coded weather token. Accepts a bare token or a code-list
/// reference whose last segment is the token.
///
/// Returns `None` only for empty input. Chunks outside the phenomenon
/// vocabulary are dropped, so unrecognised input yields a token with empty
/// phenomena.
#[must_use]
pub fn decode_weather_code(raw_code: &str) -> Option<WeatherToken> {
    let raw = last_token(raw_code).to_uppercase();
    if raw.is_empty() {
        return None;
    }

    let (intensity, mut cursor) = if let Some(rest) = raw.strip_prefix('+') {
        (Intensity::Heavy, rest)
    } else if let Some(rest) = raw.strip_prefix('-') {
        (Intensity::Light, rest)
    } else if let Some(rest) = raw.strip_prefix("VC") {
        (Intensity::Vicinity, rest)
    } else {
        (Intensity::Moderate, raw.as_str())
    };

    let descriptor = Descriptor::ALL
        .into_iter()
        .find(|d| cursor.starts_with(d.code()));
    if let Some(d) = descriptor {
        cursor = &cursor[d.code().len()..];
    }

    let phenomena: Vec<Phenomenon> = cursor
        .as_bytes()
        .chunks(2)
        .filter(|chunk| chunk.len() == 2)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .filter_map(Phenomenon::from_code)
        .collect();

    let icon_key = resolve_icon_key(descriptor, &phenomena);

    Some(WeatherToken {
        raw,
        intensity,
        descriptor,
        phenomena,
        icon_key,
    })
}

/// Display category, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Thunderstorm,
    Freezing,
    Shower,
    Precipitation,
    Obscuration,
    Other,
}

/// Icon keys per category, in priority order
const CATEGORY_ICON_KEYS: [(WeatherCategory, &[&str]); 5] = [
    (
        WeatherCategory::Thunderstorm,
        &["TS", "TSRA", "TSSN", "TSGR", "TSGS", "TSRASN", "TSSNGR"],
    ),
    (WeatherCategory::Freezing, &["FZRA", "FZDZ", "FZFG"]),
    (
        WeatherCategory::Shower,
        &["SH", "SHRA", "SHSN", "SHGR", "SHGS", "SHRASN"],
    ),
    (
        WeatherCategory::Precipitation,
        &["RA", "SN", "PL", "GR", "GS", "DZ", "SG", "IC", "UP"],
    ),
    (
        WeatherCategory::Obscuration,
        &["FG", "BR", "HZ", "FU", "VA", "DU", "SA", "MIFG", "BCFG", "PRFG"],
    ),
];

/// Keys with an icon but no severity class of their own
const OTHER_ICON_KEYS: [&str; 13] = [
    "BLSN", "BLSA", "BLDU", "DRSN", "DRSA", "DRDU", "PO", "SQ", "FC", "SS", "DS", "CAVOK", "NSW",
];

/// Icon key for empty weather
pub const NO_SIGNIFICANT_WEATHER: &str = "NSW";
/// Icon key for ceiling and visibility OK
pub const CAVOK_ICON: &str = "CAVOK";
/// Icon key for tokens outside the icon set
pub const UNKNOWN_ICON: &str = "UNKNOWN";

impl WeatherCategory {
    #[must_use]
    pub fn of_icon_key(key: &str) -> Self {
        CATEGORY_ICON_KEYS
            .iter()
            .find(|(_, keys)| keys.contains(&key))
            .map_or(WeatherCategory::Other, |(category, _)| *category)
    }
}

fn is_known_icon_key(key: &str) -> bool {
    OTHER_ICON_KEYS.contains(&key)
        || CATEGORY_ICON_KEYS
            .iter()
            .any(|(_, keys)| keys.contains(&key))
}

/// Resolve the icon key: descriptor joined with phenomena when that is a
/// known key, else the bare descriptor, else the first phenomenon, else
/// [`UNKNOWN_ICON`].
#[must_use]
pub fn resolve_icon_key(descriptor: Option<Descriptor>, phenomena: &[Phenomenon]) -> String {
    if let Some(descriptor) = descriptor {
        let joined: String = std::iter::once(descriptor.code())
            .chain(phenomena.iter().map(|p| p.code()))
            .collect();
        if is_known_icon_key(&joined) {
            return joined;
        }
        if is_known_icon_key(descriptor.code()) {
            return descriptor.code().to_string();
        }
    }

    phenomena
        .first()
        .map(|p| p.code())
        .filter(|code| is_known_icon_key(code))
        .unwrap_or(UNKNOWN_ICON)
        .to_string()
}

/// Pick the icon of the most severe token; the first token wins ties.
/// Empty weather yields [`NO_SIGNIFICANT_WEATHER`].
#[must_use]
pub fn primary_icon(weather: &[WeatherToken]) -> String {
    weather
        .iter()
        .min_by_key(|token| token.category())
        .map_or_else(|| NO_SIGNIFICANT_WEATHER.to_string(), |token| token.icon_key.clone())
}
