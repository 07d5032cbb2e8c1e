//! Human readable display strings shared by observations and timeline slots

use serde::{Deserialize, Serialize};

use super::Visibility;
use crate::decode::weather_code::CAVOK_ICON;
use crate::decode::{CloudLayer, Intensity, WeatherToken, Wind, primary_icon, temperature_token};

/// Coded cloud rendering when no cloud is reported
const NO_SIGNIFICANT_CLOUD: &str = "NSC";

/// Canonical coded strings for one resolved weather state
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DisplayStrings {
    pub wind: Option<String>,
    pub visibility: String,
    pub weather: String,
    pub clouds: String,
    /// `air/dewpoint` token, observations only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    /// `Q<value>`, observations only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qnh: Option<String>,
    pub weather_icon: String,
    pub weather_intensity: Option<Intensity>,
}

impl DisplayStrings {
    /// Render wind, visibility, weather and cloud for a resolved state
    #[must_use]
    pub fn render(
        wind: Option<&Wind>,
        visibility: &Visibility,
        weather: &[WeatherToken],
        clouds: &[CloudLayer],
        nsc: bool,
    ) -> Self {
        let cavok = visibility.cavok;

        let weather_text = if cavok {
            String::new()
        } else {
            weather
                .iter()
                .map(|token| token.raw.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        };

        let clouds_text = if cavok || nsc {
            NO_SIGNIFICANT_CLOUD.to_string()
        } else {
            clouds
                .iter()
                .filter_map(|layer| layer.raw.as_deref())
                .collect::<Vec<_>>()
                .join(" ")
        };

        Self {
            wind: wind.map(|w| w.raw.clone()),
            visibility: visibility.display(),
            weather: weather_text,
            clouds: clouds_text,
            temperature: None,
            qnh: None,
            weather_icon: if cavok {
                CAVOK_ICON.to_string()
            } else {
                primary_icon(weather)
            },
            weather_intensity: weather.first().map(|token| token.intensity),
        }
    }

    /// Attach the `air/dewpoint` token; only rendered when both are known
    #[must_use]
    pub fn with_temperature(mut self, air: Option<f64>, dewpoint: Option<f64>) -> Self {
        self.temperature = match (air, dewpoint) {
            (Some(_), Some(_)) => Some(format!(
                "{}/{}",
                temperature_token(air),
                temperature_token(dewpoint)
            )),
            _ => None,
        };
        self
    }

    #[must_use]
    pub fn with_qnh(mut self, qnh: Option<String>) -> Self {
        self.qnh = qnh;
        self
    }
}
