//! Observation (METAR) assembler
//!
//! Composes the field decoders into one observation record. The envelope
//! item supplies the airport identity; everything else comes from the
//! report node.

use tracing::{debug, instrument};

use crate::decode::{
    CloudLayer, WeatherToken, Wind, airport_icao, airport_name, decode_cloud_layer,
    decode_weather_node, decode_wind, is_nothing_significant, node_number, number, time_instant,
    whole,
};
use crate::document::Node;
use crate::models::{
    DisplayStrings, Observation, ObservationHeader, ObservationRecord, Qnh, Temperature, Visibility,
    WindShear,
};

const CAVOK_ATTRIBUTE: &str = "cloudAndVisibilityOK";
const DEFAULT_QNH_UNIT: &str = "hPa";

const VISIBILITY_PATHS: [&[&str]; 3] = [
    &[
        "iwxxm:visibility",
        "iwxxm:AerodromeHorizontalVisibility",
        "iwxxm:prevailingVisibility",
    ],
    &["iwxxm:visibility", "iwxxm:prevailingVisibility"],
    &["iwxxm:visibility"],
];

/// Assemble an observation from an envelope item and its report node.
///
/// Returns `None` when no airport identifier can be found.
#[instrument(skip_all)]
pub fn assemble_observation(item: &dyn Node, report: &dyn Node) -> Option<ObservationRecord> {
    let Some(icao) = airport_icao(item, report) else {
        debug!("Observation without airport identifier, skipping");
        return None;
    };

    let observation_node = report.path(&[
        "iwxxm:observation",
        "iwxxm:MeteorologicalAerodromeObservation",
    ]);

    let cavok = report.flag(CAVOK_ATTRIBUTE)
        || observation_node.is_some_and(|obs| obs.flag(CAVOK_ATTRIBUTE));

    let header = ObservationHeader {
        icao,
        airport_name: airport_name(item, report),
        issue_time: time_instant(report, "iwxxm:issueTime"),
        observation_time: time_instant(report, "iwxxm:observationTime"),
        automated: report.flag("automatedStation"),
    };

    let fields = observation_node.map_or_else(
        || {
            debug!("Report carries no observation block");
            ObservationFields::empty(cavok)
        },
        |obs| ObservationFields::decode(obs, cavok),
    );

    debug!(
        icao = %header.icao,
        cavok,
        nsc = fields.nsc,
        weather = fields.weather.len(),
        clouds = fields.clouds.len(),
        "Assembled observation"
    );

    Some(fields.into_record(header))
}

/// Decoded content of a `MeteorologicalAerodromeObservation` block
struct ObservationFields {
    wind: Wind,
    visibility: Visibility,
    weather: Vec<WeatherToken>,
    clouds: Vec<CloudLayer>,
    nsc: bool,
    temperature: Temperature,
    qnh: Qnh,
    wind_shear: Option<WindShear>,
}

impl ObservationFields {
    fn empty(cavok: bool) -> Self {
        Self {
            wind: Wind::calm(),
            visibility: if cavok {
                Visibility::cavok()
            } else {
                Visibility::default()
            },
            weather: Vec::new(),
            clouds: Vec::new(),
            nsc: false,
            temperature: Temperature::default(),
            qnh: Qnh {
                value: None,
                unit: DEFAULT_QNH_UNIT.to_string(),
            },
            wind_shear: None,
        }
    }

    fn decode(obs: &dyn Node, cavok: bool) -> Self {
        let wind = obs
            .path(&["iwxxm:surfaceWind", "iwxxm:AerodromeSurfaceWind"])
            .map_or_else(Wind::calm, decode_wind);

        let visibility = if cavok {
            Visibility::cavok()
        } else {
            Visibility {
                value: node_number(obs.first_path(&VISIBILITY_PATHS)).and_then(whole),
                cavok: false,
            }
        };

        let weather = if cavok {
            Vec::new()
        } else {
            obs.array("iwxxm:presentWeather")
                .into_iter()
                .filter(|node| !is_nothing_significant(*node))
                .filter_map(decode_weather_node)
                .collect()
        };

        let cloud_node = obs.child("iwxxm:cloud");
        let nsc = cloud_node.is_some_and(is_nothing_significant);
        let clouds = match cloud_node {
            Some(cloud) if !cavok && !nsc => cloud
                .child("iwxxm:AerodromeCloud")
                .map(|block| block.array("iwxxm:layer"))
                .unwrap_or_default()
                .into_iter()
                .filter_map(decode_cloud_layer)
                .collect(),
            _ => Vec::new(),
        };

        let temperature = Temperature {
            air: node_number(obs.child("iwxxm:airTemperature")),
            dewpoint: node_number(obs.child("iwxxm:dewpointTemperature")),
        };

        let qnh_node = obs.child("iwxxm:qnh");
        let qnh = Qnh {
            value: number(qnh_node.and_then(|n| n.text())),
            unit: qnh_node
                .and_then(|n| n.attribute("uom"))
                .map_or_else(|| DEFAULT_QNH_UNIT.to_string(), str::to_string),
        };

        Self {
            wind,
            visibility,
            weather,
            clouds,
            nsc,
            temperature,
            qnh,
            wind_shear: decode_wind_shear(obs),
        }
    }

    fn into_record(self, header: ObservationHeader) -> ObservationRecord {
        let display = DisplayStrings::render(
            Some(&self.wind),
            &self.visibility,
            &self.weather,
            &self.clouds,
            self.nsc,
        )
        .with_temperature(self.temperature.air, self.temperature.dewpoint)
        .with_qnh(self.qnh.display());

        let cavok_flag = self.visibility.cavok;

        ObservationRecord {
            header,
            observation: Observation {
                wind: self.wind,
                visibility: self.visibility,
                weather: self.weather,
                clouds: self.clouds,
                temperature: self.temperature,
                qnh: self.qnh,
                wind_shear: self.wind_shear,
                display,
            },
            cavok_flag,
            nsc_flag: self.nsc,
        }
    }
}

/// Wind shear block: all runways, or the listed runway designators
fn decode_wind_shear(obs: &dyn Node) -> Option<WindShear> {
    let shear = obs
        .path(&["iwxxm:windShear", "iwxxm:AerodromeWindShear"])
        .or_else(|| obs.child("iwxxm:AerodromeWindShear"))?;

    if shear.flag("allRunways") {
        return Some(WindShear {
            all_runways: true,
            runways: None,
        });
    }

    let runways: Vec<String> = shear
        .array("iwxxm:runway")
        .into_iter()
        .filter_map(|runway| runway.text())
        .map(str::to_string)
        .collect();

    Some(WindShear {
        all_runways: false,
        runways: (!runways.is_empty()).then_some(runways),
    })
}
