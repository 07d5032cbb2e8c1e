//! Forecast (TAF) assembler
//!
//! Extracts the base forecast and its change groups, then synthesizes the
//! hourly timeline over the validity window.

pub mod change_group;
pub mod timeline;

pub use change_group::{extract_change_groups, parse_fragment};
pub use timeline::{
    TimelineOptions, hour_range, infer_mist, partial_merge, resolve_hour, segment_timeline,
    synthesize,
};

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::decode::{
    ValidPeriod, airport_icao, airport_name, last_token, resolve_day_hour, signed_temperature,
    time_instant,
};
use crate::document::Node;
use crate::models::{
    ForecastFragment, ForecastHeader, ForecastRecord, ForecastState, TemperatureExtreme,
    TemperatureForecast,
};

const BASE_FORECAST: [&str; 2] = ["iwxxm:baseForecast", "iwxxm:MeteorologicalAerodromeForecast"];
const TEMPERATURE_BLOCK: [&str; 2] = ["iwxxm:temperature", "iwxxm:AerodromeAirTemperatureForecast"];

/// Assemble a forecast from an envelope item and its report node.
///
/// Returns `None` when no airport identifier can be found. A missing or
/// unusable validity window yields a record with an empty timeline.
#[instrument(skip_all)]
pub fn assemble_forecast(
    item: &dyn Node,
    report: &dyn Node,
    options: &TimelineOptions,
) -> Option<ForecastRecord> {
    let Some(icao) = airport_icao(item, report) else {
        debug!("Forecast without airport identifier, skipping");
        return None;
    };

    let issued = time_instant(report, "iwxxm:issueTime");
    let period = ValidPeriod::decode(report.child("iwxxm:validPeriod"));

    let base_node = report.path(&BASE_FORECAST);
    let base_fragment = base_node.map(parse_fragment).unwrap_or_else(|| {
        debug!("Forecast carries no base forecast block");
        ForecastFragment::default()
    });
    let base = ForecastState::from_base(&base_fragment);

    let groups = extract_change_groups(report);
    let timeline = synthesize(&base, &groups, &period, options);

    debug!(
        icao = %icao,
        groups = groups.len(),
        hours = timeline.len(),
        "Assembled forecast"
    );

    Some(ForecastRecord {
        header: ForecastHeader {
            icao,
            airport_name: airport_name(item, report),
            issued,
            valid_start: period.start,
            valid_end: period.end,
            temperatures: decode_temperatures(report, base_node, issued),
        },
        timeline,
    })
}

/// Forecast maximum and minimum temperature, read from the base forecast
/// block first and the report level second
#[must_use]
pub fn decode_temperatures(
    report: &dyn Node,
    base: Option<&dyn Node>,
    issued: Option<DateTime<Utc>>,
) -> TemperatureForecast {
    let block = base
        .and_then(|b| b.path(&TEMPERATURE_BLOCK))
        .or_else(|| report.path(&TEMPERATURE_BLOCK));

    TemperatureForecast {
        max: decode_extreme(
            report,
            block,
            "iwxxm:maximumAirTemperature",
            "iwxxm:maximumAirTemperatureTime",
            issued,
        ),
        min: decode_extreme(
            report,
            block,
            "iwxxm:minimumAirTemperature",
            "iwxxm:minimumAirTemperatureTime",
            issued,
        ),
    }
}

fn decode_extreme(
    report: &dyn Node,
    block: Option<&dyn Node>,
    value_field: &str,
    time_field: &str,
    issued: Option<DateTime<Utc>>,
) -> TemperatureExtreme {
    let value = block
        .and_then(|b| b.child(value_field))
        .or_else(|| report.child(value_field))
        .and_then(|n| n.text());

    let time = block
        .and_then(|b| {
            b.text_at(&[time_field, "gml:TimeInstant", "gml:timePosition"])
                .or_else(|| b.text_at(&[time_field, "gml:timePosition"]))
        })
        .or_else(|| report.text_at(&[time_field]));

    TemperatureExtreme {
        value: signed_temperature(value),
        time: time.and_then(|raw| resolve_day_hour(last_token(raw), issued)),
    }
}
