//! Report header fields: aerodrome identity and report times

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::values::parse_timestamp;
use crate::document::Node;

const AERODROME_SLICE: [&str; 4] = [
    "iwxxm:aerodrome",
    "aixm:AirportHeliport",
    "aixm:timeSlice",
    "aixm:AirportHeliportTimeSlice",
];

/// Validity window of a forecast or change group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidPeriod {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ValidPeriod {
    /// Decode a period node, with or without the `gml:TimePeriod` wrapper
    #[must_use]
    pub fn decode(node: Option<&dyn Node>) -> Self {
        let Some(node) = node else {
            return Self::default();
        };
        let period = node.child("gml:TimePeriod").unwrap_or(node);

        Self {
            start: period.text_at(&["gml:beginPosition"]).and_then(parse_timestamp),
            end: period.text_at(&["gml:endPosition"]).and_then(parse_timestamp),
        }
    }

    /// Whether `time` falls in `[start, end)`. Open bounds never contain.
    #[must_use]
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= time && time < end,
            _ => false,
        }
    }
}

fn aerodrome_field<'a>(report: &'a dyn Node, field: &str) -> Option<&'a str> {
    report.path(&AERODROME_SLICE)?.text_at(&[field])
}

/// Airport identifier: the envelope item's `icaoCode`, else the aerodrome
/// location indicator, else its designator
#[must_use]
pub fn airport_icao(item: &dyn Node, report: &dyn Node) -> Option<String> {
    item.text_at(&["icaoCode"])
        .or_else(|| aerodrome_field(report, "aixm:locationIndicatorICAO"))
        .or_else(|| aerodrome_field(report, "aixm:designator"))
        .map(str::to_string)
}

/// Human readable airport name
#[must_use]
pub fn airport_name(item: &dyn Node, report: &dyn Node) -> Option<String> {
    item.text_at(&["airportName"])
        .or_else(|| item.text_at(&["airportNm"]))
        .or_else(|| aerodrome_field(report, "aixm:name"))
        .map(str::to_string)
}

/// Time of a `TimeInstant`-style field (`issueTime`, `observationTime`)
#[must_use]
pub fn time_instant(report: &dyn Node, field: &str) -> Option<DateTime<Utc>> {
    report
        .text_at(&[field, "gml:TimeInstant", "gml:timePosition"])
        .or_else(|| report.text_at(&[field, "gml:timePosition"]))
        .and_then(parse_timestamp)
}
