//! Scalar extraction helpers shared by the field decoders
//!
//! Every helper degrades to `None` on missing or malformed input.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::document::Node;

/// Parse a finite number from a text payload
#[must_use]
pub fn number(text: Option<&str>) -> Option<f64> {
    let parsed = text?.trim().parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Number carried by an optional node
#[must_use]
pub fn node_number(node: Option<&dyn Node>) -> Option<f64> {
    number(node.and_then(|n| n.text()))
}

/// Round a non-negative measurement to whole units
#[must_use]
pub fn whole(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0).then(|| value.round() as u32)
}

/// Last segment of a code-list reference such as
/// `http://codes.wmo.int/306/4678/+TSRA` or `...#BKN`
#[must_use]
pub fn last_token(raw: &str) -> &str {
    let segment = raw.rsplit('/').next().unwrap_or(raw);
    segment.rsplit('#').next().unwrap_or(segment).trim()
}

/// Temperature with the coded negative convention (`M05` = -5)
#[must_use]
pub fn signed_temperature(text: Option<&str>) -> Option<f64> {
    let token = text?.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(digits) = token.strip_prefix(['M', 'm']) {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return digits.parse::<f64>().ok().map(|v| -v);
        }
    }

    number(Some(token))
}

/// Render a number without a trailing `.0` for whole values
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Encode a temperature as a coded token: two digits, `M` prefix when
/// negative, `//` when unknown
#[must_use]
pub fn temperature_token(value: Option<f64>) -> String {
    match value {
        None => "//".to_string(),
        Some(v) if v < 0.0 => format!("M{:0>2}", format_number(v.abs())),
        Some(v) => format!("{:0>2}", format_number(v)),
    }
}

/// Parse an ISO-8601 timestamp as found in `gml:timePosition` and friends.
/// Values without a zone are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = raw.strip_suffix(['Z', 'z']).unwrap_or(raw);
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|dt| dt.and_utc())
}

/// Resolve a `DDHH` day/hour token against the report issue time.
///
/// The token lands in the anchor's month; day and hour overflow roll
/// forward like calendar arithmetic. A result more than 24 hours before the
/// anchor is moved to the following month. ISO timestamps pass through.
#[must_use]
pub fn resolve_day_hour(token: &str, anchor: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    let token = token.trim();
    let is_digits = !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit());

    if !is_digits || token.len() > 4 {
        return if looks_like_iso(token) {
            parse_timestamp(token)
        } else {
            None
        };
    }

    let padded = format!("{token:0>4}");
    let day: i64 = padded[..2].parse().ok()?;
    let hour: i64 = padded[2..].parse().ok()?;
    let anchor = anchor?;

    let month_start = NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 1)?;
    let resolved = at_day_hour(month_start, day, hour)?;

    if anchor - resolved > Duration::hours(24) {
        let next_month = month_start.checked_add_months(Months::new(1))?;
        return at_day_hour(next_month, day, hour);
    }

    Some(resolved)
}

fn at_day_hour(month_start: NaiveDate, day: i64, hour: i64) -> Option<DateTime<Utc>> {
    let midnight = Utc.from_utc_datetime(&month_start.and_hms_opt(0, 0, 0)?);
    midnight.checked_add_signed(Duration::days(day - 1) + Duration::hours(hour))
}

fn looks_like_iso(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() > 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[10] == b'T'
}
