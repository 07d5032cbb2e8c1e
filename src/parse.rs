//! Document entry points
//!
//! Glue between the tree adapter and the assemblers: parse the delivery
//! envelope, unwrap the report and hand both to the matching assembler.
//! An item without a report field is assembled from its identity alone.

use serde::Serialize;
use std::path::Path;
use tracing::{debug, instrument};

use crate::Result;
use crate::document::{Envelope, XmlElement};
use crate::metar::assemble_observation;
use crate::models::{ForecastRecord, ObservationRecord};
use crate::taf::{TimelineOptions, assemble_forecast};

const METAR_FIELDS: [&str; 2] = ["metarMsg", "metar"];
const METAR_ROOT: &str = "iwxxm:METAR";
const TAF_FIELDS: [&str; 2] = ["tafMsg", "taf"];
const TAF_ROOT: &str = "iwxxm:TAF";

/// Decode an observation delivery document.
///
/// `Ok(None)` means the document holds no usable observation; `Err` is
/// returned only for malformed markup.
#[instrument(skip_all, fields(bytes = xml.len()))]
pub fn parse_metar_xml(xml: &str) -> Result<Option<ObservationRecord>> {
    let Some(envelope) = Envelope::parse(xml)? else {
        return Ok(None);
    };

    let report = envelope.report(&METAR_FIELDS, METAR_ROOT)?.unwrap_or_else(|| {
        debug!("Item carries no observation report");
        XmlElement::default()
    });

    Ok(assemble_observation(envelope.item(), &report))
}

/// Decode a forecast delivery document and synthesize its timeline.
///
/// `Ok(None)` means the document holds no usable forecast; `Err` is
/// returned only for malformed markup.
#[instrument(skip_all, fields(bytes = xml.len()))]
pub fn parse_taf_xml(xml: &str, options: &TimelineOptions) -> Result<Option<ForecastRecord>> {
    let Some(envelope) = Envelope::parse(xml)? else {
        return Ok(None);
    };

    let report = envelope.report(&TAF_FIELDS, TAF_ROOT)?.unwrap_or_else(|| {
        debug!("Item carries no forecast report");
        XmlElement::default()
    });

    Ok(assemble_forecast(envelope.item(), &report, options))
}

/// Read a document from a file, or from stdin when the path is `-`
pub fn read_document(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return Ok(std::io::read_to_string(std::io::stdin())?);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Render a record as JSON
pub fn render_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}
