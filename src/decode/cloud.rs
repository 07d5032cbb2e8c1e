//! Cloud layer decoder

use serde::{Deserialize, Serialize};

use super::values::{last_token, node_number, whole};
use crate::document::Node;

/// Metres to feet conversion for metric cloud bases
pub const FEET_PER_METRE: f64 = 3.28084;

/// Coverage classes that form a ceiling
const CEILING_AMOUNTS: [&str; 2] = ["BKN", "OVC"];

/// One reported cloud layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudLayer {
    /// Coverage class (`FEW`, `SCT`, `BKN`, `OVC`)
    pub amount: Option<String>,
    /// Base height in feet
    pub base: Option<u32>,
    /// Coded token such as `BKN035`
    pub raw: Option<String>,
}

impl CloudLayer {
    #[must_use]
    pub fn new(amount: Option<String>, base: Option<u32>) -> Self {
        let raw = match (&amount, base) {
            (Some(amount), Some(base)) => Some(format!("{amount}{}", format_cloud_base(base))),
            (Some(amount), None) => Some(amount.clone()),
            (None, _) => None,
        };
        Self { amount, base, raw }
    }

    fn is_ceiling(&self) -> bool {
        self.amount
            .as_deref()
            .is_some_and(|amount| CEILING_AMOUNTS.contains(&amount))
    }
}

/// Base height in hundreds of feet, three digits
#[must_use]
pub fn format_cloud_base(base_ft: u32) -> String {
    let hundreds = (f64::from(base_ft) / 100.0).round() as u32;
    format!("{hundreds:03}")
}

/// Decode a `layer` node, accepting either a wrapped `CloudLayer` or the
/// layer content directly. Returns `None` when neither amount nor base can
/// be read.
#[must_use]
pub fn decode_cloud_layer(node: &dyn Node) -> Option<CloudLayer> {
    let layer = node.child("iwxxm:CloudLayer").unwrap_or(node);

    let amount = layer
        .child("iwxxm:amount")
        .and_then(|n| n.attribute("xlink:href"))
        .or_else(|| layer.attribute("xlink:href"))
        .or_else(|| {
            layer
                .child("aixm:cloudAmount")
                .and_then(|n| n.attribute("xlink:href"))
        })
        .map(|href| last_token(href).to_uppercase())
        .filter(|amount| !amount.is_empty());

    let base_node = layer.first_child(&["iwxxm:base", "aixm:base", "iwxxm:cloudBase"]);
    let metric = base_node
        .and_then(|n| n.attribute("uom"))
        .is_some_and(|uom| uom.trim().eq_ignore_ascii_case("m"));
    let base = node_number(base_node)
        .map(|value| if metric { value * FEET_PER_METRE } else { value })
        .and_then(whole);

    if amount.is_none() && base.is_none() {
        return None;
    }

    Some(CloudLayer::new(amount, base))
}

/// Base of the lowest broken or overcast layer
#[must_use]
pub fn ceiling_ft(clouds: &[CloudLayer]) -> Option<u32> {
    clouds
        .iter()
        .filter(|layer| layer.is_ceiling())
        .filter_map(|layer| layer.base)
        .min()
}
