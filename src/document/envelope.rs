//! Delivery envelope around a coded report
//!
//! Bulletins arrive wrapped in a service response
//! (`response/body/items/item`). The item carries the airport identifier and
//! the report itself, either as child elements or as a second XML document
//! escaped into a text field. The escaped form is entity-decoded and handed
//! back to [`XmlElement::parse`].

use tracing::debug;

use super::{Node, XmlElement};
use crate::Result;

const ITEM_PATHS: [&[&str]; 3] = [
    &["response", "body", "items", "item"],
    &["body", "items", "item"],
    &["items", "item"],
];

/// First item of a delivery document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    item: XmlElement,
}

impl Envelope {
    /// Parse the outer document. `Ok(None)` means the document is well formed
    /// but carries no item.
    pub fn parse(xml: &str) -> Result<Option<Self>> {
        let root = XmlElement::parse(xml)?;

        let item = ITEM_PATHS
            .iter()
            .find_map(|path| root.element_at(path))
            .cloned();

        if item.is_none() {
            debug!("Envelope carries no item");
        }

        Ok(item.map(|item| Self { item }))
    }

    /// The envelope item
    #[must_use]
    pub fn item(&self) -> &XmlElement {
        &self.item
    }

    /// Extract the report payload from the first present field among `fields`
    /// and unwrap its `root` element when present.
    ///
    /// Returns `Ok(None)` when none of the fields exist.
    pub fn report(&self, fields: &[&str], root: &str) -> Result<Option<XmlElement>> {
        let Some(field) = fields.iter().find_map(|name| self.item.element(name)) else {
            debug!("No report field among {:?}", fields);
            return Ok(None);
        };

        let payload = if field.has_children() {
            field.clone()
        } else {
            let Some(escaped) = field.text() else {
                return Ok(None);
            };
            debug!("Decoding nested report document ({} bytes)", escaped.len());
            XmlElement::parse(&decode_entities(escaped))?
        };

        Ok(Some(payload.element(root).cloned().unwrap_or(payload)))
    }
}

/// Decode the entity escaping applied to a nested report document.
/// `&amp;` is decoded last so doubly escaped sequences unwrap one level.
#[must_use]
pub fn decode_entities(value: &str) -> String {
    value
        .replace("&#xD;", "\n")
        .replace("&#xd;", "\n")
        .replace("&#XD;", "\n")
        .replace("&#Xd;", "\n")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
