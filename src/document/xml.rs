//! XML element tree built with `quick-xml`

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use super::{Node, names_match};
use crate::{AeroWxError, Result};

/// Name of the synthetic element wrapping the top-level elements of a document
pub const DOCUMENT_ROOT: &str = "#document";

/// Owned XML element with attributes in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a complete document. The returned element is a synthetic
    /// [`DOCUMENT_ROOT`] whose children are the top-level elements.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack = vec![XmlElement {
            name: DOCUMENT_ROOT.to_string(),
            ..XmlElement::default()
        }];

        loop {
            let event = reader.read_event().map_err(|e| {
                AeroWxError::document(format!(
                    "XML error at position {}: {e}",
                    reader.error_position()
                ))
            })?;

            match event {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    push_child(&mut stack, element);
                }
                Event::End(_) => {
                    if stack.len() < 2 {
                        return Err(AeroWxError::document("closing tag without opening tag"));
                    }
                    if let Some(element) = stack.pop() {
                        push_child(&mut stack, element);
                    }
                }
                Event::Text(text) => {
                    let raw = utf8(&text)?;
                    let decoded = unescape(raw).map_or_else(|_| raw.to_string(), |s| s.into_owned());
                    append_text(&mut stack, &decoded);
                }
                Event::CData(data) => append_text(&mut stack, utf8(&data)?),
                Event::GeneralRef(reference) => {
                    let entity = utf8(&reference)?;
                    match resolve_reference(entity) {
                        Some(resolved) => append_text(&mut stack, &resolved),
                        None => {
                            trace!("Keeping unknown entity reference &{};", entity);
                            append_text(&mut stack, &format!("&{entity};"));
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if stack.len() != 1 {
            return Err(AeroWxError::document(format!(
                "unexpected end of document: {} element(s) left open",
                stack.len() - 1
            )));
        }

        stack
            .pop()
            .ok_or_else(|| AeroWxError::document("empty element stack"))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = utf8(start.name().as_ref())?.to_string();
        let mut attributes = Vec::new();

        for attribute in start.attributes() {
            let attribute = attribute
                .map_err(|e| AeroWxError::document(format!("invalid attribute on <{name}>: {e}")))?;
            let key = utf8(attribute.key.as_ref())?.to_string();
            let raw = utf8(&attribute.value)?;
            let value = unescape(raw).map_or_else(|_| raw.to_string(), |s| s.into_owned());
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    /// Whether this element has element children
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// First child element matching `name`
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| names_match(&c.name, name))
    }

    /// Follow a chain of child element names
    #[must_use]
    pub fn element_at(&self, names: &[&str]) -> Option<&XmlElement> {
        names
            .iter()
            .try_fold(self, |cursor, name| cursor.element(name))
    }
}

impl Node for XmlElement {
    fn name(&self) -> &str {
        &self.name
    }

    fn child(&self, name: &str) -> Option<&dyn Node> {
        self.element(name).map(|c| c as &dyn Node)
    }

    fn array(&self, name: &str) -> Vec<&dyn Node> {
        self.children
            .iter()
            .filter(|c| names_match(&c.name, name))
            .map(|c| c as &dyn Node)
            .collect()
    }

    fn text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .or_else(|| self.attributes.iter().find(|(key, _)| names_match(key, name)))
            .map(|(_, value)| value.as_str())
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| AeroWxError::document(format!("invalid UTF-8: {e}")))
}

fn push_child(stack: &mut [XmlElement], element: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    }
}

fn append_text(stack: &mut [XmlElement], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.push_str(text);
    }
}

/// Resolve a character (`#xD`, `#39`) or predefined (`lt`, `amp`) reference
fn resolve_reference(entity: &str) -> Option<String> {
    if let Some(code) = entity.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse::<u32>().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    let resolved = match entity {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "quot" => "\"",
        "apos" => "'",
        _ => return None,
    };
    Some(resolved.to_string())
}
