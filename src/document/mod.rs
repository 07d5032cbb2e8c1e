//! Document tree adapter
//!
//! The decoders never look at raw markup. They navigate an already-decoded
//! tree through the [`Node`] trait, which exposes three primitives:
//! - `text`: scalar payload of a node
//! - `array`: every child with a given name (singular or repeated)
//! - `attribute`: namespaced attribute lookup
//!
//! [`XmlElement`] is the concrete tree built from XML with `quick-xml`, and
//! [`envelope`] unwraps the outer delivery document, including the nested,
//! entity-escaped report payload.

pub mod envelope;
pub mod xml;

pub use envelope::{Envelope, decode_entities};
pub use xml::XmlElement;

/// Navigable node of a decoded document tree
pub trait Node {
    /// Qualified name of this node as written in the source
    fn name(&self) -> &str;

    /// First child matching `name`
    fn child(&self, name: &str) -> Option<&dyn Node>;

    /// Every child matching `name`, in document order
    fn array(&self, name: &str) -> Vec<&dyn Node>;

    /// Trimmed text payload, `None` when the node carries no text
    fn text(&self) -> Option<&str>;

    /// Attribute value by qualified or local name
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Follow a chain of child names. An empty chain yields `None`.
    fn path(&self, names: &[&str]) -> Option<&dyn Node> {
        let (first, rest) = names.split_first()?;
        let mut cursor = self.child(first)?;
        for name in rest {
            cursor = cursor.child(name)?;
        }
        Some(cursor)
    }

    /// First child present among synonym names
    fn first_child(&self, names: &[&str]) -> Option<&dyn Node> {
        names.iter().find_map(|name| self.child(name))
    }

    /// First chain that resolves among alternative paths
    fn first_path(&self, paths: &[&[&str]]) -> Option<&dyn Node> {
        paths.iter().find_map(|path| self.path(path))
    }

    /// Text at the end of a chain of child names
    fn text_at(&self, names: &[&str]) -> Option<&str> {
        self.path(names)?.text()
    }

    /// Boolean attribute, `true` only for a case-insensitive `"true"`
    fn flag(&self, name: &str) -> bool {
        self.attribute(name)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }
}

/// Local part of a qualified name (`iwxxm:cloud` -> `cloud`)
#[must_use]
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Exact qualified match, falling back to a local-name match
#[must_use]
pub fn names_match(actual: &str, wanted: &str) -> bool {
    actual == wanted || local_name(actual) == local_name(wanted)
}
