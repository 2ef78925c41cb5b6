//! Builder Event Types
//!
//! The input vocabulary of the tree builder. The streaming front end adapts
//! tokenizer output into these events; callers may also construct them
//! directly to drive a [`TreeBuilder`](crate::builder::TreeBuilder) by hand.
//!
//! Empty elements (`<a/>`) never appear as their own variant: the adapter
//! expands them into a `StartElement` immediately followed by `EndElement`,
//! so the builder sees exactly one shape of tree traffic.

/// One owned tokenizer event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Element opening tag with attributes in document order
    StartElement {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// Element closing tag
    EndElement { name: String },
    /// Character data, entity references already resolved
    Text(String),
    /// CDATA section content, exempt from whitespace normalization
    CData(String),
}

impl XmlEvent {
    /// Check if this is a start element event
    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, XmlEvent::StartElement { .. })
    }

    /// Check if this is an end element event
    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, XmlEvent::EndElement { .. })
    }

    /// Get the element name if this is a start or end element
    pub fn element_name(&self) -> Option<&str> {
        match self {
            XmlEvent::StartElement { name, .. } => Some(name),
            XmlEvent::EndElement { name } => Some(name),
            _ => None,
        }
    }
}
