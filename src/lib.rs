//! xmlflow - Streaming XML to simplified JSON-shaped values, and back
//!
//! Consumes an XML byte stream one event at a time and delivers, for each
//! element a caller registered interest in, a single simplified value: the
//! smallest unambiguous JSON-like shape for that element's content. The full
//! document tree is never materialized; memory is bounded by the open
//! ancestor chain plus the subtrees actually being captured.
//!
//! ```
//! use xmlflow::FlowStream;
//!
//! let xml = r#"<root><person name="Bill" id="1"/><person name="Joe" id="2"/></root>"#;
//! let mut stream = FlowStream::new(xml.as_bytes());
//! stream.on_tag("person", |person| {
//!     println!("{:?}", person.child("name"));
//! });
//! stream.run()?;
//! # Ok::<(), xmlflow::FlowError>(())
//! ```
//!
//! The inverse direction is [`to_xml`], a pure function from a simplified
//! value back to markup text: order-preserving, shape-forgetful.

mod builder;
mod dispatch;
mod error;
mod event;
mod options;
mod serialize;
mod simplify;
mod stream;
mod value;

pub use builder::{Frame, Piece, TreeBuilder};
pub use dispatch::Dispatcher;
pub use error::{FlowError, Result};
pub use event::XmlEvent;
pub use options::{FlowOptions, MarkupMode};
pub use serialize::to_xml;
pub use stream::FlowStream;
pub use value::{Node, Value};
