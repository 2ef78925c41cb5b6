//! Streaming Front End
//!
//! Wires the tokenizer to the builder and the dispatcher:
//!
//! ```text
//! BufRead ---> quick-xml Reader ---> XmlEvent ---> TreeBuilder
//!                                                      |
//!                                                      v (captured close)
//!                                               Dispatcher ---> listeners
//! ```
//!
//! The conversion is pull-driven one event per [`FlowStream::step`] call and
//! never assumes the whole document is available; a caller that stops
//! calling `step` has paused the conversion, and dropping the stream aborts
//! it. [`FlowStream::run`] drives `step` to completion.
//!
//! Adapter duties: expanding empty elements into an open/close pair,
//! resolving entity references, dropping comments, processing instructions
//! and declarations, and forwarding tokenizer errors verbatim.

use std::io::BufRead;

use log::trace;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::builder::TreeBuilder;
use crate::dispatch::Dispatcher;
use crate::error::{FlowError, Result};
use crate::event::XmlEvent;
use crate::options::FlowOptions;
use crate::value::Node;

/// A push-per-event conversion over a byte stream
pub struct FlowStream<R: BufRead> {
    reader: Reader<R>,
    builder: TreeBuilder,
    dispatcher: Dispatcher,
    buf: Vec<u8>,
    done: bool,
}

/// One tokenizer event adapted to builder traffic
#[derive(Debug)]
enum Adapted {
    One(XmlEvent),
    /// An empty element becomes an open immediately followed by a close
    Pair(XmlEvent, XmlEvent),
    Skip,
    Eof,
}

impl<R: BufRead> FlowStream<R> {
    /// Create a conversion with default options
    pub fn new(source: R) -> Self {
        Self::with_options(source, FlowOptions::default())
    }

    /// Create a conversion with explicit options
    pub fn with_options(source: R, options: FlowOptions) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().check_end_names = true;
        FlowStream {
            reader,
            builder: TreeBuilder::new(options),
            dispatcher: Dispatcher::new(),
            buf: Vec::new(),
            done: false,
        }
    }

    /// Register a listener for completed elements with this tag name.
    /// Multiple listeners on one tag fire in registration order.
    pub fn on_tag<F>(&mut self, name: impl Into<String>, listener: F) -> &mut Self
    where
        F: FnMut(&Node) + 'static,
    {
        self.dispatcher.on_tag(name, listener);
        self
    }

    /// Register a listener fired once, after the document has been read
    pub fn on_end<F>(&mut self, listener: F) -> &mut Self
    where
        F: FnMut() + 'static,
    {
        self.dispatcher.on_end(listener);
        self
    }

    /// Consume exactly one tokenizer event. Returns `Ok(true)` while more
    /// input remains, `Ok(false)` once the end notification has fired.
    pub fn step(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        self.buf.clear();
        let adapted = {
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| FlowError::Parse(e.to_string()))?;
            adapt_event(event)?
        };
        trace!("xml event: {adapted:?}");
        match adapted {
            Adapted::Skip => Ok(true),
            Adapted::One(event) => {
                self.feed(event)?;
                Ok(true)
            }
            Adapted::Pair(open, close) => {
                self.feed(open)?;
                self.feed(close)?;
                Ok(true)
            }
            Adapted::Eof => {
                self.builder.finish()?;
                self.dispatcher.emit_end();
                self.done = true;
                Ok(false)
            }
        }
    }

    /// Drive the conversion to completion
    pub fn run(&mut self) -> Result<()> {
        while self.step()? {}
        Ok(())
    }

    fn feed(&mut self, event: XmlEvent) -> Result<()> {
        let dispatcher = &self.dispatcher;
        let completed = self
            .builder
            .handle_event(event, |name| dispatcher.has_listeners(name))?;
        if let Some((name, node)) = completed {
            self.dispatcher.emit(&name, &node);
        }
        Ok(())
    }
}

fn adapt_event(event: Event<'_>) -> Result<Adapted> {
    match event {
        Event::Start(ref e) => {
            let (name, attributes) = element_parts(e)?;
            Ok(Adapted::One(XmlEvent::StartElement { name, attributes }))
        }
        Event::Empty(ref e) => {
            let (name, attributes) = element_parts(e)?;
            Ok(Adapted::Pair(
                XmlEvent::StartElement {
                    name: name.clone(),
                    attributes,
                },
                XmlEvent::EndElement { name },
            ))
        }
        Event::End(ref e) => Ok(Adapted::One(XmlEvent::EndElement {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        })),
        Event::Text(e) => {
            let content = e
                .decode()
                .map_err(|err| FlowError::Parse(err.to_string()))?
                .into_owned();
            Ok(Adapted::One(XmlEvent::Text(content)))
        }
        Event::CData(e) => {
            let content = String::from_utf8_lossy(&e).into_owned();
            Ok(Adapted::One(XmlEvent::CData(content)))
        }
        Event::GeneralRef(e) => {
            // Entity references arrive as their own events; resolve them and
            // hand them over as ordinary text so adjacent runs coalesce
            let raw = e
                .decode()
                .map_err(|err| FlowError::Parse(err.to_string()))?;
            Ok(Adapted::One(XmlEvent::Text(resolve_entity(&raw)?)))
        }
        Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {
            Ok(Adapted::Skip)
        }
        Event::Eof => Ok(Adapted::Eof),
    }
}

fn element_parts(e: &BytesStart<'_>) -> Result<(String, Vec<(String, String)>)> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| FlowError::Parse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| FlowError::Parse(err.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok((name, attributes))
}

/// Resolve a named or numeric entity reference
fn resolve_entity(raw: &str) -> Result<String> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_string());
    }
    if let Some(rest) = raw.strip_prefix('#') {
        let code = if let Some(hex) = rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            u32::from_str_radix(hex, 16)
                .map_err(|_| FlowError::InvalidEntity(raw.to_string()))?
        } else {
            rest.parse::<u32>()
                .map_err(|_| FlowError::InvalidEntity(raw.to_string()))?
        };
        let ch = char::from_u32(code).ok_or_else(|| FlowError::InvalidEntity(raw.to_string()))?;
        return Ok(ch.to_string());
    }
    Err(FlowError::InvalidEntity(raw.to_string()))
}
