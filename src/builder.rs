//! Incremental Tree Builder
//!
//! Consumes tokenizer events one at a time and maintains one frame per
//! currently-open element on an explicit stack, so nesting depth is bounded
//! only by memory and the builder tolerates arbitrary gaps between events.
//!
//! Capture keeps memory bounded: a frame starts a capture when its tag is
//! interesting (has listeners) and no enclosing capture is active. Every
//! frame is simplified on close, but the computed value is folded into the
//! parent only inside a capture; a capture root's value is returned to the
//! caller for dispatch, and everything else is discarded as soon as it is
//! computed. An element nested inside a captured one therefore never
//! surfaces on its own.

use indexmap::IndexMap;
use log::trace;

use crate::error::{FlowError, Result};
use crate::event::XmlEvent;
use crate::options::FlowOptions;
use crate::simplify::{inject_name, simplify};
use crate::value::{Node, Value};

/// The tag name recognized as a script-bearing container
const SCRIPT_TAG: &str = "script";

/// One piece of an open element's content, in document order
#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    /// A text run; CDATA runs skip whitespace normalization
    Run { content: String, cdata: bool },
    /// A completed child element
    Child { name: String, value: Value },
}

/// The in-progress representation of one open element
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Tag name, opaque (namespace prefixes are not interpreted)
    pub name: String,
    /// Attributes in document order
    pub attrs: IndexMap<String, String>,
    /// Text runs and completed children, interleaved in document order
    pub pieces: Vec<Piece>,
    /// Content bypasses normalize/trim and lands in `$script`
    pub is_script: bool,
}

impl Frame {
    /// Open a frame for an element
    pub fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        let is_script = name == SCRIPT_TAG;
        Frame {
            name,
            attrs: attributes.into_iter().collect(),
            pieces: Vec::new(),
            is_script,
        }
    }

    /// Append a text run, coalescing adjacent character data. A CDATA run
    /// always stands alone so its normalization exemption stays per-run.
    pub fn push_text(&mut self, content: String, cdata: bool) {
        if !cdata {
            if let Some(Piece::Run {
                content: last,
                cdata: false,
            }) = self.pieces.last_mut()
            {
                last.push_str(&content);
                return;
            }
        }
        self.pieces.push(Piece::Run { content, cdata });
    }
}

/// Stack-based builder turning events into simplified values
pub struct TreeBuilder {
    options: FlowOptions,
    stack: Vec<Frame>,
    /// Stack index of the active capture root, if any
    capture: Option<usize>,
}

impl TreeBuilder {
    /// Create a builder for one conversion
    pub fn new(options: FlowOptions) -> Self {
        TreeBuilder {
            options,
            stack: Vec::new(),
            capture: None,
        }
    }

    /// Number of currently-open elements
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Consume one event. Returns the simplified value of a captured element
    /// when this event closed one, with its `$name` attached.
    ///
    /// `is_interesting` reports whether a tag name is worth capturing; the
    /// streaming front end wires it to the dispatcher's registry.
    pub fn handle_event<I>(
        &mut self,
        event: XmlEvent,
        is_interesting: I,
    ) -> Result<Option<(String, Node)>>
    where
        I: Fn(&str) -> bool,
    {
        match event {
            XmlEvent::StartElement { name, attributes } => {
                if self.capture.is_none() && is_interesting(&name) {
                    self.capture = Some(self.stack.len());
                }
                self.stack.push(Frame::new(name, attributes));
                Ok(None)
            }
            XmlEvent::Text(content) => {
                // Character data outside any element (prolog/epilog) carries
                // no meaning here
                if let Some(top) = self.stack.last_mut() {
                    top.push_text(content, false);
                }
                Ok(None)
            }
            XmlEvent::CData(content) => {
                if let Some(top) = self.stack.last_mut() {
                    top.push_text(content, true);
                }
                Ok(None)
            }
            XmlEvent::EndElement { .. } => self.close_element(),
        }
    }

    /// Signal end of input; errors if elements are still open
    pub fn finish(&self) -> Result<()> {
        match self.stack.last() {
            None => Ok(()),
            Some(innermost) => Err(FlowError::UnclosedElements {
                depth: self.stack.len(),
                innermost: innermost.name.clone(),
            }),
        }
    }

    fn close_element(&mut self) -> Result<Option<(String, Node)>> {
        let frame = self.stack.pop().ok_or(FlowError::UnbalancedClose)?;
        let name = frame.name.clone();
        let value = simplify(frame, &self.options);

        match self.capture {
            Some(root) if self.stack.len() == root => {
                self.capture = None;
                let node = inject_name(name.clone(), value);
                Ok(Some((name, node)))
            }
            Some(_) => {
                if let Some(parent) = self.stack.last_mut() {
                    parent.pieces.push(Piece::Child { name, value });
                }
                Ok(None)
            }
            None => {
                trace!("discarding uncaptured <{name}>");
                Ok(None)
            }
        }
    }
}
