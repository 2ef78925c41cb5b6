//! Selector Dispatcher
//!
//! Registry mapping tag names to listeners. Listeners for one tag are
//! invoked synchronously, in registration order, once per completed matching
//! element. The end-of-document notification fires exactly once, after the
//! last element has been delivered. Listener panics are not caught; they
//! unwind straight to the caller.

use std::collections::HashMap;

use log::debug;

use crate::value::Node;

type TagListener = Box<dyn FnMut(&Node)>;
type EndListener = Box<dyn FnMut()>;

/// Listener registry for one conversion
#[derive(Default)]
pub struct Dispatcher {
    tags: HashMap<String, Vec<TagListener>>,
    end: Vec<EndListener>,
    ended: bool,
}

impl Dispatcher {
    /// Create an empty registry
    pub fn new() -> Self {
        Dispatcher::default()
    }

    /// Register a listener for a tag name
    pub fn on_tag<F>(&mut self, name: impl Into<String>, listener: F)
    where
        F: FnMut(&Node) + 'static,
    {
        self.tags
            .entry(name.into())
            .or_default()
            .push(Box::new(listener));
    }

    /// Register an end-of-document listener
    pub fn on_end<F>(&mut self, listener: F)
    where
        F: FnMut() + 'static,
    {
        self.end.push(Box::new(listener));
    }

    /// Whether any listener is registered for this tag
    pub fn has_listeners(&self, name: &str) -> bool {
        self.tags.get(name).is_some_and(|list| !list.is_empty())
    }

    /// Deliver a completed element to every listener for its tag
    pub fn emit(&mut self, name: &str, node: &Node) {
        if let Some(listeners) = self.tags.get_mut(name) {
            debug!("dispatching <{name}> to {} listener(s)", listeners.len());
            for listener in listeners {
                listener(node);
            }
        }
    }

    /// Fire the end-of-document notification; later calls are no-ops
    pub fn emit_end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        for listener in &mut self.end {
            listener();
        }
    }
}
