//! In-memory host

use super::{Callback, ExtensionTable, Host};
use crate::core::WireResult;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::{debug, error};

type Extension = Box<dyn Fn(ExtensionTable) -> ExtensionTable>;

/// Minimal event dispatcher implementing [`Host`].
///
/// Events are plain names. Firing an event marks it as fired before any of
/// its callbacks run, so a callback asking `has_fired` for its own event gets
/// `true`. Callbacks subscribed while an event is being fired wait for the
/// next time it fires.
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: RefCell<HashMap<String, Vec<Callback>>>,
    fired: RefCell<HashMap<String, usize>>,
    extensions: RefCell<HashMap<String, Vec<Extension>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `event`, running its callbacks in subscription order.
    ///
    /// Stops at the first failing callback and returns its error. Callbacks
    /// queued after it are dropped.
    pub fn fire(&self, event: &str) -> WireResult<()> {
        *self.fired.borrow_mut().entry(event.to_string()).or_default() += 1;

        let callbacks = self
            .subscribers
            .borrow_mut()
            .remove(event)
            .unwrap_or_default();
        debug!(event, callbacks = callbacks.len(), "Firing event");

        for callback in callbacks {
            if let Err(e) = callback() {
                error!(event, error = %e, "Event callback failed");
                return Err(e);
            }
        }

        Ok(())
    }

    /// How many times `event` fired
    pub fn fire_count(&self, event: &str) -> usize {
        self.fired.borrow().get(event).copied().unwrap_or(0)
    }

    /// Number of callbacks waiting for `event`
    pub fn pending(&self, event: &str) -> usize {
        self.subscribers.borrow().get(event).map_or(0, Vec::len)
    }

    /// Register a rewrite for the extension point `name`.
    ///
    /// Extensions for the same name run in registration order, each one
    /// receiving the previous one's output.
    pub fn add_extension<F>(&self, name: impl Into<String>, extension: F)
    where
        F: Fn(ExtensionTable) -> ExtensionTable + 'static,
    {
        self.extensions
            .borrow_mut()
            .entry(name.into())
            .or_default()
            .push(Box::new(extension));
    }
}

impl Host for EventDispatcher {
    fn subscribe(&self, event: &str, callback: Callback) {
        self.subscribers
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(callback);
    }

    fn has_fired(&self, event: &str) -> bool {
        self.fire_count(event) > 0
    }

    fn apply_extension(&self, name: &str, table: ExtensionTable) -> ExtensionTable {
        let extensions = self.extensions.borrow();
        match extensions.get(name) {
            Some(extensions) => extensions
                .iter()
                .fold(table, |table, extension| extension(table)),
            None => table,
        }
    }
}
