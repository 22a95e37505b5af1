//! Test doubles for the host boundary

use crate::core::WireResult;
use crate::host::{Callback, EventDispatcher, ExtensionTable, Host};
use std::cell::RefCell;

/// Host that records every request the orchestrator makes.
///
/// Events and extension points behave like an [`EventDispatcher`]; on top of
/// that the subscribed event names and the applied extension point names are
/// kept in call order.
///
/// # Example
///
/// ```
/// use servicewire::di::mocks::RecordingHost;
/// use servicewire::host::Host;
///
/// let host = RecordingHost::new();
/// host.subscribe("init", Box::new(|| Ok(())));
/// assert_eq!(host.subscriptions(), ["init"]);
///
/// host.fire("init").unwrap();
/// assert!(host.has_fired("init"));
/// ```
#[derive(Default)]
pub struct RecordingHost {
    dispatcher: EventDispatcher,
    subscriptions: RefCell<Vec<String>>,
    extension_calls: RefCell<Vec<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self, event: &str) -> WireResult<()> {
        self.dispatcher.fire(event)
    }

    /// Dispatcher backing this host, for registering extensions
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Event names passed to `subscribe`, in call order
    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.borrow().clone()
    }

    /// Extension point names passed to `apply_extension`, in call order
    pub fn extension_calls(&self) -> Vec<String> {
        self.extension_calls.borrow().clone()
    }
}

impl Host for RecordingHost {
    fn subscribe(&self, event: &str, callback: Callback) {
        self.subscriptions.borrow_mut().push(event.to_string());
        self.dispatcher.subscribe(event, callback);
    }

    fn has_fired(&self, event: &str) -> bool {
        self.dispatcher.has_fired(event)
    }

    fn apply_extension(&self, name: &str, table: ExtensionTable) -> ExtensionTable {
        self.extension_calls.borrow_mut().push(name.to_string());
        self.dispatcher.apply_extension(name, table)
    }
}
