//! Capability traits for services
//!
//! A service type opts into orchestration behavior by implementing one of
//! these traits and declaring it on its [`ServiceClass`](super::ServiceClass).

use crate::host::Host;
use std::any::Any;

/// Marker for types the orchestrator may store in the container.
pub trait Service: Any {}

/// Service that is only instantiated when a predicate holds.
pub trait Conditional {
    /// Whether the service should be registered at all
    fn is_needed() -> bool;
}

/// Service that requires other services to be registered first.
pub trait HasDependencies {
    /// Ids of the services this one depends on
    fn dependencies() -> &'static [&'static str];
}

/// Service whose registration waits for a host lifecycle event.
pub trait Delayed {
    fn registration_event() -> &'static str;
}

/// Service with a post-construction hook.
///
/// Called exactly once, right after the instance was stored in the container.
pub trait Registerable {
    fn register(&self, host: &dyn Host);
}

/// Service that reacts to the embedding application being activated.
pub trait Activateable {
    fn activate(&self);
}

/// Service that reacts to the embedding application being deactivated.
pub trait Deactivateable {
    fn deactivate(&self);
}
