//! Servicewire
//!
//! Service orchestration on top of the `servicewire-core` injector: a
//! declarative service manifest, capability-aware service classes, the
//! service container and the host boundary the orchestrator is driven
//! through.

pub use servicewire_core::{
    ConfigurationError, InstantiationError, ServiceError, WireError, WireResult,
};

/// Core module re-exported from servicewire-core.
pub mod core {
    pub use servicewire_core::core::*;
}

/// Injector re-exported from servicewire-core.
pub mod injector {
    pub use servicewire_core::injector::*;
}

/// Configuration management.
pub mod config;

/// Service container and capability traits.
pub mod di;

/// Host boundary and in-memory event dispatcher.
pub mod host;

/// Service dependency analysis.
pub mod resolver;

/// Service orchestrator.
pub mod orchestrator;
