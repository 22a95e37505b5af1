//! Core types shared by the injector and the orchestrator.

pub mod error;

pub use error::{
    ConfigurationError, InjectorResult, InstantiationError, ServiceError, WireError, WireResult,
};
