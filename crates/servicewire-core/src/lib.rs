//! Servicewire core
//!
//! The dependency injector and the error taxonomy shared by every
//! Servicewire crate. Constructor metadata is declared up front through
//! [`injector::ClassDescriptor`] instead of being discovered at runtime.

pub mod core;
pub mod injector;

pub use crate::core::{
    ConfigurationError, InjectorResult, InstantiationError, ServiceError, WireError, WireResult,
};
pub use injector::{
    ArgumentMap, Arguments, Capabilities, ClassDescriptor, ClassRegistry, ConstructorInstantiator,
    Delegate, InjectionChain, Injectable, Injector, Instance, Instantiator, Parameter, Value,
    GLOBAL_ARGUMENTS,
};
