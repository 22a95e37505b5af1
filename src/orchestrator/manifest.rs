//! Declarative service manifest

use crate::config::ManifestConfig;
use crate::di::ServiceContainer;
use indexmap::IndexMap;
use servicewire_core::injector::{ClassDescriptor, ClassRegistry, Delegate, Injector, Instance};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Service id -> class name, possibly computed.
pub type ServiceTable = IndexMap<String, Resolvable<String>>;

/// Interface or class -> replacement class.
pub type BindingTable = IndexMap<String, String>;

/// Class (or [`GLOBAL_ARGUMENTS`](servicewire_core::GLOBAL_ARGUMENTS)) -> argument name -> value.
pub type ArgumentTable = IndexMap<String, IndexMap<String, Value>>;

/// Classes whose first instance is reused.
pub type SharedTable = Vec<String>;

/// Class -> factory replacing descriptor-based construction.
pub type DelegationTable = IndexMap<String, Delegate>;

type Factory<T> = Rc<dyn Fn(&Injector, &ServiceContainer) -> T>;

/// A table value that is either given directly or computed when the
/// registration pass starts.
pub enum Resolvable<T> {
    Literal(T),
    Factory(Factory<T>),
}

impl<T: Clone> Resolvable<T> {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&Injector, &ServiceContainer) -> T + 'static,
    {
        Resolvable::Factory(Rc::new(factory))
    }

    pub fn resolve(&self, injector: &Injector, container: &ServiceContainer) -> T {
        match self {
            Resolvable::Literal(value) => value.clone(),
            Resolvable::Factory(factory) => factory(injector, container),
        }
    }
}

impl<T: Clone> Clone for Resolvable<T> {
    fn clone(&self) -> Self {
        match self {
            Resolvable::Literal(value) => Resolvable::Literal(value.clone()),
            Resolvable::Factory(factory) => Resolvable::Factory(Rc::clone(factory)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Resolvable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolvable::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Resolvable::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

impl From<&str> for Resolvable<String> {
    fn from(value: &str) -> Self {
        Resolvable::Literal(value.to_string())
    }
}

impl From<String> for Resolvable<String> {
    fn from(value: String) -> Self {
        Resolvable::Literal(value)
    }
}

/// Everything the orchestrator needs to build its services.
///
/// # Example
///
/// ```
/// use servicewire::orchestrator::ServiceManifest;
///
/// let manifest = ServiceManifest::new()
///     .service("mailer", "Mailer")
///     .bind("Transport", "SmtpTransport")
///     .argument("SmtpTransport", "host", "localhost")
///     .share("SmtpTransport");
///
/// assert_eq!(manifest.services().len(), 1);
/// ```
#[derive(Default)]
pub struct ServiceManifest {
    classes: ClassRegistry,
    services: ServiceTable,
    bindings: BindingTable,
    arguments: ArgumentTable,
    shared_instances: SharedTable,
    delegations: DelegationTable,
}

/// The manifest split into its tables.
pub struct ManifestParts {
    pub classes: ClassRegistry,
    pub services: ServiceTable,
    pub bindings: BindingTable,
    pub arguments: ArgumentTable,
    pub shared_instances: SharedTable,
    pub delegations: DelegationTable,
}

impl ServiceManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the data tables of a configuration document
    pub fn from_config(config: &ManifestConfig) -> Self {
        let mut manifest = Self::new();
        for (id, class) in &config.services {
            manifest = manifest.service(id.as_str(), class.as_str());
        }
        manifest.bindings = config.bindings.clone();
        manifest.arguments = config.arguments.clone();
        manifest.shared_instances = config.shared_instances.clone();
        manifest
    }

    /// Register a class descriptor the injector can construct
    pub fn class(mut self, descriptor: impl Into<ClassDescriptor>) -> Self {
        self.classes.register(descriptor.into());
        self
    }

    pub fn service(mut self, id: impl Into<String>, class: impl Into<Resolvable<String>>) -> Self {
        self.services.insert(id.into(), class.into());
        self
    }

    pub fn bind(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.bindings.insert(from.into(), to.into());
        self
    }

    pub fn argument(
        mut self,
        class: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.arguments
            .entry(class.into())
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    pub fn share(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.shared_instances.contains(&class) {
            self.shared_instances.push(class);
        }
        self
    }

    pub fn delegate<F>(mut self, class: impl Into<String>, delegate: F) -> Self
    where
        F: Fn(&str) -> Option<Instance> + 'static,
    {
        self.delegations.insert(class.into(), Rc::new(delegate));
        self
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn services(&self) -> &ServiceTable {
        &self.services
    }

    pub fn into_parts(self) -> ManifestParts {
        ManifestParts {
            classes: self.classes,
            services: self.services,
            bindings: self.bindings,
            arguments: self.arguments,
            shared_instances: self.shared_instances,
            delegations: self.delegations,
        }
    }
}
