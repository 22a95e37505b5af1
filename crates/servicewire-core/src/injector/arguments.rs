//! Resolved constructor arguments

use super::class::ClassRegistry;
use super::Instance;
use crate::core::{InjectorResult, InstantiationError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone)]
enum Resolved {
    Value(Value),
    Object(Instance),
}

/// Arguments handed to a constructor, keyed by parameter name.
///
/// Dependencies arrive as instances, by-name parameters as JSON values that
/// are converted to the requested type on access.
pub struct Arguments<'a> {
    class: &'a str,
    registry: &'a ClassRegistry,
    resolved: HashMap<String, Resolved>,
}

impl<'a> Arguments<'a> {
    pub fn new(class: &'a str, registry: &'a ClassRegistry) -> Self {
        Self {
            class,
            registry,
            resolved: HashMap::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.resolved.insert(name.into(), Resolved::Value(value.into()));
        self
    }

    pub fn with_object(mut self, name: impl Into<String>, object: Instance) -> Self {
        self.resolved.insert(name.into(), Resolved::Object(object));
        self
    }

    /// Class being constructed
    pub fn class(&self) -> &str {
        self.class
    }

    /// Convert a by-name argument into `T`
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> InjectorResult<T> {
        match self.resolved.get(name) {
            Some(Resolved::Value(value)) => {
                serde_json::from_value(value.clone()).map_err(|e| self.invalid(name, e.to_string()))
            }
            Some(Resolved::Object(_)) => {
                Err(self.invalid(name, "expected a value, found an object".to_string()))
            }
            None => Err(self.unresolved(name)),
        }
    }

    /// Raw instance of a dependency argument
    pub fn instance(&self, name: &str) -> InjectorResult<Instance> {
        match self.resolved.get(name) {
            Some(Resolved::Object(object)) => Ok(Rc::clone(object)),
            Some(Resolved::Value(_)) => {
                Err(self.invalid(name, "expected an object, found a value".to_string()))
            }
            None => Err(self.unresolved(name)),
        }
    }

    /// Dependency argument as its concrete type
    pub fn object<T: Any>(&self, name: &str) -> InjectorResult<Rc<T>> {
        self.instance(name)?.downcast::<T>().map_err(|_| {
            self.invalid(
                name,
                format!("object is not a {}", std::any::type_name::<T>()),
            )
        })
    }

    /// Dependency argument viewed through a trait object its class implements
    pub fn interface<I: ?Sized + 'static>(&self, name: &str) -> InjectorResult<Rc<I>> {
        let instance = self.instance(name)?;
        self.registry
            .describe(instance.as_ref())
            .and_then(|descriptor| descriptor.cast::<I>(&instance))
            .ok_or_else(|| {
                self.invalid(
                    name,
                    format!("object does not implement {}", std::any::type_name::<I>()),
                )
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolved.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    fn unresolved(&self, name: &str) -> InstantiationError {
        InstantiationError::UnresolvedArgument {
            argument: name.to_string(),
            class: self.class.to_string(),
        }
    }

    fn invalid(&self, name: &str, reason: String) -> InstantiationError {
        InstantiationError::InvalidArgument {
            argument: name.to_string(),
            class: self.class.to_string(),
            reason,
        }
    }
}
