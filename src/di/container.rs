//! Service container

use crate::core::ServiceError;
use indexmap::IndexMap;
use servicewire_core::injector::Instance;
use std::any::Any;
use std::rc::Rc;

/// Ordered registry of constructed services, keyed by service id.
///
/// New ids are appended at the end, replacing an id keeps its position.
/// Iteration follows insertion order, which is what the orchestrator uses to
/// broadcast lifecycle calls.
///
/// # Example
///
/// ```
/// use servicewire::di::ServiceContainer;
/// use std::rc::Rc;
///
/// let mut container = ServiceContainer::new();
/// container.put("answer", Rc::new(42_u32));
///
/// assert!(container.has("answer"));
/// assert_eq!(*container.get_as::<u32>("answer").unwrap(), 42);
/// ```
#[derive(Clone, Default)]
pub struct ServiceContainer {
    services: IndexMap<String, Instance>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a service, replacing any previous instance under the same id
    pub fn put(&mut self, id: impl Into<String>, service: Instance) {
        self.services.insert(id.into(), service);
    }

    pub fn has(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Result<Instance, ServiceError> {
        self.services
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::ServiceNotFound(id.to_string()))
    }

    /// Get a service as its concrete type
    ///
    /// Returns `ServiceError::UnexpectedType` if the stored instance is of a
    /// different type.
    pub fn get_as<T: Any>(&self, id: &str) -> Result<Rc<T>, ServiceError> {
        self.get(id)?
            .downcast::<T>()
            .map_err(|_| ServiceError::UnexpectedType {
                id: id.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn count(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Instance)> {
        self.services.iter().map(|(id, service)| (id.as_str(), service))
    }
}

impl<'a> IntoIterator for &'a ServiceContainer {
    type Item = (&'a String, &'a Instance);
    type IntoIter = indexmap::map::Iter<'a, String, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.services.iter()
    }
}
