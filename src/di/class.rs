//! Capability-aware class descriptors for services

use super::traits::{
    Activateable, Conditional, Deactivateable, Delayed, HasDependencies, Registerable, Service,
};
use servicewire_core::injector::{ClassDescriptor, Injectable};
use std::any::Any;
use std::marker::PhantomData;
use std::rc::Rc;

/// Builder that declares which capabilities a service type implements.
///
/// Each method is bounded by the capability trait, so a class can only
/// declare what it actually implements.
///
/// # Example
///
/// ```
/// use servicewire::di::{Registerable, Service, ServiceClass};
/// use servicewire::host::Host;
/// use servicewire::injector::{Arguments, ClassRegistry, Injectable};
/// use servicewire::core::InjectorResult;
///
/// struct Menu;
///
/// impl Service for Menu {}
///
/// impl Registerable for Menu {
///     fn register(&self, host: &dyn Host) {
///         host.subscribe("admin_menu", Box::new(|| Ok(())));
///     }
/// }
///
/// impl Injectable for Menu {
///     const NAME: &'static str = "Menu";
///
///     fn construct(_args: &Arguments<'_>) -> InjectorResult<Self> {
///         Ok(Menu)
///     }
/// }
///
/// let mut classes = ClassRegistry::new();
/// classes.register(ServiceClass::<Menu>::new().registerable().into());
/// assert!(classes.get("Menu").unwrap().capabilities().service);
/// ```
pub struct ServiceClass<T> {
    descriptor: ClassDescriptor,
    _marker: PhantomData<T>,
}

impl<T: Injectable + Service> ServiceClass<T> {
    pub fn new() -> Self {
        let mut descriptor = ClassDescriptor::of::<T>();
        descriptor.capabilities_mut().service = true;
        Self {
            descriptor,
            _marker: PhantomData,
        }
    }
}

impl<T: Injectable + Service> Default for ServiceClass<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Injectable> ServiceClass<T> {
    pub fn conditional(mut self) -> Self
    where
        T: Conditional,
    {
        self.descriptor.capabilities_mut().is_needed = Some(T::is_needed);
        self
    }

    pub fn with_dependencies(mut self) -> Self
    where
        T: HasDependencies,
    {
        self.descriptor.capabilities_mut().dependencies = Some(T::dependencies);
        self
    }

    pub fn delayed(mut self) -> Self
    where
        T: Delayed,
    {
        self.descriptor.capabilities_mut().registration_event = Some(T::registration_event);
        self
    }

    pub fn registerable(mut self) -> Self
    where
        T: Registerable,
    {
        self.descriptor
            .capabilities_mut()
            .insert_hook::<dyn Registerable>(as_registerable::<T>);
        self
    }

    pub fn activateable(mut self) -> Self
    where
        T: Activateable,
    {
        self.descriptor
            .capabilities_mut()
            .insert_hook::<dyn Activateable>(as_activateable::<T>);
        self
    }

    pub fn deactivateable(mut self) -> Self
    where
        T: Deactivateable,
    {
        self.descriptor
            .capabilities_mut()
            .insert_hook::<dyn Deactivateable>(as_deactivateable::<T>);
        self
    }

    /// Expose instances as the trait object `I`
    pub fn implements<I: ?Sized + 'static>(mut self, cast: fn(Rc<T>) -> Rc<I>) -> Self {
        self.descriptor = self.descriptor.implements::<I, T>(cast);
        self
    }
}

impl<T> From<ServiceClass<T>> for ClassDescriptor {
    fn from(class: ServiceClass<T>) -> Self {
        class.descriptor
    }
}

fn as_registerable<T: Registerable + Any>(
    instance: &dyn Any,
) -> Option<&(dyn Registerable + 'static)> {
    instance
        .downcast_ref::<T>()
        .map(|service| service as &(dyn Registerable + 'static))
}

fn as_activateable<T: Activateable + Any>(
    instance: &dyn Any,
) -> Option<&(dyn Activateable + 'static)> {
    instance
        .downcast_ref::<T>()
        .map(|service| service as &(dyn Activateable + 'static))
}

fn as_deactivateable<T: Deactivateable + Any>(
    instance: &dyn Any,
) -> Option<&(dyn Deactivateable + 'static)> {
    instance
        .downcast_ref::<T>()
        .map(|service| service as &(dyn Deactivateable + 'static))
}
