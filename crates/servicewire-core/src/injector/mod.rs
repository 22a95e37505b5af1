//! Dependency injector
//!
//! Resolves type identifiers through bindings, builds constructor argument
//! lists from declared [`Parameter`]s and caches shared instances.
//!
//! # Example
//! ```
//! use servicewire_core::injector::{
//!     Arguments, ClassDescriptor, ClassRegistry, Injectable, Injector,
//! };
//! use servicewire_core::InjectorResult;
//!
//! struct Clock;
//!
//! impl Injectable for Clock {
//!     const NAME: &'static str = "Clock";
//!
//!     fn construct(_args: &Arguments<'_>) -> InjectorResult<Self> {
//!         Ok(Clock)
//!     }
//! }
//!
//! let mut classes = ClassRegistry::new();
//! classes.register(ClassDescriptor::of::<Clock>());
//!
//! let mut injector = Injector::new(classes);
//! injector.share("Clock");
//!
//! let first = injector.make("Clock").unwrap();
//! let second = injector.make("Clock").unwrap();
//! assert!(std::rc::Rc::ptr_eq(&first, &second));
//! ```

pub mod arguments;
pub mod chain;
pub mod class;
pub mod instantiator;

pub use arguments::Arguments;
pub use chain::InjectionChain;
pub use class::{Capabilities, ClassDescriptor, ClassRegistry, Injectable, Parameter};
pub use instantiator::{ConstructorInstantiator, Instantiator};
pub use serde_json::Value;

use crate::core::{InjectorResult, InstantiationError};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// Special-case class key for globally bound named arguments.
pub const GLOBAL_ARGUMENTS: &str = "__global__";

/// A constructed object.
pub type Instance = Rc<dyn Any>;

/// Factory that replaces descriptor-based construction for one class.
pub type Delegate = Rc<dyn Fn(&str) -> Option<Instance>>;

/// Explicit call-site arguments, keyed by parameter name.
pub type ArgumentMap = HashMap<String, Value>;

/// Simple dependency injector.
///
/// Bindings, argument bindings, shared markers and delegates are configured
/// through `&mut self` before the injector is handed out. `make` only
/// mutates the shared instance slots.
pub struct Injector {
    classes: ClassRegistry,
    mappings: HashMap<String, String>,
    shared_instances: RefCell<HashMap<String, Option<Instance>>>,
    delegates: HashMap<String, Delegate>,
    argument_mappings: HashMap<String, HashMap<String, Value>>,
    instantiator: Box<dyn Instantiator>,
}

impl Injector {
    pub fn new(classes: ClassRegistry) -> Self {
        Self::with_instantiator(classes, Box::new(ConstructorInstantiator))
    }

    pub fn with_instantiator(classes: ClassRegistry, instantiator: Box<dyn Instantiator>) -> Self {
        let mut argument_mappings = HashMap::new();
        argument_mappings.insert(GLOBAL_ARGUMENTS.to_string(), HashMap::new());

        Self {
            classes,
            mappings: HashMap::new(),
            shared_instances: RefCell::new(HashMap::new()),
            delegates: HashMap::new(),
            argument_mappings,
            instantiator,
        }
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Make an instance of a class or interface
    pub fn make(&self, class: &str) -> InjectorResult<Instance> {
        self.make_with_arguments(class, &ArgumentMap::new())
    }

    /// Make an instance, taking by-name arguments from `arguments` first
    pub fn make_with_arguments(
        &self,
        class: &str,
        arguments: &ArgumentMap,
    ) -> InjectorResult<Instance> {
        self.build(InjectionChain::new(), class, arguments)
    }

    /// Make an instance and downcast it to its concrete type
    pub fn make_as<T: Any>(&self, class: &str) -> InjectorResult<Rc<T>> {
        self.make(class)?
            .downcast::<T>()
            .map_err(|_| InstantiationError::InvalidReflection(class.to_string()))
    }

    /// View an instance through a trait object its class declared
    pub fn cast<I: ?Sized + 'static>(&self, instance: &Instance) -> Option<Rc<I>> {
        self.classes.describe(instance.as_ref())?.cast::<I>(instance)
    }

    /// Resolve `from` to `to` at make time. `to` is not validated here.
    pub fn bind(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.mappings.insert(from.into(), to.into());
        self
    }

    /// Bind a value to a named constructor parameter of `class`.
    ///
    /// Use [`GLOBAL_ARGUMENTS`] as the class to bind for every class.
    pub fn bind_argument(
        &mut self,
        class: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.argument_mappings
            .entry(class.into())
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    /// Cache the first instance made for `class` and reuse it afterwards
    pub fn share(&mut self, class: impl Into<String>) -> &mut Self {
        self.shared_instances.get_mut().insert(class.into(), None);
        self
    }

    pub fn delegate<F>(&mut self, class: impl Into<String>, delegate: F) -> &mut Self
    where
        F: Fn(&str) -> Option<Instance> + 'static,
    {
        self.delegates.insert(class.into(), Rc::new(delegate));
        self
    }

    pub fn is_shared(&self, class: &str) -> bool {
        self.shared_instances.borrow().contains_key(class)
    }

    fn build(
        &self,
        chain: InjectionChain,
        requested: &str,
        arguments: &ArgumentMap,
    ) -> InjectorResult<Instance> {
        let chain = self.resolve(chain, requested)?;
        let class = chain.current_target()?;

        if self.has_shared_instance(class) {
            trace!(class, "Reusing shared instance");
            return self.get_shared_instance(class);
        }

        let object = if let Some(delegate) = self.delegates.get(class) {
            debug!(class, "Making instance through delegate");
            self.invoke_delegate(class, delegate)?
        } else {
            let reflection = self.get_class_reflection(class)?;
            Self::ensure_is_instantiable(reflection)?;
            let dependencies = self.get_dependencies_for(&chain, reflection, arguments)?;
            let object = self.instantiator.instantiate(reflection, &dependencies)?;
            if reflection.type_id() != Some((*object).type_id()) {
                return Err(InstantiationError::InvalidReflection(class.to_string()));
            }
            object
        };

        if let Some(slot) = self.shared_instances.borrow_mut().get_mut(class) {
            trace!(class, "Storing shared instance");
            *slot = Some(Rc::clone(&object));
        }

        Ok(object)
    }

    /// Follow bindings from `requested` to the final concrete target.
    fn resolve(
        &self,
        mut chain: InjectionChain,
        requested: &str,
    ) -> InjectorResult<InjectionChain> {
        let mut current = requested;
        loop {
            if chain.has_resolution(current) {
                return Err(InstantiationError::CircularReference {
                    class: current.to_string(),
                    chain: chain.chain(),
                });
            }
            chain.add_resolution(current);

            match self.mappings.get(current) {
                Some(to) => {
                    trace!(from = current, to = to.as_str(), "Following binding");
                    current = to.as_str();
                }
                None => {
                    chain.add_to_chain(current);
                    return Ok(chain);
                }
            }
        }
    }

    fn get_dependencies_for<'a>(
        &'a self,
        chain: &InjectionChain,
        reflection: &'a ClassDescriptor,
        arguments: &ArgumentMap,
    ) -> InjectorResult<Arguments<'a>> {
        let class = reflection.name();
        let mut dependencies = Arguments::new(class, &self.classes);

        for parameter in reflection.parameters() {
            dependencies = match parameter {
                Parameter::Dependency { name, class: dependency } => {
                    let object = self.build(chain.clone(), dependency, &ArgumentMap::new())?;
                    dependencies.with_object(name.as_str(), object)
                }
                Parameter::Value { name, default } => {
                    let value = self.resolve_argument_by_name(class, name, default, arguments)?;
                    dependencies.with_value(name.as_str(), value)
                }
            };
        }

        Ok(dependencies)
    }

    fn resolve_argument_by_name(
        &self,
        class: &str,
        name: &str,
        default: &Option<Value>,
        arguments: &ArgumentMap,
    ) -> InjectorResult<Value> {
        // Provided directly to the make() call.
        if let Some(value) = arguments.get(name) {
            return Ok(value.clone());
        }

        if let Some(value) = self
            .argument_mappings
            .get(class)
            .and_then(|mapped| mapped.get(name))
        {
            return Ok(value.clone());
        }

        if let Some(value) = self
            .argument_mappings
            .get(GLOBAL_ARGUMENTS)
            .and_then(|mapped| mapped.get(name))
        {
            return Ok(value.clone());
        }

        default
            .clone()
            .ok_or_else(|| InstantiationError::UnresolvedArgument {
                argument: name.to_string(),
                class: class.to_string(),
            })
    }

    fn invoke_delegate(&self, class: &str, delegate: &Delegate) -> InjectorResult<Instance> {
        let object =
            delegate(class).ok_or_else(|| InstantiationError::InvalidDelegate(class.to_string()))?;

        let expected = self.classes.get(class).and_then(ClassDescriptor::type_id);
        match expected {
            Some(type_id) if type_id != (*object).type_id() => {
                Err(InstantiationError::InvalidDelegate(class.to_string()))
            }
            _ => Ok(object),
        }
    }

    fn has_shared_instance(&self, class: &str) -> bool {
        matches!(self.shared_instances.borrow().get(class), Some(Some(_)))
    }

    fn get_shared_instance(&self, class: &str) -> InjectorResult<Instance> {
        match self.shared_instances.borrow().get(class) {
            Some(Some(instance)) => Ok(Rc::clone(instance)),
            _ => Err(InstantiationError::UninstantiatedSharedInstance(
                class.to_string(),
            )),
        }
    }

    fn get_class_reflection(&self, class: &str) -> InjectorResult<&ClassDescriptor> {
        self.classes
            .get(class)
            .ok_or_else(|| InstantiationError::UnreflectableClass(class.to_string()))
    }

    fn ensure_is_instantiable(reflection: &ClassDescriptor) -> InjectorResult<()> {
        if !reflection.is_instantiable() {
            return Err(InstantiationError::UnresolvedInterface(
                reflection.name().to_string(),
            ));
        }
        Ok(())
    }
}
