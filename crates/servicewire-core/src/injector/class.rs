//! Declared constructor metadata
//!
//! Types opt into injection by implementing [`Injectable`]: they name
//! themselves, list their constructor parameters and build themselves from
//! the resolved [`Arguments`]. A [`ClassDescriptor`] erases that into a
//! registry entry and records which service capabilities the type declares.

use super::arguments::Arguments;
use super::Instance;
use crate::core::{InjectorResult, InstantiationError};
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

/// A type the injector can construct.
pub trait Injectable: Any + Sized {
    /// Stable type identifier used in bindings and service tables
    const NAME: &'static str;

    /// Constructor parameters in declaration order
    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    fn construct(args: &Arguments<'_>) -> InjectorResult<Self>;
}

/// One constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// Typed with a non-builtin type identifier, resolved recursively.
    Dependency { name: String, class: String },
    /// Builtin or untyped, resolved by name from bound arguments.
    Value {
        name: String,
        default: Option<Value>,
    },
}

impl Parameter {
    pub fn dependency(name: impl Into<String>, class: impl Into<String>) -> Self {
        Parameter::Dependency {
            name: name.into(),
            class: class.into(),
        }
    }

    pub fn value(name: impl Into<String>) -> Self {
        Parameter::Value {
            name: name.into(),
            default: None,
        }
    }

    /// Attach a declared default to a by-name parameter
    pub fn with_default(self, default: impl Into<Value>) -> Self {
        match self {
            Parameter::Value { name, .. } => Parameter::Value {
                name,
                default: Some(default.into()),
            },
            dependency => dependency,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Parameter::Dependency { name, .. } | Parameter::Value { name, .. } => name,
        }
    }
}

type Constructor = Rc<dyn Fn(&Arguments<'_>) -> InjectorResult<Instance>>;

/// Static capability hooks a class declared.
///
/// The fn pointers are filled by capability-aware builders, which
/// carry the trait bounds, so a hook is present exactly when the type
/// implements the matching capability trait.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub is_needed: Option<fn() -> bool>,
    pub dependencies: Option<fn() -> &'static [&'static str]>,
    pub registration_event: Option<fn() -> &'static str>,
    pub service: bool,
    /// Instance-level hooks, keyed by the `TypeId` of the hook trait object.
    hooks: HashMap<TypeId, Rc<dyn Any>>,
}

impl Capabilities {
    pub fn insert_hook<H: ?Sized + 'static>(&mut self, hook: fn(&dyn Any) -> Option<&H>) {
        self.hooks.insert(TypeId::of::<H>(), Rc::new(hook));
    }

    /// View `instance` through the hook trait `H`, if the class declared it
    pub fn hook<'a, H: ?Sized + 'static>(&self, instance: &'a dyn Any) -> Option<&'a H> {
        let hook = self.hooks.get(&TypeId::of::<H>())?;
        let hook = hook.downcast_ref::<fn(&dyn Any) -> Option<&H>>()?;
        hook(instance)
    }
}

#[derive(Clone)]
enum ClassKind {
    Concrete {
        type_id: TypeId,
        parameters: Vec<Parameter>,
        constructor: Constructor,
    },
    Interface,
}

/// Registry entry describing one type identifier.
#[derive(Clone)]
pub struct ClassDescriptor {
    name: String,
    kind: ClassKind,
    capabilities: Capabilities,
    /// Upcasts to trait objects, keyed by the trait object's `TypeId`.
    casts: HashMap<TypeId, Rc<dyn Any>>,
}

type Cast<I> = Rc<dyn Fn(Instance) -> Option<Rc<I>>>;

impl ClassDescriptor {
    /// Describe a concrete, constructible type
    pub fn of<T: Injectable>() -> Self {
        let constructor: Constructor =
            Rc::new(|args: &Arguments<'_>| Ok(Rc::new(T::construct(args)?) as Instance));
        Self {
            name: T::NAME.to_string(),
            kind: ClassKind::Concrete {
                type_id: TypeId::of::<T>(),
                parameters: T::parameters(),
                constructor,
            },
            capabilities: Capabilities::default(),
            casts: HashMap::new(),
        }
    }

    /// Describe an abstract type identifier that must be bound before use
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Interface,
            capabilities: Capabilities::default(),
            casts: HashMap::new(),
        }
    }

    /// Allow instances of `T` to be viewed as the trait object `I`.
    ///
    /// ```ignore
    /// ClassDescriptor::of::<FileLogger>()
    ///     .implements::<dyn Logger, FileLogger>(|l| l as Rc<dyn Logger>)
    /// ```
    pub fn implements<I: ?Sized + 'static, T: Any>(mut self, cast: fn(Rc<T>) -> Rc<I>) -> Self {
        let cast: Cast<I> =
            Rc::new(move |instance: Instance| instance.downcast::<T>().ok().map(cast));
        self.casts.insert(TypeId::of::<I>(), Rc::new(cast));
        self
    }

    pub(crate) fn cast<I: ?Sized + 'static>(&self, instance: &Instance) -> Option<Rc<I>> {
        let cast = self.casts.get(&TypeId::of::<I>())?.downcast_ref::<Cast<I>>()?;
        cast(Rc::clone(instance))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_instantiable(&self) -> bool {
        matches!(self.kind, ClassKind::Concrete { .. })
    }

    /// `TypeId` of the concrete type, `None` for interfaces
    pub fn type_id(&self) -> Option<TypeId> {
        match &self.kind {
            ClassKind::Concrete { type_id, .. } => Some(*type_id),
            ClassKind::Interface => None,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        match &self.kind {
            ClassKind::Concrete { parameters, .. } => parameters,
            ClassKind::Interface => &[],
        }
    }

    /// Run the declared constructor
    pub fn construct(&self, arguments: &Arguments<'_>) -> InjectorResult<Instance> {
        match &self.kind {
            ClassKind::Concrete { constructor, .. } => constructor(arguments),
            ClassKind::Interface => {
                Err(InstantiationError::UnresolvedInterface(self.name.clone()))
            }
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.capabilities
    }
}

/// Known type identifiers, the injector's stand-in for runtime reflection.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassDescriptor>,
    by_type: HashMap<TypeId, String>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its own name, replacing any previous one
    pub fn register(&mut self, descriptor: ClassDescriptor) -> &mut Self {
        if let Some(type_id) = descriptor.type_id() {
            self.by_type.insert(type_id, descriptor.name().to_string());
        }
        self.classes.insert(descriptor.name().to_string(), descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Descriptor of the concrete type behind an instance
    pub fn describe(&self, instance: &dyn Any) -> Option<&ClassDescriptor> {
        let name = self.by_type.get(&instance.type_id())?;
        self.classes.get(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
