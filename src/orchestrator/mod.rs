//! Service orchestrator
//!
//! Turns a [`ServiceManifest`] into registered services. Construction goes
//! through the injector; what gets constructed, and when, depends on the
//! capabilities each service class declared:
//!
//! - `Conditional` services whose predicate fails are skipped for good,
//!   before their dependencies are checked.
//! - Services with dependencies wait until every dependency is in the
//!   container. Within one pass they move to the end of the walk; when a
//!   dependency is waiting on a host event they are parked until it registers.
//! - `Delayed` services subscribe to their event and register when it fires.
//!
//! Missing or circular dependencies are rejected before anything is built.
//!
//! # Example
//!
//! ```
//! use servicewire::config::Settings;
//! use servicewire::di::{Service, ServiceClass};
//! use servicewire::host::EventDispatcher;
//! use servicewire::injector::{Arguments, Injectable};
//! use servicewire::core::InjectorResult;
//! use servicewire::orchestrator::{Orchestrator, ServiceManifest};
//! use std::rc::Rc;
//!
//! struct Mailer;
//!
//! impl Service for Mailer {}
//!
//! impl Injectable for Mailer {
//!     const NAME: &'static str = "Mailer";
//!
//!     fn construct(_args: &Arguments<'_>) -> InjectorResult<Self> {
//!         Ok(Mailer)
//!     }
//! }
//!
//! let host = Rc::new(EventDispatcher::new());
//! let manifest = ServiceManifest::new()
//!     .class(ServiceClass::<Mailer>::new())
//!     .service("mailer", "Mailer");
//!
//! let orchestrator = Orchestrator::new(manifest, host.clone(), Settings::default()).unwrap();
//! orchestrator.register();
//! host.fire("plugins_loaded").unwrap();
//!
//! assert!(orchestrator.container().has("mailer"));
//! ```

pub mod manifest;

pub use manifest::{
    ArgumentTable, BindingTable, DelegationTable, ManifestParts, Resolvable, ServiceManifest,
    ServiceTable, SharedTable,
};

use crate::config::Settings;
use crate::core::{ConfigurationError, ServiceError, WireResult};
use crate::di::{Activateable, Deactivateable, Registerable, ServiceContainer};
use crate::host::{ExtensibleTable, Host};
use crate::resolver::DependencyGraph;
use indexmap::IndexMap;
use servicewire_core::injector::{Capabilities, Injector, Instance};
use std::cell::{Ref, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tracing::{debug, trace, warn};

pub const SERVICES_EXTENSION: &str = "services";
pub const BINDINGS_EXTENSION: &str = "bindings";
pub const ARGUMENTS_EXTENSION: &str = "arguments";
pub const SHARED_INSTANCES_EXTENSION: &str = "shared_instances";
pub const DELEGATIONS_EXTENSION: &str = "delegations";

/// Where a declared service is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Pending,
    /// Moved to the end of the current pass, dependencies still pending
    Deferred,
    Skipped,
    WaitingOnEvent(String),
    WaitingOnDependency(String),
    Instantiated,
    Registered,
}

#[derive(Clone)]
struct Plan {
    class: String,
    capabilities: Capabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Pass,
    Event,
    Dependency,
}

enum Step {
    Done,
    Requeue,
}

/// Drives service registration for one embedding application.
pub struct Orchestrator {
    inner: Rc<Inner>,
}

struct Inner {
    injector: Rc<Injector>,
    host: Rc<dyn Host>,
    settings: Settings,
    services: RefCell<ServiceTable>,
    container: RefCell<ServiceContainer>,
    plans: RefCell<IndexMap<String, Plan>>,
    states: RefCell<IndexMap<String, ServiceState>>,
    /// Dependency id -> services waiting for it to register
    parked: RefCell<HashMap<String, Vec<String>>>,
}

impl Orchestrator {
    /// Configure the injector from the manifest.
    ///
    /// Bindings, arguments, shared instances and delegations pass through
    /// their extension points first when extensions are enabled.
    pub fn new(
        manifest: ServiceManifest,
        host: Rc<dyn Host>,
        settings: Settings,
    ) -> WireResult<Self> {
        let ManifestParts {
            classes,
            services,
            bindings,
            arguments,
            shared_instances,
            delegations,
        } = manifest.into_parts();
        let mut injector = Injector::new(classes);

        for (from, to) in extend(host.as_ref(), &settings, BINDINGS_EXTENSION, bindings)? {
            ensure_class_name(&from)?;
            ensure_class_name(&to)?;
            injector.bind(from, to);
        }

        for (class, values) in extend(host.as_ref(), &settings, ARGUMENTS_EXTENSION, arguments)? {
            if class.is_empty() {
                return Err(ConfigurationError::InvalidArgumentMap {
                    class,
                    reason: "the class name is empty".to_string(),
                }
                .into());
            }
            for (name, value) in values {
                if name.is_empty() {
                    return Err(ConfigurationError::InvalidArgumentMap {
                        class,
                        reason: "an argument name is empty".to_string(),
                    }
                    .into());
                }
                injector.bind_argument(class.as_str(), name, value);
            }
        }

        let shared_instances = extend(
            host.as_ref(),
            &settings,
            SHARED_INSTANCES_EXTENSION,
            shared_instances,
        )?;
        for class in shared_instances {
            ensure_class_name(&class)?;
            injector.share(class);
        }

        for (class, delegate) in
            extend(host.as_ref(), &settings, DELEGATIONS_EXTENSION, delegations)?
        {
            ensure_class_name(&class)?;
            injector.delegate(class, move |requested: &str| delegate(requested));
        }

        Ok(Self {
            inner: Rc::new(Inner {
                injector: Rc::new(injector),
                host,
                settings,
                services: RefCell::new(services),
                container: RefCell::new(ServiceContainer::new()),
                plans: RefCell::new(IndexMap::new()),
                states: RefCell::new(IndexMap::new()),
                parked: RefCell::new(HashMap::new()),
            }),
        })
    }

    /// Run [`register_services`](Self::register_services) when the
    /// registration event fires.
    ///
    /// The subscription holds a weak reference, dropping the orchestrator
    /// turns it into a no-op.
    pub fn register(&self) {
        let event = self.inner.settings.registration_event.as_str();
        debug!(event, "Scheduling service registration");

        let inner = Rc::downgrade(&self.inner);
        self.inner.host.subscribe(
            event,
            Box::new(move || match inner.upgrade() {
                Some(inner) => inner.register_services(),
                None => Ok(()),
            }),
        );
    }

    /// Instantiate and register every declared service that can be.
    ///
    /// Only the first call does any work. Errors abort the pass, services
    /// registered before the failure stay in the container.
    pub fn register_services(&self) -> WireResult<()> {
        self.inner.register_services()
    }

    /// Register services, then notify every `Activateable` one
    pub fn activate(&self) -> WireResult<()> {
        self.register_services()?;
        for (id, instance) in self.inner.snapshot() {
            if let Some(service) = self.inner.hook::<dyn Activateable>(&instance) {
                debug!(id = id.as_str(), "Activating service");
                service.activate();
            }
        }
        Ok(())
    }

    /// Register services, then notify every `Deactivateable` one
    pub fn deactivate(&self) -> WireResult<()> {
        self.register_services()?;
        for (id, instance) in self.inner.snapshot() {
            if let Some(service) = self.inner.hook::<dyn Deactivateable>(&instance) {
                debug!(id = id.as_str(), "Deactivating service");
                service.deactivate();
            }
        }
        Ok(())
    }

    /// Borrow the container.
    ///
    /// Release the borrow before firing host events.
    pub fn container(&self) -> Ref<'_, ServiceContainer> {
        self.inner.container.borrow()
    }

    pub fn injector(&self) -> Rc<Injector> {
        Rc::clone(&self.inner.injector)
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Lifecycle state of a declared service, `None` before the pass ran
    pub fn state_of(&self, id: &str) -> Option<ServiceState> {
        self.inner.state(id)
    }
}

impl Inner {
    fn register_services(self: &Rc<Self>) -> WireResult<()> {
        if !self.container.borrow().is_empty() {
            trace!("Services already registered");
            return Ok(());
        }

        let injector_id = self.settings.injector_service_id();
        let injector: Instance = Rc::clone(&self.injector) as Instance;
        self.container.borrow_mut().put(injector_id.as_str(), injector);

        let services = std::mem::take(&mut *self.services.borrow_mut());
        let services = extend(
            self.host.as_ref(),
            &self.settings,
            SERVICES_EXTENSION,
            services,
        )?;

        let mut graph = DependencyGraph::new();
        graph.add_node(injector_id, Vec::<String>::new());

        let mut plans = IndexMap::new();
        let mut unneeded = Vec::new();
        for (id, class) in &services {
            if id.is_empty() || graph.contains(id) {
                return Err(ServiceError::InvalidIdentifier(id.clone()).into());
            }
            let class = class.resolve(&self.injector, &self.container.borrow());
            ensure_class_name(&class)?;

            let capabilities = self
                .injector
                .classes()
                .get(&class)
                .map(|descriptor| descriptor.capabilities().clone())
                .unwrap_or_default();

            // Not-needed services stay out of the dependency checks
            if capabilities.is_needed.is_some_and(|is_needed| !is_needed()) {
                debug!(id = id.as_str(), "Service is not needed");
                graph.add_node(id.as_str(), Vec::<String>::new());
                unneeded.push(id.clone());
            } else {
                let dependencies: &[&str] =
                    capabilities.dependencies.map(|f| f()).unwrap_or_default();
                graph.add_node(id.as_str(), dependencies.iter().copied());
            }

            plans.insert(id.clone(), Plan { class, capabilities });
        }

        graph.validate_references()?;
        graph.detect_circular_dependencies()?;

        {
            let mut states = self.states.borrow_mut();
            for id in plans.keys() {
                states.insert(id.clone(), ServiceState::Pending);
            }
            for id in unneeded {
                states.insert(id, ServiceState::Skipped);
            }
        }
        let mut queue: VecDeque<String> = plans.keys().cloned().collect();
        *self.plans.borrow_mut() = plans;
        debug!(services = queue.len(), "Registering services");

        while let Some(id) = queue.pop_front() {
            if let Step::Requeue = self.process(&id, Trigger::Pass)? {
                queue.push_back(id);
            }
        }

        Ok(())
    }

    fn process(self: &Rc<Self>, id: &str, trigger: Trigger) -> WireResult<Step> {
        let plan = match self.plans.borrow().get(id) {
            Some(plan) => plan.clone(),
            None => return Err(ServiceError::ServiceNotFound(id.to_string()).into()),
        };
        let capabilities = &plan.capabilities;

        if matches!(
            self.state(id),
            Some(ServiceState::Skipped)
                | Some(ServiceState::Instantiated)
                | Some(ServiceState::Registered)
        ) {
            return Ok(Step::Done);
        }

        let dependencies: &[&str] = capabilities.dependencies.map(|f| f()).unwrap_or_default();
        let missing: Vec<&str> = {
            let container = self.container.borrow();
            dependencies
                .iter()
                .copied()
                .filter(|dependency| !container.has(dependency))
                .collect()
        };

        if let Some(skipped) = missing
            .iter()
            .find(|dependency| self.state(dependency) == Some(ServiceState::Skipped))
        {
            warn!(id, dependency = *skipped, "Dependency was skipped, skipping service");
            self.skip(id);
            return Ok(Step::Done);
        }

        if let Some(first) = missing.first() {
            let unsettled = missing.iter().any(|dependency| {
                matches!(
                    self.state(dependency),
                    Some(ServiceState::Pending) | Some(ServiceState::Deferred)
                )
            });
            if trigger == Trigger::Pass && unsettled {
                trace!(id, "Dependencies pending, moving service to the end of the pass");
                self.set_state(id, ServiceState::Deferred);
                return Ok(Step::Requeue);
            }

            debug!(id, dependency = *first, "Waiting on dependency");
            self.parked
                .borrow_mut()
                .entry(first.to_string())
                .or_default()
                .push(id.to_string());
            self.set_state(id, ServiceState::WaitingOnDependency(first.to_string()));
            return Ok(Step::Done);
        }

        if trigger != Trigger::Event {
            if let Some(event) = capabilities.registration_event.map(|f| f()) {
                if !self.host.has_fired(event) {
                    self.wait_for_event(id, event);
                    return Ok(Step::Done);
                }
            }
        }

        self.register_service(id, &plan.class)?;
        Ok(Step::Done)
    }

    fn wait_for_event(self: &Rc<Self>, id: &str, event: &str) {
        let waiting = ServiceState::WaitingOnEvent(event.to_string());
        if self.state(id).as_ref() == Some(&waiting) {
            return;
        }
        debug!(id, event, "Delaying service until event fires");
        self.set_state(id, waiting);

        let inner = Rc::downgrade(self);
        let service = id.to_string();
        self.host.subscribe(
            event,
            Box::new(move || match inner.upgrade() {
                Some(inner) => inner.process(&service, Trigger::Event).map(|_| ()),
                None => Ok(()),
            }),
        );
    }

    fn register_service(self: &Rc<Self>, id: &str, class: &str) -> WireResult<()> {
        debug!(id, class, "Registering service");
        let instance = self.injector.make(class)?;
        let descriptor = self
            .injector
            .classes()
            .describe(instance.as_ref())
            .filter(|descriptor| descriptor.capabilities().service)
            .ok_or_else(|| ServiceError::InvalidService(id.to_string()))?;

        self.set_state(id, ServiceState::Instantiated);
        self.container.borrow_mut().put(id, Rc::clone(&instance));

        if let Some(service) = descriptor
            .capabilities()
            .hook::<dyn Registerable>(instance.as_ref())
        {
            service.register(self.host.as_ref());
        }
        self.set_state(id, ServiceState::Registered);

        let dependents = self.parked.borrow_mut().remove(id).unwrap_or_default();
        for dependent in dependents {
            trace!(id, dependent = dependent.as_str(), "Retrying dependent service");
            self.process(&dependent, Trigger::Dependency)?;
        }

        Ok(())
    }

    fn skip(&self, id: &str) {
        self.set_state(id, ServiceState::Skipped);

        let dependents = self.parked.borrow_mut().remove(id).unwrap_or_default();
        for dependent in dependents {
            warn!(
                id = dependent.as_str(),
                dependency = id,
                "Dependency was skipped, skipping service"
            );
            self.skip(&dependent);
        }
    }

    fn state(&self, id: &str) -> Option<ServiceState> {
        self.states.borrow().get(id).cloned()
    }

    fn set_state(&self, id: &str, state: ServiceState) {
        trace!(id, state = ?state, "Service state changed");
        self.states.borrow_mut().insert(id.to_string(), state);
    }

    fn snapshot(&self) -> Vec<(String, Instance)> {
        self.container
            .borrow()
            .iter()
            .map(|(id, instance)| (id.to_string(), Rc::clone(instance)))
            .collect()
    }

    fn hook<'a, H: ?Sized + 'static>(&self, instance: &'a Instance) -> Option<&'a H> {
        let descriptor = self.injector.classes().describe(instance.as_ref())?;
        descriptor.capabilities().hook::<H>(instance.as_ref())
    }
}

/// Route a table through its extension point and check it kept its shape
fn extend<T: ExtensibleTable>(
    host: &dyn Host,
    settings: &Settings,
    extension: &str,
    table: T,
) -> WireResult<T> {
    if !settings.enable_extensions {
        return Ok(table);
    }

    let name = settings.extension_name(extension);
    trace!(extension = name.as_str(), "Applying extension point");
    T::from_extension(host.apply_extension(&name, table.into_extension())).map_err(|other| {
        ConfigurationError::InvalidTable {
            table: T::KIND,
            expected: T::KIND,
            found: other.kind(),
        }
        .into()
    })
}

fn ensure_class_name(class: &str) -> Result<(), ServiceError> {
    if class.trim().is_empty() {
        return Err(ServiceError::InvalidClassName(class.to_string()));
    }
    Ok(())
}
