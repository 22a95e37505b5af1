//! Common fixtures for integration tests

use servicewire::config::Settings;
use servicewire::core::InjectorResult;
use servicewire::di::mocks::RecordingHost;
use servicewire::di::{
    Activateable, Conditional, Deactivateable, Delayed, HasDependencies, Registerable, Service,
    ServiceClass,
};
use servicewire::host::Host;
use servicewire::injector::{Arguments, Injectable};
use servicewire::orchestrator::{Orchestrator, ServiceManifest};
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

thread_local! {
    static EVENTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Install a test-writer subscriber, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Append to this thread's fixture log
pub fn record(event: impl Into<String>) {
    EVENTS.with(|events| events.borrow_mut().push(event.into()));
}

/// Drain this thread's fixture log
pub fn take_events() -> Vec<String> {
    EVENTS.with(|events| events.take())
}

pub fn built(class: &str) -> usize {
    let expected = format!("construct:{}", class);
    EVENTS.with(|events| events.borrow().iter().filter(|e| **e == expected).count())
}

macro_rules! service {
    ($name:ident) => {
        pub struct $name;

        impl Service for $name {}

        impl Injectable for $name {
            const NAME: &'static str = stringify!($name);

            fn construct(_args: &Arguments<'_>) -> InjectorResult<Self> {
                record(concat!("construct:", stringify!($name)));
                Ok($name)
            }
        }
    };
}

service!(ServiceA);
service!(ServiceB);
service!(ServiceC);
service!(Unneeded);
service!(InitService);
service!(LoadedService);
service!(AfterInit);
service!(AfterBothEvents);
service!(CycleLeft);
service!(CycleRight);
service!(Ghostly);
service!(Lifecycle);
service!(Menu);
service!(OptionalFeature);
service!(OptionalLeft);
service!(OptionalRight);
service!(UsesOptional);

impl HasDependencies for ServiceC {
    fn dependencies() -> &'static [&'static str] {
        &["a", "b"]
    }
}

impl Conditional for Unneeded {
    fn is_needed() -> bool {
        false
    }
}

impl Delayed for InitService {
    fn registration_event() -> &'static str {
        "init"
    }
}

impl Delayed for LoadedService {
    fn registration_event() -> &'static str {
        "wp_loaded"
    }
}

impl HasDependencies for AfterInit {
    fn dependencies() -> &'static [&'static str] {
        &["delayed"]
    }
}

impl HasDependencies for AfterBothEvents {
    fn dependencies() -> &'static [&'static str] {
        &["delayed", "loaded"]
    }
}

impl HasDependencies for CycleLeft {
    fn dependencies() -> &'static [&'static str] {
        &["right"]
    }
}

impl HasDependencies for CycleRight {
    fn dependencies() -> &'static [&'static str] {
        &["left"]
    }
}

impl HasDependencies for Ghostly {
    fn dependencies() -> &'static [&'static str] {
        &["ghost"]
    }
}

impl Conditional for OptionalFeature {
    fn is_needed() -> bool {
        false
    }
}

impl HasDependencies for OptionalFeature {
    fn dependencies() -> &'static [&'static str] {
        &["plugin_only_dep"]
    }
}

impl Conditional for OptionalLeft {
    fn is_needed() -> bool {
        false
    }
}

impl HasDependencies for OptionalLeft {
    fn dependencies() -> &'static [&'static str] {
        &["optional_right"]
    }
}

impl Conditional for OptionalRight {
    fn is_needed() -> bool {
        false
    }
}

impl HasDependencies for OptionalRight {
    fn dependencies() -> &'static [&'static str] {
        &["optional_left"]
    }
}

impl HasDependencies for UsesOptional {
    fn dependencies() -> &'static [&'static str] {
        &["optional"]
    }
}

impl Activateable for Lifecycle {
    fn activate(&self) {
        record("activate:Lifecycle");
    }
}

impl Deactivateable for Lifecycle {
    fn deactivate(&self) {
        record("deactivate:Lifecycle");
    }
}

impl Registerable for Menu {
    fn register(&self, host: &dyn Host) {
        record("register:Menu");
        host.subscribe(
            "admin_menu",
            Box::new(|| {
                record("admin_menu:Menu");
                Ok(())
            }),
        );
    }
}

/// Manifest declaring every fixture class, but no services
pub fn fixture_manifest() -> ServiceManifest {
    with_fixture_classes(ServiceManifest::new())
}

/// Add every fixture class to `manifest`
pub fn with_fixture_classes(manifest: ServiceManifest) -> ServiceManifest {
    manifest
        .class(ServiceClass::<ServiceA>::new())
        .class(ServiceClass::<ServiceB>::new())
        .class(ServiceClass::<ServiceC>::new().with_dependencies())
        .class(ServiceClass::<Unneeded>::new().conditional())
        .class(ServiceClass::<InitService>::new().delayed())
        .class(ServiceClass::<LoadedService>::new().delayed())
        .class(ServiceClass::<AfterInit>::new().with_dependencies())
        .class(ServiceClass::<AfterBothEvents>::new().with_dependencies())
        .class(ServiceClass::<CycleLeft>::new().with_dependencies())
        .class(ServiceClass::<CycleRight>::new().with_dependencies())
        .class(ServiceClass::<Ghostly>::new().with_dependencies())
        .class(
            ServiceClass::<Lifecycle>::new()
                .activateable()
                .deactivateable(),
        )
        .class(ServiceClass::<Menu>::new().registerable())
        .class(
            ServiceClass::<OptionalFeature>::new()
                .conditional()
                .with_dependencies(),
        )
        .class(
            ServiceClass::<OptionalLeft>::new()
                .conditional()
                .with_dependencies(),
        )
        .class(
            ServiceClass::<OptionalRight>::new()
                .conditional()
                .with_dependencies(),
        )
        .class(ServiceClass::<UsesOptional>::new().with_dependencies())
}

/// Orchestrator over a recording host with default settings
pub fn orchestrate(manifest: ServiceManifest) -> (Orchestrator, Rc<RecordingHost>) {
    init_tracing();
    take_events();
    let host = Rc::new(RecordingHost::new());
    let orchestrator = Orchestrator::new(manifest, host.clone(), Settings::default())
        .expect("manifest should configure the injector");
    (orchestrator, host)
}

pub fn container_ids(orchestrator: &Orchestrator) -> Vec<String> {
    orchestrator
        .container()
        .ids()
        .map(str::to_string)
        .collect()
}
