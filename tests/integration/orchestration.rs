//! End-to-end service registration

use super::common::*;
use servicewire::config::{ManifestConfig, Settings};
use servicewire::core::{ConfigurationError, ServiceError, WireError};
use servicewire::host::{EventDispatcher, ExtensionTable, Host};
use servicewire::orchestrator::{Orchestrator, Resolvable, ServiceManifest, ServiceState};
use std::rc::Rc;
use tempfile::TempDir;

#[test]
fn test_dependencies_are_resolved() {
    let (orchestrator, _host) = orchestrate(
        fixture_manifest()
            .service("a", "ServiceA")
            .service("b", "ServiceB")
            .service("c", "ServiceC"),
    );
    orchestrator.register_services().unwrap();

    assert_eq!(container_ids(&orchestrator), ["injector", "a", "b", "c"]);
    let c = orchestrator.container().get("c").unwrap();
    assert!(c.downcast::<ServiceC>().is_ok());
}

#[test]
fn test_dependent_declared_first_registers_after_its_dependencies() {
    let (orchestrator, _host) = orchestrate(
        fixture_manifest()
            .service("c", "ServiceC")
            .service("a", "ServiceA")
            .service("b", "ServiceB"),
    );
    orchestrator.register_services().unwrap();

    assert_eq!(container_ids(&orchestrator), ["injector", "a", "b", "c"]);
}

#[test]
fn test_registration_runs_once() {
    let (orchestrator, host) = orchestrate(
        fixture_manifest()
            .service("a", "ServiceA")
            .service("menu", "Menu"),
    );
    orchestrator.register();
    host.fire("plugins_loaded").unwrap();
    orchestrator.register_services().unwrap();
    orchestrator.register_services().unwrap();

    assert_eq!(built("ServiceA"), 1);
    assert_eq!(built("Menu"), 1);
    let registrations = take_events()
        .into_iter()
        .filter(|e| e == "register:Menu")
        .count();
    assert_eq!(registrations, 1);
}

#[test]
fn test_unneeded_service_is_never_constructed() {
    let (orchestrator, _host) = orchestrate(
        fixture_manifest()
            .service("a", "ServiceA")
            .service("unneeded", "Unneeded"),
    );
    orchestrator.register_services().unwrap();

    assert!(!orchestrator.container().has("unneeded"));
    assert_eq!(built("Unneeded"), 0);
    assert_eq!(orchestrator.state_of("unneeded"), Some(ServiceState::Skipped));
}

#[test]
fn test_unneeded_service_dependencies_are_not_checked() {
    let (orchestrator, _host) = orchestrate(
        fixture_manifest()
            .service("optional", "OptionalFeature")
            .service("a", "ServiceA")
            .service("uses_optional", "UsesOptional")
            .service("optional_left", "OptionalLeft")
            .service("optional_right", "OptionalRight"),
    );
    orchestrator.register_services().unwrap();

    assert_eq!(container_ids(&orchestrator), ["injector", "a"]);
    for id in ["optional", "uses_optional", "optional_left", "optional_right"] {
        assert_eq!(orchestrator.state_of(id), Some(ServiceState::Skipped), "{}", id);
    }
    assert_eq!(built("OptionalFeature"), 0);
    assert_eq!(built("UsesOptional"), 0);
}

#[test]
fn test_missing_dependency_names_absent_id() {
    let (orchestrator, _host) = orchestrate(fixture_manifest().service("ghostly", "Ghostly"));

    match orchestrator.register_services() {
        Err(WireError::Service(ServiceError::MissingService {
            service,
            dependency,
        })) => {
            assert_eq!(service, "ghostly");
            assert_eq!(dependency, "ghost");
        }
        other => panic!("expected MissingService, got {:?}", other),
    }
    assert_eq!(built("Ghostly"), 0);
}

#[test]
fn test_circular_services_fail_before_construction() {
    let (orchestrator, _host) = orchestrate(
        fixture_manifest()
            .service("a", "ServiceA")
            .service("left", "CycleLeft")
            .service("right", "CycleRight"),
    );

    match orchestrator.register_services() {
        Err(WireError::Service(ServiceError::CircularDependency { cycle })) => {
            assert_eq!(cycle, ["left", "right", "left"]);
        }
        other => panic!("expected CircularDependency, got {:?}", other),
    }
    assert!(take_events().is_empty());
}

#[test]
fn test_delayed_service_appears_when_event_fires() {
    let (orchestrator, host) = orchestrate(fixture_manifest().service("delayed", "InitService"));
    orchestrator.register_services().unwrap();

    assert!(!orchestrator.container().has("delayed"));
    host.fire("init").unwrap();
    assert!(orchestrator.container().has("delayed"));
}

#[test]
fn test_delayed_dependencies_resolve_on_event() {
    let (orchestrator, host) = orchestrate(
        fixture_manifest()
            .service("delayed", "InitService")
            .service("dependent", "AfterInit"),
    );
    orchestrator.register_services().unwrap();

    assert!(!orchestrator.container().has("delayed"));
    assert!(!orchestrator.container().has("dependent"));
    assert_eq!(
        orchestrator.state_of("dependent"),
        Some(ServiceState::WaitingOnDependency("delayed".to_string()))
    );

    host.fire("init").unwrap();
    assert_eq!(
        container_ids(&orchestrator),
        ["injector", "delayed", "dependent"]
    );
}

#[test]
fn test_multiple_delayed_dependencies_resolve_on_events() {
    let (orchestrator, host) = orchestrate(
        fixture_manifest()
            .service("delayed", "InitService")
            .service("loaded", "LoadedService")
            .service("dependent", "AfterBothEvents"),
    );
    orchestrator.register_services().unwrap();
    assert_eq!(container_ids(&orchestrator), ["injector"]);

    host.fire("init").unwrap();
    assert!(orchestrator.container().has("delayed"));
    assert!(!orchestrator.container().has("dependent"));

    host.fire("wp_loaded").unwrap();
    assert_eq!(
        container_ids(&orchestrator),
        ["injector", "delayed", "loaded", "dependent"]
    );
}

#[test]
fn test_never_fired_event_leaves_service_unregistered() {
    let (orchestrator, host) = orchestrate(
        fixture_manifest()
            .service("loaded", "LoadedService")
            .service("a", "ServiceA"),
    );
    orchestrator.register_services().unwrap();
    host.fire("init").unwrap();

    assert_eq!(container_ids(&orchestrator), ["injector", "a"]);
    assert_eq!(
        orchestrator.state_of("loaded"),
        Some(ServiceState::WaitingOnEvent("wp_loaded".to_string()))
    );
}

#[test]
fn test_registerable_hook_can_subscribe() {
    let (orchestrator, host) = orchestrate(fixture_manifest().service("menu", "Menu"));
    orchestrator.register_services().unwrap();
    assert_eq!(host.subscriptions(), ["admin_menu"]);

    host.fire("admin_menu").unwrap();
    assert_eq!(
        take_events(),
        ["construct:Menu", "register:Menu", "admin_menu:Menu"]
    );
}

#[test]
fn test_activation_is_broadcast() {
    let (orchestrator, _host) = orchestrate(
        fixture_manifest()
            .service("a", "ServiceA")
            .service("lifecycle", "Lifecycle"),
    );

    orchestrator.activate().unwrap();
    orchestrator.deactivate().unwrap();

    let lifecycle: Vec<String> = take_events()
        .into_iter()
        .filter(|e| !e.starts_with("construct:"))
        .collect();
    assert_eq!(lifecycle, ["activate:Lifecycle", "deactivate:Lifecycle"]);
}

#[test]
fn test_failure_keeps_earlier_services() {
    let (orchestrator, _host) = orchestrate(
        fixture_manifest()
            .service("a", "ServiceA")
            .service("broken", "NoSuchClass")
            .service("b", "ServiceB"),
    );

    let result = orchestrator.register_services();
    assert!(matches!(result, Err(WireError::Instantiation(_))));
    assert_eq!(container_ids(&orchestrator), ["injector", "a"]);
}

#[test]
fn test_factory_class_is_resolved_at_registration() {
    let manifest = fixture_manifest().service(
        "picked",
        Resolvable::factory(|_, container| {
            if container.has("injector") {
                "ServiceB".to_string()
            } else {
                "ServiceA".to_string()
            }
        }),
    );
    let (orchestrator, _host) = orchestrate(manifest);
    orchestrator.register_services().unwrap();

    assert!(orchestrator
        .container()
        .get_as::<ServiceB>("picked")
        .is_ok());
}

#[test]
fn test_services_extension_replaces_a_service() {
    init_tracing();
    let host = Rc::new(EventDispatcher::new());
    host.add_extension("services", |table| match table {
        ExtensionTable::Services(mut services) => {
            services.insert("a".to_string(), "ServiceB".into());
            ExtensionTable::Services(services)
        }
        other => other,
    });

    let orchestrator = Orchestrator::new(
        fixture_manifest().service("a", "ServiceA"),
        host,
        Settings::default(),
    )
    .unwrap();
    orchestrator.register_services().unwrap();

    assert!(orchestrator.container().get_as::<ServiceB>("a").is_ok());
}

#[test]
fn test_wrongly_shaped_services_table_is_rejected() {
    init_tracing();
    let host = Rc::new(EventDispatcher::new());
    host.add_extension("services", |_| ExtensionTable::SharedInstances(Vec::new()));

    let orchestrator = Orchestrator::new(
        fixture_manifest().service("a", "ServiceA"),
        host,
        Settings::default(),
    )
    .unwrap();

    assert!(matches!(
        orchestrator.register_services(),
        Err(WireError::Configuration(ConfigurationError::InvalidTable {
            table: "services",
            ..
        }))
    ));
}

#[test]
fn test_yaml_manifest_drives_registration() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("services.yaml");
    std::fs::write(
        &path,
        r#"
settings:
  registration_event: init
  service_prefix: "acme."
services:
  c: ServiceC
  a: ServiceA
  b: Alias
bindings:
  Alias: ServiceB
shared_instances:
  - ServiceA
"#,
    )
    .unwrap();

    let config = ManifestConfig::load(&path).unwrap();
    let manifest = with_fixture_classes(ServiceManifest::from_config(&config));

    let host = Rc::new(EventDispatcher::new());
    let orchestrator = Orchestrator::new(manifest, host.clone(), config.settings).unwrap();
    orchestrator.register();

    assert_eq!(host.pending("init"), 1);
    host.fire("init").unwrap();

    assert_eq!(
        container_ids(&orchestrator),
        ["acme.injector", "a", "b", "c"]
    );
    assert!(orchestrator.container().get_as::<ServiceB>("b").is_ok());
    assert!(orchestrator.injector().is_shared("ServiceA"));
    assert!(!host.has_fired("plugins_loaded"));
}

#[test]
fn test_dropped_orchestrator_ignores_events() {
    init_tracing();
    let host = Rc::new(EventDispatcher::new());
    {
        let orchestrator = Orchestrator::new(
            fixture_manifest().service("a", "ServiceA"),
            host.clone(),
            Settings::default(),
        )
        .unwrap();
        orchestrator.register();
    }

    assert!(host.fire("plugins_loaded").is_ok());
}
