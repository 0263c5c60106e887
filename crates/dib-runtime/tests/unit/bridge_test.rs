//! Tests for the runtime bridge state machine

use crate::test_utils::{component, external, foo_bar, foo_bar_factories, local, registration};
use dib_domain::{BindingKey, BindingKind, ConstructionPoint, DependencyMode, Scope};
use dib_runtime::{
    BridgeConfig, BridgeError, BridgeState, FactoryRegistry, HostInjector, Injector, Instance,
    RuntimeBridge,
};

fn bridge() -> RuntimeBridge {
    RuntimeBridge::new(BridgeConfig::default()).with_factories(foo_bar_factories())
}

#[test]
fn test_states_follow_load_and_register() {
    let mut bridge = bridge();
    assert_eq!(bridge.state(), BridgeState::Uninitialized);

    bridge.load_registration(foo_bar(Scope::Singleton)).unwrap();
    assert_eq!(bridge.state(), BridgeState::Loading);

    let mut injector = Injector::new();
    bridge.register(&mut injector).unwrap();
    assert_eq!(bridge.state(), BridgeState::Ready);
    assert_eq!(
        bridge.bound_keys(),
        [BindingKey::new("app::Foo"), BindingKey::new("app::Bar")]
    );
}

#[test]
fn test_registering_same_artifact_twice_yields_same_bound_set() {
    let mut injector = Injector::new();

    let mut first = bridge();
    first.load_registration(foo_bar(Scope::Singleton)).unwrap();
    first.load_registration(foo_bar(Scope::Singleton)).unwrap();
    first.register(&mut injector).unwrap();
    let keys: Vec<BindingKey> = injector.keys().cloned().collect();

    let mut second = bridge();
    second.load_registration(foo_bar(Scope::Singleton)).unwrap();
    second.register(&mut injector).unwrap();

    assert_eq!(second.state(), BridgeState::Ready);
    assert_eq!(injector.keys().cloned().collect::<Vec<_>>(), keys);
    assert_eq!(second.bound_keys(), first.bound_keys());
}

#[test]
fn test_different_descriptor_for_bound_key_conflicts() {
    let mut injector = Injector::new();
    let mut first = bridge();
    first.load_registration(foo_bar(Scope::Singleton)).unwrap();
    first.register(&mut injector).unwrap();

    let mut second = bridge();
    second.load_registration(foo_bar(Scope::Prototype)).unwrap();
    let err = second.register(&mut injector).unwrap_err();

    assert!(matches!(err, BridgeError::ConflictingBinding { ref key, .. } if key == "app::Foo"));
    assert_eq!(second.state(), BridgeState::Failed);
}

#[test]
fn test_key_bound_by_host_conflicts() {
    let mut injector = Injector::new();
    injector
        .bind_instance(BindingKey::new("app::Foo"), Instance::new(0_u8))
        .unwrap();
    let mut bridge = bridge();
    bridge.load_registration(foo_bar(Scope::Singleton)).unwrap();
    assert!(matches!(
        bridge.register(&mut injector),
        Err(BridgeError::ConflictingBinding { .. })
    ));
}

#[test]
fn test_missing_factory_fails_the_bridge() {
    let mut bridge = RuntimeBridge::new(BridgeConfig::default()).with_factories(FactoryRegistry::empty());
    bridge.load_registration(foo_bar(Scope::Singleton)).unwrap();

    let err = bridge.register(&mut Injector::new()).unwrap_err();

    assert_eq!(err.to_string(), "No factory registered for app::Foo");
    assert_eq!(bridge.state(), BridgeState::Failed);
    assert!(matches!(
        bridge.load_registration(foo_bar(Scope::Singleton)),
        Err(BridgeError::InvalidState { state: BridgeState::Failed, .. })
    ));
}

#[test]
fn test_unbound_external_dependency_is_unresolved() {
    let reg = registration(vec![component(
        0,
        "app::Client",
        Scope::Singleton,
        vec![external("String@url", 0)],
    )]);
    let factories = FactoryRegistry::empty().with(BindingKey::new("app::Client"), |ctx| {
        let url: String = ctx.dependency(0)?;
        Ok(Instance::new(std::sync::Arc::new(url)))
    });
    let mut bridge = RuntimeBridge::new(BridgeConfig::default()).with_factories(factories);
    bridge.load_registration(reg).unwrap();

    let err = bridge.register(&mut Injector::new()).unwrap_err();

    assert!(err.is_wiring_error());
    assert_eq!(
        err.to_string(),
        "Unresolved binding String@url required by app::Client"
    );
    assert_eq!(bridge.state(), BridgeState::Failed);
}

#[test]
fn test_external_dependency_bound_by_host_resolves() {
    let reg = registration(vec![component(
        0,
        "app::Client",
        Scope::Singleton,
        vec![external("String@url", 0)],
    )]);
    let factories = FactoryRegistry::empty().with(BindingKey::new("app::Client"), |ctx| {
        let url: String = ctx.dependency(0)?;
        Ok(Instance::new(std::sync::Arc::new(url)))
    });
    let mut injector = Injector::new();
    injector
        .bind(BindingKey::named("String", "url"), String::from("https://example.test"))
        .unwrap();
    let mut bridge = RuntimeBridge::new(BridgeConfig::default()).with_factories(factories);
    bridge.load_registration(reg).unwrap();
    bridge.register(&mut injector).unwrap();

    let frozen = injector.freeze().unwrap();
    let client: std::sync::Arc<String> = frozen.get_type("app::Client").unwrap();
    assert_eq!(client.as_str(), "https://example.test");
}

#[test]
fn test_inactive_environment_is_skipped() {
    let mut test_only = component(0, "app::FakeMailer", Scope::Singleton, Vec::new());
    test_only.environments = vec!["test".into()];
    let mut prod_only = component(1, "app::SmtpMailer", Scope::Singleton, Vec::new());
    prod_only.environments = vec!["prod".into()];
    let reg = registration(vec![test_only, prod_only]);

    let factories = FactoryRegistry::empty()
        .with(BindingKey::new("app::FakeMailer"), |_| Ok(Instance::new(1_u8)))
        .with(BindingKey::new("app::SmtpMailer"), |_| Ok(Instance::new(2_u8)));
    let config = BridgeConfig::default().with_environment("test");
    let mut bridge = RuntimeBridge::new(config).with_factories(factories);
    bridge.load_registration(reg).unwrap();

    let mut injector = Injector::new();
    bridge.register(&mut injector).unwrap();

    assert!(injector.contains(&BindingKey::new("app::FakeMailer")));
    assert!(!injector.contains(&BindingKey::new("app::SmtpMailer")));
}

#[test]
fn test_load_json_rejects_tampered_artifact() {
    let mut reg = foo_bar(Scope::Singleton);
    reg.descriptors[1].dependencies = vec![local("app::Foo", 0, 7)];
    let json = serde_json::to_string(&reg).unwrap();

    let mut bridge = bridge();
    assert!(matches!(bridge.load_json(&json), Err(BridgeError::Domain(_))));
    assert_eq!(bridge.state(), BridgeState::Failed);
}

#[test]
fn test_register_again_after_ready_adds_new_registrations() {
    let mut injector = Injector::new();
    let mut bridge = RuntimeBridge::new(BridgeConfig::default()).with_factories(
        foo_bar_factories().with(BindingKey::new("app::Extra"), |_| Ok(Instance::new(3_u8))),
    );
    bridge.load_registration(foo_bar(Scope::Singleton)).unwrap();
    bridge.register(&mut injector).unwrap();

    let extra = dib_domain::ModuleRegistration::new(
        "extra",
        vec![component(0, "app::Extra", Scope::Prototype, Vec::new())],
    )
    .unwrap();
    bridge.load_registration(extra).unwrap();
    bridge.register(&mut injector).unwrap();

    assert_eq!(bridge.state(), BridgeState::Ready);
    assert_eq!(bridge.bound_keys().len(), 3);
    assert_eq!(bridge.registrations().len(), 2);
}

#[test]
fn test_generic_instantiations_bind_separately() {
    let reg = registration(vec![
        component(0, "Vec<String>", Scope::Singleton, Vec::new()),
        component(1, "Vec<u16>", Scope::Singleton, Vec::new()),
        component(2, "app::Ports", Scope::Singleton, vec![local("Vec<u16>", 0, 1)]),
    ]);
    let factories = FactoryRegistry::empty()
        .with(BindingKey::new("Vec<String>"), |_| {
            Ok(Instance::new(std::sync::Arc::new(vec![String::from("api")])))
        })
        .with(BindingKey::new("Vec<u16>"), |_| {
            Ok(Instance::new(std::sync::Arc::new(vec![8080_u16, 8443])))
        })
        .with(BindingKey::new("app::Ports"), |ctx| {
            let ports: std::sync::Arc<Vec<u16>> = ctx.dependency(0)?;
            Ok(Instance::new(ports))
        });
    let mut bridge = RuntimeBridge::new(BridgeConfig::default()).with_factories(factories);
    bridge.load_registration(reg).unwrap();
    let frozen = bridge.start(Injector::new()).unwrap();

    let names: std::sync::Arc<Vec<String>> = frozen.get_type("Vec<String>").unwrap();
    let ports: std::sync::Arc<Vec<u16>> = frozen.get_type("app::Ports").unwrap();
    assert_eq!(names.as_slice(), ["api"]);
    assert_eq!(ports.as_slice(), [8080, 8443]);
    assert_eq!(bridge.bound_keys().len(), 3);
}

#[test]
fn test_set_skips_contributions_of_inactive_environment() {
    let mut fake = component(0, "u8@app::Plugins::fake", Scope::Singleton, Vec::new());
    fake.environments = vec!["test".into()];
    let real = component(1, "u8@app::Plugins::real", Scope::Singleton, Vec::new());
    let mut set = component(
        2,
        "Vec<u8>",
        Scope::Prototype,
        vec![
            local("u8@app::Plugins::fake", 0, 0).with_mode(DependencyMode::Optional),
            local("u8@app::Plugins::real", 1, 1).with_mode(DependencyMode::Optional),
        ],
    );
    set.kind = BindingKind::Set;
    set.construction = ConstructionPoint::Collect;
    let reg = registration(vec![fake, real, set]);

    let factories = FactoryRegistry::empty()
        .with(BindingKey::named("u8", "app::Plugins::fake"), |_| Ok(Instance::new(1_u8)))
        .with(BindingKey::named("u8", "app::Plugins::real"), |_| Ok(Instance::new(2_u8)))
        .with(BindingKey::new("Vec<u8>"), |ctx| {
            let mut items = Vec::new();
            for position in 0..2 {
                if let Some(item) = ctx.optional_dependency::<u8>(position)? {
                    items.push(item);
                }
            }
            Ok(Instance::new(items))
        });
    let config = BridgeConfig::default().with_environment("prod");
    let mut bridge = RuntimeBridge::new(config).with_factories(factories);
    bridge.load_registration(reg).unwrap();
    let frozen = bridge.start(Injector::new()).unwrap();

    let plugins: Vec<u8> = frozen.get_type("Vec<u8>").unwrap();
    assert_eq!(plugins, [2]);
}
