//! End-to-end startup: load, register, freeze, resolve

use crate::test_utils::{Bar, Foo, component, foo_bar, foo_bar_factories, local, registration};
use dib_domain::{BindingDescriptor, BindingKey, BindingKind, ConstructionPoint, DescriptorId, Scope};
use dib_runtime::{
    BridgeConfig, BridgeError, BridgeState, FactoryRegistry, Injector, Instance, RuntimeBridge,
};
use std::sync::Arc;
use tempfile::TempDir;

fn start(registration: dib_domain::ModuleRegistration, factories: FactoryRegistry) -> dib_runtime::FrozenInjector {
    let mut bridge = RuntimeBridge::new(BridgeConfig::default()).with_factories(factories);
    bridge.load_registration(registration).unwrap();
    let injector = bridge.start(Injector::new()).unwrap();
    assert_eq!(bridge.state(), BridgeState::Ready);
    injector
}

#[test]
fn test_singleton_dependency_is_shared() {
    let injector = start(foo_bar(Scope::Singleton), foo_bar_factories());

    let first: Arc<Bar> = injector.get_type("app::Bar").unwrap();
    let second: Arc<Bar> = injector.get_type("app::Bar").unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.foo, &second.foo));
    assert_eq!(first.foo.label, "foo");
}

#[test]
fn test_prototype_dependency_is_fresh() {
    let injector = start(foo_bar(Scope::Prototype), foo_bar_factories());

    let first: Arc<Bar> = injector.get_type("app::Bar").unwrap();
    let second: Arc<Bar> = injector.get_type("app::Bar").unwrap();

    assert!(!Arc::ptr_eq(&first.foo, &second.foo));
}

#[test]
fn test_request_scoped_dependency_per_request() {
    let injector = start(foo_bar(Scope::Request), foo_bar_factories());

    assert!(matches!(
        injector.get_type::<Arc<Bar>>("app::Bar"),
        Err(BridgeError::ScopeNotActive { ref key }) if key == "app::Foo"
    ));

    let request = injector.request_scope();
    let a: Arc<Bar> = request.get_type("app::Bar").unwrap();
    let b: Arc<Bar> = request.get_type("app::Bar").unwrap();
    assert!(Arc::ptr_eq(&a.foo, &b.foo));

    let other: Arc<Bar> = injector.request_scope().get_type("app::Bar").unwrap();
    assert!(!Arc::ptr_eq(&a.foo, &other.foo));
}

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".into()
    }
}

#[test]
fn test_module_provider_and_linked_trait() {
    let module = BindingDescriptor {
        kind: BindingKind::Module,
        construction: ConstructionPoint::UnitStruct,
        ..component(0, "app::Settings", Scope::Singleton, Vec::new())
    };
    let port = BindingDescriptor {
        kind: BindingKind::Provider {
            module: DescriptorId(0),
            method: "port".into(),
        },
        construction: ConstructionPoint::ProviderMethod {
            name: "port".into(),
            has_receiver: true,
        },
        ..component(1, "u16@port", Scope::Singleton, vec![local("app::Settings", 0, 0)])
    };
    let english = component(2, "app::English", Scope::Singleton, Vec::new());
    let greeter = BindingDescriptor {
        kind: BindingKind::Linked {
            target: BindingKey::new("app::English"),
        },
        construction: ConstructionPoint::Link,
        ..component(3, "app::Greeter", Scope::Prototype, vec![local("app::English", 0, 2)])
    };

    struct Settings;
    impl Settings {
        fn port(&self) -> u16 {
            8080
        }
    }

    let factories = FactoryRegistry::empty()
        .with(BindingKey::new("app::Settings"), |_| Ok(Instance::new(Arc::new(Settings))))
        .with(BindingKey::named("u16", "port"), |ctx| {
            let settings: Arc<Settings> = ctx.dependency(0)?;
            Ok(Instance::new(settings.port()))
        })
        .with(BindingKey::new("app::English"), |_| Ok(Instance::new(Arc::new(English))))
        .with(BindingKey::new("app::Greeter"), |ctx| {
            let target: Arc<English> = ctx.dependency(0)?;
            let linked: Arc<dyn Greeter + Send + Sync> = target;
            Ok(Instance::new(linked))
        });

    let injector = start(registration(vec![module, port, english, greeter]), factories);

    assert_eq!(injector.get_named::<u16>("u16", "port").unwrap(), 8080);
    let greeter: Arc<dyn Greeter + Send + Sync> = injector.get_type("app::Greeter").unwrap();
    assert_eq!(greeter.greet(), "hello");
}

#[test]
fn test_start_loads_configured_artifacts() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("app.dib.json");
    foo_bar(Scope::Singleton).write_to(&path).unwrap();

    let config = BridgeConfig::default().with_artifact(&path);
    let mut bridge = RuntimeBridge::new(config).with_factories(foo_bar_factories());
    let injector = bridge.start(Injector::new()).unwrap();

    assert_eq!(injector.len(), 2);
    assert!(injector.get_type::<Arc<Foo>>("app::Foo").is_ok());
}

#[test]
fn test_missing_artifact_fails_start() {
    let temp = TempDir::new().unwrap();
    let config = BridgeConfig::default().with_artifact(temp.path().join("missing.dib.json"));
    let mut bridge = RuntimeBridge::new(config).with_factories(foo_bar_factories());

    assert!(bridge.start(Injector::new()).is_err());
    assert_eq!(bridge.state(), BridgeState::Failed);
}

#[test]
fn test_failing_eager_singleton_fails_start() {
    let mut clock = component(0, "app::Clock", Scope::Singleton, Vec::new());
    clock.eager = true;
    let factories = FactoryRegistry::empty().with(BindingKey::new("app::Clock"), |ctx| {
        Err(BridgeError::provider(ctx.key(), "no time source"))
    });
    let mut bridge = RuntimeBridge::new(BridgeConfig::default()).with_factories(factories);
    bridge.load_registration(registration(vec![clock])).unwrap();

    assert!(matches!(
        bridge.start(Injector::new()),
        Err(BridgeError::Provider { .. })
    ));
    assert_eq!(bridge.state(), BridgeState::Failed);
}
