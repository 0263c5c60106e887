//! Resolution through the registration and factories emitted by `build.rs`

use dib::runtime::{BindingKey, ModuleRegistration};
use dib_demo::clock::{Clock, SystemClock};
use dib_demo::greeter::Greeter;
use dib_demo::plugins::PluginHost;
use dib_demo::server::{Server, Supervisor};
use dib_demo::{DIB_REGISTRATION_JSON, start};
use std::sync::Arc;

#[test]
fn test_registration_lists_every_binding() {
    let registration = ModuleRegistration::from_json(DIB_REGISTRATION_JSON).unwrap();
    assert_eq!(registration.crate_name, "dib_demo");
    for key in [
        BindingKey::new("dib_demo::clock::Clock"),
        BindingKey::new("dib_demo::greeter::Greeter"),
        BindingKey::named("String", "greeting"),
        BindingKey::new("Vec<String>"),
        BindingKey::new("Vec<u16>"),
        BindingKey::new("dib_demo::server::Supervisor"),
    ] {
        assert!(registration.find(&key).is_some(), "{key} is not registered");
    }
}

#[test]
fn test_singleton_is_shared() {
    let injector = start().unwrap();
    let a: Arc<Greeter> = injector.get_type("dib_demo::greeter::Greeter").unwrap();
    let b: Arc<Greeter> = injector.get_type("dib_demo::greeter::Greeter").unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let server: Arc<Server> = injector.get_type("dib_demo::server::Server").unwrap();
    assert_eq!(server.banner(), "Hello, client!");
}

#[test]
fn test_named_provider_value() {
    let injector = start().unwrap();
    let greeting: String = injector.get_named("String", "greeting").unwrap();
    assert_eq!(greeting, "Hello");

    let greeter: Arc<Greeter> = injector.get_type("dib_demo::greeter::Greeter").unwrap();
    assert_eq!(greeter.greet("dib"), "Hello, dib!");
}

#[test]
fn test_linked_trait_resolves_to_implementation() {
    let injector = start().unwrap();
    let clock: Arc<dyn Clock + Send + Sync> = injector.get_type("dib_demo::clock::Clock").unwrap();
    let system: Arc<SystemClock> = injector.get_type("dib_demo::clock::SystemClock").unwrap();
    assert_eq!(Arc::as_ptr(&clock).cast::<()>(), Arc::as_ptr(&system).cast::<()>());

    let greeter: Arc<Greeter> = injector.get_type("dib_demo::greeter::Greeter").unwrap();
    assert!(Arc::ptr_eq(greeter.clock(), &clock));
    assert!(clock.now() > 0);
}

#[test]
fn test_generic_instantiations_resolve_separately() {
    let injector = start().unwrap();
    let hosts: Vec<String> = injector.get_type("Vec<String>").unwrap();
    let ports: Vec<u16> = injector.get_type("Vec<u16>").unwrap();
    assert_eq!(hosts, ["127.0.0.1", "::1"]);
    assert_eq!(ports, [8080, 8443]);

    let server: Arc<Server> = injector.get_type("dib_demo::server::Server").unwrap();
    assert_eq!(
        server.addresses(),
        ["127.0.0.1:8080", "127.0.0.1:8443", "::1:8080", "::1:8443"]
    );
}

#[test]
fn test_set_collects_contributions() {
    let injector = start().unwrap();
    let host: Arc<PluginHost> = injector.get_type("dib_demo::plugins::PluginHost").unwrap();
    let mut names = host.names();
    names.sort_unstable();
    assert_eq!(names, ["audit", "metrics"]);
}

#[test]
fn test_lazy_dependency_closes_cycle() {
    let injector = start().unwrap();
    let server: Arc<Server> = injector.get_type("dib_demo::server::Server").unwrap();
    let supervisor: Arc<Supervisor> = injector.get_type("dib_demo::server::Supervisor").unwrap();
    assert!(Arc::ptr_eq(server.supervisor(), &supervisor));
    assert!(Arc::ptr_eq(&supervisor.server().unwrap(), &server));
}

#[test]
fn test_lazy_dependency_outliving_injector() {
    let supervisor: Arc<Supervisor> = start()
        .unwrap()
        .get_type("dib_demo::server::Supervisor")
        .unwrap();
    assert!(supervisor.server().is_err());
}
