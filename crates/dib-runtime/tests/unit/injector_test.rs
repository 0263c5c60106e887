//! Tests for the default injector

use dib_domain::{BindingKey, Scope};
use dib_runtime::{
    BridgeError, HostInjector, Injector, Instance, Lazy, Provider, ProviderRegistration,
    ResolutionContext, Result,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn registration(key: &str, scope: Scope, eager: bool, provider: Provider) -> ProviderRegistration {
    ProviderRegistration {
        key: BindingKey::new(key),
        scope,
        eager,
        dependencies: Vec::new(),
        provider,
        descriptor: None,
    }
}

fn counting(counter: &Arc<AtomicUsize>) -> Provider {
    let counter = Arc::clone(counter);
    Arc::new(move |_: &ResolutionContext<'_>| -> Result<Instance> {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Ok(Instance::new(Arc::new(n)))
    })
}

#[test]
fn test_eager_singleton_is_built_on_freeze() {
    let built = Arc::new(AtomicUsize::new(0));
    let mut injector = Injector::new();
    injector
        .register_provider(registration("app::Clock", Scope::Singleton, true, counting(&built)))
        .unwrap();
    injector
        .register_provider(registration("app::Lazy", Scope::Singleton, false, counting(&built)))
        .unwrap();

    let frozen = injector.freeze().unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 1);

    let _: Arc<usize> = frozen.get_type("app::Clock").unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 1);
    let _: Arc<usize> = frozen.get_type("app::Lazy").unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 2);
}

#[test]
fn test_failing_eager_singleton_fails_freeze() {
    let mut injector = Injector::new();
    let failing: Provider = Arc::new(|ctx: &ResolutionContext<'_>| -> Result<Instance> {
        Err(BridgeError::provider(ctx.key(), "database unreachable"))
    });
    injector
        .register_provider(registration("app::Pool", Scope::Singleton, true, failing))
        .unwrap();

    let err = injector.freeze().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Provider for app::Pool failed: database unreachable"
    );
}

#[test]
fn test_prototype_is_built_per_resolution() {
    let built = Arc::new(AtomicUsize::new(0));
    let mut injector = Injector::new();
    injector
        .register_provider(registration("app::Job", Scope::Prototype, false, counting(&built)))
        .unwrap();
    let frozen = injector.freeze().unwrap();

    let a: Arc<usize> = frozen.get_type("app::Job").unwrap();
    let b: Arc<usize> = frozen.get_type("app::Job").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(built.load(Ordering::SeqCst), 2);
}

#[test]
fn test_singleton_is_built_once_across_threads() {
    let built = Arc::new(AtomicUsize::new(0));
    let mut injector = Injector::new();
    injector
        .register_provider(registration("app::Cache", Scope::Singleton, false, counting(&built)))
        .unwrap();
    let frozen = injector.freeze().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let frozen = frozen.clone();
            std::thread::spawn(move || frozen.get_type::<Arc<usize>>("app::Cache").unwrap())
        })
        .collect();
    let values: Vec<Arc<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(built.load(Ordering::SeqCst), 1);
    assert!(values.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn test_named_instance_and_type_mismatch() {
    let mut injector = Injector::new();
    injector
        .bind(BindingKey::named("u16", "port"), 8080_u16)
        .unwrap();
    let frozen = injector.freeze().unwrap();

    assert_eq!(frozen.get_named::<u16>("u16", "port").unwrap(), 8080);
    assert!(matches!(
        frozen.get_named::<u32>("u16", "port"),
        Err(BridgeError::TypeMismatch { expected: "u32", found: "u16", .. })
    ));
    assert!(matches!(
        frozen.get_type::<u16>("u16"),
        Err(BridgeError::UnresolvedBinding { .. })
    ));
}

#[test]
fn test_request_scope_shares_singletons() {
    let built = Arc::new(AtomicUsize::new(0));
    let mut injector = Injector::new();
    injector
        .register_provider(registration("app::Config", Scope::Singleton, false, counting(&built)))
        .unwrap();
    let frozen = injector.freeze().unwrap();

    let from_root: Arc<usize> = frozen.get_type("app::Config").unwrap();
    let scope = frozen.request_scope();
    let from_scope: Arc<usize> = scope.get_type("app::Config").unwrap();
    assert!(Arc::ptr_eq(&from_root, &from_scope));
}

fn with_dependency(key: &str, scope: Scope, dependency: &str, provider: Provider) -> ProviderRegistration {
    ProviderRegistration {
        dependencies: vec![BindingKey::new(dependency)],
        ..registration(key, scope, false, provider)
    }
}

#[test]
fn test_optional_dependency_follows_binding_presence() {
    let report: Provider = Arc::new(|ctx: &ResolutionContext<'_>| -> Result<Instance> {
        let footer: Option<Arc<String>> = ctx.optional_dependency(0)?;
        Ok(Instance::new(Arc::new(footer.map_or(0, |f| f.len()))))
    });

    let mut bare = Injector::new();
    bare.register_provider(with_dependency("app::Report", Scope::Prototype, "app::Footer", Arc::clone(&report)))
        .unwrap();
    let frozen = bare.freeze().unwrap();
    assert_eq!(*frozen.get_type::<Arc<usize>>("app::Report").unwrap(), 0);

    let mut with_footer = Injector::new();
    with_footer
        .bind(BindingKey::new("app::Footer"), Arc::new(String::from("page 1")))
        .unwrap();
    with_footer
        .register_provider(with_dependency("app::Report", Scope::Prototype, "app::Footer", report))
        .unwrap();
    let frozen = with_footer.freeze().unwrap();
    assert_eq!(*frozen.get_type::<Arc<usize>>("app::Report").unwrap(), 6);
}

#[test]
fn test_lazy_dependency_resolves_request_scoped_value_in_scope() {
    let built = Arc::new(AtomicUsize::new(0));
    let mut injector = Injector::new();
    injector
        .register_provider(registration("app::Session", Scope::Request, false, counting(&built)))
        .unwrap();
    injector
        .register_provider(with_dependency(
            "app::Handler",
            Scope::Singleton,
            "app::Session",
            Arc::new(|ctx: &ResolutionContext<'_>| -> Result<Instance> {
                let session: Lazy<Arc<usize>> = ctx.lazy(0)?;
                Ok(Instance::new(Arc::new(session)))
            }),
        ))
        .unwrap();
    let frozen = injector.freeze().unwrap();

    let handler: Arc<Lazy<Arc<usize>>> = frozen.get_type("app::Handler").unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 0);
    assert!(matches!(handler.get(), Err(BridgeError::ScopeNotActive { .. })));

    let scope = frozen.request_scope();
    let a = handler.get_in(&scope).unwrap();
    let b = handler.get_in(&scope).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(built.load(Ordering::SeqCst), 1);
}
