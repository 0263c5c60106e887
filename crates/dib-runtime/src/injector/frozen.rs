//! Read-only injector after startup
//!
//! No binding is added or removed once frozen. Singletons are created lazily
//! in per-binding `OnceCell`s, request-scoped values live in the cache of a
//! [`RequestScope`], prototypes are built on every resolution. All of it is
//! `Send + Sync`, so one `FrozenInjector` can serve concurrent requests.

use super::container::{Binding, Source};
use crate::constants::ROOT_REQUESTER;
use crate::error::{BridgeError, Result};
use crate::factory::{Instance, Provider, ResolutionContext, Resolve};
use dashmap::DashMap;
use dib_domain::{BindingKey, Scope};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

struct FrozenBinding {
    scope: Scope,
    dependencies: Vec<BindingKey>,
    provider: Option<Provider>,
    cell: OnceCell<Instance>,
}

struct Inner {
    bindings: HashMap<BindingKey, FrozenBinding>,
    order: Vec<BindingKey>,
}

/// Default host injector, ready phase
#[derive(Clone)]
pub struct FrozenInjector {
    inner: Arc<Inner>,
}

/// Weak handle on a [`FrozenInjector`]
#[derive(Clone)]
pub(crate) struct WeakInjector(Weak<Inner>);

impl WeakInjector {
    /// The injector, while any strong handle on it is alive
    pub(crate) fn upgrade(&self) -> Option<FrozenInjector> {
        self.0.upgrade().map(|inner| FrozenInjector { inner })
    }
}

type RequestCache = DashMap<BindingKey, Instance>;

/// One resolution pass, optionally inside a request scope
struct Session<'a> {
    inner: &'a Arc<Inner>,
    request: Option<&'a RequestCache>,
}

impl Session<'_> {
    fn build(&self, key: &BindingKey, binding: &FrozenBinding, path: &[BindingKey]) -> Result<Instance> {
        let provider = binding
            .provider
            .as_ref()
            .ok_or_else(|| BridgeError::missing_factory(key))?;
        let mut path = path.to_vec();
        path.push(key.clone());
        tracing::trace!(key = %key, depth = path.len(), "Building");
        let ctx = ResolutionContext::new(self, key, &binding.dependencies, &path);
        provider(&ctx)
    }
}

impl Resolve for Session<'_> {
    fn resolve(&self, key: &BindingKey, path: &[BindingKey]) -> Result<Instance> {
        let binding = self.inner.bindings.get(key).ok_or_else(|| {
            BridgeError::unresolved_binding(
                key,
                path.last().map_or_else(|| ROOT_REQUESTER.to_string(), ToString::to_string),
            )
        })?;

        if let Some(start) = path.iter().position(|k| k == key) {
            let mut cycle: Vec<String> = path[start..].iter().map(ToString::to_string).collect();
            cycle.push(key.to_string());
            return Err(BridgeError::CyclicDependency { cycle });
        }

        match binding.scope {
            Scope::Singleton => binding
                .cell
                .get_or_try_init(|| self.build(key, binding, path))
                .cloned(),
            Scope::Request => {
                let cache = self
                    .request
                    .ok_or_else(|| BridgeError::scope_not_active(key))?;
                if let Some(hit) = cache.get(key) {
                    return Ok(hit.value().clone());
                }
                // Built outside any map guard: the provider may resolve other request bindings
                let built = self.build(key, binding, path)?;
                Ok(cache.entry(key.clone()).or_insert(built).value().clone())
            }
            Scope::Prototype => self.build(key, binding, path),
        }
    }

    fn contains(&self, key: &BindingKey) -> bool {
        self.inner.bindings.contains_key(key)
    }

    fn injector(&self) -> WeakInjector {
        WeakInjector(Arc::downgrade(self.inner))
    }
}

impl FrozenInjector {
    pub(super) fn freeze(bindings: HashMap<BindingKey, Binding>, order: Vec<BindingKey>) -> Result<Self> {
        let mut eager = Vec::new();
        let bindings = bindings
            .into_iter()
            .map(|(key, binding)| {
                if binding.eager {
                    eager.push(key.clone());
                }
                let (provider, cell) = match binding.source {
                    Source::Provider(p) => (Some(p), OnceCell::new()),
                    Source::Instance(i) => (None, OnceCell::with_value(i)),
                };
                let frozen = FrozenBinding {
                    scope: binding.scope,
                    dependencies: binding.dependencies,
                    provider,
                    cell,
                };
                (key, frozen)
            })
            .collect();

        let injector = Self {
            inner: Arc::new(Inner { bindings, order }),
        };
        let eager_keys: Vec<&BindingKey> = injector
            .inner
            .order
            .iter()
            .filter(|k| eager.contains(*k))
            .collect();
        for key in &eager_keys {
            injector.instance(key)?;
        }
        tracing::info!(
            bindings = injector.len(),
            eager = eager_keys.len(),
            "Injector frozen"
        );
        Ok(injector)
    }

    fn session(&self) -> Session<'_> {
        Session {
            inner: &self.inner,
            request: None,
        }
    }

    /// Resolve a key to its stored value
    pub fn instance(&self, key: &BindingKey) -> Result<Instance> {
        self.session().resolve(key, &[])
    }

    /// Resolve a key and clone the value out as `T`
    pub fn get<T: Any + Clone>(&self, key: &BindingKey) -> Result<T> {
        self.instance(key)?.get(key)
    }

    /// Resolve an unqualified type name
    pub fn get_type<T: Any + Clone>(&self, type_name: &str) -> Result<T> {
        self.get(&BindingKey::new(type_name))
    }

    /// Resolve a qualified type name
    pub fn get_named<T: Any + Clone>(&self, type_name: &str, qualifier: &str) -> Result<T> {
        self.get(&BindingKey::named(type_name, qualifier))
    }

    /// True when `key` is bound
    pub fn contains(&self, key: &BindingKey) -> bool {
        self.inner.bindings.contains_key(key)
    }

    /// Bound keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &BindingKey> {
        self.inner.order.iter()
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.inner.order.len()
    }

    /// True when nothing is bound
    pub fn is_empty(&self) -> bool {
        self.inner.order.is_empty()
    }

    /// Open a request scope
    ///
    /// Request-scoped bindings resolve to one value per scope; the values are
    /// dropped with the scope.
    pub fn request_scope(&self) -> RequestScope {
        RequestScope {
            injector: self.clone(),
            cache: DashMap::new(),
        }
    }
}

impl std::fmt::Debug for FrozenInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrozenInjector")
            .field("keys", &self.inner.order)
            .finish_non_exhaustive()
    }
}

/// Resolution scope for one request
pub struct RequestScope {
    injector: FrozenInjector,
    cache: RequestCache,
}

impl RequestScope {
    fn session(&self) -> Session<'_> {
        Session {
            inner: &self.injector.inner,
            request: Some(&self.cache),
        }
    }

    /// Resolve a key to its stored value
    pub fn instance(&self, key: &BindingKey) -> Result<Instance> {
        self.session().resolve(key, &[])
    }

    /// Resolve a key and clone the value out as `T`
    pub fn get<T: Any + Clone>(&self, key: &BindingKey) -> Result<T> {
        self.instance(key)?.get(key)
    }

    /// Resolve an unqualified type name
    pub fn get_type<T: Any + Clone>(&self, type_name: &str) -> Result<T> {
        self.get(&BindingKey::new(type_name))
    }

    /// Resolve a qualified type name
    pub fn get_named<T: Any + Clone>(&self, type_name: &str, qualifier: &str) -> Result<T> {
        self.get(&BindingKey::named(type_name, qualifier))
    }

    /// Injector the scope was opened on
    pub fn injector(&self) -> &FrozenInjector {
        &self.injector
    }
}
