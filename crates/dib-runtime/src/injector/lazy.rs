//! Deferred dependencies
//!
//! A constructor parameter written as `Lazy<Arc<T>>` receives a handle
//! instead of the value. The handle holds the injector weakly, so a singleton
//! keeping one does not keep the injector alive. Each [`Lazy::get`] resolves
//! the key again under its own scope.
//!
//! The handle must not be resolved inside the constructor that receives it:
//! the binding it closes a cycle with may still be under construction.

use super::frozen::{RequestScope, WeakInjector};
use crate::error::{BridgeError, Result};
use dib_domain::BindingKey;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// Handle resolving a binding on first use
pub struct Lazy<T> {
    injector: WeakInjector,
    key: BindingKey,
    _value: PhantomData<fn() -> T>,
}

impl<T: Any + Clone> Lazy<T> {
    pub(crate) fn new(injector: WeakInjector, key: BindingKey) -> Self {
        Self {
            injector,
            key,
            _value: PhantomData,
        }
    }

    /// Key the handle resolves
    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    /// Resolve the value
    ///
    /// Request-scoped keys need [`Lazy::get_in`].
    pub fn get(&self) -> Result<T> {
        let injector = self.injector.upgrade().ok_or_else(|| BridgeError::InjectorDropped {
            key: self.key.to_string(),
        })?;
        injector.get(&self.key)
    }

    /// Resolve the value inside a request scope
    pub fn get_in(&self, scope: &RequestScope) -> Result<T> {
        scope.get(&self.key)
    }
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            injector: self.injector.clone(),
            key: self.key.clone(),
            _value: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy").field("key", &self.key).finish_non_exhaustive()
    }
}
