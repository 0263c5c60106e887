//! Runtime bridge errors

use crate::bridge::BridgeState;
use thiserror::Error;

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors raised while loading, registering or resolving bindings
///
/// Wiring errors (`UnresolvedBinding`, `CyclicDependency`, `MissingFactory`,
/// `ConflictingBinding`) are configuration errors: they abort startup and are
/// never retried.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A dependency has no binding in the injector
    #[error("Unresolved binding {dependency} required by {required_by}")]
    UnresolvedBinding {
        /// The missing binding
        dependency: String,
        /// The binding whose construction needs it
        required_by: String,
    },

    /// Resolution re-entered a binding it is still building
    #[error("Cyclic dependency: {}", cycle.join(" -> "))]
    CyclicDependency {
        /// Keys on the cycle, first key repeated at the end
        cycle: Vec<String>,
    },

    /// A descriptor has no compiled factory
    #[error("No factory registered for {key}")]
    MissingFactory {
        /// Key of the descriptor
        key: String,
    },

    /// A key is already bound to a different binding
    #[error("Conflicting binding for {key}: already bound as {existing}, registering {incoming}")]
    ConflictingBinding {
        /// The contested key
        key: String,
        /// Existing binding
        existing: String,
        /// Binding being registered
        incoming: String,
    },

    /// Stored instance is not of the requested type
    #[error("Type mismatch for {key}: requested {expected}, bound {found}")]
    TypeMismatch {
        /// Key resolved
        key: String,
        /// Requested Rust type
        expected: &'static str,
        /// Stored Rust type
        found: &'static str,
    },

    /// Request-scoped binding resolved outside a request scope
    #[error("{key} is request scoped and no request scope is active")]
    ScopeNotActive {
        /// Key resolved
        key: String,
    },

    /// A lazy dependency outlived its injector
    #[error("Injector holding {key} was dropped before the lazy dependency was resolved")]
    InjectorDropped {
        /// Key of the lazy dependency
        key: String,
    },

    /// Operation not allowed in the current bridge state
    #[error("Cannot {operation} while the bridge is {state}")]
    InvalidState {
        /// Attempted operation
        operation: &'static str,
        /// Current state
        state: BridgeState,
    },

    /// A provider could not produce its value
    #[error("Provider for {key} failed: {message}")]
    Provider {
        /// Key being built
        key: String,
        /// Description of the failure
        message: String,
    },

    /// Domain error (artifact parsing, verification)
    #[error(transparent)]
    Domain(#[from] dib_domain::Error),

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl BridgeError {
    /// Create an unresolved binding error
    pub fn unresolved_binding<D: ToString, R: ToString>(dependency: D, required_by: R) -> Self {
        Self::UnresolvedBinding {
            dependency: dependency.to_string(),
            required_by: required_by.to_string(),
        }
    }

    /// Create a missing factory error
    pub fn missing_factory<K: ToString>(key: K) -> Self {
        Self::MissingFactory {
            key: key.to_string(),
        }
    }

    /// Create a scope-not-active error
    pub fn scope_not_active<K: ToString>(key: K) -> Self {
        Self::ScopeNotActive {
            key: key.to_string(),
        }
    }

    /// Create a provider error
    pub fn provider<K: ToString, S: Into<String>>(key: K, message: S) -> Self {
        Self::Provider {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// True for the wiring errors that abort startup
    pub fn is_wiring_error(&self) -> bool {
        match self {
            Self::UnresolvedBinding { .. }
            | Self::CyclicDependency { .. }
            | Self::MissingFactory { .. }
            | Self::ConflictingBinding { .. } => true,
            Self::Domain(e) => e.is_wiring_error(),
            _ => false,
        }
    }
}

impl From<BridgeError> for dib_domain::Error {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::UnresolvedBinding {
                dependency,
                required_by,
            } => Self::unresolved_binding(dependency, required_by),
            BridgeError::CyclicDependency { cycle } => Self::cyclic_dependency(cycle),
            BridgeError::Domain(e) => e,
            BridgeError::Configuration { message, .. } => Self::configuration(message),
            other => Self::invalid_argument(other.to_string()),
        }
    }
}
