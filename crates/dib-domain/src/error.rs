//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type shared by the processor and the runtime bridge
///
/// The three wiring kinds (`MultipleConstructionPoints`, `CyclicDependency`,
/// `UnresolvedBinding`) are static configuration errors: they abort the phase
/// that detected them and are never retried.
#[derive(Error, Debug)]
pub enum Error {
    /// A type offers more than one eligible construction point
    #[error("Multiple construction points for {type_name}: {}", candidates.join(", "))]
    MultipleConstructionPoints {
        /// The offending type
        type_name: String,
        /// Names of the competing constructors
        candidates: Vec<String>,
    },

    /// Bindings depend on each other in a cycle
    #[error("Cyclic dependency: {}", cycle.join(" -> "))]
    CyclicDependency {
        /// Types on the cycle, first type repeated at the end
        cycle: Vec<String>,
    },

    /// A dependency reference has no binding to resolve against
    #[error("Unresolved binding {dependency} required by {required_by}")]
    UnresolvedBinding {
        /// The missing binding
        dependency: String,
        /// The binding whose construction needs it
        required_by: String,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Underlying error
        #[source]
        source: Option<std::io::Error>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },
}

impl Error {
    /// Create a multiple construction points error
    pub fn multiple_construction_points<S: Into<String>>(
        type_name: S,
        candidates: Vec<String>,
    ) -> Self {
        Self::MultipleConstructionPoints {
            type_name: type_name.into(),
            candidates,
        }
    }

    /// Create a cyclic dependency error
    pub fn cyclic_dependency(cycle: Vec<String>) -> Self {
        Self::CyclicDependency { cycle }
    }

    /// Create an unresolved binding error
    pub fn unresolved_binding<D: Into<String>, R: Into<String>>(
        dependency: D,
        required_by: R,
    ) -> Self {
        Self::UnresolvedBinding {
            dependency: dependency.into(),
            required_by: required_by.into(),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>>(message: S, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// True for the wiring errors that abort processing or startup
    pub fn is_wiring_error(&self) -> bool {
        matches!(
            self,
            Self::MultipleConstructionPoints { .. }
                | Self::CyclicDependency { .. }
                | Self::UnresolvedBinding { .. }
        )
    }
}
