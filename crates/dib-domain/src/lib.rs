//! Domain layer for dib
//!
//! Holds everything the processor and the runtime bridge agree on:
//!
//! - [`annotations`]: the fixed marker vocabulary recognised in source code
//! - [`value_objects`]: binding keys, scopes, binding descriptors and the
//!   module registration artifact they are grouped into
//! - [`error`]: the shared error type
//!
//! ```text
//! annotated source ──► dib-processor ──► ModuleRegistration (JSON)
//!                                              │
//!                                              ▼
//!                                        dib-runtime ──► host injector
//! ```
//!
//! Nothing in this crate performs I/O beyond (de)serializing registrations.

pub mod annotations;
pub mod constants;
pub mod error;
pub mod value_objects;

pub use annotations::Marker;
pub use error::{Error, Result};
pub use value_objects::{
    BindingDescriptor, BindingKey, BindingKind, ConstructionPoint, DependencyMode, DependencyOrigin,
    DependencyRef, DescriptorId, ModuleRegistration, Scope, SourceLocation,
};
