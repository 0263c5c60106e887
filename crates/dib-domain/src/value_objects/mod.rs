//! Value objects
//!
//! Immutable records describing bindings. Descriptors are stored in an arena
//! inside [`ModuleRegistration`] and refer to each other through
//! [`DescriptorId`] rather than pointers.

pub mod descriptor;
pub mod key;
pub mod registration;
pub mod scope;

pub use descriptor::{
    BindingDescriptor, BindingKind, ConstructionPoint, DependencyMode, DependencyOrigin, DependencyRef,
    DescriptorId, SourceLocation,
};
pub use key::BindingKey;
pub use registration::ModuleRegistration;
pub use scope::Scope;
