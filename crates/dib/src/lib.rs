//! # dib
//!
//! Annotation-driven dependency-injection bridge.
//!
//! Types are annotated with inert marker attributes. At build time
//! `dib-processor` reads the markers from the crate's sources and emits a
//! module registration (JSON) plus glue code that submits one factory per
//! binding. At startup the [`runtime`] bridge loads the registration and
//! registers every binding into a host injector.
//!
//! ## Example
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     if let Err(e) = dib::processor::build_script::run() {
//!         panic!("dib processing failed: {e}");
//!     }
//! }
//!
//! // src/main.rs
//! use dib::{inject, injectable, singleton};
//! use std::sync::Arc;
//!
//! include!(concat!(env!("OUT_DIR"), "/dib_bindings.rs"));
//!
//! #[injectable]
//! #[singleton]
//! pub struct Clock;
//!
//! #[injectable]
//! pub struct Greeter {
//!     clock: Arc<Clock>,
//! }
//!
//! #[injectable]
//! impl Greeter {
//!     #[inject]
//!     pub fn new(clock: Arc<Clock>) -> Self {
//!         Self { clock }
//!     }
//! }
//!
//! fn main() -> dib::runtime::Result<()> {
//!     let mut bridge = dib::runtime::RuntimeBridge::new(Default::default());
//!     bridge.load_json(DIB_REGISTRATION_JSON)?;
//!     let injector = bridge.start(dib::runtime::Injector::new())?;
//!     let greeter: Arc<Greeter> = injector.get_type("app::Greeter")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Crates
//!
//! - `domain` - binding keys, scopes, descriptors, registrations
//! - `runtime` - bridge, factory registry, default injector
//! - `processor` - build-time processor (feature `processor`)

pub use dib_macros::{
    eager_singleton, implemented_by, inject, injectable, module, named, provides, qualifier,
    scope, singleton,
};

/// Domain layer - binding keys, descriptors and registrations
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use dib_domain::*;
}

/// Runtime bridge - loading, registration and resolution
///
/// Generated glue refers to items of this module.
pub mod runtime {
    pub use dib_runtime::*;
}

/// Build-time processor
#[cfg(feature = "processor")]
pub mod processor {
    pub use dib_processor::*;
}
