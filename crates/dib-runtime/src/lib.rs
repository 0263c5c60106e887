//! # Runtime bridge for dib
//!
//! Loads the module registrations emitted by `dib-processor` and registers
//! every binding into a host injector.
//!
//! ## Module Categories
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | `RuntimeBridge` state machine: load, register, start |
//! | [`factory`] | Factory registry fed by `linkme` distributed slices |
//! | [`injector`] | `HostInjector` port and the default `Injector` |
//! | [`config`] | Figment-based `BridgeConfig` loading |
//! | [`logging`] | Structured logging with tracing |
//! | [`error`] | `BridgeError` and the `Result` alias |
//!
//! ## Startup
//!
//! ```ignore
//! include!(concat!(env!("OUT_DIR"), "/dib_bindings.rs"));
//!
//! fn main() -> dib_runtime::Result<()> {
//!     let mut bridge = RuntimeBridge::new(ConfigLoader::new().load()?);
//!     bridge.load_json(DIB_REGISTRATION_JSON)?;
//!     let injector = bridge.start(Injector::new())?;
//!     let server: std::sync::Arc<Server> = injector.get_type("app::Server")?;
//!     server.run()
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod constants;
pub mod error;
pub mod error_ext;
pub mod factory;
pub mod injector;
pub mod logging;

// Re-exported for generated glue
pub use linkme;

pub use bridge::{BridgeState, RuntimeBridge};
pub use config::{BridgeConfig, ConfigLoader, LoggingConfig};
pub use error::{BridgeError, Result};
pub use factory::{
    COMPONENT_FACTORIES, ComponentFactoryEntry, FactoryFn, FactoryRegistry, Instance, Provider,
    ResolutionContext,
};
pub use injector::{
    FrozenInjector, HostInjector, Injector, Lazy, ProviderRegistration, RequestScope,
};
pub use logging::init_logging;

pub use dib_domain::{BindingDescriptor, BindingKey, ModuleRegistration, Scope};
