//! Bridge configuration
//!
//! [`BridgeConfig`] is loaded through [`ConfigLoader`] from defaults, an
//! optional `dib.toml` and `DIB_*` environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{BridgeConfig, LoggingConfig};
