//! # dib-demo
//!
//! Small application wired entirely through the build-time processor.
//! `build.rs` emits the registration and factories, [`start`] loads them
//! into an injector.
//!
//! | Module | Bindings |
//! |--------|----------|
//! | [`clock`] | `Clock` trait linked to `SystemClock` |
//! | [`settings`] | Named greeting, listener hosts and ports |
//! | [`greeter`] | Singleton `Greeter` using the named greeting |
//! | [`plugins`] | `Plugin` set collected into `PluginHost` |
//! | [`server`] | `Server` and `Supervisor`, linked through `Lazy` |

pub mod clock;
pub mod greeter;
pub mod plugins;
pub mod server;
pub mod settings;

use dib::runtime::{BridgeConfig, FrozenInjector, Injector, Result, RuntimeBridge};

include!(concat!(env!("OUT_DIR"), "/dib_bindings.rs"));

/// Load this crate's registration and freeze a ready injector
pub fn start() -> Result<FrozenInjector> {
    start_with(BridgeConfig::default())
}

/// [`start`] with an explicit bridge configuration
pub fn start_with(config: BridgeConfig) -> Result<FrozenInjector> {
    let mut bridge = RuntimeBridge::new(config);
    bridge.load_json(DIB_REGISTRATION_JSON)?;
    bridge.start(Injector::new())
}
