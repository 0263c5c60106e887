//! `build.rs` entry point
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     if let Err(e) = dib_processor::build_script::run() {
//!         panic!("{e}");
//!     }
//! }
//!
//! // src/lib.rs
//! include!(concat!(env!("OUT_DIR"), "/dib_bindings.rs"));
//! ```

use crate::config::{DEFAULT_CONFIG_FILENAME, PROCESSOR_ENV_PREFIX};
use crate::{Diagnostic, EmittedFiles, Processor, ProcessorConfig, ProcessorError, Result, emit};

/// Process the crate being built and emit into `OUT_DIR`
///
/// Prints `cargo:rerun-if-changed` for the source root and the config file,
/// and forwards warning diagnostics as `cargo:warning` lines.
pub fn run() -> Result<EmittedFiles> {
    let config = ProcessorConfig::from_cargo_env()?;
    run_with(config)
}

/// Same as [`run`] with an explicit configuration
pub fn run_with(config: ProcessorConfig) -> Result<EmittedFiles> {
    let out_dir = config
        .out_dir
        .clone()
        .ok_or_else(|| ProcessorError::config("No output directory configured"))?;

    println!("cargo:rerun-if-changed={}", config.source_root.display());
    if let Some(manifest_dir) = config.source_root.parent() {
        println!(
            "cargo:rerun-if-changed={}",
            manifest_dir.join(DEFAULT_CONFIG_FILENAME).display()
        );
    }
    println!("cargo:rerun-if-env-changed={PROCESSOR_ENV_PREFIX}RUNTIME_PATH");

    let output = Processor::new(config).process()?;
    for warning in &output.warnings {
        match warning.location() {
            Some(location) => println!("cargo:warning={location}: {warning}"),
            None => println!("cargo:warning={warning}"),
        }
    }
    emit(&output, &out_dir)
}
