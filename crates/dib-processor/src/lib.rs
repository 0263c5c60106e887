//! Build-time processor for dib
//!
//! Scans the Rust sources of one crate for the dib markers, turns every
//! annotated declaration into a [`BindingDescriptor`](dib_domain::BindingDescriptor)
//! and emits the resulting [`ModuleRegistration`](dib_domain::ModuleRegistration)
//! together with the glue code that registers one factory per descriptor.
//!
//! # Pipeline
//!
//! ```text
//! scan      walk src/, derive module paths        (scan.rs)
//! collect   syn::parse_file + marker extraction   (collect.rs, markers.rs)
//! build     construction points, references       (builder.rs, construction.rs)
//! graph     cycle detection over the arena        (graph.rs)
//! emit      JSON artifact + linkme glue           (emit.rs, codegen.rs)
//! ```
//!
//! # Build script usage
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     if let Err(e) = dib_processor::build_script::run() {
//!         panic!("dib processing failed: {e}");
//!     }
//! }
//! ```
//!
//! Processing is deterministic: files are visited in sorted order and the
//! emitted bytes depend only on the input sources and the configuration.

pub mod build_script;
pub mod builder;
pub mod codegen;
pub mod collect;
pub mod config;
pub mod construction;
pub mod diagnostics;
pub mod emit;
pub mod graph;
pub mod markers;
pub mod processor;
pub mod scan;
pub mod types;

use std::path::PathBuf;
use thiserror::Error;

pub use config::ProcessorConfig;
pub use diagnostics::{Diagnostic, ProcessorDiagnostic, Severity};
pub use emit::{EmittedFiles, emit};
pub use processor::{ProcessOutput, Processor};
pub use scan::SourceFile;

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, ProcessorError>;

/// Processing errors
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// File could not be read or written
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid processor configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern: {0}")]
    Pattern(#[from] globset::Error),

    /// The sources contain wiring errors
    #[error("{} error(s) while processing bindings:\n{}", .0.len(), diagnostics::render_all(.0))]
    Diagnostics(Vec<ProcessorDiagnostic>),

    /// Domain error (artifact serialization, fingerprinting)
    #[error(transparent)]
    Domain(#[from] dib_domain::Error),
}

impl ProcessorError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Diagnostics carried by this error, empty for other kinds
    pub fn diagnostics(&self) -> &[ProcessorDiagnostic] {
        match self {
            Self::Diagnostics(d) => d,
            _ => &[],
        }
    }

    /// Shared domain errors for the wiring diagnostics
    ///
    /// `MultipleConstructionPoints` and `CyclicDependency` diagnostics convert
    /// to their [`dib_domain::Error`] counterparts.
    pub fn domain_errors(&self) -> Vec<dib_domain::Error> {
        self.diagnostics()
            .iter()
            .filter_map(ProcessorDiagnostic::to_domain_error)
            .collect()
    }
}
