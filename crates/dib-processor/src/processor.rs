//! Processing pipeline

use crate::builder;
use crate::collect::{self, Declarations};
use crate::diagnostics::ProcessorDiagnostic;
use crate::graph;
use crate::scan::{self, SourceFile};
use crate::{ProcessorConfig, ProcessorError, Result};
use dib_domain::ModuleRegistration;

/// Successful processing result
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Registration built from the sources
    pub registration: ModuleRegistration,
    /// Warning-level diagnostics
    pub warnings: Vec<ProcessorDiagnostic>,
    /// Runtime crate path for the glue
    pub runtime_path: String,
}

/// Build-time processor for one crate
pub struct Processor {
    config: ProcessorConfig,
}

impl Processor {
    /// Create a processor for a configuration
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Scan the configured source root and build the registration
    pub fn process(&self) -> Result<ProcessOutput> {
        self.config.validate()?;
        let sources = scan::collect_sources(&self.config)?;
        self.process_sources(&sources)
    }

    /// Build the registration from sources already in memory
    ///
    /// Fails with [`ProcessorError::Diagnostics`] listing every diagnostic
    /// when at least one is an error.
    pub fn process_sources(&self, sources: &[SourceFile]) -> Result<ProcessOutput> {
        let crate_name = &self.config.crate_name;
        let mut decls = Declarations::default();
        let mut diagnostics = Vec::new();

        for source in sources {
            match syn::parse_file(&source.content) {
                Ok(file) => collect::collect_file(&file, source, &mut decls, &mut diagnostics),
                Err(e) => diagnostics.push(ProcessorDiagnostic::Parse {
                    file: source.relative_path.clone(),
                    message: format!("line {}: {e}", e.span().start().line),
                }),
            }
        }

        let built = builder::build(crate_name, &decls);
        diagnostics.extend(built.diagnostics);

        for cycle in graph::find_cycles(&built.descriptors) {
            let location = cycle
                .first()
                .and_then(|id| built.descriptors.get(id.index()))
                .map(|d| d.source.clone())
                .unwrap_or_default();
            diagnostics.push(ProcessorDiagnostic::CyclicDependency {
                cycle: graph::cycle_names(&built.descriptors, &cycle),
                location,
            });
        }

        let (errors, warnings): (Vec<_>, Vec<_>) =
            diagnostics.into_iter().partition(ProcessorDiagnostic::is_error);
        for warning in &warnings {
            tracing::warn!(diagnostic = %crate::diagnostics::render(warning), "Binding warning");
        }
        if !errors.is_empty() {
            tracing::error!(count = errors.len(), crate_name = %crate_name, "Binding processing failed");
            return Err(ProcessorError::Diagnostics(errors));
        }

        let registration = ModuleRegistration::new(crate_name.clone(), built.descriptors)?;
        tracing::info!(
            crate_name = %crate_name,
            files = sources.len(),
            descriptors = registration.len(),
            fingerprint = %registration.fingerprint,
            "Processed bindings"
        );
        Ok(ProcessOutput {
            registration,
            warnings,
            runtime_path: self.config.runtime_path.clone(),
        })
    }
}
