//! Shared test utilities for dib-processor tests

#![allow(dead_code)] // Test utilities may not all be used in every test file

use dib_processor::{ProcessOutput, Processor, ProcessorConfig, ProcessorError, SourceFile};
use std::fs;
use tempfile::TempDir;

/// Process in-memory sources for crate `app`
pub fn process(files: &[(&str, &str)]) -> Result<ProcessOutput, ProcessorError> {
    let sources: Vec<SourceFile> = files
        .iter()
        .map(|(path, content)| SourceFile::new(*path, *content))
        .collect();
    Processor::new(ProcessorConfig::new("app", "src")).process_sources(&sources)
}

/// Process and expect failure, returning the diagnostic ids
pub fn diagnostic_ids(files: &[(&str, &str)]) -> Vec<&'static str> {
    use dib_processor::Diagnostic;
    match process(files) {
        Ok(_) => Vec::new(),
        Err(e) => e.diagnostics().iter().map(Diagnostic::id).collect(),
    }
}

/// Create a crate directory with `src/` files, returning the source root
pub fn create_test_crate(temp: &TempDir, name: &str, files: &[(&str, &str)]) -> std::path::PathBuf {
    let crate_dir = temp.path().join(name);
    let src = crate_dir.join("src");
    for (path, content) in files {
        let file = src.join(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(file, content).unwrap();
    }
    fs::write(
        crate_dir.join("Cargo.toml"),
        format!("[package]\nname = \"{name}\"\nversion = \"0.1.0\"\n"),
    )
    .unwrap();
    src
}
