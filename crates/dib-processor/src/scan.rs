//! Source file discovery

use crate::{ProcessorConfig, ProcessorError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One Rust source file of the compilation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the source root, `/`-separated
    pub relative_path: String,
    /// Module path of the file (`billing/paypal.rs` → `["billing", "paypal"]`)
    pub module_path: Vec<String>,
    /// File contents
    pub content: String,
}

impl SourceFile {
    /// Create a source file from a relative path and its contents
    pub fn new(relative_path: impl Into<String>, content: impl Into<String>) -> Self {
        let relative_path = relative_path.into().replace('\\', "/");
        let module_path = module_path_for(&relative_path);
        Self {
            relative_path,
            module_path,
            content: content.into(),
        }
    }
}

/// Module path implied by a file's location under the source root
///
/// `lib.rs` and `main.rs` are the crate root, `mod.rs` names its directory.
pub fn module_path_for(relative_path: &str) -> Vec<String> {
    let trimmed = relative_path.strip_suffix(".rs").unwrap_or(relative_path);
    let mut segments: Vec<String> = trimmed
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    match segments.last().map(String::as_str) {
        Some("mod") => {
            segments.pop();
        }
        Some("lib" | "main") if segments.len() == 1 => {
            segments.pop();
        }
        _ => {}
    }
    segments
}

/// Collect all `.rs` files under the configured source root, sorted by path
pub fn collect_sources(config: &ProcessorConfig) -> Result<Vec<SourceFile>> {
    let root = &config.source_root;
    if !root.is_dir() {
        return Err(ProcessorError::config(format!(
            "Source root {} is not a directory",
            root.display()
        )));
    }
    let excludes = config.exclude_set()?;

    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(walkdir::DirEntry::into_path)
        .collect();
    paths.sort();

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let relative = relative_to(&path, root);
        if excludes.is_match(&relative) {
            tracing::debug!(file = %relative, "Excluded from processing");
            continue;
        }
        let content =
            std::fs::read_to_string(&path).map_err(|e| ProcessorError::io(&path, e))?;
        sources.push(SourceFile::new(relative, content));
    }

    tracing::debug!(count = sources.len(), root = %root.display(), "Collected source files");
    Ok(sources)
}

fn relative_to(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
