//! Artifact emission

use crate::codegen;
use crate::processor::ProcessOutput;
use crate::{ProcessorError, Result};
use dib_domain::constants::{GLUE_FILE_NAME, REGISTRATION_FILE_SUFFIX};
use std::path::{Path, PathBuf};

/// Paths written by [`emit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFiles {
    /// `<crate>.dib.json`
    pub artifact: PathBuf,
    /// `dib_bindings.rs`
    pub glue: PathBuf,
}

/// Write the registration artifact and the glue code into `out_dir`
///
/// Files whose content is unchanged are not rewritten, so repeated builds
/// leave modification times alone.
pub fn emit(output: &ProcessOutput, out_dir: &Path) -> Result<EmittedFiles> {
    std::fs::create_dir_all(out_dir).map_err(|e| ProcessorError::io(out_dir, e))?;

    let registration = &output.registration;
    let artifact = out_dir.join(format!(
        "{}{}",
        registration.crate_name, REGISTRATION_FILE_SUFFIX
    ));
    let glue = out_dir.join(GLUE_FILE_NAME);

    write_if_changed(&artifact, &registration.to_json_pretty()?)?;
    write_if_changed(
        &glue,
        &codegen::render_glue(registration, &output.runtime_path)?,
    )?;

    tracing::info!(
        crate_name = %registration.crate_name,
        descriptors = registration.len(),
        artifact = %artifact.display(),
        "Emitted module registration"
    );
    Ok(EmittedFiles { artifact, glue })
}

fn write_if_changed(path: &Path, content: &str) -> Result<()> {
    if std::fs::read_to_string(path).is_ok_and(|existing| existing == content) {
        return Ok(());
    }
    std::fs::write(path, content).map_err(|e| ProcessorError::io(path, e))
}
