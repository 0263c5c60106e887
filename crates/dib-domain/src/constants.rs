//! Domain constants
//!
//! Values shared by the processor (which writes artifacts) and the runtime
//! bridge (which reads them).

// ============================================================================
// ARTIFACT CONSTANTS
// ============================================================================

/// Version of the registration artifact format
///
/// Bumped whenever the serialized shape of [`crate::ModuleRegistration`] changes.
pub const REGISTRATION_FORMAT_VERSION: u32 = 1;

/// File extension appended to the crate name for registration artifacts
pub const REGISTRATION_FILE_SUFFIX: &str = ".dib.json";

/// File name of the generated glue code
pub const GLUE_FILE_NAME: &str = "dib_bindings.rs";

// ============================================================================
// PATH NORMALISATION CONSTANTS
// ============================================================================

/// Path prefixes that are dropped when a written type path is normalised
pub const RELATIVE_PATH_PREFIXES: &[&str] = &["crate", "self", "super"];

/// Separator between a type name and its qualifier in displayed binding keys
pub const QUALIFIER_SEPARATOR: char = '@';

// ============================================================================
// MARKER ARGUMENT CONSTANTS
// ============================================================================

/// `#[provides(into_set)]`: contribute the value to a set binding
pub const PROVIDES_INTO_SET: &str = "into_set";
