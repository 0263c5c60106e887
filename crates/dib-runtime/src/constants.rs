//! Runtime constants

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "dib.toml";

/// Environment variable prefix for bridge configuration
pub const CONFIG_ENV_PREFIX: &str = "DIB";

/// Separator between nested keys in environment variables (`DIB_LOGGING__LEVEL`)
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Environment variable holding a tracing filter directive
pub const LOG_FILTER_ENV: &str = "DIB_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ============================================================================
// RESOLUTION CONSTANTS
// ============================================================================

/// Name used for top-level lookups in unresolved binding errors
pub const ROOT_REQUESTER: &str = "<root>";
