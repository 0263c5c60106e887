//! Binding lifecycles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a binding in the host injector
///
/// Unscoped declarations map to [`Scope::Prototype`]: every resolution
/// builds a fresh instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// One instance per injector
    Singleton,
    /// One instance per request scope
    Request,
    /// A new instance per resolution
    #[default]
    Prototype,
}

impl Scope {
    /// Scope name as written in `#[scope(..)]`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::Request => "request",
            Self::Prototype => "prototype",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "singleton" => Ok(Self::Singleton),
            "request" | "per_request" => Ok(Self::Request),
            "prototype" | "no_scope" => Ok(Self::Prototype),
            other => Err(format!(
                "Unsupported scope '{other}'. Use singleton, request or prototype"
            )),
        }
    }
}
