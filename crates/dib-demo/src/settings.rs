//! Plain values provided to the rest of the application

use dib::module;

/// Provider module for configuration values
#[derive(Debug, Default)]
pub struct Settings;

#[module]
impl Settings {
    /// Greeting used by [`crate::greeter::Greeter`]
    #[dib::provides]
    #[dib::named("greeting")]
    pub fn greeting() -> String {
        "Hello".to_string()
    }

    /// Hosts the server listens on
    #[dib::provides]
    pub fn hosts() -> Vec<String> {
        vec!["127.0.0.1".to_string(), "::1".to_string()]
    }

    /// Ports the server listens on
    #[dib::provides]
    pub fn ports() -> Vec<u16> {
        vec![8080, 8443]
    }
}
