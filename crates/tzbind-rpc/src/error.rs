//! Error types for tzbind-rpc

use thiserror::Error;

/// Errors raised while loading or applying RPC configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent
    #[error("missing setting: {0}")]
    Missing(&'static str),

    /// A setting is present but cannot be used
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Setting name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// The JSON document could not be parsed
    #[error("config parse error: {0}")]
    Parse(String),

    /// The HTTP client could not be built
    #[error("http client error: {0}")]
    Client(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Parse(error.to_string())
    }
}
