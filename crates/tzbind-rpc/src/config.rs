//! Node RPC configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the node base URL
pub const ENV_RPC_URL: &str = "TZBIND_RPC_URL";
/// Environment variable holding the chain name
pub const ENV_CHAIN: &str = "TZBIND_CHAIN";
/// Environment variable holding the block reference
pub const ENV_BLOCK: &str = "TZBIND_BLOCK";
/// Environment variable holding the request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "TZBIND_TIMEOUT_SECS";

/// Where and how to query a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Node base URL, e.g. `http://localhost:8732`
    pub base_url: String,
    /// Chain name used in RPC paths
    #[serde(default = "default_chain")]
    pub chain: String,
    /// Block reference used in RPC paths (`head`, a level or a block hash)
    #[serde(default = "default_block")]
    pub block: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_chain() -> String {
    "main".to_string()
}

fn default_block() -> String {
    "head".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8732".to_string(),
            chain: default_chain(),
            block: default_block(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RpcConfig {
    /// Configuration for `base_url` with default chain, block and timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON document
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read settings from the process environment
    ///
    /// The base URL is required; the other settings fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_RPC_URL).ok_or(ConfigError::Missing(ENV_RPC_URL))?;
        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(text) => text.trim().parse().map_err(|e| ConfigError::Invalid {
                name: ENV_TIMEOUT_SECS,
                reason: format!("{}", e),
            })?,
            None => default_timeout_secs(),
        };
        let config = Self {
            base_url,
            chain: lookup(ENV_CHAIN).unwrap_or_else(default_chain),
            block: lookup(ENV_BLOCK).unwrap_or_else(default_block),
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no request could be built from
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "base_url",
                reason: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }
        if self.chain.is_empty() || self.block.is_empty() {
            return Err(ConfigError::Invalid {
                name: "chain/block",
                reason: "must not be empty".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// URL of the big map value stored under `expr` in big map `id`
    pub fn big_map_url(&self, id: i64, expr: &str) -> String {
        format!(
            "{}/chains/{}/blocks/{}/context/big_maps/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.chain,
            self.block,
            id,
            expr
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_json_defaults() {
        let config = RpcConfig::from_json(r#"{"base_url":"https://node.example"}"#).unwrap();
        assert_eq!(config.chain, "main");
        assert_eq!(config.block, "head");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_json_rejects_bad_values() {
        assert!(matches!(
            RpcConfig::from_json(r#"{"base_url":"ftp://node"}"#),
            Err(ConfigError::Invalid { name: "base_url", .. })
        ));
        assert!(matches!(
            RpcConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_environment_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_RPC_URL, "http://127.0.0.1:8732"),
            (ENV_BLOCK, "123"),
            (ENV_TIMEOUT_SECS, "5"),
        ]
        .into_iter()
        .collect();
        let config = RpcConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.chain, "main");
        assert_eq!(config.block, "123");
        assert_eq!(config.timeout_secs, 5);

        let missing = RpcConfig::from_lookup(|_| None);
        assert_eq!(missing, Err(ConfigError::Missing(ENV_RPC_URL)));
    }

    #[test]
    fn test_big_map_url() {
        let config = RpcConfig::new("http://node:8732/");
        assert_eq!(
            config.big_map_url(17, "exprABC"),
            "http://node:8732/chains/main/blocks/head/context/big_maps/17/exprABC"
        );
    }
}
