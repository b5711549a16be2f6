//! HTTP accessor against a node RPC
//!
//! Big map values are read from
//! `GET {base}/chains/{chain}/blocks/{block}/context/big_maps/{id}/{expr}`,
//! which answers with the JSON form of the stored tree, or 404 when the key is
//! absent.

use crate::accessor::NetworkAccessor;
use crate::config::RpcConfig;
use crate::error::ConfigError;
use futures::future::BoxFuture;
use reqwest::StatusCode;
use tracing::{debug, trace};
use tzbind_core::{AccessError, Prim, ScriptExprHash};

/// [`NetworkAccessor`] backed by a node's HTTP RPC
#[derive(Debug, Clone)]
pub struct RpcAccessor {
    config: RpcConfig,
    client: reqwest::Client,
}

impl RpcAccessor {
    /// Create an accessor from a validated configuration
    pub fn new(config: RpcConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Configuration in use
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    async fn fetch_value(&self, id: i64, digest: &ScriptExprHash) -> Result<Prim, AccessError> {
        let url = self.config.big_map_url(id, &digest.to_string());
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(AccessError::transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(AccessError::NotFound),
            status if !status.is_success() => return Err(AccessError::Status(status.as_u16())),
            _ => {}
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AccessError::Decode(e.to_string()))?;
        trace!("Big map {} response: {}", id, body);
        Prim::from_json(&body).map_err(|e| AccessError::Decode(e.to_string()))
    }
}

impl NetworkAccessor for RpcAccessor {
    fn fetch(&self, id: i64, digest: &ScriptExprHash) -> BoxFuture<'_, Result<Prim, AccessError>> {
        let digest = *digest;
        Box::pin(async move { self.fetch_value(id, &digest).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_creation() {
        let accessor = RpcAccessor::new(RpcConfig::new("http://localhost:8732")).unwrap();
        assert_eq!(accessor.config().chain, "main");
    }

    #[test]
    fn test_accessor_rejects_invalid_config() {
        assert!(RpcAccessor::new(RpcConfig::new("localhost")).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport_error() {
        let mut config = RpcConfig::new("http://127.0.0.1:1");
        config.timeout_secs = 2;
        let accessor = RpcAccessor::new(config).unwrap();
        let digest = ScriptExprHash::of_prim(&Prim::int(0));
        assert!(matches!(
            accessor.fetch(0, &digest).await,
            Err(AccessError::Transport(_))
        ));
    }
}
