//! Wallet client configuration.

use std::time::Duration;
use xvg_rpc::{RpcConfig, DEFAULT_SERVICE_URL};
use xvg_types::Network;

/// Copayer name used when the caller does not supply one.
pub const DEFAULT_COPAYER_NAME: &str = "xvg-rs-copayer";

#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// Wallet service base URL, without a trailing slash.
    pub service_url: String,
    pub network: Network,
    pub copayer_name: String,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            network: Network::Mainnet,
            copayer_name: DEFAULT_COPAYER_NAME.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl WalletConfig {
    pub fn new(service_url: &str, network: Network) -> Self {
        Self {
            service_url: service_url.trim_end_matches('/').to_string(),
            network,
            ..Default::default()
        }
    }

    /// Transport settings derived from this config.
    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            timeout: self.timeout,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.service_url, "https://vws2.swenvanzanten.com/vws/api");
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.rpc_config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_new_trims_slash() {
        let config = WalletConfig::new("http://localhost:3232/bws/api/", Network::Testnet);
        assert_eq!(config.service_url, "http://localhost:3232/bws/api");
        assert_eq!(config.copayer_name, DEFAULT_COPAYER_NAME);
    }
}
