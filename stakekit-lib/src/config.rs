//! Configuration for discovery, negotiation and the delegation backend.
//!
//! Every field has a default matching the deployed dApp, so an empty JSON
//! object (or no configuration at all) yields a working mainnet setup.
//!
//! # Environment Variables
//!
//! [`StakekitConfig::from_env`] overlays:
//! - `STAKEKIT_API_BASE` - delegation backend base URL
//! - `STAKEKIT_NETWORK` - `mainnet`, `testnet`, `preprod` or `preview`
//! - `STAKEKIT_POOL_ID` - target pool (bech32 or hex)
//! - `STAKEKIT_WALLETS` - comma-separated supported wallet ids
//! - `STAKEKIT_DISCOVERY_MAX_WAIT_MS` - discovery budget
//! - `STAKEKIT_DISCOVERY_POLL_MS` - discovery poll interval
//! - `STAKEKIT_AUTH_TIMEOUT_SECS` - authorization timeout

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::address::{AddressClass, Network};
use crate::discovery::DiscoveryConfig;
use crate::negotiator::NegotiatorConfig;
use crate::{PoolId, ProviderId, Result, StakekitError};

/// Backend the deployed dApp talks to.
pub const DEFAULT_API_BASE: &str = "https://cardano-wallet-backend.vercel.app/api/";

/// Wallets the deployed dApp offers to connect to.
pub const DEFAULT_SUPPORTED_WALLETS: [&str; 4] = ["nami", "eternl", "yoroi", "lace"];

/// `pool1w2duw0lk7lxjpfqjguxvtp0znhaqf8l2yvzcfd72l8fuk0h77gy`
const DEFAULT_POOL_HASH: [u8; 28] = [
    0x72, 0x9b, 0xc7, 0x3f, 0xf6, 0xf7, 0xcd, 0x20, 0xa4, 0x12, 0x47, 0x0c, 0xc5, 0x85, 0xe2,
    0x9d, 0xfa, 0x04, 0x9f, 0xea, 0x23, 0x05, 0x84, 0xb7, 0xca, 0xf9, 0xd3, 0xcb,
];

/// Delegation backend connection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL; endpoint paths are appended to it.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl BackendConfig {
    /// Create a backend configuration.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            timeout_secs: default_timeout(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Join an endpoint path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Negotiation settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationSettings {
    /// Authorization timeout in seconds.
    #[serde(default = "default_authorization_timeout")]
    pub authorization_timeout_secs: u64,
}

fn default_authorization_timeout() -> u64 {
    60
}

impl Default for NegotiationSettings {
    fn default() -> Self {
        Self {
            authorization_timeout_secs: default_authorization_timeout(),
        }
    }
}

/// Complete Stakekit configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakekitConfig {
    /// Delegation backend.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Wallet discovery timing.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Connection negotiation.
    #[serde(default)]
    pub negotiation: NegotiationSettings,

    /// Network sessions must be on.
    #[serde(default)]
    pub network: Network,

    /// Wallets offered to the user, in display order.
    #[serde(default = "default_supported_wallets")]
    pub supported_wallets: Vec<ProviderId>,

    /// Pool to delegate to.
    #[serde(default = "default_pool_id")]
    pub pool_id: PoolId,
}

fn default_supported_wallets() -> Vec<ProviderId> {
    DEFAULT_SUPPORTED_WALLETS
        .iter()
        .map(|id| ProviderId::new(*id))
        .collect()
}

fn default_pool_id() -> PoolId {
    PoolId::from_hash(DEFAULT_POOL_HASH)
}

impl Default for StakekitConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            discovery: DiscoveryConfig::default(),
            negotiation: NegotiationSettings::default(),
            network: Network::default(),
            supported_wallets: default_supported_wallets(),
            pool_id: default_pool_id(),
        }
    }
}

impl StakekitConfig {
    /// Defaults overlaid with `STAKEKIT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup` (an environment-like source).
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base) = get("STAKEKIT_API_BASE") {
            self.backend.api_base = base;
        }
        if let Some(network) = get("STAKEKIT_NETWORK") {
            self.network = network.parse()?;
        }
        if let Some(pool) = get("STAKEKIT_POOL_ID") {
            self.pool_id = pool.parse()?;
        }
        if let Some(wallets) = get("STAKEKIT_WALLETS") {
            self.supported_wallets = wallets
                .split(',')
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(ProviderId::new)
                .collect();
        }
        if let Some(ms) = get("STAKEKIT_DISCOVERY_MAX_WAIT_MS") {
            self.discovery.max_wait = Duration::from_millis(parse_u64("discovery.max_wait", &ms)?);
        }
        if let Some(ms) = get("STAKEKIT_DISCOVERY_POLL_MS") {
            self.discovery.poll_interval =
                Duration::from_millis(parse_u64("discovery.poll_interval", &ms)?);
        }
        if let Some(secs) = get("STAKEKIT_AUTH_TIMEOUT_SECS") {
            self.negotiation.authorization_timeout_secs =
                parse_u64("negotiation.authorization_timeout_secs", &secs)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Set the backend base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.backend.api_base = api_base.into();
        self
    }

    /// Set the network.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Set the target pool.
    pub fn with_pool_id(mut self, pool_id: PoolId) -> Self {
        self.pool_id = pool_id;
        self
    }

    /// Set discovery timing.
    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.discovery.validate()?;

        let base = self.backend.api_base.as_str();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(StakekitError::invalid_config(
                "backend.api_base",
                format!("'{}' is not an http(s) URL", base),
            ));
        }
        if self.backend.timeout_secs == 0 {
            return Err(StakekitError::invalid_config(
                "backend.timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.negotiation.authorization_timeout_secs == 0 {
            return Err(StakekitError::invalid_config(
                "negotiation.authorization_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.supported_wallets.is_empty() {
            return Err(StakekitError::invalid_config(
                "supported_wallets",
                "at least one wallet must be supported",
            ));
        }
        Ok(())
    }

    /// Negotiator settings derived from this configuration.
    pub fn negotiator_config(&self) -> NegotiatorConfig {
        NegotiatorConfig::default()
            .with_authorization_timeout(Duration::from_secs(
                self.negotiation.authorization_timeout_secs,
            ))
            .with_address_class(AddressClass::ShelleyPayment {
                network: self.network,
            })
    }
}

fn parse_u64(field: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| StakekitError::invalid_config(field, format!("'{}' is not a number", value)))
}
