//! Stakekit library.
//!
//! Connects to CIP-30 Cardano wallets and delegates their stake to a pool.
//! The crate holds no global state: wallet providers arrive through a
//! [`ProviderRegistry`](provider::ProviderRegistry) supplied by the caller,
//! and a successful connection yields a [`Session`](session::Session) the
//! caller owns.
//!
//! # Features
//!
//! - **Discovery**: Poll a provider registry within a bounded budget
//! - **Negotiation**: Authorize, fetch the first used address, normalize it
//! - **Address model**: Hex or raw CIP-19 bytes to canonical bech32
//! - **Delegation**: Submit through a backend or an external transaction builder
//!
//! # Example
//!
//! ```ignore
//! use stakekit_lib::prelude::*;
//!
//! let config = StakekitConfig::from_env()?;
//! let registry = Arc::new(InjectedRegistry::new());
//! // ... wallet bridge injects providers into `registry` ...
//!
//! let wallets = discover_supported(&*registry, &config.discovery, &config.supported_wallets).await?;
//! let negotiator = ConnectionNegotiator::new(registry, config.negotiator_config());
//! let session = negotiator.connect(&wallets[0]).await?;
//!
//! let backend = HttpDelegationBackend::new(config.backend.clone())?;
//! let receipt = Delegator::new(Arc::new(backend)).delegate(&session, &config.pool_id).await?;
//! println!("TxHash: {}", receipt.tx_hash);
//! ```

pub mod address;
pub mod backend;
pub mod config;
pub mod delegation;
pub mod discovery;
pub mod errors;
pub mod negotiator;
mod pool;
pub mod prelude;
pub mod provider;
pub mod session;

pub use address::{normalize, CanonicalAddress, RawAddress};
pub use errors::{StakekitError, StakekitErrorCode};
pub use pool::PoolId;

/// Common result alias for Stakekit operations.
pub type Result<T> = std::result::Result<T, StakekitError>;

/// Identifier of a wallet provider, e.g. `nami` or `eternl`.
///
/// This is the key a wallet registers itself under (the CIP-30
/// `window.cardano.<id>` name).
///
/// # Example
///
/// ```
/// use stakekit_lib::ProviderId;
///
/// let id: ProviderId = "nami".into();
/// assert_eq!(id.as_str(), "nami");
/// assert_eq!(id, ProviderId::new("nami"));
/// ```
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ProviderId(pub String);

impl ProviderId {
    /// Create a new ProviderId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the provider ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProviderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ProviderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
