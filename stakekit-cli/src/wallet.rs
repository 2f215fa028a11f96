//! Watch-only wallet for command-line delegation.
//!
//! The CLI has no browser extension to talk to. It registers this provider
//! under [`CLI_WALLET_ID`] so the address given on the command line goes
//! through the same discovery and negotiation as a real wallet's.

use std::sync::Arc;

use async_trait::async_trait;
use stakekit_lib::provider::{ProviderError, ProviderInfo, WalletApi, WalletProvider};
use stakekit_lib::RawAddress;

/// Registry key of the watch-only wallet.
pub const CLI_WALLET_ID: &str = "cli";

/// Provider that authorizes immediately and reports one used address.
pub struct WatchOnlyWallet {
    address: RawAddress,
}

impl WatchOnlyWallet {
    pub fn new(address: impl Into<RawAddress>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl WalletProvider for WatchOnlyWallet {
    fn info(&self) -> ProviderInfo {
        ProviderInfo::new("Command line", env!("CARGO_PKG_VERSION"))
    }

    async fn enable(&self) -> Result<Arc<dyn WalletApi>, ProviderError> {
        Ok(Arc::new(WatchOnlyApi {
            address: self.address.clone(),
        }))
    }
}

struct WatchOnlyApi {
    address: RawAddress,
}

#[async_trait]
impl WalletApi for WatchOnlyApi {
    async fn used_addresses(&self) -> Result<Option<Vec<RawAddress>>, ProviderError> {
        Ok(Some(vec![self.address.clone()]))
    }

    async fn sign_tx(&self, _tx_cbor_hex: &str, _partial: bool) -> Result<String, ProviderError> {
        Err(ProviderError::Refused("watch-only wallet cannot sign".into()))
    }
}
