//! Wallet Provider Traits
//!
//! A browser wallet injects an object under `window.cardano.<id>`; calling its
//! `enable()` yields an API handle scoped to the connected dApp (CIP-30). The
//! two traits here mirror that split: [`WalletProvider`] is the unauthorized
//! entry point, [`WalletApi`] the authorized capability handle.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::address::RawAddress;

/// Error returned by a wallet, following the CIP-30 `APIError` codes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Inputs do not conform to the wallet API.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Wallet failed internally.
    #[error("internal wallet error: {0}")]
    InternalError(String),
    /// The user declined the request.
    #[error("refused: {0}")]
    Refused(String),
    /// The account changed since the handle was issued.
    #[error("account changed: {0}")]
    AccountChange(String),
}

impl ProviderError {
    /// Numeric CIP-30 error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidRequest(_) => -1,
            Self::InternalError(_) => -2,
            Self::Refused(_) => -3,
            Self::AccountChange(_) => -4,
        }
    }

    /// Rebuild from a numeric code and info string, as a host bridge receives them.
    pub fn from_code(code: i32, info: impl Into<String>) -> Self {
        let info = info.into();
        match code {
            -1 => Self::InvalidRequest(info),
            -3 => Self::Refused(info),
            -4 => Self::AccountChange(info),
            _ => Self::InternalError(info),
        }
    }
}

/// Display metadata a wallet publishes on its injected object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    /// Name to show when asking the user which wallet to connect.
    pub name: String,
    /// Image URI (usually a data URI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Wallet API version string.
    pub api_version: String,
}

impl ProviderInfo {
    /// Create metadata with no icon.
    pub fn new(name: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: None,
            api_version: api_version.into(),
        }
    }

    /// Set the icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Injected wallet entry point, before authorization.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Wallet metadata.
    fn info(&self) -> ProviderInfo;

    /// Ask the user to authorize this dApp.
    ///
    /// May prompt; may resolve immediately when the dApp is already
    /// whitelisted. Calling it again after success returns an equivalent
    /// handle.
    async fn enable(&self) -> Result<Arc<dyn WalletApi>, ProviderError>;
}

/// Authorized wallet capability handle.
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Addresses already used on chain by this wallet.
    ///
    /// `Ok(None)` stands for a wallet that returned nothing at all.
    async fn used_addresses(&self) -> Result<Option<Vec<RawAddress>>, ProviderError>;

    /// Sign a CBOR-hex transaction, returning the CBOR-hex witness set.
    async fn sign_tx(&self, _tx_cbor_hex: &str, _partial: bool) -> Result<String, ProviderError> {
        Err(ProviderError::InvalidRequest(
            "signTx is not supported by this wallet".to_string(),
        ))
    }

    /// Submit a signed CBOR-hex transaction through the wallet, returning its hash.
    async fn submit_tx(&self, _tx_cbor_hex: &str) -> Result<String, ProviderError> {
        Err(ProviderError::InvalidRequest(
            "submitTx is not supported by this wallet".to_string(),
        ))
    }
}
