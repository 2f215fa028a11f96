//! Stake delegation for a connected session.
//!
//! Two paths produce a delegation transaction:
//!
//! - [`Delegator`] hands the session's address and the target pool to a
//!   [`DelegationBackend`], which builds and submits the transaction.
//! - [`delegate_with_builder`] asks a [`DelegationTxBuilder`] for an unsigned
//!   transaction, has the wallet sign it, then submits the signed result.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::address::CanonicalAddress;
use crate::backend::{DelegationBackend, DelegationRequest};
use crate::session::Session;
use crate::{PoolId, Result, StakekitError};

/// Delegation settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationOptions {
    /// Send the fetched UTxOs and protocol parameters along with the submit
    /// request. The hosted backend looks them up itself.
    #[serde(default)]
    pub attach_chain_context: bool,
}

/// Outcome of a submitted delegation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationReceipt {
    /// Hash of the submitted transaction.
    pub tx_hash: String,
    /// Pool delegated to.
    pub pool_id: PoolId,
    /// Delegating address.
    pub address: CanonicalAddress,
}

/// Backend-driven delegation.
pub struct Delegator {
    backend: Arc<dyn DelegationBackend>,
    options: DelegationOptions,
}

impl Delegator {
    /// Create a delegator with default options.
    pub fn new(backend: Arc<dyn DelegationBackend>) -> Self {
        Self {
            backend,
            options: DelegationOptions::default(),
        }
    }

    /// Set the options.
    pub fn with_options(mut self, options: DelegationOptions) -> Self {
        self.options = options;
        self
    }

    /// Options in use.
    pub fn options(&self) -> DelegationOptions {
        self.options
    }

    /// Delegate the session's stake to `pool`.
    ///
    /// Fetches the address's UTxOs and the current protocol parameters, then
    /// submits. Any failed step aborts the flow with its error; nothing is
    /// retried.
    #[tracing::instrument(
        skip(self, session, pool),
        fields(provider = %session.provider_id(), address = %session.address().short(), pool = %pool)
    )]
    pub async fn delegate(&self, session: &Session, pool: &PoolId) -> Result<DelegationReceipt> {
        let address = session.address();

        let utxos = self.backend.fetch_utxos(address).await?;
        let params = self.backend.fetch_epoch_params().await?;
        tracing::debug!(utxos = utxos.len(), epoch = ?params.epoch(), "chain context fetched");

        let mut request = DelegationRequest::new(address.clone(), *pool);
        if self.options.attach_chain_context {
            request = request.with_chain_context(utxos, params);
        }

        let response = self.backend.submit(&request).await?;
        let tx_hash = checked_hash(response.tx_hash)?;
        tracing::info!(%tx_hash, "delegation submitted");

        Ok(DelegationReceipt {
            tx_hash,
            pool_id: *pool,
            address: address.clone(),
        })
    }
}

/// Transaction awaiting the wallet's signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTx {
    /// CBOR-encoded transaction, hex.
    pub cbor_hex: String,
}

/// Transaction together with the wallet's witness set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    /// CBOR-encoded transaction body as built, hex.
    pub cbor_hex: String,
    /// CBOR-encoded witness set returned by the wallet, hex.
    pub witness_set_hex: String,
}

/// Builds delegation certificate transactions outside the backend, e.g.
/// with a serialization library.
#[async_trait]
pub trait DelegationTxBuilder: Send + Sync {
    /// Build an unsigned transaction delegating `address`'s stake to `pool`.
    async fn build(&self, address: &CanonicalAddress, pool: &PoolId) -> Result<UnsignedTx>;

    /// Assemble and submit a signed transaction, returning its hash.
    async fn submit(&self, signed: &SignedTx) -> Result<String>;
}

/// Delegate through `builder`, signing with the session's wallet.
#[tracing::instrument(
    skip(session, builder, pool),
    fields(provider = %session.provider_id(), pool = %pool)
)]
pub async fn delegate_with_builder(
    session: &Session,
    builder: &dyn DelegationTxBuilder,
    pool: &PoolId,
) -> Result<DelegationReceipt> {
    let address = session.address();
    let unsigned = builder.build(address, pool).await?;

    let witness_set_hex = session
        .api()
        .sign_tx(&unsigned.cbor_hex, false)
        .await
        .map_err(|err| StakekitError::WalletOperation {
            operation: "signTx",
            reason: err.to_string(),
        })?;

    let signed = SignedTx {
        cbor_hex: unsigned.cbor_hex,
        witness_set_hex,
    };
    let tx_hash = checked_hash(builder.submit(&signed).await?)?;
    tracing::info!(%tx_hash, "delegation submitted");

    Ok(DelegationReceipt {
        tx_hash,
        pool_id: *pool,
        address: address.clone(),
    })
}

fn checked_hash(tx_hash: String) -> Result<String> {
    let tx_hash = tx_hash.trim().to_string();
    if tx_hash.is_empty() {
        return Err(StakekitError::Serialization(
            "submit response carried an empty transaction hash".into(),
        ));
    }
    Ok(tx_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::RawAddress;
    use crate::backend::{EpochParams, SubmitResponse, Utxo};
    use crate::provider::{ProviderError, WalletApi};
    use crate::ProviderId;
    use std::sync::Mutex;

    const ADDR: &str = "addr1vx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzers66hrl8";
    const POOL: &str = "pool1w2duw0lk7lxjpfqjguxvtp0znhaqf8l2yvzcfd72l8fuk0h77gy";

    #[derive(Default)]
    struct RecordingBackend {
        submitted: Mutex<Vec<DelegationRequest>>,
        fail_params: bool,
    }

    #[async_trait]
    impl DelegationBackend for RecordingBackend {
        async fn fetch_utxos(&self, _address: &CanonicalAddress) -> Result<Vec<Utxo>> {
            Ok(vec![Utxo(serde_json::json!({"amount": "5000000"}))])
        }

        async fn fetch_epoch_params(&self) -> Result<EpochParams> {
            if self.fail_params {
                return Err(StakekitError::Backend {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            Ok(EpochParams(serde_json::json!({"epoch": 512})))
        }

        async fn submit(&self, request: &DelegationRequest) -> Result<SubmitResponse> {
            self.submitted.lock().unwrap().push(request.clone());
            Ok(SubmitResponse {
                tx_hash: "abc123".into(),
            })
        }
    }

    struct SigningApi;

    #[async_trait]
    impl WalletApi for SigningApi {
        async fn used_addresses(&self) -> std::result::Result<Option<Vec<RawAddress>>, ProviderError> {
            Ok(None)
        }

        async fn sign_tx(
            &self,
            tx_cbor_hex: &str,
            _partial: bool,
        ) -> std::result::Result<String, ProviderError> {
            Ok(format!("witness-for-{}", tx_cbor_hex))
        }
    }

    struct NoSignApi;

    #[async_trait]
    impl WalletApi for NoSignApi {
        async fn used_addresses(&self) -> std::result::Result<Option<Vec<RawAddress>>, ProviderError> {
            Ok(None)
        }
    }

    struct EchoBuilder;

    #[async_trait]
    impl DelegationTxBuilder for EchoBuilder {
        async fn build(&self, _address: &CanonicalAddress, _pool: &PoolId) -> Result<UnsignedTx> {
            Ok(UnsignedTx {
                cbor_hex: "84a4".into(),
            })
        }

        async fn submit(&self, signed: &SignedTx) -> Result<String> {
            assert_eq!(signed.witness_set_hex, "witness-for-84a4");
            Ok("feedface".into())
        }
    }

    fn session(api: Arc<dyn WalletApi>) -> Session {
        Session::new(ProviderId::new("nami"), api, ADDR.parse().unwrap())
    }

    #[tokio::test]
    async fn test_delegate_sends_address_and_pool() {
        let backend = Arc::new(RecordingBackend::default());
        let delegator = Delegator::new(backend.clone());
        let pool: PoolId = POOL.parse().unwrap();

        let receipt = delegator.delegate(&session(Arc::new(SigningApi)), &pool).await.unwrap();
        assert_eq!(receipt.tx_hash, "abc123");
        assert_eq!(receipt.address.as_str(), ADDR);

        let submitted = backend.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert!(submitted[0].utxos.is_none());
        assert!(submitted[0].epoch_params.is_none());
    }

    #[tokio::test]
    async fn test_delegate_attaches_context_when_asked() {
        let backend = Arc::new(RecordingBackend::default());
        let delegator = Delegator::new(backend.clone()).with_options(DelegationOptions {
            attach_chain_context: true,
        });

        delegator
            .delegate(&session(Arc::new(SigningApi)), &POOL.parse().unwrap())
            .await
            .unwrap();

        let submitted = backend.submitted.lock().unwrap();
        assert_eq!(submitted[0].utxos.as_ref().map(Vec::len), Some(1));
        assert_eq!(submitted[0].epoch_params.as_ref().and_then(|p| p.epoch()), Some(512));
    }

    #[tokio::test]
    async fn test_failed_step_skips_submit() {
        let backend = Arc::new(RecordingBackend {
            fail_params: true,
            ..Default::default()
        });
        let delegator = Delegator::new(backend.clone());

        let err = delegator
            .delegate(&session(Arc::new(SigningApi)), &POOL.parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StakekitError::Backend { status: 503, .. }));
        assert!(backend.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_builder_path_signs_through_wallet() {
        let receipt = delegate_with_builder(
            &session(Arc::new(SigningApi)),
            &EchoBuilder,
            &POOL.parse().unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(receipt.tx_hash, "feedface");
    }

    #[tokio::test]
    async fn test_builder_path_reports_signing_failure() {
        let err = delegate_with_builder(
            &session(Arc::new(NoSignApi)),
            &EchoBuilder,
            &POOL.parse().unwrap(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            StakekitError::WalletOperation { operation: "signTx", .. }
        ));
    }

    #[test]
    fn test_empty_hash_rejected() {
        assert!(checked_hash("  ".into()).is_err());
        assert_eq!(checked_hash(" ab \n".into()).unwrap(), "ab");
    }
}
