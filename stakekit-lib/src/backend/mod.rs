//! Delegation backend.
//!
//! The backend owns transaction construction: it is given the wallet's
//! canonical address and the target pool, and answers with a transaction
//! hash. Two read endpoints expose chain context (UTxOs and protocol
//! parameters) that a caller may fetch beforehand.
//!
//! | Endpoint | Method | Body / Query | Response |
//! |---|---|---|---|
//! | `utxos` | GET | `?address=<bech32>` | JSON array |
//! | `epoch-params` | GET | | JSON object |
//! | `submit` | POST | [`DelegationRequest`] | [`SubmitResponse`] or `{"error": …}` |

mod http;

pub use http::HttpDelegationBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::address::CanonicalAddress;
use crate::{PoolId, Result};

/// Unspent output as reported by the backend. The layout is the backend's
/// own and is passed through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Utxo(pub serde_json::Value);

/// Current protocol parameters as reported by the backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochParams(pub serde_json::Value);

impl EpochParams {
    /// Look up a top-level parameter, e.g. `"epoch"` or `"min_fee_a"`.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Epoch number, if the backend reports one.
    pub fn epoch(&self) -> Option<u64> {
        self.get("epoch").and_then(|v| v.as_u64())
    }
}

/// Body of a `submit` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationRequest {
    /// Delegator's canonical address.
    pub address: CanonicalAddress,
    /// UTxOs to spend, when the caller attaches chain context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utxos: Option<Vec<Utxo>>,
    /// Protocol parameters, when the caller attaches chain context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch_params: Option<EpochParams>,
    /// Target pool.
    pub pool_id: PoolId,
}

impl DelegationRequest {
    /// Request carrying only the address and pool.
    pub fn new(address: CanonicalAddress, pool_id: PoolId) -> Self {
        Self {
            address,
            utxos: None,
            epoch_params: None,
            pool_id,
        }
    }

    /// Attach UTxOs and protocol parameters.
    pub fn with_chain_context(mut self, utxos: Vec<Utxo>, params: EpochParams) -> Self {
        self.utxos = Some(utxos);
        self.epoch_params = Some(params);
        self
    }
}

/// Successful `submit` response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// Hash of the submitted transaction.
    pub tx_hash: String,
}

/// Error body returned with a non-2xx status.
#[cfg(any(feature = "http-backend", test))]
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Service that builds and submits delegation transactions.
#[async_trait]
pub trait DelegationBackend: Send + Sync {
    /// Unspent outputs at `address`.
    async fn fetch_utxos(&self, address: &CanonicalAddress) -> Result<Vec<Utxo>>;

    /// Current protocol parameters.
    async fn fetch_epoch_params(&self) -> Result<EpochParams>;

    /// Build and submit a delegation certificate transaction.
    async fn submit(&self, request: &DelegationRequest) -> Result<SubmitResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "addr1vx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzers66hrl8";
    const POOL: &str = "pool1w2duw0lk7lxjpfqjguxvtp0znhaqf8l2yvzcfd72l8fuk0h77gy";

    fn request() -> DelegationRequest {
        DelegationRequest::new(ADDR.parse().unwrap(), POOL.parse().unwrap())
    }

    #[test]
    fn test_request_body_without_context() {
        let body = serde_json::to_value(request()).unwrap();
        assert_eq!(body, serde_json::json!({"address": ADDR, "poolId": POOL}));
    }

    #[test]
    fn test_request_body_with_context() {
        let params = EpochParams(serde_json::json!({"epoch": 512, "min_fee_a": 44}));
        let utxo = Utxo(serde_json::json!({"tx_hash": "ab", "output_index": 0}));
        let body = serde_json::to_value(request().with_chain_context(vec![utxo], params)).unwrap();

        assert_eq!(body["epochParams"]["epoch"], 512);
        assert_eq!(body["utxos"][0]["output_index"], 0);
        assert_eq!(body["poolId"], POOL);
    }

    #[test]
    fn test_submit_response_field_name() {
        let response: SubmitResponse =
            serde_json::from_str(r#"{"txHash": "deadbeef"}"#).unwrap();
        assert_eq!(response.tx_hash, "deadbeef");
    }

    #[test]
    fn test_epoch_accessor() {
        let params = EpochParams(serde_json::json!({"epoch": 512}));
        assert_eq!(params.epoch(), Some(512));
        assert_eq!(EpochParams::default().epoch(), None);
    }
}
