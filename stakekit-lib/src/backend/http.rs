//! HTTP client for the delegation backend.
//!
//! # Feature Flags
//!
//! Requests need the `http-backend` feature. Without it the client still
//! constructs, but every call returns [`StakekitError::Unimplemented`].
//!
//! ```toml
//! [dependencies]
//! stakekit-lib = { version = "0.1", features = ["http-backend"] }
//! ```

use async_trait::async_trait;
#[cfg(feature = "http-backend")]
use serde::de::DeserializeOwned;
#[cfg(feature = "http-backend")]
use std::time::Duration;

#[cfg(any(feature = "http-backend", test))]
use super::ErrorBody;
use super::{DelegationBackend, DelegationRequest, EpochParams, SubmitResponse, Utxo};
use crate::address::CanonicalAddress;
use crate::config::BackendConfig;
use crate::{Result, StakekitError};

#[cfg(not(feature = "http-backend"))]
const NOT_COMPILED: &str =
    "delegation HTTP client not compiled - enable the 'http-backend' feature";

/// [`DelegationBackend`] over the backend's JSON HTTP API.
pub struct HttpDelegationBackend {
    config: BackendConfig,
    #[cfg(feature = "http-backend")]
    client: reqwest::Client,
}

impl HttpDelegationBackend {
    /// Create a client for `config`.
    #[cfg(feature = "http-backend")]
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StakekitError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create a client for `config` (stub when feature disabled).
    #[cfg(not(feature = "http-backend"))]
    pub fn new(config: BackendConfig) -> Result<Self> {
        Ok(Self { config })
    }

    /// Client for the deployed backend.
    pub fn hosted() -> Result<Self> {
        Self::new(BackendConfig::default())
    }

    /// Settings in use.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    #[cfg(feature = "http-backend")]
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.config.url(path);
        tracing::debug!(%url, "backend GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(path, e))?;

        self.handle_response(path, response).await
    }

    #[cfg(feature = "http-backend")]
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.url(path);
        tracing::debug!(%url, "backend POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(path, e))?;

        self.handle_response(path, response).await
    }

    #[cfg(feature = "http-backend")]
    async fn handle_response<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(map_status_error(status.as_u16(), &text));
        }

        response.json::<T>().await.map_err(|e| {
            StakekitError::Serialization(format!("failed to parse '{}' response: {}", path, e))
        })
    }

    #[cfg(feature = "http-backend")]
    fn map_reqwest_error(&self, path: &str, e: reqwest::Error) -> StakekitError {
        if e.is_timeout() {
            StakekitError::Transport(format!(
                "'{}' timed out after {}s",
                path, self.config.timeout_secs
            ))
        } else if e.is_connect() {
            StakekitError::Transport(format!("cannot reach {}: {}", self.config.api_base, e))
        } else {
            StakekitError::transport(e)
        }
    }
}

/// Non-2xx response to [`StakekitError::Backend`], preferring the `error`
/// field of a JSON body over the raw text.
#[cfg(any(feature = "http-backend", test))]
fn map_status_error(status: u16, body: &str) -> StakekitError {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);
    let message = parsed.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            format!("HTTP {}", status)
        } else {
            trimmed.to_string()
        }
    });
    StakekitError::Backend { status, message }
}

#[async_trait]
impl DelegationBackend for HttpDelegationBackend {
    #[tracing::instrument(skip(self, address), fields(address = %address.short()))]
    async fn fetch_utxos(&self, address: &CanonicalAddress) -> Result<Vec<Utxo>> {
        #[cfg(feature = "http-backend")]
        {
            self.get("utxos", &[("address", address.as_str())]).await
        }
        #[cfg(not(feature = "http-backend"))]
        {
            Err(StakekitError::Unimplemented(NOT_COMPILED))
        }
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_epoch_params(&self) -> Result<EpochParams> {
        #[cfg(feature = "http-backend")]
        {
            self.get("epoch-params", &[]).await
        }
        #[cfg(not(feature = "http-backend"))]
        {
            Err(StakekitError::Unimplemented(NOT_COMPILED))
        }
    }

    #[tracing::instrument(skip(self, request), fields(pool = %request.pool_id))]
    async fn submit(&self, request: &DelegationRequest) -> Result<SubmitResponse> {
        #[cfg(feature = "http-backend")]
        {
            self.post("submit", request).await
        }
        #[cfg(not(feature = "http-backend"))]
        {
            let _ = request;
            Err(StakekitError::Unimplemented(NOT_COMPILED))
        }
    }
}
