//! Connection negotiation with a chosen wallet.
//!
//! One `connect` call walks a fixed sequence:
//!
//! ```text
//! Idle -> Authorizing -> AddressFetching -> Normalizing -> Connected
//!   \________________\_____________\______________\-----> Failed
//! ```
//!
//! No step is skipped and none is retried within a call. Every failure ends
//! the attempt and is returned to the caller, who may start a fresh one.
//!
//! At most one negotiation runs at a time per [`ConnectionNegotiator`]; a
//! concurrent call is rejected with [`StakekitError::NegotiationInProgress`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::address::{normalize, AddressClass};
use crate::provider::ProviderRegistry;
use crate::session::{Session, SessionSlot};
use crate::{ProviderId, Result, StakekitError};

/// Authorization is a user consent prompt with no protocol deadline.
pub const DEFAULT_AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Step of the current (or last) negotiation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationState {
    /// No attempt yet, or an attempt is starting.
    Idle,
    /// Waiting for the user to authorize.
    Authorizing,
    /// Asking the wallet for its used addresses.
    AddressFetching,
    /// Normalizing and classifying the address.
    Normalizing,
    /// Attempt succeeded.
    Connected,
    /// Attempt failed or was abandoned.
    Failed,
}

impl NegotiationState {
    /// True for `Connected` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Connected | Self::Failed)
    }
}

/// Negotiator settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NegotiatorConfig {
    /// Bound on the authorization step.
    pub authorization_timeout: Duration,
    /// Addresses a session may carry.
    pub address_class: AddressClass,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            authorization_timeout: DEFAULT_AUTHORIZATION_TIMEOUT,
            address_class: AddressClass::default(),
        }
    }
}

impl NegotiatorConfig {
    /// Set the authorization timeout.
    pub fn with_authorization_timeout(mut self, timeout: Duration) -> Self {
        self.authorization_timeout = timeout;
        self
    }

    /// Set the accepted address class.
    pub fn with_address_class(mut self, class: AddressClass) -> Self {
        self.address_class = class;
        self
    }
}

/// Negotiates authorized sessions with providers from a registry.
///
/// # Example
///
/// ```ignore
/// let negotiator = ConnectionNegotiator::new(registry, NegotiatorConfig::default());
/// let session = negotiator.connect(&"nami".into()).await?;
/// println!("connected: {}", session.address().short());
/// ```
pub struct ConnectionNegotiator {
    registry: Arc<dyn ProviderRegistry>,
    config: NegotiatorConfig,
    in_flight: AtomicBool,
    state: watch::Sender<NegotiationState>,
}

impl ConnectionNegotiator {
    /// Create a negotiator over `registry`.
    pub fn new(registry: Arc<dyn ProviderRegistry>, config: NegotiatorConfig) -> Self {
        let (state, _) = watch::channel(NegotiationState::Idle);
        Self {
            registry,
            config,
            in_flight: AtomicBool::new(false),
            state,
        }
    }

    /// Settings in use.
    pub fn config(&self) -> &NegotiatorConfig {
        &self.config
    }

    /// State of the current or most recent attempt.
    pub fn state(&self) -> NegotiationState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<NegotiationState> {
        self.state.subscribe()
    }

    /// True while a `connect` call is running.
    pub fn is_negotiating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Authorize with `provider_id`, fetch its first used address and return
    /// a session carrying the canonical form of that address.
    ///
    /// # Errors
    ///
    /// - [`StakekitError::NegotiationInProgress`] if another call is running.
    /// - [`StakekitError::ProviderNotFound`] if the registry lacks the id.
    /// - [`StakekitError::AuthorizationDenied`] / [`StakekitError::AuthorizationTimeout`].
    /// - [`StakekitError::WalletOperation`] if listing addresses fails.
    /// - [`StakekitError::NoAddressAvailable`] if the wallet has no used address.
    /// - [`StakekitError::MalformedAddress`] / [`StakekitError::UnsupportedAddressClass`].
    #[tracing::instrument(skip(self, provider_id), fields(provider = %provider_id))]
    pub async fn connect(&self, provider_id: &ProviderId) -> Result<Session> {
        let mut attempt = Attempt::begin(self)?;

        match self.negotiate(provider_id).await {
            Ok(session) => {
                attempt.finish(NegotiationState::Connected);
                tracing::info!(address = %session.address().short(), "wallet connected");
                Ok(session)
            }
            Err(err) => {
                attempt.finish(NegotiationState::Failed);
                tracing::warn!(code = err.code() as i32, "wallet connection failed: {}", err);
                Err(err)
            }
        }
    }

    /// [`connect`](Self::connect), then install the session in `slot`.
    ///
    /// On failure the slot keeps its previous session.
    pub async fn connect_into(
        &self,
        provider_id: &ProviderId,
        slot: &SessionSlot,
    ) -> Result<Arc<Session>> {
        let session = Arc::new(self.connect(provider_id).await?);
        slot.replace_arc(session.clone());
        Ok(session)
    }

    async fn negotiate(&self, provider_id: &ProviderId) -> Result<Session> {
        let provider = self
            .registry
            .get(provider_id)
            .ok_or_else(|| StakekitError::ProviderNotFound(provider_id.clone()))?;

        self.transition(NegotiationState::Authorizing);
        let timeout = self.config.authorization_timeout;
        let api = match tokio::time::timeout(timeout, provider.enable()).await {
            Ok(Ok(api)) => api,
            Ok(Err(err)) => {
                return Err(StakekitError::AuthorizationDenied {
                    provider: provider_id.clone(),
                    reason: err.to_string(),
                })
            }
            Err(_) => {
                return Err(StakekitError::AuthorizationTimeout {
                    provider: provider_id.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        };

        self.transition(NegotiationState::AddressFetching);
        let used = api
            .used_addresses()
            .await
            .map_err(|err| StakekitError::WalletOperation {
                operation: "getUsedAddresses",
                reason: err.to_string(),
            })?;
        let raw = used
            .and_then(|addresses| addresses.into_iter().next())
            .ok_or_else(|| StakekitError::NoAddressAvailable {
                provider: provider_id.clone(),
            })?;

        self.transition(NegotiationState::Normalizing);
        let address = normalize(&raw)?;
        self.config.address_class.check(&address)?;

        Ok(Session::new(provider_id.clone(), api, address))
    }

    fn transition(&self, next: NegotiationState) {
        tracing::debug!(state = ?next, "negotiation step");
        self.state.send_replace(next);
    }
}

/// Holds the in-flight flag for one `connect` call.
///
/// Dropping it before `finish` (the caller abandoned the future) still clears
/// the flag and records the attempt as failed.
struct Attempt<'a> {
    negotiator: &'a ConnectionNegotiator,
    finished: bool,
}

impl<'a> Attempt<'a> {
    fn begin(negotiator: &'a ConnectionNegotiator) -> Result<Self> {
        negotiator
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StakekitError::NegotiationInProgress)?;
        negotiator.transition(NegotiationState::Idle);
        Ok(Self {
            negotiator,
            finished: false,
        })
    }

    fn finish(&mut self, state: NegotiationState) {
        self.negotiator.transition(state);
        self.finished = true;
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.negotiator.transition(NegotiationState::Failed);
        }
        self.negotiator.in_flight.store(false, Ordering::Release);
    }
}
