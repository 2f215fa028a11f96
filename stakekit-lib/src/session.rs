//! Connected wallet sessions.
//!
//! A [`Session`] is created only by a successful negotiation and is never
//! mutated afterwards. The caller owns it and passes it explicitly to the
//! delegation flow. [`SessionSlot`] holds the single current session of an
//! application: reconnecting replaces it, disconnecting clears it.

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::address::CanonicalAddress;
use crate::provider::WalletApi;
use crate::ProviderId;

/// Authorized connection to one wallet.
#[derive(Clone)]
pub struct Session {
    provider_id: ProviderId,
    api: Arc<dyn WalletApi>,
    address: CanonicalAddress,
    connected_at: i64,
}

impl Session {
    /// Assemble a session. The address is canonical by construction.
    pub fn new(provider_id: ProviderId, api: Arc<dyn WalletApi>, address: CanonicalAddress) -> Self {
        Self {
            provider_id,
            api,
            address,
            connected_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Provider this session was negotiated with.
    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    /// Authorized wallet handle, for signing and further queries.
    pub fn api(&self) -> &Arc<dyn WalletApi> {
        &self.api
    }

    /// Canonical address of the wallet.
    pub fn address(&self) -> &CanonicalAddress {
        &self.address
    }

    /// Connection time (unix epoch seconds).
    pub fn connected_at(&self) -> i64 {
        self.connected_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("provider_id", &self.provider_id)
            .field("address", &self.address.as_str())
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

/// Holder for the application's single current session.
#[derive(Default)]
pub struct SessionSlot {
    current: RwLock<Option<Arc<Session>>>,
}

impl SessionSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `session`, returning the one it replaced.
    pub fn replace(&self, session: Session) -> Option<Arc<Session>> {
        self.replace_arc(Arc::new(session))
    }

    /// Install an already shared `session`, returning the one it replaced.
    pub fn replace_arc(&self, session: Arc<Session>) -> Option<Arc<Session>> {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.as_ref() {
            tracing::debug!(
                previous = %previous.provider_id(),
                next = %session.provider_id(),
                "replacing wallet session"
            );
        }
        current.replace(session)
    }

    /// Drop the current session, returning it.
    pub fn disconnect(&self) -> Option<Arc<Session>> {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        current.take()
    }

    /// The current session, if connected.
    pub fn current(&self) -> Option<Arc<Session>> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        current.clone()
    }

    /// True if a session is installed.
    pub fn is_connected(&self) -> bool {
        self.current().is_some()
    }
}
