//! Wallet Provider Registry
//!
//! The host environment owns the registry: it injects providers whenever the
//! corresponding browser extensions finish loading, which may be before or
//! after discovery starts watching. Discovery and negotiation only read it.
//!
//! # Thread Safety
//!
//! [`InjectedRegistry`] uses `RwLock` for shared access. A poisoned lock is
//! recovered rather than propagated, since every write leaves the map in a
//! consistent state.

use super::traits::WalletProvider;
use crate::ProviderId;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Read-only view of the host's provider registry.
pub trait ProviderRegistry: Send + Sync {
    /// Identifiers of every provider currently present, sorted.
    fn provider_ids(&self) -> Vec<ProviderId>;

    /// Look up one provider.
    fn get(&self, id: &ProviderId) -> Option<Arc<dyn WalletProvider>>;

    /// True if no provider has been injected yet.
    fn is_empty(&self) -> bool {
        self.provider_ids().is_empty()
    }
}

impl<R: ProviderRegistry + ?Sized> ProviderRegistry for Arc<R> {
    fn provider_ids(&self) -> Vec<ProviderId> {
        (**self).provider_ids()
    }

    fn get(&self, id: &ProviderId) -> Option<Arc<dyn WalletProvider>> {
        (**self).get(id)
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}

/// In-process registry that host glue (or tests) populate.
///
/// # Example
///
/// ```ignore
/// use stakekit_lib::provider::InjectedRegistry;
///
/// let registry = InjectedRegistry::new();
/// registry.inject("nami", Arc::new(NamiBridge::new()));
/// assert!(registry.contains(&"nami".into()));
/// ```
#[derive(Default)]
pub struct InjectedRegistry {
    providers: RwLock<BTreeMap<ProviderId, Arc<dyn WalletProvider>>>,
}

impl InjectedRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects a provider under `id`, replacing any previous one.
    pub fn inject(&self, id: impl Into<ProviderId>, provider: Arc<dyn WalletProvider>) {
        let mut providers = self.providers.write().unwrap_or_else(|e| e.into_inner());
        providers.insert(id.into(), provider);
    }

    /// Removes a provider, returning it if it existed.
    pub fn remove(&self, id: &ProviderId) -> Option<Arc<dyn WalletProvider>> {
        let mut providers = self.providers.write().unwrap_or_else(|e| e.into_inner());
        providers.remove(id)
    }

    /// Checks if a provider is present.
    pub fn contains(&self, id: &ProviderId) -> bool {
        let providers = self.providers.read().unwrap_or_else(|e| e.into_inner());
        providers.contains_key(id)
    }

    /// Returns the number of injected providers.
    pub fn len(&self) -> usize {
        let providers = self.providers.read().unwrap_or_else(|e| e.into_inner());
        providers.len()
    }
}

impl ProviderRegistry for InjectedRegistry {
    fn provider_ids(&self) -> Vec<ProviderId> {
        let providers = self.providers.read().unwrap_or_else(|e| e.into_inner());
        providers.keys().cloned().collect()
    }

    fn get(&self, id: &ProviderId) -> Option<Arc<dyn WalletProvider>> {
        let providers = self.providers.read().unwrap_or_else(|e| e.into_inner());
        providers.get(id).cloned()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
