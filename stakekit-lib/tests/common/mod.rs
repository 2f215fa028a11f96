//! Shared wallet mocks for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use stakekit_lib::negotiator::NegotiationState;
use stakekit_lib::provider::{
    InjectedRegistry, ProviderError, ProviderInfo, ProviderRegistry, WalletApi, WalletProvider,
};
use stakekit_lib::{ProviderId, RawAddress};
use tokio::sync::watch;

/// Base address, mainnet, key/key credentials.
pub const BASE_MAINNET_HEX: &str = "019493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e337b62cfff6403a06a3acbc34f8c46003c69fe79a3628cefa9c47251";
pub const BASE_MAINNET: &str = "addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3n0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgse35a3x";
pub const ENTERPRISE_TESTNET_HEX: &str = "609493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e";
pub const REWARD_MAINNET_HEX: &str = "e1337b62cfff6403a06a3acbc34f8c46003c69fe79a3628cefa9c47251";
pub const POOL: &str = "pool1w2duw0lk7lxjpfqjguxvtp0znhaqf8l2yvzcfd72l8fuk0h77gy";

/// How a [`MockProvider`] answers `enable()`.
#[derive(Clone, Debug)]
pub enum EnableOutcome {
    Approve,
    Refuse,
}

/// Configurable CIP-30 wallet.
#[derive(Clone)]
pub struct MockProvider {
    name: String,
    addresses: Option<Vec<RawAddress>>,
    outcome: EnableOutcome,
    enable_delay: Duration,
    list_error: Option<ProviderError>,
    observer: Arc<Mutex<Option<StateProbe>>>,
}

impl MockProvider {
    pub fn with_addresses(addresses: Option<Vec<RawAddress>>) -> Self {
        Self {
            name: "Mock".into(),
            addresses,
            outcome: EnableOutcome::Approve,
            enable_delay: Duration::ZERO,
            list_error: None,
            observer: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_hex(hex: &str) -> Self {
        Self::with_addresses(Some(vec![RawAddress::from(hex)]))
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.into();
        self
    }

    pub fn refusing(mut self) -> Self {
        self.outcome = EnableOutcome::Refuse;
        self
    }

    pub fn with_enable_delay(mut self, delay: Duration) -> Self {
        self.enable_delay = delay;
        self
    }

    pub fn failing_address_list(mut self, err: ProviderError) -> Self {
        self.list_error = Some(err);
        self
    }

    /// Record negotiator state whenever the wallet is called.
    pub fn observe(self, probe: StateProbe) -> Self {
        *self.observer.lock().unwrap() = Some(probe);
        self
    }

    fn record(&self) {
        if let Some(probe) = self.observer.lock().unwrap().as_ref() {
            probe.record();
        }
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo::new(self.name.clone(), "0.1.0")
    }

    async fn enable(&self) -> Result<Arc<dyn WalletApi>, ProviderError> {
        self.record();
        if !self.enable_delay.is_zero() {
            tokio::time::sleep(self.enable_delay).await;
        }
        match self.outcome {
            EnableOutcome::Approve => Ok(Arc::new(MockApi {
                provider: self.clone(),
            })),
            EnableOutcome::Refuse => Err(ProviderError::Refused("user declined".into())),
        }
    }
}

struct MockApi {
    provider: MockProvider,
}

#[async_trait]
impl WalletApi for MockApi {
    async fn used_addresses(&self) -> Result<Option<Vec<RawAddress>>, ProviderError> {
        self.provider.record();
        match &self.provider.list_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.provider.addresses.clone()),
        }
    }
}

/// Snapshot of negotiator states seen from inside wallet calls.
#[derive(Clone)]
pub struct StateProbe {
    rx: watch::Receiver<NegotiationState>,
    seen: Arc<Mutex<Vec<NegotiationState>>>,
}

impl StateProbe {
    pub fn new(rx: watch::Receiver<NegotiationState>) -> Self {
        Self {
            rx,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self) {
        let state = *self.rx.borrow();
        self.seen.lock().unwrap().push(state);
    }

    pub fn seen(&self) -> Vec<NegotiationState> {
        self.seen.lock().unwrap().clone()
    }
}

/// Registry wrapper counting how often it is listed.
#[derive(Default)]
pub struct CountingRegistry {
    pub inner: InjectedRegistry,
    listings: AtomicUsize,
}

impl CountingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

impl ProviderRegistry for CountingRegistry {
    fn provider_ids(&self) -> Vec<ProviderId> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.inner.provider_ids()
    }

    fn get(&self, id: &ProviderId) -> Option<Arc<dyn WalletProvider>> {
        self.inner.get(id)
    }
}

/// Registry holding `ids`, each a wallet with one mainnet base address.
pub fn registry_with(ids: &[&str]) -> Arc<InjectedRegistry> {
    let registry = Arc::new(InjectedRegistry::new());
    for id in ids {
        registry.inject(*id, Arc::new(MockProvider::with_hex(BASE_MAINNET_HEX).named(id)));
    }
    registry
}
