//! Custom Wallet Provider Example
//!
//! This example wires a hand-written wallet and delegation backend through
//! the full flow: the wallet appears in the registry some time after startup,
//! discovery picks it up, negotiation yields a session, and the delegator
//! submits to a backend that only logs what it receives.
//!
//! ```bash
//! cargo run -p stakekit-lib --example custom_wallet
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stakekit_lib::address::CanonicalAddress;
use stakekit_lib::backend::{
    DelegationBackend, DelegationRequest, EpochParams, SubmitResponse, Utxo,
};
use stakekit_lib::prelude::*;

/// A wallet holding one enterprise address.
struct DemoWallet;

#[async_trait]
impl WalletProvider for DemoWallet {
    fn info(&self) -> ProviderInfo {
        ProviderInfo::new("Demo Wallet", "0.1.0")
    }

    async fn enable(&self) -> std::result::Result<Arc<dyn WalletApi>, ProviderError> {
        // Simulate the user reading the consent prompt.
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(Arc::new(DemoApi))
    }
}

struct DemoApi;

#[async_trait]
impl WalletApi for DemoApi {
    async fn used_addresses(
        &self,
    ) -> std::result::Result<Option<Vec<RawAddress>>, ProviderError> {
        Ok(Some(vec![RawAddress::from(
            "619493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e",
        )]))
    }
}

/// Backend that accepts every delegation without touching the chain.
struct DryRunBackend;

#[async_trait]
impl DelegationBackend for DryRunBackend {
    async fn fetch_utxos(&self, address: &CanonicalAddress) -> Result<Vec<Utxo>> {
        println!("  backend: utxos for {}", address.short());
        Ok(Vec::new())
    }

    async fn fetch_epoch_params(&self) -> Result<EpochParams> {
        Ok(EpochParams(serde_json::json!({"epoch": 0})))
    }

    async fn submit(&self, request: &DelegationRequest) -> Result<SubmitResponse> {
        println!(
            "  backend: submit {}",
            serde_json::to_string(request).unwrap_or_default()
        );
        Ok(SubmitResponse {
            tx_hash: "00".repeat(32),
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    println!("=== Custom Wallet Provider Example ===\n");

    let config = StakekitConfig::default();
    let registry = Arc::new(InjectedRegistry::new());

    // The extension shows up after the page has started looking for it.
    let injector = registry.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(700)).await;
        injector.inject("nami", Arc::new(DemoWallet));
    });

    let found = discover(&*registry, &config.discovery).await?;
    let supported = found.supported(&config.supported_wallets);
    println!(
        "Discovered after {}ms: {:?}",
        found.elapsed().as_millis(),
        supported
            .iter()
            .map(|id| found.display_name(id))
            .collect::<Vec<_>>()
    );

    let negotiator = ConnectionNegotiator::new(registry, config.negotiator_config());
    let session = negotiator.connect(&supported[0]).await?;
    println!("Connected: {}\n", session.address().short());

    let receipt = Delegator::new(Arc::new(DryRunBackend))
        .delegate(&session, &config.pool_id)
        .await?;
    println!("\nTxHash: {}", receipt.tx_hash);

    Ok(())
}
