//! Delegate command - connect a watch-only wallet and submit a delegation

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use stakekit_lib::backend::HttpDelegationBackend;
use stakekit_lib::config::StakekitConfig;
use stakekit_lib::delegation::{DelegationOptions, Delegator};
use stakekit_lib::discovery::discover_supported;
use stakekit_lib::negotiator::ConnectionNegotiator;
use stakekit_lib::provider::InjectedRegistry;
use stakekit_lib::session::Session;
use stakekit_lib::ProviderId;

use super::pool;
use crate::ui;
use crate::wallet::{WatchOnlyWallet, CLI_WALLET_ID};

#[tracing::instrument(skip(config))]
pub async fn run(
    config: &StakekitConfig,
    address: &str,
    pool_id: Option<&str>,
    attach_context: bool,
    yes: bool,
) -> Result<()> {
    ui::header("Delegate Stake");

    let pool = pool::resolve(config, pool_id)?;
    let session = connect(config, address).await?;

    ui::key_value("Address", session.address().as_str());
    ui::key_value("Pool", &pool.to_bech32());
    if attach_context {
        ui::info("UTxOs and protocol parameters will be sent with the request");
    }

    if !yes && !ui::confirm("Submit delegation?", false)? {
        ui::warning("Delegation cancelled");
        return Ok(());
    }

    let backend = HttpDelegationBackend::new(config.backend.clone())?;
    let delegator = Delegator::new(Arc::new(backend)).with_options(DelegationOptions {
        attach_chain_context: attach_context,
    });

    let spinner = ui::spinner("Preparing delegation...");
    let result = delegator.delegate(&session, &pool).await;
    spinner.finish_and_clear();

    match result {
        Ok(receipt) => {
            ui::success("Delegation submitted!");
            ui::key_value("TxHash", &receipt.tx_hash);
            Ok(())
        }
        Err(e) => {
            if e.is_retryable() {
                ui::warning("The backend may accept a later attempt");
            }
            Err(e).context("delegation failed")
        }
    }
}

/// Run `address` through discovery and negotiation as a watch-only wallet.
pub async fn connect(config: &StakekitConfig, address: &str) -> Result<Session> {
    let registry = Arc::new(InjectedRegistry::new());
    registry.inject(CLI_WALLET_ID, Arc::new(WatchOnlyWallet::new(address.trim())));

    let wallet_id = ProviderId::new(CLI_WALLET_ID);
    let found = discover_supported(&*registry, &config.discovery, &[wallet_id.clone()]).await?;
    if !found.contains(&wallet_id) {
        bail!("watch-only wallet was not discovered");
    }

    let negotiator = ConnectionNegotiator::new(registry, config.negotiator_config());
    let session = negotiator
        .connect(&wallet_id)
        .await
        .context("address rejected")?;
    tracing::debug!(address = %session.address().short(), "watch-only session ready");
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakekit_lib::StakekitError;

    const BASE_HEX: &str = "019493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e337b62cfff6403a06a3acbc34f8c46003c69fe79a3628cefa9c47251";

    #[tokio::test]
    async fn test_connect_normalizes_hex() {
        let session = connect(&StakekitConfig::default(), BASE_HEX).await.unwrap();
        assert_eq!(session.provider_id().as_str(), CLI_WALLET_ID);
        assert!(session.address().as_str().starts_with("addr1qx2fxv2umy"));
    }

    #[tokio::test]
    async fn test_connect_rejects_stake_address() {
        let err = connect(
            &StakekitConfig::default(),
            "stake1uyehkck0lajq8gr28t9uxnuvgcqrc6070x3k9r8048z8y5gh6ffgw",
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StakekitError>(),
            Some(StakekitError::UnsupportedAddressClass { .. })
        ));
    }
}
