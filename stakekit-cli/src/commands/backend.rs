//! Backend commands - query chain context from the delegation backend

use anyhow::{Context, Result};
use stakekit_lib::backend::{DelegationBackend, HttpDelegationBackend};
use stakekit_lib::config::StakekitConfig;

use super::normalize::canonicalize;
use crate::ui;

#[tracing::instrument(skip(config))]
pub async fn utxos(config: &StakekitConfig, address: &str, verbose: bool) -> Result<()> {
    ui::header("Unspent Outputs");

    let address = canonicalize(config, address, true).context("invalid address")?;
    let backend = HttpDelegationBackend::new(config.backend.clone())?;

    if verbose {
        ui::info(&format!("Backend: {}", config.backend.api_base));
    }
    ui::key_value("Address", address.as_str());

    let spinner = ui::spinner("Fetching UTxOs...");
    let result = backend.fetch_utxos(&address).await;
    spinner.finish_and_clear();

    let utxos = result.context("failed to fetch UTxOs")?;
    if utxos.is_empty() {
        ui::info("No unspent outputs");
        return Ok(());
    }

    ui::success(&format!("Found {} UTxO(s)", utxos.len()));
    ui::separator();
    for utxo in &utxos {
        ui::json(&utxo.0);
    }
    Ok(())
}

#[tracing::instrument(skip(config))]
pub async fn params(config: &StakekitConfig, verbose: bool) -> Result<()> {
    ui::header("Protocol Parameters");

    let backend = HttpDelegationBackend::new(config.backend.clone())?;
    if verbose {
        ui::info(&format!("Backend: {}", config.backend.api_base));
    }

    let spinner = ui::spinner("Fetching epoch parameters...");
    let result = backend.fetch_epoch_params().await;
    spinner.finish_and_clear();

    let params = result.context("failed to fetch epoch parameters")?;
    if let Some(epoch) = params.epoch() {
        ui::key_value("Epoch", &epoch.to_string());
    }
    ui::separator();
    ui::json(&params.0);
    Ok(())
}
