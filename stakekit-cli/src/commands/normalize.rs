//! Normalize command - convert a wallet address to canonical bech32

use anyhow::{Context, Result};
use stakekit_lib::address::AddressClass;
use stakekit_lib::config::StakekitConfig;
use stakekit_lib::{normalize, CanonicalAddress, RawAddress};

use crate::ui;

#[tracing::instrument(skip(config))]
pub fn run(config: &StakekitConfig, raw: &str, any_class: bool, verbose: bool) -> Result<()> {
    ui::header("Normalize Address");

    let address = canonicalize(config, raw, any_class).context("invalid address")?;

    ui::success("Address is valid");
    ui::key_value("Address", address.as_str());
    ui::key_value("Kind", address.kind().as_str());
    ui::key_value("Network", address.network().as_str());
    if verbose {
        if let Ok(bytes) = address.to_bytes() {
            ui::key_value("Hex", &hex::encode(bytes.as_bytes()));
        }
    }
    Ok(())
}

/// Normalize `raw` and apply the configured address class.
pub fn canonicalize(
    config: &StakekitConfig,
    raw: &str,
    any_class: bool,
) -> stakekit_lib::Result<CanonicalAddress> {
    let address = normalize(&RawAddress::from(raw.trim()))?;
    let class = if any_class {
        AddressClass::Any
    } else {
        config.negotiator_config().address_class
    };
    class.check(&address)?;
    Ok(address)
}
