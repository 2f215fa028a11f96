//! Config command - print the effective configuration

use anyhow::Result;
use stakekit_lib::config::StakekitConfig;

use crate::ui;

pub fn run(config: &StakekitConfig) -> Result<()> {
    ui::header("Configuration");
    ui::json(&serde_json::to_value(config)?);
    Ok(())
}
