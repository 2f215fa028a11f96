//! Pool command - validate a stake pool id

use anyhow::{Context, Result};
use stakekit_lib::config::StakekitConfig;
use stakekit_lib::PoolId;

use crate::ui;

pub fn run(config: &StakekitConfig, id: Option<&str>) -> Result<()> {
    ui::header("Stake Pool");

    let pool = resolve(config, id)?;
    if id.is_none() {
        ui::info("Using the configured pool");
    }
    ui::key_value("Bech32", &pool.to_bech32());
    ui::key_value("Hex", &pool.to_hex());
    Ok(())
}

/// The pool named on the command line, or the configured one.
pub fn resolve(config: &StakekitConfig, id: Option<&str>) -> Result<PoolId> {
    match id {
        Some(text) => PoolId::parse(text).with_context(|| format!("invalid pool id '{}'", text)),
        None => Ok(config.pool_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_configured_pool() {
        let config = StakekitConfig::default();
        assert_eq!(resolve(&config, None).unwrap(), config.pool_id);
    }

    #[test]
    fn test_explicit_hex_pool() {
        let pool = resolve(
            &StakekitConfig::default(),
            Some("729bc73ff6f7cd20a412470cc585e29dfa049fea230584b7caf9d3cb"),
        )
        .unwrap();
        assert_eq!(
            pool.to_bech32(),
            "pool1w2duw0lk7lxjpfqjguxvtp0znhaqf8l2yvzcfd72l8fuk0h77gy"
        );
    }

    #[test]
    fn test_invalid_pool_has_context() {
        let err = resolve(&StakekitConfig::default(), Some("pool1xyz")).unwrap_err();
        assert!(err.to_string().contains("pool1xyz"));
    }
}
