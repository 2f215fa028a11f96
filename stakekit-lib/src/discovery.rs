//! Wallet discovery.
//!
//! Browser extensions inject their provider objects at some unspecified time
//! after page load, and there is no event guaranteed to fire after an
//! observer starts listening. Discovery therefore polls the registry on a
//! fixed cadence within a bounded budget.
//!
//! # Cancellation
//!
//! [`discover`] holds no timer outside its own future: dropping the future
//! (for example because the caller navigated away, or lost a `select!`) stops
//! all further polls.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::provider::{ProviderInfo, ProviderRegistry};
use crate::{ProviderId, Result, StakekitError};

/// Timing for a discovery run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Total budget. Zero means a single immediate check.
    #[serde(with = "millis")]
    pub max_wait: Duration,
    /// Delay between checks. Must be non-zero and below `max_wait`.
    #[serde(with = "millis")]
    pub poll_interval: Duration,
}

/// 20 polls of 300ms, as deployed in the dApp this crate serves.
impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_millis(6_000),
            poll_interval: Duration::from_millis(300),
        }
    }
}

impl DiscoveryConfig {
    /// Create a config from millisecond values.
    pub fn from_millis(max_wait_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            max_wait: Duration::from_millis(max_wait_ms),
            poll_interval: Duration::from_millis(poll_interval_ms),
        }
    }

    /// Check the interval constraints.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(StakekitError::invalid_config(
                "discovery.poll_interval",
                "must be greater than zero",
            ));
        }
        if !self.max_wait.is_zero() && self.poll_interval >= self.max_wait {
            return Err(StakekitError::invalid_config(
                "discovery.poll_interval",
                format!(
                    "{}ms must be below max_wait {}ms",
                    self.poll_interval.as_millis(),
                    self.max_wait.as_millis()
                ),
            ));
        }
        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Result of a successful discovery run. Never empty.
#[derive(Clone, Debug)]
pub struct DiscoveredProviders {
    infos: BTreeMap<ProviderId, ProviderInfo>,
    elapsed: Duration,
}

impl DiscoveredProviders {
    fn collect<R: ProviderRegistry + ?Sized>(
        registry: &R,
        ids: Vec<ProviderId>,
        elapsed: Duration,
    ) -> Self {
        let infos = ids
            .into_iter()
            .map(|id| {
                // A provider removed between listing and lookup still counts as
                // discovered; it falls back to its id for display.
                let info = registry
                    .get(&id)
                    .map(|p| p.info())
                    .unwrap_or_else(|| ProviderInfo::new(id.as_str(), ""));
                (id, info)
            })
            .collect();
        Self { infos, elapsed }
    }

    /// Every discovered identifier, sorted.
    pub fn ids(&self) -> BTreeSet<ProviderId> {
        self.infos.keys().cloned().collect()
    }

    /// True if `id` was discovered.
    pub fn contains(&self, id: &ProviderId) -> bool {
        self.infos.contains_key(id)
    }

    /// Number of discovered providers.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Always false for a value returned by [`discover`].
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Wallet metadata for `id`.
    pub fn info(&self, id: &ProviderId) -> Option<&ProviderInfo> {
        self.infos.get(id)
    }

    /// Label for a connect button: the wallet's own name, or its id.
    pub fn display_name(&self, id: &ProviderId) -> String {
        self.infos
            .get(id)
            .map(|info| info.name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(id.as_str())
            .to_string()
    }

    /// Discovered ids that are on `allowlist`, in allowlist order.
    pub fn supported(&self, allowlist: &[ProviderId]) -> Vec<ProviderId> {
        allowlist
            .iter()
            .filter(|id| self.infos.contains_key(*id))
            .cloned()
            .collect()
    }

    /// Time from the start of discovery to the successful check.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Wait for at least one wallet provider to appear.
///
/// Checks immediately and returns without delay when the registry already has
/// entries. Otherwise re-checks every `poll_interval` until the registry is
/// non-empty or `max_wait` has elapsed, in which case it fails with
/// [`StakekitError::NoProviderFound`]. A user without any wallet extension
/// lands there; it is not a defect.
#[tracing::instrument(
    skip(registry, config),
    fields(
        max_wait_ms = config.max_wait.as_millis() as u64,
        poll_ms = config.poll_interval.as_millis() as u64
    )
)]
pub async fn discover<R>(registry: &R, config: &DiscoveryConfig) -> Result<DiscoveredProviders>
where
    R: ProviderRegistry + ?Sized,
{
    config.validate()?;

    let started = Instant::now();
    let deadline = started + config.max_wait;
    let mut polls: u32 = 0;

    loop {
        let ids = registry.provider_ids();
        polls += 1;
        if !ids.is_empty() {
            let elapsed = started.elapsed();
            tracing::debug!(
                polls,
                elapsed_ms = elapsed.as_millis() as u64,
                count = ids.len(),
                "wallet providers detected"
            );
            return Ok(DiscoveredProviders::collect(registry, ids, elapsed));
        }

        let now = Instant::now();
        if now >= deadline {
            let waited_ms = now.duration_since(started).as_millis() as u64;
            tracing::info!(polls, waited_ms, "no wallet provider detected");
            return Err(StakekitError::NoProviderFound { waited_ms });
        }

        let pause = config.poll_interval.min(deadline - now);
        tracing::trace!(polls, pause_ms = pause.as_millis() as u64, "registry empty, waiting");
        tokio::time::sleep(pause).await;
    }
}

/// Like [`discover`], then keep only providers on `allowlist`.
///
/// Fails with [`StakekitError::NoSupportedProvider`] when wallets were found
/// but none of them is allowlisted.
pub async fn discover_supported<R>(
    registry: &R,
    config: &DiscoveryConfig,
    allowlist: &[ProviderId],
) -> Result<Vec<ProviderId>>
where
    R: ProviderRegistry + ?Sized,
{
    let found = discover(registry, config).await?;
    let supported = found.supported(allowlist);
    if supported.is_empty() {
        return Err(StakekitError::NoSupportedProvider {
            found: found.ids().into_iter().collect(),
        });
    }
    Ok(supported)
}
