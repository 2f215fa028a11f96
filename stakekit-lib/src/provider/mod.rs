//! Wallet Provider Capabilities
//!
//! CIP-30 wallets inject a loosely shaped object into the page. Here each
//! wallet is an implementation of two traits:
//!
//! - [`WalletProvider`]: the injected, unauthorized entry point (`enable`).
//! - [`WalletApi`]: the authorized handle (`used_addresses`, `sign_tx`, ...).
//!
//! Providers are looked up through a [`ProviderRegistry`]. Hosts that inject
//! wallets themselves can use [`InjectedRegistry`].

mod registry;
mod traits;

pub use registry::{InjectedRegistry, ProviderRegistry};
pub use traits::{ProviderError, ProviderInfo, WalletApi, WalletProvider};
