//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use stakekit_lib::prelude::*;
//! ```
//!
//! ## What's Included
//!
//! - Core types: `ProviderId`, `PoolId`, `CanonicalAddress`, `RawAddress`
//! - Error types: `StakekitError`, `StakekitErrorCode`, `Result`
//! - Provider traits and the injected registry
//! - Discovery, negotiation, sessions and delegation entry points

// Core types
pub use crate::address::{normalize, AddressClass, AddressKind, CanonicalAddress, Network, RawAddress};
pub use crate::{PoolId, ProviderId};

// Error handling
pub use crate::errors::{StakekitError, StakekitErrorCode};
pub use crate::Result;

// Providers
pub use crate::provider::{
    InjectedRegistry, ProviderError, ProviderInfo, ProviderRegistry, WalletApi, WalletProvider,
};

// Connection
pub use crate::discovery::{discover, discover_supported, DiscoveredProviders, DiscoveryConfig};
pub use crate::negotiator::{ConnectionNegotiator, NegotiationState, NegotiatorConfig};
pub use crate::session::{Session, SessionSlot};

// Delegation
pub use crate::backend::{DelegationBackend, HttpDelegationBackend};
pub use crate::delegation::{
    delegate_with_builder, DelegationOptions, DelegationReceipt, DelegationTxBuilder, Delegator,
};

// Configuration
pub use crate::config::StakekitConfig;
