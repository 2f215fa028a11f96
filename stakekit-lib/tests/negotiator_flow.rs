//! End-to-end connection negotiation against mock wallets.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    MockProvider, StateProbe, BASE_MAINNET, BASE_MAINNET_HEX, ENTERPRISE_TESTNET_HEX,
    REWARD_MAINNET_HEX,
};
use stakekit_lib::address::{AddressClass, AddressKind, Network};
use stakekit_lib::negotiator::{ConnectionNegotiator, NegotiationState, NegotiatorConfig};
use stakekit_lib::provider::{InjectedRegistry, ProviderError};
use stakekit_lib::session::SessionSlot;
use stakekit_lib::{RawAddress, StakekitError, StakekitErrorCode};

fn negotiator(provider: MockProvider) -> ConnectionNegotiator {
    negotiator_with_config(provider, NegotiatorConfig::default())
}

fn negotiator_with_config(provider: MockProvider, config: NegotiatorConfig) -> ConnectionNegotiator {
    let registry = InjectedRegistry::new();
    registry.inject("nami", Arc::new(provider));
    ConnectionNegotiator::new(Arc::new(registry), config)
}

#[tokio::test]
async fn test_hex_address_becomes_canonical_session() {
    let negotiator = negotiator(MockProvider::with_hex(BASE_MAINNET_HEX));

    let session = negotiator.connect(&"nami".into()).await.unwrap();

    assert_eq!(session.provider_id().as_str(), "nami");
    assert_eq!(session.address().as_str(), BASE_MAINNET);
    assert_eq!(session.address().kind(), AddressKind::Base);
    assert_eq!(session.address().short(), "addr1qx2fxv2umy...");
}

#[tokio::test]
async fn test_raw_bytes_address_matches_hex() {
    let bytes = hex::decode(BASE_MAINNET_HEX).unwrap();
    let negotiator = negotiator(MockProvider::with_addresses(Some(vec![RawAddress::from(
        bytes,
    )])));

    let session = negotiator.connect(&"nami".into()).await.unwrap();
    assert_eq!(session.address().as_str(), BASE_MAINNET);
}

#[tokio::test]
async fn test_first_used_address_wins() {
    let negotiator = negotiator(MockProvider::with_addresses(Some(vec![
        RawAddress::from(BASE_MAINNET_HEX),
        RawAddress::from("not even an address"),
    ])));

    let session = negotiator.connect(&"nami".into()).await.unwrap();
    assert_eq!(session.address().as_str(), BASE_MAINNET);
}

#[tokio::test]
async fn test_empty_address_list() {
    let negotiator = negotiator(MockProvider::with_addresses(Some(Vec::new())));

    let err = negotiator.connect(&"nami".into()).await.unwrap_err();
    assert_eq!(err.code(), StakekitErrorCode::NoAddressAvailable);
    assert_eq!(negotiator.state(), NegotiationState::Failed);
}

#[tokio::test]
async fn test_wrong_length_hex_is_malformed() {
    // Base header with a single credential.
    let truncated = &BASE_MAINNET_HEX[..58];
    let negotiator = negotiator(MockProvider::with_hex(truncated));

    let err = negotiator.connect(&"nami".into()).await.unwrap_err();
    assert!(matches!(err, StakekitError::MalformedAddress(_)));
}

#[tokio::test]
async fn test_refusal_is_denied() {
    let negotiator = negotiator(MockProvider::with_hex(BASE_MAINNET_HEX).refusing());

    let err = negotiator.connect(&"nami".into()).await.unwrap_err();
    match err {
        StakekitError::AuthorizationDenied { provider, reason } => {
            assert_eq!(provider.as_str(), "nami");
            assert!(reason.contains("user declined"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_address_listing_failure() {
    let negotiator = negotiator(
        MockProvider::with_hex(BASE_MAINNET_HEX)
            .failing_address_list(ProviderError::AccountChange("switched".into())),
    );

    let err = negotiator.connect(&"nami".into()).await.unwrap_err();
    assert!(matches!(
        err,
        StakekitError::WalletOperation { operation: "getUsedAddresses", .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_prompt_times_out() {
    let config = NegotiatorConfig::default().with_authorization_timeout(Duration::from_secs(5));
    let negotiator = negotiator_with_config(
        MockProvider::with_hex(BASE_MAINNET_HEX).with_enable_delay(Duration::from_secs(3_600)),
        config,
    );

    let err = negotiator.connect(&"nami".into()).await.unwrap_err();
    assert!(matches!(
        err,
        StakekitError::AuthorizationTimeout { timeout_ms: 5_000, .. }
    ));
    assert!(!negotiator.is_negotiating());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_connect_is_rejected() {
    let negotiator = negotiator(
        MockProvider::with_hex(BASE_MAINNET_HEX).with_enable_delay(Duration::from_secs(2)),
    );
    let id = "nami".into();

    let (first, second) = tokio::join!(negotiator.connect(&id), negotiator.connect(&id));

    assert!(first.is_ok());
    assert!(matches!(second, Err(StakekitError::NegotiationInProgress)));
    assert_eq!(negotiator.state(), NegotiationState::Connected);

    // The guard is released once the first call finishes.
    assert!(negotiator.connect(&id).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_connect_releases_guard() {
    let negotiator = negotiator(
        MockProvider::with_hex(BASE_MAINNET_HEX).with_enable_delay(Duration::from_secs(30)),
    );

    let abandoned =
        tokio::time::timeout(Duration::from_secs(1), negotiator.connect(&"nami".into())).await;
    assert!(abandoned.is_err());

    assert!(!negotiator.is_negotiating());
    assert_eq!(negotiator.state(), NegotiationState::Failed);
}

#[tokio::test]
async fn test_stake_address_rejected_for_payment_session() {
    let negotiator = negotiator(MockProvider::with_hex(REWARD_MAINNET_HEX));

    let err = negotiator.connect(&"nami".into()).await.unwrap_err();
    assert!(matches!(err, StakekitError::UnsupportedAddressClass { .. }));
}

#[tokio::test]
async fn test_network_mismatch_rejected() {
    let negotiator = negotiator(MockProvider::with_hex(ENTERPRISE_TESTNET_HEX));

    let err = negotiator.connect(&"nami".into()).await.unwrap_err();
    assert!(matches!(err, StakekitError::UnsupportedAddressClass { .. }));
}

#[tokio::test]
async fn test_testnet_policy_accepts_testnet_wallet() {
    let config = NegotiatorConfig::default().with_address_class(AddressClass::ShelleyPayment {
        network: Network::Testnet,
    });
    let negotiator = negotiator_with_config(MockProvider::with_hex(ENTERPRISE_TESTNET_HEX), config);

    let session = negotiator.connect(&"nami".into()).await.unwrap();
    assert!(session.address().as_str().starts_with("addr_test1"));
}

#[tokio::test]
async fn test_states_seen_by_wallet() {
    let registry = Arc::new(InjectedRegistry::new());
    let negotiator = ConnectionNegotiator::new(registry.clone(), NegotiatorConfig::default());
    let probe = StateProbe::new(negotiator.subscribe());
    registry.inject(
        "nami",
        Arc::new(MockProvider::with_hex(BASE_MAINNET_HEX).observe(probe.clone())),
    );

    negotiator.connect(&"nami".into()).await.unwrap();

    assert_eq!(
        probe.seen(),
        vec![NegotiationState::Authorizing, NegotiationState::AddressFetching]
    );
    assert_eq!(negotiator.state(), NegotiationState::Connected);
}

#[tokio::test]
async fn test_reconnect_replaces_slot_session() {
    let registry = Arc::new(InjectedRegistry::new());
    registry.inject("nami", Arc::new(MockProvider::with_hex(BASE_MAINNET_HEX)));
    registry.inject("lace", Arc::new(MockProvider::with_hex(BASE_MAINNET_HEX)));
    let negotiator = ConnectionNegotiator::new(registry, NegotiatorConfig::default());
    let slot = SessionSlot::new();

    negotiator.connect_into(&"nami".into(), &slot).await.unwrap();
    negotiator.connect_into(&"lace".into(), &slot).await.unwrap();

    assert_eq!(slot.current().unwrap().provider_id().as_str(), "lace");
    slot.disconnect();
    assert!(!slot.is_connected());
}
