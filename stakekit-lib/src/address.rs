//! Cardano address normalization.
//!
//! Wallets hand out used addresses either as hex text or as raw bytes (CIP-30
//! leaves the choice to the implementation). Everything that leaves this module
//! is a [`CanonicalAddress`]: the bech32 form with the prefix derived from the
//! address header (`addr`, `addr_test`, `stake`, `stake_test`).
//!
//! # Header layout
//!
//! | high nibble | kind         | length                         |
//! |-------------|--------------|--------------------------------|
//! | 0-3         | base         | 57 bytes                       |
//! | 4-5         | pointer      | 29 bytes + three naturals      |
//! | 6-7         | enterprise   | 29 bytes                       |
//! | 8           | byron        | CBOR, no bech32 form           |
//! | 14-15       | reward       | 29 bytes                       |
//!
//! The low nibble is the network id (`1` mainnet, `0` test networks).

use std::fmt;
use std::str::FromStr;

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};

use crate::{Result, StakekitError};

const HRP_ADDR: Hrp = Hrp::parse_unchecked("addr");
const HRP_ADDR_TEST: Hrp = Hrp::parse_unchecked("addr_test");
const HRP_STAKE: Hrp = Hrp::parse_unchecked("stake");
const HRP_STAKE_TEST: Hrp = Hrp::parse_unchecked("stake_test");

/// Size of a payment or stake credential hash.
pub const CREDENTIAL_LEN: usize = 28;

/// Length of a base address (header + two credentials).
pub const BASE_ADDRESS_LEN: usize = 1 + 2 * CREDENTIAL_LEN;

/// Length of enterprise and reward addresses (header + one credential).
pub const SINGLE_CREDENTIAL_LEN: usize = 1 + CREDENTIAL_LEN;

/// Largest encoding of a pointer component (a `u64` in 7-bit groups).
const MAX_NATURAL_LEN: usize = 10;

/// Cardano network an address belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Cardano mainnet (network id 1).
    #[default]
    Mainnet,
    /// Any test network: preprod, preview (network id 0).
    Testnet,
}

impl Network {
    /// Network id as carried in the low nibble of the address header.
    pub fn id(&self) -> u8 {
        match self {
            Self::Mainnet => 1,
            Self::Testnet => 0,
        }
    }

    /// Map a header network id to a network.
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            1 => Ok(Self::Mainnet),
            0 => Ok(Self::Testnet),
            other => Err(StakekitError::malformed(format!(
                "unknown network id {}",
                other
            ))),
        }
    }

    /// Bech32 prefix for payment addresses on this network.
    pub fn payment_hrp(&self) -> Hrp {
        match self {
            Self::Mainnet => HRP_ADDR,
            Self::Testnet => HRP_ADDR_TEST,
        }
    }

    /// Bech32 prefix for reward (stake) addresses on this network.
    pub fn stake_hrp(&self) -> Hrp {
        match self {
            Self::Mainnet => HRP_STAKE,
            Self::Testnet => HRP_STAKE_TEST,
        }
    }

    /// Lowercase network name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = StakekitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" | "preprod" | "preview" => Ok(Self::Testnet),
            other => Err(StakekitError::invalid_config(
                "network",
                format!("unknown network '{}'", other),
            )),
        }
    }
}

/// Address kind named by the header's high nibble.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    /// Payment credential plus stake credential.
    Base,
    /// Payment credential plus a chain pointer to a stake registration.
    Pointer,
    /// Payment credential only.
    Enterprise,
    /// Stake credential only.
    Reward,
    /// Legacy bootstrap-era address.
    Byron,
}

impl AddressKind {
    /// Classify an address by its header byte.
    pub fn from_header(header: u8) -> Result<Self> {
        match header >> 4 {
            0..=3 => Ok(Self::Base),
            4 | 5 => Ok(Self::Pointer),
            6 | 7 => Ok(Self::Enterprise),
            8 => Ok(Self::Byron),
            14 | 15 => Ok(Self::Reward),
            other => Err(StakekitError::malformed(format!(
                "reserved address type {}",
                other
            ))),
        }
    }

    /// Exact byte length for fixed-size kinds.
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            Self::Base => Some(BASE_ADDRESS_LEN),
            Self::Enterprise | Self::Reward => Some(SINGLE_CREDENTIAL_LEN),
            Self::Pointer | Self::Byron => None,
        }
    }

    /// True for kinds that can receive payments.
    pub fn is_payment(&self) -> bool {
        matches!(self, Self::Base | Self::Pointer | Self::Enterprise)
    }

    /// Lowercase kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Pointer => "pointer",
            Self::Enterprise => "enterprise",
            Self::Reward => "reward",
            Self::Byron => "byron",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address exactly as a wallet returned it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawAddress {
    /// Text form: hex (CIP-30) or an already-encoded bech32 string.
    Text(String),
    /// Byte form: either the binary address or ASCII hex.
    Bytes(Vec<u8>),
}

impl From<&str> for RawAddress {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawAddress {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for RawAddress {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for RawAddress {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Binary Shelley-era address whose header and length have been validated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AddressBytes {
    bytes: Vec<u8>,
    kind: AddressKind,
    network: Network,
}

impl AddressBytes {
    /// Validate a binary address.
    ///
    /// Byron addresses have no bech32 representation and are reported as
    /// [`StakekitError::UnsupportedAddressClass`].
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let header = *bytes
            .first()
            .ok_or_else(|| StakekitError::malformed("empty address"))?;
        let kind = AddressKind::from_header(header)?;
        if kind == AddressKind::Byron {
            return Err(StakekitError::UnsupportedAddressClass {
                found: "byron".to_string(),
                expected: "shelley-era address".to_string(),
            });
        }
        let network = Network::from_id(header & 0x0f)?;

        match kind.fixed_len() {
            Some(expected) if bytes.len() != expected => {
                return Err(StakekitError::malformed(format!(
                    "{} address must be {} bytes, got {}",
                    kind,
                    expected,
                    bytes.len()
                )));
            }
            Some(_) => {}
            None => validate_pointer(&bytes)?,
        }

        Ok(Self {
            bytes,
            kind,
            network,
        })
    }

    /// Decode hex text and validate the result.
    pub fn from_hex(text: &str) -> Result<Self> {
        if text.len() % 2 != 0 {
            return Err(StakekitError::malformed(format!(
                "hex address has odd length {}",
                text.len()
            )));
        }
        let bytes = hex::decode(text)
            .map_err(|e| StakekitError::malformed(format!("invalid hex: {}", e)))?;
        Self::from_bytes(bytes)
    }

    /// Raw address bytes, header first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Address kind from the header.
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// Network from the header.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Bech32 prefix this address is displayed with.
    pub fn hrp(&self) -> Hrp {
        if self.kind == AddressKind::Reward {
            self.network.stake_hrp()
        } else {
            self.network.payment_hrp()
        }
    }

    /// Encode to the canonical bech32 display string.
    pub fn encode(&self) -> Result<CanonicalAddress> {
        let text = bech32::encode::<Bech32>(self.hrp(), &self.bytes)
            .map_err(|e| StakekitError::malformed(format!("bech32 encoding failed: {}", e)))?;
        Ok(CanonicalAddress {
            text,
            kind: self.kind,
            network: self.network,
        })
    }
}

/// Pointer addresses carry three variable-length naturals after the payment
/// credential (slot, transaction index, certificate index). They must use the
/// remaining bytes exactly.
fn validate_pointer(bytes: &[u8]) -> Result<()> {
    let mut rest = bytes
        .get(SINGLE_CREDENTIAL_LEN..)
        .ok_or_else(|| StakekitError::malformed("pointer address too short"))?;
    for component in ["slot", "transaction index", "certificate index"] {
        let used = natural_len(rest).ok_or_else(|| {
            StakekitError::malformed(format!("pointer {} is truncated or too large", component))
        })?;
        rest = &rest[used..];
    }
    if !rest.is_empty() {
        return Err(StakekitError::malformed(format!(
            "pointer address has {} trailing bytes",
            rest.len()
        )));
    }
    Ok(())
}

/// Number of bytes used by the natural at the start of `bytes`.
fn natural_len(bytes: &[u8]) -> Option<usize> {
    let last = bytes
        .iter()
        .take(MAX_NATURAL_LEN)
        .position(|b| b & 0x80 == 0)?;
    // Nine groups hold 63 bits; the tenth may only carry the top bit.
    if last == MAX_NATURAL_LEN - 1 && bytes[last] > 1 {
        return None;
    }
    Some(last + 1)
}

/// Normalized, human-displayable bech32 address.
///
/// Constructed only through [`normalize`], [`CanonicalAddress::parse`] or
/// [`AddressBytes::encode`], so the text is always lowercase, checksummed and
/// prefixed according to its header.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalAddress {
    text: String,
    kind: AddressKind,
    network: Network,
}

impl CanonicalAddress {
    /// Parse a bech32 address, re-checking header, length and prefix.
    pub fn parse(text: &str) -> Result<Self> {
        let checked = CheckedHrpstring::new::<Bech32>(text)
            .map_err(|e| StakekitError::malformed(format!("invalid bech32: {}", e)))?;
        let hrp = checked.hrp();
        let bytes = AddressBytes::from_bytes(checked.byte_iter().collect())?;
        if hrp != bytes.hrp() {
            return Err(StakekitError::malformed(format!(
                "prefix '{}' does not match {} {} header",
                hrp,
                bytes.network(),
                bytes.kind()
            )));
        }
        bytes.encode()
    }

    /// The bech32 text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Address kind.
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// Address network.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Human-readable prefix (text before the last `1` separator).
    pub fn prefix(&self) -> &str {
        self.text
            .rsplit_once('1')
            .map(|(hrp, _)| hrp)
            .unwrap_or(&self.text)
    }

    /// Decode back to the binary address.
    pub fn to_bytes(&self) -> Result<AddressBytes> {
        let checked = CheckedHrpstring::new::<Bech32>(&self.text)
            .map_err(|e| StakekitError::malformed(format!("invalid bech32: {}", e)))?;
        AddressBytes::from_bytes(checked.byte_iter().collect())
    }

    /// Abbreviated form for status lines: the first 15 characters and `...`.
    pub fn short(&self) -> String {
        let head: String = self.text.chars().take(15).collect();
        format!("{}...", head)
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for CanonicalAddress {
    type Err = StakekitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CanonicalAddress {
    type Error = StakekitError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<CanonicalAddress> for String {
    fn from(addr: CanonicalAddress) -> Self {
        addr.text
    }
}

impl AsRef<str> for CanonicalAddress {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

fn is_hex_alphabet(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().all(u8::is_ascii_hexdigit)
}

/// Normalize a wallet-supplied address to its canonical bech32 form.
///
/// Accepted inputs:
/// - hex text (even length, hex alphabet),
/// - bech32 text (re-validated, so normalizing a canonical address returns it
///   unchanged),
/// - byte buffers holding ASCII hex (even length, hex alphabet),
/// - byte buffers holding the binary address.
///
/// Anything else, including hex of odd length or a binary address whose length
/// does not match its header, fails with [`StakekitError::MalformedAddress`].
///
/// # Example
///
/// ```
/// use stakekit_lib::address::{normalize, RawAddress};
///
/// let raw = RawAddress::from("619493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e");
/// let addr = normalize(&raw).unwrap();
/// assert_eq!(addr.as_str(), "addr1vx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzers66hrl8");
/// ```
pub fn normalize(raw: &RawAddress) -> Result<CanonicalAddress> {
    match raw {
        RawAddress::Text(text) => {
            if is_hex_alphabet(text.as_bytes()) {
                AddressBytes::from_hex(text)?.encode()
            } else if text.contains('1') {
                CanonicalAddress::parse(text)
            } else {
                Err(StakekitError::malformed(
                    "address text is neither hex nor bech32",
                ))
            }
        }
        RawAddress::Bytes(bytes) => {
            // Every fixed-size binary address has an odd length, so an
            // even-length hex buffer cannot be mistaken for one.
            if bytes.len() % 2 == 0 && is_hex_alphabet(bytes) {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| StakekitError::malformed(e.to_string()))?;
                AddressBytes::from_hex(text)?.encode()
            } else {
                AddressBytes::from_bytes(bytes.clone())?.encode()
            }
        }
    }
}

/// Which addresses a connection may surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum AddressClass {
    /// Shelley-era payment address (`addr1…` / `addr_test1…`) on `network`.
    ShelleyPayment {
        /// Required network
        network: Network,
    },
    /// Any address that normalizes.
    Any,
}

impl Default for AddressClass {
    fn default() -> Self {
        Self::ShelleyPayment {
            network: Network::Mainnet,
        }
    }
}

impl AddressClass {
    /// Required bech32 prefix including the separator, if any.
    pub fn expected_prefix(&self) -> Option<String> {
        match self {
            Self::ShelleyPayment { network } => Some(format!("{}1", network.payment_hrp())),
            Self::Any => None,
        }
    }

    /// Check a canonical address against this class.
    pub fn check(&self, address: &CanonicalAddress) -> Result<()> {
        match self.expected_prefix() {
            Some(prefix) if !address.as_str().starts_with(&prefix) => {
                Err(StakekitError::UnsupportedAddressClass {
                    found: address.to_string(),
                    expected: format!("{}…", prefix),
                })
            }
            _ => Ok(()),
        }
    }
}
