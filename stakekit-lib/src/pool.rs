//! Stake pool identifiers.

use std::fmt;
use std::str::FromStr;

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};

use crate::address::CREDENTIAL_LEN;
use crate::{Result, StakekitError};

const HRP_POOL: Hrp = Hrp::parse_unchecked("pool");

/// Pool operator key hash, displayed as `pool1…`.
///
/// # Example
///
/// ```
/// use stakekit_lib::PoolId;
///
/// let pool: PoolId = "pool1w2duw0lk7lxjpfqjguxvtp0znhaqf8l2yvzcfd72l8fuk0h77gy".parse().unwrap();
/// assert_eq!(pool.to_hex(), "729bc73ff6f7cd20a412470cc585e29dfa049fea230584b7caf9d3cb");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PoolId([u8; CREDENTIAL_LEN]);

impl PoolId {
    /// Build from the raw 28-byte key hash.
    pub fn from_hash(hash: [u8; CREDENTIAL_LEN]) -> Self {
        Self(hash)
    }

    /// Parse bech32 (`pool1…`) or 56-character hex.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let bytes = if text.len() == CREDENTIAL_LEN * 2
            && text.bytes().all(|b| b.is_ascii_hexdigit())
        {
            hex::decode(text).map_err(|e| StakekitError::InvalidPoolId(e.to_string()))?
        } else {
            let checked = CheckedHrpstring::new::<Bech32>(text)
                .map_err(|e| StakekitError::InvalidPoolId(e.to_string()))?;
            if checked.hrp() != HRP_POOL {
                return Err(StakekitError::InvalidPoolId(format!(
                    "expected 'pool' prefix, got '{}'",
                    checked.hrp()
                )));
            }
            checked.byte_iter().collect()
        };

        let hash: [u8; CREDENTIAL_LEN] = bytes.as_slice().try_into().map_err(|_| {
            StakekitError::InvalidPoolId(format!(
                "expected {} bytes, got {}",
                CREDENTIAL_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(hash))
    }

    /// Raw key hash.
    pub fn as_bytes(&self) -> &[u8; CREDENTIAL_LEN] {
        &self.0
    }

    /// Hex form of the key hash.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Bech32 form.
    pub fn to_bech32(&self) -> String {
        // 28 bytes under a 4-character prefix is far below the code length limit.
        bech32::encode::<Bech32>(HRP_POOL, &self.0).unwrap_or_else(|_| self.to_hex())
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId({})", self.to_bech32())
    }
}

impl FromStr for PoolId {
    type Err = StakekitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PoolId {
    type Error = StakekitError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<PoolId> for String {
    fn from(pool: PoolId) -> Self {
        pool.to_bech32()
    }
}
