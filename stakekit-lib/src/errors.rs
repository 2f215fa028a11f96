//! Error types for Stakekit operations.
//!
//! Every failure of discovery, negotiation or delegation is surfaced to the
//! immediate caller as a [`StakekitError`]. Nothing is swallowed or reduced
//! to an empty value, so callers can always tell *why* an attempt failed.

use std::fmt;

use crate::ProviderId;

/// Error codes for host bridges (wasm, FFI).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum StakekitErrorCode {
    /// Feature not compiled in
    Unimplemented = 1000,
    /// No wallet provider appeared within the discovery budget
    NoProviderFound = 2000,
    /// Providers were found but none is on the allowlist
    NoSupportedProvider = 2001,
    /// Requested provider is not registered
    ProviderNotFound = 2002,
    /// User or wallet refused authorization
    AuthorizationDenied = 3000,
    /// Wallet did not answer the authorization request in time
    AuthorizationTimeout = 3001,
    /// Another negotiation is already running
    NegotiationInProgress = 3002,
    /// Wallet reported no used addresses
    NoAddressAvailable = 4000,
    /// Address bytes or text could not be decoded
    MalformedAddress = 4001,
    /// Address decoded but is not of the expected class
    UnsupportedAddressClass = 4002,
    /// Pool identifier could not be parsed
    InvalidPoolId = 4003,
    /// Wallet call other than authorization failed
    WalletOperation = 5000,
    /// Transport/network layer error
    Transport = 6000,
    /// Backend answered with an error
    Backend = 6001,
    /// Serialization error
    Serialization = 6002,
    /// Configuration rejected
    InvalidConfig = 7000,
}

/// Comprehensive error type for Stakekit operations.
#[derive(Debug)]
pub enum StakekitError {
    /// Feature not compiled in.
    Unimplemented(&'static str),

    /// The registry stayed empty for the whole discovery budget.
    NoProviderFound {
        /// How long discovery waited, in milliseconds
        waited_ms: u64,
    },

    /// Providers were injected, but none of them is supported.
    NoSupportedProvider {
        /// Identifiers that were present in the registry
        found: Vec<ProviderId>,
    },

    /// The requested provider is not present in the registry.
    ProviderNotFound(ProviderId),

    /// The user rejected the connection or the wallet raised an error.
    AuthorizationDenied {
        /// Provider that was asked
        provider: ProviderId,
        /// Reason reported by the wallet
        reason: String,
    },

    /// No authorization answer arrived within the configured bound.
    AuthorizationTimeout {
        /// Provider that was asked
        provider: ProviderId,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// A `connect` call is already in flight.
    NegotiationInProgress,

    /// The wallet has no used addresses (or returned none).
    NoAddressAvailable {
        /// Provider that was asked
        provider: ProviderId,
    },

    /// Address input had the wrong length or failed to decode.
    MalformedAddress(String),

    /// Address decoded correctly but is not of the expected class.
    UnsupportedAddressClass {
        /// What was found (canonical text when available)
        found: String,
        /// What the policy expected
        expected: String,
    },

    /// Pool identifier could not be parsed.
    InvalidPoolId(String),

    /// A wallet call after authorization failed.
    WalletOperation {
        /// Wallet operation name
        operation: &'static str,
        /// Underlying error message
        reason: String,
    },

    /// Transport/network layer error.
    Transport(String),

    /// Backend answered with a non-success status.
    Backend {
        /// HTTP status code
        status: u16,
        /// Error message reported by the backend
        message: String,
    },

    /// Serialization/deserialization error.
    Serialization(String),

    /// Configuration value rejected.
    InvalidConfig {
        /// Offending field
        field: String,
        /// Reason for rejection
        reason: String,
    },
}

impl StakekitError {
    /// Get the error code for host bridges.
    pub fn code(&self) -> StakekitErrorCode {
        match self {
            Self::Unimplemented(_) => StakekitErrorCode::Unimplemented,
            Self::NoProviderFound { .. } => StakekitErrorCode::NoProviderFound,
            Self::NoSupportedProvider { .. } => StakekitErrorCode::NoSupportedProvider,
            Self::ProviderNotFound(_) => StakekitErrorCode::ProviderNotFound,
            Self::AuthorizationDenied { .. } => StakekitErrorCode::AuthorizationDenied,
            Self::AuthorizationTimeout { .. } => StakekitErrorCode::AuthorizationTimeout,
            Self::NegotiationInProgress => StakekitErrorCode::NegotiationInProgress,
            Self::NoAddressAvailable { .. } => StakekitErrorCode::NoAddressAvailable,
            Self::MalformedAddress(_) => StakekitErrorCode::MalformedAddress,
            Self::UnsupportedAddressClass { .. } => StakekitErrorCode::UnsupportedAddressClass,
            Self::InvalidPoolId(_) => StakekitErrorCode::InvalidPoolId,
            Self::WalletOperation { .. } => StakekitErrorCode::WalletOperation,
            Self::Transport(_) => StakekitErrorCode::Transport,
            Self::Backend { .. } => StakekitErrorCode::Backend,
            Self::Serialization(_) => StakekitErrorCode::Serialization,
            Self::InvalidConfig { .. } => StakekitErrorCode::InvalidConfig,
        }
    }

    /// Get the error message as an owned String (useful for host bridges).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true if repeating the same call unchanged may succeed.
    ///
    /// Every error is recoverable from the caller's point of view (pick another
    /// wallet, install one, fix the input); this only flags the ones where a
    /// plain retry is meaningful.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NoProviderFound { .. }
                | Self::AuthorizationTimeout { .. }
                | Self::NegotiationInProgress
                | Self::Transport(_)
        ) || matches!(self, Self::Backend { status, .. } if *status >= 500)
    }

    /// Returns a suggested retry delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::NegotiationInProgress => Some(500),
            Self::Transport(_) => Some(1000),
            Self::Backend { status, .. } if *status >= 500 => Some(2000),
            _ => None,
        }
    }

    /// Create a malformed-address error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedAddress(reason.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a transport error from any error type.
    pub fn transport<E: std::error::Error>(err: E) -> Self {
        Self::Transport(err.to_string())
    }
}

impl fmt::Display for StakekitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unimplemented(what) => write!(f, "unimplemented: {}", what),
            Self::NoProviderFound { waited_ms } => {
                write!(f, "no wallet provider found after {}ms", waited_ms)
            }
            Self::NoSupportedProvider { found } => {
                let names: Vec<&str> = found.iter().map(ProviderId::as_str).collect();
                write!(f, "no supported wallet found (present: {})", names.join(", "))
            }
            Self::ProviderNotFound(id) => write!(f, "wallet provider not found: {}", id),
            Self::AuthorizationDenied { provider, reason } => {
                write!(f, "{} refused authorization: {}", provider, reason)
            }
            Self::AuthorizationTimeout {
                provider,
                timeout_ms,
            } => {
                write!(
                    f,
                    "{} did not answer authorization within {}ms",
                    provider, timeout_ms
                )
            }
            Self::NegotiationInProgress => write!(f, "a wallet connection is already in progress"),
            Self::NoAddressAvailable { provider } => {
                write!(f, "{} has no used addresses", provider)
            }
            Self::MalformedAddress(reason) => write!(f, "malformed address: {}", reason),
            Self::UnsupportedAddressClass { found, expected } => {
                write!(f, "unsupported address class: {} (expected {})", found, expected)
            }
            Self::InvalidPoolId(reason) => write!(f, "invalid pool id: {}", reason),
            Self::WalletOperation { operation, reason } => {
                write!(f, "wallet {} failed: {}", operation, reason)
            }
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::Backend { status, message } => {
                write!(f, "backend returned {}: {}", status, message)
            }
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid config {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for StakekitError {}

impl From<serde_json::Error> for StakekitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = StakekitError::NoProviderFound { waited_ms: 3000 };
        assert_eq!(err.code(), StakekitErrorCode::NoProviderFound);
        assert!(err.is_retryable());
        assert_eq!(err.retry_after_ms(), None);

        let err = StakekitError::malformed("odd length");
        assert_eq!(err.code(), StakekitErrorCode::MalformedAddress);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = StakekitError::AuthorizationTimeout {
            provider: ProviderId::new("nami"),
            timeout_ms: 60_000,
        };
        assert!(err.to_string().contains("nami"));
        assert!(err.to_string().contains("60000ms"));

        let err = StakekitError::NoSupportedProvider {
            found: vec![ProviderId::new("flint"), ProviderId::new("gero")],
        };
        assert_eq!(
            err.to_string(),
            "no supported wallet found (present: flint, gero)"
        );
    }

    #[test]
    fn test_backend_retry_policy() {
        let server = StakekitError::Backend {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(server.is_retryable());
        assert_eq!(server.retry_after_ms(), Some(2000));

        let client = StakekitError::Backend {
            status: 400,
            message: "bad pool".into(),
        };
        assert!(!client.is_retryable());
    }

    #[test]
    fn test_code_values_are_stable() {
        assert_eq!(StakekitErrorCode::NegotiationInProgress as i32, 3002);
        assert_eq!(StakekitErrorCode::UnsupportedAddressClass as i32, 4002);
    }
}
