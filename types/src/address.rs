//! Account address type with `0x` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when parsing an [`AccountAddress`] from a string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with 0x: {0}")]
    MissingPrefix(String),

    #[error("address body must be 40 hex digits, got {0} characters")]
    BadLength(usize),

    #[error("address contains non-hex characters: {0}")]
    NotHex(String),
}

/// An EVM-style account address: `0x` followed by 40 hex digits.
///
/// Normalised to lowercase on construction so owner and voter comparisons
/// are case-insensitive regardless of how the provider checksums them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountAddress(String);

impl AccountAddress {
    /// The standard prefix for all account addresses.
    pub const PREFIX: &'static str = "0x";

    /// Length of the hex body (20 bytes, hex-encoded).
    pub const BODY_LEN: usize = 40;

    /// Parse and normalise an address string.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, AddressError> {
        let raw = raw.as_ref();
        let body = raw
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| AddressError::MissingPrefix(raw.to_string()))?;

        if body.len() != Self::BODY_LEN {
            return Err(AddressError::BadLength(body.len()));
        }

        hex::decode(body).map_err(|_| AddressError::NotHex(raw.to_string()))?;

        Ok(Self(format!("{}{}", Self::PREFIX, body.to_lowercase())))
    }

    /// Return the normalised address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
