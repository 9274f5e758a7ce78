//! Chain identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which chain the wallet provider is connected to.
///
/// The contract is deployed on exactly one chain; the coordinator refuses
/// to operate against any other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    pub const MAINNET: Self = Self(1);
    pub const GOERLI: Self = Self(5);
    pub const SEPOLIA: Self = Self(11_155_111);
    pub const DEV: Self = Self(1337);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Human-readable name for well-known chains.
    pub fn name(&self) -> &'static str {
        match *self {
            Self::MAINNET => "mainnet",
            Self::GOERLI => "goerli",
            Self::SEPOLIA => "sepolia",
            Self::DEV => "dev",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.name())
    }
}
