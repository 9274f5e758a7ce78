//! Wallet-identity generation counter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A monotonic counter identifying the current wallet/network identity epoch.
///
/// A session starts at [`Generation::ZERO`] (nothing connected yet); the
/// first successful connect mints generation 1, and every reconnect or
/// account/chain change mints the next. Async work captures the generation
/// it started under; any result that settles under a different generation
/// is discarded, so a slow call from a previously connected account can
/// never overwrite state for a newly connected one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// The epoch before any wallet has connected.
    pub const ZERO: Self = Self(0);

    /// The next generation after this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_connect_mints_generation_one() {
        assert_eq!(Generation::ZERO.next().as_u64(), 1);
    }

    #[test]
    fn next_is_strictly_increasing() {
        let g = Generation::ZERO.next();
        assert!(g.next() > g);
        assert_eq!(g.next().as_u64(), 2);
    }
}
