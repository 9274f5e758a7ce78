//! Timestamp type used throughout the coordinator.
//!
//! Timestamps are Unix epoch seconds (UTC). The election phase is derived
//! from the ledger's reported clock, so this type deliberately has no
//! `now()` constructor: the only source of "now" is a ledger read.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward by `secs` (saturating).
    pub fn plus(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Seconds elapsed since this timestamp (relative to `now`, saturating).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_seconds() {
        assert!(Timestamp::new(10) < Timestamp::new(20));
        assert_eq!(Timestamp::new(10), Timestamp::new(10));
    }

    #[test]
    fn plus_saturates() {
        assert_eq!(Timestamp::new(u64::MAX).plus(5), Timestamp::new(u64::MAX));
        assert_eq!(Timestamp::new(100).plus(5), Timestamp::new(105));
    }

    #[test]
    fn elapsed_since_saturates_to_zero() {
        let later = Timestamp::new(200);
        let earlier = Timestamp::new(100);
        assert_eq!(earlier.elapsed_since(later), 100);
        assert_eq!(later.elapsed_since(earlier), 0);
    }
}
