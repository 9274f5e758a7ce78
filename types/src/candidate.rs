//! Candidate identity and tally types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger-assigned candidate id. Positive, 1-based, dense: a roster of
/// `n` candidates carries exactly the ids `1..=n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(u32);

impl CandidateId {
    pub fn new(id: u32) -> Self {
        debug_assert!(id > 0, "candidate ids are 1-based");
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered candidate with its current tally.
///
/// Identity (`id`, `name`) is immutable once created on the ledger;
/// `vote_count` is monotonically non-decreasing while voting is open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub vote_count: u64,
}
