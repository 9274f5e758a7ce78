//! Election lifecycle state, ledger snapshots, vote records, and results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::AccountAddress;
use crate::candidate::CandidateId;
use crate::time::Timestamp;

/// The election's lifecycle phase.
///
/// Derived from ledger-reported facts on every refresh, never stored as
/// client-authoritative. Transitions only move forward, except a reset to
/// `Unconfigured` when the wallet identity generation advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionPhase {
    /// No voting window has ever been set.
    Unconfigured,
    /// A window is set and has not opened yet.
    Scheduled,
    /// The window is open and the ledger has not flagged the vote ended.
    Open,
    /// The ledger flagged the vote ended, or the window has lapsed.
    Closed,
    /// Closed, and a result has been successfully computed at least once.
    Resolved,
}

impl ElectionPhase {
    /// Whether candidates may still be registered.
    pub fn accepts_candidates(&self) -> bool {
        matches!(self, Self::Unconfigured | Self::Scheduled)
    }

    /// Whether votes may be cast.
    pub fn voting_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether a winner may be computed.
    pub fn resolvable(&self) -> bool {
        matches!(self, Self::Closed | Self::Resolved)
    }
}

impl fmt::Display for ElectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unconfigured => "unconfigured",
            Self::Scheduled => "scheduled",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Resolved => "resolved",
        };
        write!(f, "{s}")
    }
}

/// The scheduled voting window. Invariant: `start < end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl VotingWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }
}

/// The last-read ledger facts the election phase is derived from.
///
/// Authored by ledger reads only; the coordinator replaces the whole value
/// on refresh and never edits fields in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSnapshot {
    /// The contract owner (the only account allowed to administer).
    pub owner: AccountAddress,
    /// The voting window, if one was ever set.
    pub window: Option<VotingWindow>,
    /// The ledger's "voting ended" flag.
    pub ended: bool,
    /// The ledger's authoritative clock at read time.
    pub ledger_time: Timestamp,
}

/// A local, per-session record of this wallet's vote.
///
/// Used only to short-circuit redundant submission attempts; the ledger
/// remains the single source of truth for "has voted".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: AccountAddress,
    pub has_voted: bool,
    /// The candidate voted for, when known locally. A vote discovered via
    /// the ledger's `has_voted` (cast in an earlier session) stays `None`.
    pub candidate: Option<CandidateId>,
}

/// The computed election winner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionResult {
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub vote_count: u64,
}
