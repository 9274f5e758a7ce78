//! The coordinator-wide error taxonomy.
//!
//! Validation kinds are raised before any network call; ledger-raised kinds
//! are classified from the revert reason at the gateway (see
//! [`crate::gateway::classify_revert`]). No kind is fatal to the
//! coordinator's own state: a failed operation leaves the cache unchanged
//! and the phase re-derivable on the next refresh.

use ivp_types::{CandidateId, ChainId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ElectionError {
    #[error("no compatible wallet provider is available")]
    NoWalletProvider,

    #[error("the wallet provider rejected the connection request")]
    ProviderRejected,

    #[error("wrong network: expected chain {expected}, connected to {actual}")]
    WrongNetwork { expected: ChainId, actual: ChainId },

    #[error("only the contract owner may perform this action")]
    NotOwner,

    #[error("voting is not open")]
    VotingNotOpen,

    #[error("voting has already opened")]
    VotingAlreadyOpen,

    #[error("voting is still open")]
    VotingStillOpen,

    #[error("this account has already voted")]
    AlreadyVoted,

    #[error("unknown candidate {id}")]
    UnknownCandidate { id: CandidateId },

    #[error("candidate name must not be empty")]
    EmptyName,

    #[error("no candidates are registered")]
    NoCandidates,

    #[error("no votes were cast; no winner is computable")]
    NoVotesCast,

    #[error("invalid voting window: start must precede end")]
    InvalidVotingWindow,

    #[error("the user rejected the transaction in the wallet")]
    TransactionRejectedByUser,

    #[error("transaction reverted: {reason}")]
    TransactionReverted { reason: String },

    #[error("ledger RPC unavailable: {reason}")]
    RpcUnavailable { reason: String },

    /// Internal: the wallet identity changed while the operation was in
    /// flight. Public operations translate this into a silent no-op; it is
    /// never surfaced to the user.
    #[error("operation settled under a stale wallet generation")]
    StaleGeneration,

    #[error("config error: {0}")]
    Config(String),
}

impl ElectionError {
    /// Whether the caller should retry the same operation later.
    ///
    /// Only transport-level unavailability is retryable; a reverted
    /// transaction means the action itself is invalid in the current state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RpcUnavailable { .. })
    }
}
