//! The typed boundary to the external election ledger.
//!
//! [`LedgerGateway`] is the sole path through which the coordinator talks to
//! the contract. Implementations are stateless and hold no cache; every
//! write returns only once the underlying transaction has reached the
//! ledger's confirmation state, and every failure is mapped into the
//! [`ElectionError`] taxonomy — raw provider errors never leak upward.

use ivp_types::{AccountAddress, Candidate, CandidateId, ElectionResult, Timestamp, VotingWindow};

use crate::error::ElectionError;

/// Typed request/response boundary to the election contract.
///
/// The coordinator is generic over this trait; tests drive it with an
/// in-memory mock ledger.
#[allow(async_fn_in_trait)]
pub trait LedgerGateway {
    // ── Reads ───────────────────────────────────────────────────────────

    /// The contract owner.
    async fn owner(&self) -> Result<AccountAddress, ElectionError>;

    /// Number of registered candidates.
    async fn candidates_count(&self) -> Result<u32, ElectionError>;

    /// The candidate with the given 1-based id. `id` must be in
    /// `1..=candidates_count()`.
    async fn candidate(&self, id: CandidateId) -> Result<Candidate, ElectionError>;

    /// The scheduled voting window, if one was ever set.
    async fn voting_window(&self) -> Result<Option<VotingWindow>, ElectionError>;

    /// The ledger's "voting ended" flag.
    async fn voting_ended(&self) -> Result<bool, ElectionError>;

    /// The ledger's authoritative clock.
    async fn current_time(&self) -> Result<Timestamp, ElectionError>;

    /// Whether the given account has already voted.
    async fn has_voted(&self, voter: &AccountAddress) -> Result<bool, ElectionError>;

    /// The contract's own winner computation. Reverts when voting is not
    /// closed or no votes were cast.
    async fn winner(&self) -> Result<ElectionResult, ElectionError>;

    // ── Writes (confirmation-gated) ─────────────────────────────────────

    /// Register a candidate. Owner only, pre-open only.
    async fn add_candidate(&self, name: &str) -> Result<(), ElectionError>;

    /// Set the voting window and open scheduling. Owner only.
    async fn start_voting(&self, window: VotingWindow) -> Result<(), ElectionError>;

    /// Set the "voting ended" flag. Owner only, idempotent on the contract.
    async fn end_voting(&self) -> Result<(), ElectionError>;

    /// Cast this account's single vote for the given candidate.
    async fn vote(&self, id: CandidateId) -> Result<(), ElectionError>;
}

/// Classify a ledger revert reason into the error taxonomy.
///
/// Matching is case-insensitive on the phrases the contract's guards emit.
/// An unrecognised reason is surfaced as [`ElectionError::TransactionReverted`]
/// with the raw reason attached, never masked.
pub fn classify_revert(reason: &str) -> ElectionError {
    let lower = reason.to_lowercase();

    if lower.contains("user rejected") || lower.contains("user denied") {
        return ElectionError::TransactionRejectedByUser;
    }
    if lower.contains("only owner") || lower.contains("not the owner") {
        return ElectionError::NotOwner;
    }
    if lower.contains("already voted") {
        return ElectionError::AlreadyVoted;
    }
    if lower.contains("already started") || lower.contains("already open") {
        return ElectionError::VotingAlreadyOpen;
    }
    if lower.contains("has not ended") || lower.contains("still open") {
        return ElectionError::VotingStillOpen;
    }
    if lower.contains("not open")
        || lower.contains("not started")
        || lower.contains("has ended")
        || lower.contains("voting ended")
    {
        return ElectionError::VotingNotOpen;
    }
    if lower.contains("empty name") || lower.contains("name required") {
        return ElectionError::EmptyName;
    }
    if lower.contains("no candidates") {
        return ElectionError::NoCandidates;
    }
    if lower.contains("no votes") || lower.contains("nowinner") {
        return ElectionError::NoVotesCast;
    }

    ElectionError::TransactionReverted {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_owner_guard() {
        assert_eq!(classify_revert("Only owner can call this"), ElectionError::NotOwner);
        assert_eq!(
            classify_revert("caller is not the owner"),
            ElectionError::NotOwner
        );
    }

    #[test]
    fn classifies_vote_guards() {
        assert_eq!(
            classify_revert("You have already voted"),
            ElectionError::AlreadyVoted
        );
        assert_eq!(
            classify_revert("Voting is not open"),
            ElectionError::VotingNotOpen
        );
        assert_eq!(
            classify_revert("Voting has ended"),
            ElectionError::VotingNotOpen
        );
    }

    #[test]
    fn classifies_lifecycle_guards() {
        assert_eq!(
            classify_revert("Voting has already started"),
            ElectionError::VotingAlreadyOpen
        );
        assert_eq!(
            classify_revert("Voting has not ended yet"),
            ElectionError::VotingStillOpen
        );
    }

    #[test]
    fn classifies_winner_guards() {
        assert_eq!(classify_revert("No candidates"), ElectionError::NoCandidates);
        assert_eq!(classify_revert("NoWinner()"), ElectionError::NoVotesCast);
        assert_eq!(
            classify_revert("No votes were cast"),
            ElectionError::NoVotesCast
        );
    }

    #[test]
    fn classifies_user_rejection() {
        assert_eq!(
            classify_revert("MetaMask Tx Signature: User denied transaction signature."),
            ElectionError::TransactionRejectedByUser
        );
    }

    #[test]
    fn unrecognised_reason_is_preserved_verbatim() {
        let err = classify_revert("panic: arithmetic overflow");
        assert_eq!(
            err,
            ElectionError::TransactionReverted {
                reason: "panic: arithmetic overflow".to_string()
            }
        );
    }
}
