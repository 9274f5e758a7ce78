//! Locally cached, ledger-backed view of candidates and this session's vote.
//!
//! The cache is only ever replaced whole, never edited in place, so readers
//! can never observe a torn roster. The vote record is an optimistic local
//! guard; the ledger remains the single source of truth for "has voted".

use ivp_types::{AccountAddress, Candidate, CandidateId, VoteRecord};

use crate::error::ElectionError;
use crate::gateway::LedgerGateway;

/// Candidate roster and per-session vote record.
#[derive(Debug, Default)]
pub struct CandidateRegistry {
    candidates: Vec<Candidate>,
    vote_record: Option<VoteRecord>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached roster, in id order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    /// Fail with `UnknownCandidate` unless `id` is in the cached roster.
    pub fn require_known(&self, id: CandidateId) -> Result<&Candidate, ElectionError> {
        self.get(id).ok_or(ElectionError::UnknownCandidate { id })
    }

    /// Sum of all cached tallies.
    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|c| c.vote_count).sum()
    }

    /// Atomically replace the roster.
    pub fn replace(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
    }

    /// Drop everything tied to the previous wallet identity.
    pub fn clear(&mut self) {
        self.candidates = Vec::new();
        self.vote_record = None;
    }

    pub fn vote_record(&self) -> Option<&VoteRecord> {
        self.vote_record.as_ref()
    }

    /// Local fast path: fail with `AlreadyVoted` when this session has
    /// already recorded a vote for `voter`, without any network call.
    pub fn check_not_voted(&self, voter: &AccountAddress) -> Result<(), ElectionError> {
        match &self.vote_record {
            Some(record) if record.voter == *voter && record.has_voted => {
                Err(ElectionError::AlreadyVoted)
            }
            _ => Ok(()),
        }
    }

    /// Record a vote confirmed by the ledger this session.
    pub fn record_vote(&mut self, voter: AccountAddress, candidate: CandidateId) {
        self.vote_record = Some(VoteRecord {
            voter,
            has_voted: true,
            candidate: Some(candidate),
        });
    }

    /// Record that the ledger reports `voter` as having voted, without
    /// knowing which candidate (the vote predates this session).
    pub fn record_ledger_vote(&mut self, voter: AccountAddress) {
        self.vote_record = Some(VoteRecord {
            voter,
            has_voted: true,
            candidate: None,
        });
    }

    /// Read the full roster from the ledger: the count, then candidates
    /// `1..=count` in order.
    ///
    /// The returned list is dense by construction (one entry per id). A
    /// ledger response whose id disagrees with its position is logged and
    /// kept — the ledger stays authoritative even when it is surprising.
    pub async fn fetch_all<G: LedgerGateway>(
        gateway: &G,
    ) -> Result<Vec<Candidate>, ElectionError> {
        let count = gateway.candidates_count().await?;
        let mut candidates = Vec::with_capacity(count as usize);
        for id in 1..=count {
            let candidate = gateway.candidate(CandidateId::new(id)).await?;
            if candidate.id.get() != id {
                tracing::warn!(
                    requested = id,
                    reported = candidate.id.get(),
                    "ledger reported a candidate id that disagrees with its slot"
                );
            }
            candidates.push(candidate);
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> AccountAddress {
        AccountAddress::parse(format!("0x{}", hex::encode([byte; 20]))).unwrap()
    }

    fn candidate(id: u32, votes: u64) -> Candidate {
        Candidate {
            id: CandidateId::new(id),
            name: format!("candidate-{id}"),
            vote_count: votes,
        }
    }

    #[test]
    fn empty_registry_knows_nothing() {
        let registry = CandidateRegistry::new();
        assert!(registry.candidates().is_empty());
        assert_eq!(registry.total_votes(), 0);
        assert_eq!(
            registry.require_known(CandidateId::new(1)).unwrap_err(),
            ElectionError::UnknownCandidate {
                id: CandidateId::new(1)
            }
        );
    }

    #[test]
    fn replace_swaps_the_whole_roster() {
        let mut registry = CandidateRegistry::new();
        registry.replace(vec![candidate(1, 3), candidate(2, 7)]);
        assert_eq!(registry.candidates().len(), 2);
        assert_eq!(registry.total_votes(), 10);

        registry.replace(vec![candidate(1, 4)]);
        assert_eq!(registry.candidates().len(), 1);
        assert_eq!(registry.total_votes(), 4);
    }

    #[test]
    fn fast_path_rejects_second_vote_same_session() {
        let mut registry = CandidateRegistry::new();
        let voter = addr(0xaa);
        assert!(registry.check_not_voted(&voter).is_ok());

        registry.record_vote(voter.clone(), CandidateId::new(2));
        assert_eq!(
            registry.check_not_voted(&voter).unwrap_err(),
            ElectionError::AlreadyVoted
        );
        let record = registry.vote_record().unwrap();
        assert_eq!(record.candidate, Some(CandidateId::new(2)));
    }

    #[test]
    fn fast_path_does_not_block_a_different_voter() {
        let mut registry = CandidateRegistry::new();
        registry.record_vote(addr(0xaa), CandidateId::new(1));
        assert!(registry.check_not_voted(&addr(0xbb)).is_ok());
    }

    #[test]
    fn ledger_discovered_vote_has_unknown_candidate() {
        let mut registry = CandidateRegistry::new();
        let voter = addr(0xaa);
        registry.record_ledger_vote(voter.clone());

        assert_eq!(
            registry.check_not_voted(&voter).unwrap_err(),
            ElectionError::AlreadyVoted
        );
        assert_eq!(registry.vote_record().unwrap().candidate, None);
    }

    #[test]
    fn clear_forgets_roster_and_vote() {
        let mut registry = CandidateRegistry::new();
        registry.replace(vec![candidate(1, 3)]);
        registry.record_vote(addr(0xaa), CandidateId::new(1));

        registry.clear();
        assert!(registry.candidates().is_empty());
        assert!(registry.vote_record().is_none());
        assert!(registry.check_not_voted(&addr(0xaa)).is_ok());
    }
}
