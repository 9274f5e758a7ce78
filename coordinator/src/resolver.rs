//! Winner computation over cached tallies, reconciled against the ledger.

use ivp_types::{Candidate, ElectionResult};

use crate::error::ElectionError;

/// Compute the winner from cached tallies.
///
/// Fails with `NoCandidates` on an empty roster and `NoVotesCast` when the
/// tallies sum to zero — the latter is a normal terminal outcome of an
/// election nobody voted in, not a defect. Ties are broken by the lowest
/// candidate id, matching the contract's own scan order.
pub fn compute_winner(candidates: &[Candidate]) -> Result<ElectionResult, ElectionError> {
    if candidates.is_empty() {
        return Err(ElectionError::NoCandidates);
    }

    let total: u64 = candidates.iter().map(|c| c.vote_count).sum();
    if total == 0 {
        return Err(ElectionError::NoVotesCast);
    }

    let mut best = &candidates[0];
    for candidate in &candidates[1..] {
        let wins = candidate.vote_count > best.vote_count
            || (candidate.vote_count == best.vote_count && candidate.id < best.id);
        if wins {
            best = candidate;
        }
    }

    Ok(ElectionResult {
        candidate_id: best.id,
        candidate_name: best.name.clone(),
        vote_count: best.vote_count,
    })
}

/// Reconcile the locally recomputed winner with the ledger's own answer.
///
/// The ledger wins on any disagreement; the discrepancy is surfaced as a
/// warning, never silently overwritten.
pub fn reconcile(local: ElectionResult, ledger: ElectionResult) -> ElectionResult {
    if local != ledger {
        tracing::warn!(
            local_id = local.candidate_id.get(),
            local_votes = local.vote_count,
            ledger_id = ledger.candidate_id.get(),
            ledger_votes = ledger.vote_count,
            "locally recomputed winner disagrees with the ledger; keeping the ledger's answer"
        );
    }
    ledger
}

#[cfg(test)]
mod tests {
    use super::*;
    use ivp_types::CandidateId;

    fn candidate(id: u32, votes: u64) -> Candidate {
        Candidate {
            id: CandidateId::new(id),
            name: format!("candidate-{id}"),
            vote_count: votes,
        }
    }

    #[test]
    fn empty_roster_has_no_winner() {
        assert_eq!(compute_winner(&[]).unwrap_err(), ElectionError::NoCandidates);
    }

    #[test]
    fn zero_votes_is_a_normal_terminal_outcome() {
        let roster = vec![candidate(1, 0), candidate(2, 0)];
        assert_eq!(
            compute_winner(&roster).unwrap_err(),
            ElectionError::NoVotesCast
        );
    }

    #[test]
    fn plain_majority_wins() {
        let roster = vec![candidate(1, 3), candidate(2, 7)];
        let result = compute_winner(&roster).unwrap();
        assert_eq!(result.candidate_id, CandidateId::new(2));
        assert_eq!(result.vote_count, 7);
    }

    #[test]
    fn tie_breaks_to_lowest_id() {
        // Roster order is irrelevant; only votes then id decide.
        let roster = vec![candidate(2, 5), candidate(5, 5), candidate(1, 3)];
        let result = compute_winner(&roster).unwrap();
        assert_eq!(result.candidate_id, CandidateId::new(2));
        assert_eq!(result.vote_count, 5);
    }

    #[test]
    fn reconcile_keeps_agreement() {
        let local = compute_winner(&[candidate(1, 4)]).unwrap();
        let ledger = local.clone();
        assert_eq!(reconcile(local, ledger.clone()), ledger);
    }

    #[test]
    fn reconcile_prefers_the_ledger_on_disagreement() {
        let local = ElectionResult {
            candidate_id: CandidateId::new(1),
            candidate_name: "candidate-1".into(),
            vote_count: 4,
        };
        let ledger = ElectionResult {
            candidate_id: CandidateId::new(2),
            candidate_name: "candidate-2".into(),
            vote_count: 9,
        };
        assert_eq!(reconcile(local, ledger.clone()), ledger);
    }
}
