//! Election lifecycle derivation and operation gating.
//!
//! The phase is a pure function of the last-read ledger facts — window,
//! "ended" flag, and the ledger's own clock — plus whether a result has
//! been computed. It is recomputed on every refresh and never stored as
//! client-authoritative. Gates raise validation errors before any network
//! call is made.

use ivp_types::{AccountAddress, ElectionPhase, ElectionSnapshot, VotingWindow};

use crate::error::ElectionError;

/// Derive the election phase from a ledger snapshot.
///
/// `has_result` marks whether a winner has been successfully computed at
/// least once this generation; it lifts a Closed election to Resolved.
pub fn derive_phase(snapshot: &ElectionSnapshot, has_result: bool) -> ElectionPhase {
    let window = match snapshot.window {
        Some(w) => w,
        None => return ElectionPhase::Unconfigured,
    };

    if snapshot.ended || snapshot.ledger_time >= window.end {
        if has_result {
            ElectionPhase::Resolved
        } else {
            ElectionPhase::Closed
        }
    } else if snapshot.ledger_time < window.start {
        ElectionPhase::Scheduled
    } else {
        ElectionPhase::Open
    }
}

/// What `end_voting` should do given the current snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndVotingAction {
    /// The ledger flag is already set; succeed without a transaction.
    Noop,
    /// Submit the transaction (voting is open, or the window lapsed but the
    /// flag was never recorded).
    Submit,
}

/// Gate for `start_voting`: owner only, before voting has ever opened, and
/// only with a well-ordered window.
pub fn gate_start_voting(
    caller: &AccountAddress,
    snapshot: &ElectionSnapshot,
    phase: ElectionPhase,
    window: VotingWindow,
) -> Result<(), ElectionError> {
    ensure_owner(caller, snapshot)?;
    if !phase.accepts_candidates() {
        return Err(ElectionError::VotingAlreadyOpen);
    }
    if !window.is_valid() {
        return Err(ElectionError::InvalidVotingWindow);
    }
    Ok(())
}

/// Gate for `end_voting`: owner only; a no-op once the ledger flag is set;
/// `VotingNotOpen` while the window has not opened.
pub fn gate_end_voting(
    caller: &AccountAddress,
    snapshot: &ElectionSnapshot,
) -> Result<EndVotingAction, ElectionError> {
    ensure_owner(caller, snapshot)?;

    if snapshot.ended {
        return Ok(EndVotingAction::Noop);
    }
    let window = snapshot.window.ok_or(ElectionError::VotingNotOpen)?;
    if snapshot.ledger_time < window.start {
        return Err(ElectionError::VotingNotOpen);
    }
    Ok(EndVotingAction::Submit)
}

/// Gate for `add_candidate`: owner only, pre-open only, non-blank name.
pub fn gate_add_candidate(
    caller: &AccountAddress,
    snapshot: &ElectionSnapshot,
    phase: ElectionPhase,
    name: &str,
) -> Result<(), ElectionError> {
    ensure_owner(caller, snapshot)?;
    if name.trim().is_empty() {
        return Err(ElectionError::EmptyName);
    }
    if !phase.accepts_candidates() {
        return Err(ElectionError::VotingAlreadyOpen);
    }
    Ok(())
}

/// Gate for `cast_vote`: only while the phase is Open.
pub fn gate_cast_vote(phase: ElectionPhase) -> Result<(), ElectionError> {
    if !phase.voting_open() {
        return Err(ElectionError::VotingNotOpen);
    }
    Ok(())
}

/// Gate for `resolve`: only once the election is Closed or Resolved.
pub fn gate_resolve(phase: ElectionPhase) -> Result<(), ElectionError> {
    if !phase.resolvable() {
        return Err(ElectionError::VotingStillOpen);
    }
    Ok(())
}

fn ensure_owner(
    caller: &AccountAddress,
    snapshot: &ElectionSnapshot,
) -> Result<(), ElectionError> {
    if *caller != snapshot.owner {
        return Err(ElectionError::NotOwner);
    }
    Ok(())
}
