//! The election session coordinator.
//!
//! Mediates between the wallet provider, the ledger gateway, and the local
//! UI session. Every operation follows the same pipeline: absorb provider
//! events → lifecycle gate → business check → gateway call → generation
//! check → atomic cache update. Results that settle after the wallet
//! identity changed are discarded, never applied: a slow call from a
//! previously connected account must not overwrite state for a new one.

use ivp_types::{
    Candidate, CandidateId, ElectionPhase, ElectionResult, ElectionSnapshot, Generation,
    VotingWindow,
};

use crate::config::CoordinatorConfig;
use crate::error::ElectionError;
use crate::gateway::LedgerGateway;
use crate::registry::CandidateRegistry;
use crate::resolver;
use crate::session::{SessionManager, WalletProvider, WalletSession};
use crate::state_machine::{self, EndVotingAction};

/// Coordinates one election session against the ledger.
///
/// All state lives behind `&mut self`; operations are async tasks on one
/// logical thread, so the cache is never mutated concurrently. The only
/// suspension points are the gateway calls.
pub struct ElectionCoordinator<G: LedgerGateway, P: WalletProvider> {
    gateway: G,
    session: SessionManager<P>,
    snapshot: Option<ElectionSnapshot>,
    registry: CandidateRegistry,
    result: Option<ElectionResult>,
}

impl<G: LedgerGateway, P: WalletProvider> ElectionCoordinator<G, P> {
    pub fn new(gateway: G, provider: P, config: &CoordinatorConfig) -> Self {
        Self {
            gateway,
            session: SessionManager::new(provider, config.chain()),
            snapshot: None,
            registry: CandidateRegistry::new(),
            result: None,
        }
    }

    // ── Session ─────────────────────────────────────────────────────────

    /// Connect (or reconnect) the wallet. Mints a new generation and
    /// clears every ledger-derived cache: whatever was cached belongs to
    /// the previous identity.
    pub async fn connect(&mut self) -> Result<WalletSession, ElectionError> {
        self.absorb();
        let session = self.session.connect().await?.clone();
        self.clear_ledger_caches();
        Ok(session)
    }

    pub fn session(&self) -> &WalletSession {
        self.session.session()
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// The current phase, derived from the cached snapshot.
    ///
    /// Always `Unconfigured` while no account is connected, without
    /// contacting the gateway.
    pub fn phase(&self) -> ElectionPhase {
        if self.session.session().account.is_none() {
            return ElectionPhase::Unconfigured;
        }
        match &self.snapshot {
            Some(snapshot) => state_machine::derive_phase(snapshot, self.result.is_some()),
            None => ElectionPhase::Unconfigured,
        }
    }

    /// The cached candidate roster, in id order.
    pub fn candidates(&self) -> &[Candidate] {
        self.registry.candidates()
    }

    /// The cached election result, if one was computed this generation.
    pub fn result(&self) -> Option<&ElectionResult> {
        self.result.as_ref()
    }

    /// The last-read ledger snapshot.
    pub fn snapshot(&self) -> Option<&ElectionSnapshot> {
        self.snapshot.as_ref()
    }

    /// Re-read the election snapshot and candidate roster from the ledger
    /// and replace the caches atomically. Returns the phase derived from
    /// whatever state is current once the refresh settles.
    pub async fn refresh(&mut self) -> Result<ElectionPhase, ElectionError> {
        self.absorb();
        if self.session.session().account.is_none() {
            return Ok(ElectionPhase::Unconfigured);
        }
        self.session.require_expected_chain()?;

        let started = self.session.generation();
        let snapshot = self.read_snapshot().await?;
        let candidates = CandidateRegistry::fetch_all(&self.gateway).await?;

        if !self.settle(started) {
            return Ok(self.phase());
        }
        self.snapshot = Some(snapshot);
        self.registry.replace(candidates);
        Ok(self.phase())
    }

    // ── Administration ──────────────────────────────────────────────────

    /// Register a candidate. Owner only, pre-open only.
    pub async fn add_candidate(&mut self, name: &str) -> Result<(), ElectionError> {
        self.absorb();
        let caller = self.session.require_account()?.clone();
        self.session.require_expected_chain()?;

        let started = self.session.generation();
        let snapshot = self.read_snapshot().await?;
        if !self.settle(started) {
            return Ok(());
        }
        self.snapshot = Some(snapshot.clone());

        let phase = state_machine::derive_phase(&snapshot, self.result.is_some());
        state_machine::gate_add_candidate(&caller, &snapshot, phase, name)?;

        match self.gateway.add_candidate(name.trim()).await {
            Ok(()) => {
                if !self.settle(started) {
                    return Ok(());
                }
                tracing::info!(name = name.trim(), "candidate registered");
                self.refresh_candidates(started).await
            }
            Err(e) => self.settle_error(started, e),
        }
    }

    /// Schedule and open the voting window. Owner only, before voting has
    /// ever opened.
    pub async fn start_voting(&mut self, window: VotingWindow) -> Result<(), ElectionError> {
        self.absorb();
        let caller = self.session.require_account()?.clone();
        self.session.require_expected_chain()?;

        let started = self.session.generation();
        let snapshot = self.read_snapshot().await?;
        if !self.settle(started) {
            return Ok(());
        }
        self.snapshot = Some(snapshot.clone());

        let phase = state_machine::derive_phase(&snapshot, self.result.is_some());
        state_machine::gate_start_voting(&caller, &snapshot, phase, window)?;

        match self.gateway.start_voting(window).await {
            Ok(()) => {
                if !self.settle(started) {
                    return Ok(());
                }
                tracing::info!(start = %window.start, end = %window.end, "voting scheduled");
                self.refresh_snapshot(started).await
            }
            Err(e) => self.settle_error(started, e),
        }
    }

    /// Record the end of voting on the ledger. Owner only; succeeds as a
    /// no-op when the ledger flag is already set.
    pub async fn end_voting(&mut self) -> Result<(), ElectionError> {
        self.absorb();
        let caller = self.session.require_account()?.clone();
        self.session.require_expected_chain()?;

        let started = self.session.generation();
        let snapshot = self.read_snapshot().await?;
        if !self.settle(started) {
            return Ok(());
        }
        self.snapshot = Some(snapshot.clone());

        match state_machine::gate_end_voting(&caller, &snapshot)? {
            EndVotingAction::Noop => Ok(()),
            EndVotingAction::Submit => match self.gateway.end_voting().await {
                Ok(()) => {
                    if !self.settle(started) {
                        return Ok(());
                    }
                    tracing::info!("voting ended");
                    self.refresh_snapshot(started).await
                }
                Err(e) => self.settle_error(started, e),
            },
        }
    }

    // ── Voting ──────────────────────────────────────────────────────────

    /// Cast this account's single vote.
    ///
    /// Two-layer guard: the local vote record rejects a repeat attempt
    /// without any network call, then the ledger's `has_voted` is consulted
    /// before the transaction so a stale local cache never causes a doomed
    /// submission.
    pub async fn cast_vote(&mut self, id: CandidateId) -> Result<(), ElectionError> {
        self.absorb();
        let voter = self.session.require_account()?.clone();
        self.session.require_expected_chain()?;

        state_machine::gate_cast_vote(self.phase())?;
        self.registry.require_known(id)?;
        self.registry.check_not_voted(&voter)?;

        let started = self.session.generation();
        match self.gateway.has_voted(&voter).await {
            Ok(true) => {
                if !self.settle(started) {
                    return Ok(());
                }
                // Vote cast in an earlier session; remember it so the next
                // attempt takes the fast path.
                self.registry.record_ledger_vote(voter);
                return Err(ElectionError::AlreadyVoted);
            }
            Ok(false) => {}
            Err(e) => return self.settle_error(started, e),
        }

        match self.gateway.vote(id).await {
            Ok(()) => {
                if !self.settle(started) {
                    return Ok(());
                }
                tracing::info!(candidate = %id, voter = %voter, "vote confirmed");
                self.registry.record_vote(voter, id);
                self.refresh_candidates(started).await
            }
            Err(e) => self.settle_error(started, e),
        }
    }

    // ── Resolution ──────────────────────────────────────────────────────

    /// Compute and cache the winner once the election is closed.
    ///
    /// The winner is recomputed locally from cached tallies, then checked
    /// against the ledger's own answer; on disagreement the ledger wins
    /// and the discrepancy is logged. Returns `Ok(None)` only when the
    /// wallet identity changed while the query was in flight and the
    /// outcome was discarded.
    pub async fn resolve(&mut self) -> Result<Option<ElectionResult>, ElectionError> {
        self.absorb();
        self.session.require_account()?;
        self.session.require_expected_chain()?;

        state_machine::gate_resolve(self.phase())?;
        let local = resolver::compute_winner(self.registry.candidates())?;

        let started = self.session.generation();
        match self.gateway.winner().await {
            Ok(ledger) => {
                if !self.settle(started) {
                    return Ok(None);
                }
                let result = resolver::reconcile(local, ledger);
                self.result = Some(result.clone());
                tracing::info!(
                    winner = %result.candidate_id,
                    votes = result.vote_count,
                    "election resolved"
                );
                Ok(Some(result))
            }
            // The ledger's refusal also wins over the local computation.
            Err(e) => self.settle_error(started, e).map(|()| None),
        }
    }

    // ── Internals ───────────────────────────────────────────────────────

    async fn read_snapshot(&self) -> Result<ElectionSnapshot, ElectionError> {
        let owner = self.gateway.owner().await?;
        let window = self.gateway.voting_window().await?;
        let ended = self.gateway.voting_ended().await?;
        let ledger_time = self.gateway.current_time().await?;
        Ok(ElectionSnapshot {
            owner,
            window,
            ended,
            ledger_time,
        })
    }

    /// Re-read and apply the candidate roster, generation-guarded.
    async fn refresh_candidates(&mut self, started: Generation) -> Result<(), ElectionError> {
        let candidates = CandidateRegistry::fetch_all(&self.gateway).await?;
        if self.settle(started) {
            self.registry.replace(candidates);
        }
        Ok(())
    }

    /// Re-read and apply the election snapshot, generation-guarded.
    async fn refresh_snapshot(&mut self, started: Generation) -> Result<(), ElectionError> {
        let snapshot = self.read_snapshot().await?;
        if self.settle(started) {
            self.snapshot = Some(snapshot);
        }
        Ok(())
    }

    /// Drain provider events; on an identity change, clear every
    /// ledger-derived cache.
    fn absorb(&mut self) -> bool {
        if self.session.absorb_events() {
            tracing::debug!("wallet identity changed; clearing ledger-derived caches");
            self.clear_ledger_caches();
            true
        } else {
            false
        }
    }

    /// Absorb events after a gateway call settles. Returns `false` when
    /// the operation started under a generation that is no longer current,
    /// in which case its result must not be applied.
    fn settle(&mut self, started: Generation) -> bool {
        self.absorb();
        if self.session.is_stale(started) {
            tracing::debug!(%started, current = %self.session.generation(),
                "discarding result of operation from a stale generation");
            false
        } else {
            true
        }
    }

    /// Error counterpart of [`Self::settle`]: a failure from a stale generation
    /// is dropped silently, one from the current generation propagates.
    fn settle_error(
        &mut self,
        started: Generation,
        error: ElectionError,
    ) -> Result<(), ElectionError> {
        if self.settle(started) {
            Err(error)
        } else {
            Ok(())
        }
    }

    fn clear_ledger_caches(&mut self) {
        self.snapshot = None;
        self.registry.clear();
        self.result = None;
    }
}
