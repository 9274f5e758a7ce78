//! Wallet session tracking and stale-work invalidation.
//!
//! The session manager owns the identity of the currently connected
//! account/chain and its generation counter. It consumes push notifications
//! from the wallet provider over a `tokio::sync::broadcast` channel; each
//! account or chain change mints a new generation, which invalidates every
//! async operation still in flight from the previous identity.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use ivp_types::{AccountAddress, ChainId, Generation};

use crate::error::ElectionError;

/// Push notifications from the wallet provider.
#[derive(Clone, Debug)]
pub enum ProviderEvent {
    /// The selected account changed; `None` means the wallet disconnected.
    AccountChanged(Option<AccountAddress>),
    /// The provider switched to a different chain.
    ChainChanged(ChainId),
}

/// The identity a successful connect yields.
#[derive(Clone, Debug)]
pub struct ProviderIdentity {
    pub account: AccountAddress,
    pub chain: ChainId,
}

/// Boundary to the wallet/provider (browser extension, RPC signer, ...).
///
/// `connect` fails with [`ElectionError::NoWalletProvider`] when no
/// compatible provider is present and [`ElectionError::ProviderRejected`]
/// when the user declines the connection prompt.
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    async fn connect(&self) -> Result<ProviderIdentity, ElectionError>;

    /// Subscribe to account/chain change notifications.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// The currently connected wallet identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletSession {
    pub account: Option<AccountAddress>,
    pub chain: Option<ChainId>,
    pub generation: Generation,
}

impl WalletSession {
    fn disconnected() -> Self {
        Self {
            account: None,
            chain: None,
            generation: Generation::ZERO,
        }
    }
}

/// Tracks which account/chain is current and invalidates stale async work.
pub struct SessionManager<P: WalletProvider> {
    provider: P,
    events: broadcast::Receiver<ProviderEvent>,
    session: WalletSession,
    expected_chain: ChainId,
}

impl<P: WalletProvider> SessionManager<P> {
    pub fn new(provider: P, expected_chain: ChainId) -> Self {
        let events = provider.subscribe();
        Self {
            provider,
            events,
            session: WalletSession::disconnected(),
            expected_chain,
        }
    }

    /// Connect (or reconnect) through the provider.
    ///
    /// Mints generation 1 on the first connect and increments on every
    /// reconnect. Refuses with `WrongNetwork` when the provider reports a
    /// chain other than the one the contract is deployed on.
    pub async fn connect(&mut self) -> Result<&WalletSession, ElectionError> {
        let identity = self.provider.connect().await?;

        if identity.chain != self.expected_chain {
            return Err(ElectionError::WrongNetwork {
                expected: self.expected_chain,
                actual: identity.chain,
            });
        }

        self.session.chain = Some(identity.chain);
        self.session.generation = self.session.generation.next();
        tracing::info!(
            account = %identity.account,
            chain = %identity.chain,
            generation = %self.session.generation,
            "wallet connected"
        );
        self.session.account = Some(identity.account);
        Ok(&self.session)
    }

    /// Drain pending provider notifications without blocking.
    ///
    /// Each notification updates the identity and mints a new generation.
    /// Returns `true` when anything changed, meaning every ledger-derived
    /// cache is now meaningless and must be cleared.
    pub fn absorb_events(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(ProviderEvent::AccountChanged(account)) => {
                    tracing::info!(
                        account = account.as_ref().map(|a| a.as_str()).unwrap_or("<none>"),
                        "account changed"
                    );
                    self.session.account = account;
                    self.session.generation = self.session.generation.next();
                    changed = true;
                }
                Ok(ProviderEvent::ChainChanged(chain)) => {
                    tracing::info!(chain = %chain, "chain changed");
                    self.session.chain = Some(chain);
                    self.session.generation = self.session.generation.next();
                    changed = true;
                }
                Err(TryRecvError::Lagged(missed)) => {
                    // Missed notifications may include an identity change we
                    // never saw; invalidate unconditionally.
                    tracing::warn!(missed, "provider event stream lagged");
                    self.session.generation = self.session.generation.next();
                    changed = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        changed
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn generation(&self) -> Generation {
        self.session.generation
    }

    /// Whether work started under `started` must be discarded.
    pub fn is_stale(&self, started: Generation) -> bool {
        self.session.generation != started
    }

    /// The connected account, or `NoWalletProvider` when nothing is
    /// connected (a disconnected session has no contract handle at all).
    pub fn require_account(&self) -> Result<&AccountAddress, ElectionError> {
        self.session
            .account
            .as_ref()
            .ok_or(ElectionError::NoWalletProvider)
    }

    /// Fail with `WrongNetwork` unless the session is on the expected chain.
    pub fn require_expected_chain(&self) -> Result<(), ElectionError> {
        match self.session.chain {
            Some(chain) if chain == self.expected_chain => Ok(()),
            Some(chain) => Err(ElectionError::WrongNetwork {
                expected: self.expected_chain,
                actual: chain,
            }),
            None => Err(ElectionError::NoWalletProvider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProvider {
        outcome: Result<ProviderIdentity, ElectionError>,
        tx: broadcast::Sender<ProviderEvent>,
    }

    impl FakeProvider {
        fn connecting_to(chain: ChainId) -> (Self, broadcast::Sender<ProviderEvent>) {
            let (tx, _) = broadcast::channel(16);
            let provider = Self {
                outcome: Ok(ProviderIdentity {
                    account: addr(0xaa),
                    chain,
                }),
                tx: tx.clone(),
            };
            (provider, tx)
        }

        fn failing_with(err: ElectionError) -> Self {
            let (tx, _) = broadcast::channel(16);
            Self {
                outcome: Err(err),
                tx,
            }
        }
    }

    impl WalletProvider for FakeProvider {
        async fn connect(&self) -> Result<ProviderIdentity, ElectionError> {
            self.outcome.clone()
        }

        fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
            self.tx.subscribe()
        }
    }

    fn addr(byte: u8) -> AccountAddress {
        AccountAddress::parse(format!("0x{}", hex::encode([byte; 20]))).unwrap()
    }

    #[tokio::test]
    async fn first_connect_mints_generation_one() {
        let (provider, _tx) = FakeProvider::connecting_to(ChainId::GOERLI);
        let mut manager = SessionManager::new(provider, ChainId::GOERLI);

        let session = manager.connect().await.unwrap();
        assert_eq!(session.generation.as_u64(), 1);
        assert_eq!(session.account, Some(addr(0xaa)));
    }

    #[tokio::test]
    async fn reconnect_increments_generation() {
        let (provider, _tx) = FakeProvider::connecting_to(ChainId::GOERLI);
        let mut manager = SessionManager::new(provider, ChainId::GOERLI);

        manager.connect().await.unwrap();
        manager.connect().await.unwrap();
        assert_eq!(manager.generation().as_u64(), 2);
    }

    #[tokio::test]
    async fn wrong_chain_is_refused() {
        let (provider, _tx) = FakeProvider::connecting_to(ChainId::MAINNET);
        let mut manager = SessionManager::new(provider, ChainId::GOERLI);

        let err = manager.connect().await.unwrap_err();
        assert_eq!(
            err,
            ElectionError::WrongNetwork {
                expected: ChainId::GOERLI,
                actual: ChainId::MAINNET,
            }
        );
        assert_eq!(manager.session().account, None);
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let provider = FakeProvider::failing_with(ElectionError::ProviderRejected);
        let mut manager = SessionManager::new(provider, ChainId::GOERLI);
        assert_eq!(
            manager.connect().await.unwrap_err(),
            ElectionError::ProviderRejected
        );
    }

    #[tokio::test]
    async fn account_change_bumps_generation() {
        let (provider, tx) = FakeProvider::connecting_to(ChainId::GOERLI);
        let mut manager = SessionManager::new(provider, ChainId::GOERLI);
        manager.connect().await.unwrap();
        let before = manager.generation();

        tx.send(ProviderEvent::AccountChanged(Some(addr(0xbb)))).unwrap();
        assert!(manager.absorb_events());
        assert!(manager.generation() > before);
        assert_eq!(manager.session().account, Some(addr(0xbb)));
        assert!(manager.is_stale(before));
    }

    #[tokio::test]
    async fn chain_change_makes_operations_fail_wrong_network() {
        let (provider, tx) = FakeProvider::connecting_to(ChainId::GOERLI);
        let mut manager = SessionManager::new(provider, ChainId::GOERLI);
        manager.connect().await.unwrap();
        assert!(manager.require_expected_chain().is_ok());

        tx.send(ProviderEvent::ChainChanged(ChainId::MAINNET)).unwrap();
        assert!(manager.absorb_events());
        assert_eq!(
            manager.require_expected_chain().unwrap_err(),
            ElectionError::WrongNetwork {
                expected: ChainId::GOERLI,
                actual: ChainId::MAINNET,
            }
        );
    }

    #[tokio::test]
    async fn absorb_with_no_events_reports_no_change() {
        let (provider, _tx) = FakeProvider::connecting_to(ChainId::GOERLI);
        let mut manager = SessionManager::new(provider, ChainId::GOERLI);
        manager.connect().await.unwrap();
        let before = manager.generation();
        assert!(!manager.absorb_events());
        assert_eq!(manager.generation(), before);
    }

    #[tokio::test]
    async fn disconnected_session_has_no_account() {
        let (provider, _tx) = FakeProvider::connecting_to(ChainId::GOERLI);
        let manager = SessionManager::new(provider, ChainId::GOERLI);
        assert_eq!(
            manager.require_account().unwrap_err(),
            ElectionError::NoWalletProvider
        );
    }
}
