//! Election session coordinator for the IVP voting platform.
//!
//! Mediates between an asynchronous, eventually-consistent election ledger
//! and a local UI session:
//! - Typed gateway boundary to the contract with a domain error taxonomy
//! - Wallet session tracking with generation-tagged stale-work invalidation
//! - Lifecycle phase derivation from ledger-reported time and flags
//! - Cached candidate roster with optimistic-then-reconciled vote casting
//! - Winner resolution with deterministic tie-break, reconciled against the
//!   ledger's own answer

pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod rpc;
pub mod session;
pub mod state_machine;

pub use config::CoordinatorConfig;
pub use coordinator::ElectionCoordinator;
pub use error::ElectionError;
pub use gateway::{classify_revert, LedgerGateway};
pub use rpc::RpcLedgerGateway;
pub use session::{ProviderEvent, ProviderIdentity, SessionManager, WalletProvider, WalletSession};
