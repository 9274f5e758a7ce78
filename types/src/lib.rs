//! Fundamental types for the IVP election coordinator.
//!
//! This crate defines the core types shared across the workspace: account
//! addresses, chain identifiers, timestamps, identity generations, and the
//! election data model (candidates, phases, snapshots, vote records,
//! results).

pub mod address;
pub mod candidate;
pub mod chain;
pub mod election;
pub mod generation;
pub mod time;

pub use address::{AccountAddress, AddressError};
pub use candidate::{Candidate, CandidateId};
pub use chain::ChainId;
pub use election::{ElectionPhase, ElectionResult, ElectionSnapshot, VoteRecord, VotingWindow};
pub use generation::Generation;
pub use time::Timestamp;
