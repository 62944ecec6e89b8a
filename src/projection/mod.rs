//! Projection module
//!
//! Read-model table (wallets) kept in lockstep with the event log.
//! Optimized for queries; always derivable from the events.

mod service;

pub use service::{ProjectionError, ProjectionService, WalletRow};
