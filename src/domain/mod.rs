//! Domain module
//!
//! Core domain types for the wallet ledger: events, validated money
//! primitives, domain errors, and operation context.

mod amount;
mod context;
mod error;
mod events;

pub use amount::{Amount, AmountError, Balance};
pub use context::OperationContext;
pub use error::DomainError;
pub use events::{StoredEvent, WalletEvent, KNOWN_EVENT_TYPES};
