//! Replay module
//!
//! Query-side recomputation of balance and transaction views from the
//! event log, independent of the cached projection.

mod engine;

pub use engine::{fold_events, ReplayEngine, ReplayError, ReplayResult};
