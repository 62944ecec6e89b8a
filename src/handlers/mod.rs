//! Command Handlers module
//!
//! CQRS command handlers that orchestrate business operations.
//! Each handler coordinates the wallet aggregate, event store, and
//! projection inside a single database transaction: the event append
//! and the projection update commit together or not at all.

mod commands;
mod create_wallet_handler;
mod delete_wallet_handler;
mod deposit_handler;
mod withdraw_handler;

pub use commands::*;
pub use create_wallet_handler::CreateWalletHandler;
pub use delete_wallet_handler::DeleteWalletHandler;
pub use deposit_handler::DepositHandler;
pub use withdraw_handler::WithdrawHandler;
