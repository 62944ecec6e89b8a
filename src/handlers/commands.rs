//! Command definitions
//!
//! Commands represent intentions to change the ledger state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default currency for new wallets
pub const DEFAULT_CURRENCY: &str = "IRR";

/// Command to create a new wallet for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWalletCommand {
    pub user_id: Uuid,
    /// Currency code; defaults to `DEFAULT_CURRENCY`
    pub currency: Option<String>,
    /// Seed balance (as string for precise decimal); defaults to zero
    pub initial_balance: Option<String>,
}

impl CreateWalletCommand {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            currency: None,
            initial_balance: None,
        }
    }

    pub fn with_currency(mut self, currency: String) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn with_initial_balance(mut self, balance: String) -> Self {
        self.initial_balance = Some(balance);
        self
    }
}

/// Command to deposit funds into a wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositCommand {
    pub wallet_id: Uuid,
    /// Amount to deposit (as string for precise decimal)
    pub amount: String,
}

impl DepositCommand {
    pub fn new(wallet_id: Uuid, amount: String) -> Self {
        Self { wallet_id, amount }
    }
}

/// Command to withdraw funds from a wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawCommand {
    pub wallet_id: Uuid,
    /// Amount to withdraw (as string for precise decimal)
    pub amount: String,
}

impl WithdrawCommand {
    pub fn new(wallet_id: Uuid, amount: String) -> Self {
        Self { wallet_id, amount }
    }
}

/// Command to tombstone a wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteWalletCommand {
    pub wallet_id: Uuid,
}

/// Result of a successful wallet creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWalletResult {
    pub wallet_id: Uuid,
    pub user_id: Uuid,
    pub currency: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful deposit or withdrawal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResult {
    pub transaction_id: Uuid,
    pub wallet_id: Uuid,
    pub amount: Decimal,
    /// Projection balance after the command committed
    pub balance: Decimal,
}

/// Result of a successful wallet deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteWalletResult {
    pub wallet_id: Uuid,
    pub deleted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_wallet_command_defaults() {
        let user_id = Uuid::new_v4();
        let cmd = CreateWalletCommand::new(user_id);

        assert_eq!(cmd.user_id, user_id);
        assert!(cmd.currency.is_none());
        assert!(cmd.initial_balance.is_none());
    }

    #[test]
    fn test_create_wallet_command_builder() {
        let cmd = CreateWalletCommand::new(Uuid::new_v4())
            .with_currency("USD".to_string())
            .with_initial_balance("250.00".to_string());

        assert_eq!(cmd.currency, Some("USD".to_string()));
        assert_eq!(cmd.initial_balance, Some("250.00".to_string()));
    }

    #[test]
    fn test_deposit_command() {
        let wallet_id = Uuid::new_v4();
        let cmd = DepositCommand::new(wallet_id, "100.50".to_string());

        assert_eq!(cmd.wallet_id, wallet_id);
        assert_eq!(cmd.amount, "100.50");
    }
}
