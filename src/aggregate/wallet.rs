//! Wallet Aggregate
//!
//! Wallet is the single aggregate of the ledger. It applies events to
//! maintain current state and generates events for commands. State is
//! derived from events, never directly mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Amount, Balance, DomainError, WalletEvent};

use super::Aggregate;

/// Wallet Aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// Unique wallet ID, generated at creation, immutable
    id: Uuid,

    /// Owner user ID, immutable
    user_id: Uuid,

    /// Currency, fixed at creation
    currency: String,

    /// Current balance (derived from events)
    balance: Balance,

    /// Tombstone timestamp; set once by WalletDeleted, never cleared
    deleted_at: Option<DateTime<Utc>>,

    /// Current version (number of events applied)
    version: i64,

    /// When the wallet was created
    created_at: Option<DateTime<Utc>>,
}

impl Wallet {
    /// Create a new wallet and generate the creation event.
    /// The seed balance must already be validated (non-negative).
    pub fn create(
        wallet_id: Uuid,
        user_id: Uuid,
        currency: String,
        seed: Balance,
    ) -> (Self, WalletEvent) {
        let now = Utc::now();

        let event = WalletEvent::WalletCreated {
            wallet_id,
            user_id,
            currency: currency.clone(),
            balance: seed.value(),
            created_at: now,
        };

        let wallet = Self {
            id: wallet_id,
            user_id,
            currency,
            balance: seed,
            deleted_at: None,
            version: 1,
            created_at: Some(now),
        };

        (wallet, event)
    }

    /// Reconstruct a wallet from a projection row.
    /// Used by command handlers that hold the row lock and need the
    /// aggregate's command methods without replaying the whole log.
    pub fn from_row(
        id: Uuid,
        user_id: Uuid,
        currency: String,
        balance: Balance,
        deleted_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            currency,
            balance,
            deleted_at,
            version: 0, // not tracked for row-loaded wallets
            created_at: Some(created_at),
        }
    }

    /// Deposit funds into the wallet.
    /// Returns the event to be persisted, or an error if not allowed.
    pub fn deposit(&self, amount: &Amount) -> Result<WalletEvent, DomainError> {
        if self.deleted_at.is_some() {
            return Err(DomainError::WalletDeleted(self.id.to_string()));
        }

        // The resulting balance must stay within Balance's range, or
        // later commands could not reconstruct it from the projection row
        self.balance.credit(amount)?;

        Ok(WalletEvent::Deposited {
            wallet_id: self.id,
            transaction_id: Uuid::new_v4(),
            amount: amount.value(),
            created_at: Utc::now(),
        })
    }

    /// Withdraw funds from the wallet.
    /// Fails when `amount > balance`; a zero balance alone does not block
    /// the check, the comparison is always against the requested amount.
    pub fn withdraw(&self, amount: &Amount) -> Result<WalletEvent, DomainError> {
        if self.deleted_at.is_some() {
            return Err(DomainError::WalletDeleted(self.id.to_string()));
        }

        if !self.balance.is_sufficient_for(amount) {
            return Err(DomainError::insufficient_funds(
                amount.value(),
                self.balance.value(),
            ));
        }

        Ok(WalletEvent::Withdrawn {
            wallet_id: self.id,
            transaction_id: Uuid::new_v4(),
            amount: amount.value(),
            created_at: Utc::now(),
        })
    }

    /// Tombstone the wallet. The wallet remains queryable for audit.
    pub fn delete(&self) -> Result<WalletEvent, DomainError> {
        if self.deleted_at.is_some() {
            return Err(DomainError::WalletDeleted(self.id.to_string()));
        }

        Ok(WalletEvent::WalletDeleted {
            wallet_id: self.id,
            created_at: Utc::now(),
        })
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn balance(&self) -> &Balance {
        &self.balance
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            currency: String::new(),
            balance: Balance::zero(),
            deleted_at: None,
            version: 0,
            created_at: None,
        }
    }
}

impl Aggregate for Wallet {
    type Event = WalletEvent;

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(mut self, event: Self::Event) -> Self {
        match event {
            WalletEvent::WalletCreated {
                wallet_id,
                user_id,
                currency,
                balance,
                created_at,
            } => {
                self.id = wallet_id;
                self.user_id = user_id;
                self.currency = currency;
                self.balance = Balance::new(balance).unwrap_or_else(|_| Balance::zero());
                self.deleted_at = None;
                self.created_at = Some(created_at);
            }

            WalletEvent::Deposited { amount, .. } => match Amount::new(amount) {
                Ok(amt) => match self.balance.credit(&amt) {
                    Ok(new_balance) => self.balance = new_balance,
                    Err(e) => {
                        tracing::error!(
                            "Balance overflow during deposit replay for wallet {}: {}",
                            self.id,
                            e
                        );
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Invalid amount in Deposited event for wallet {}: {}",
                        self.id,
                        e
                    );
                }
            },

            WalletEvent::Withdrawn { amount, .. } => match Amount::new(amount) {
                Ok(amt) => match self.balance.debit(&amt) {
                    Ok(new_balance) => self.balance = new_balance,
                    Err(e) => {
                        tracing::error!(
                            "Balance underflow during withdraw replay for wallet {}: {}",
                            self.id,
                            e
                        );
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Invalid amount in Withdrawn event for wallet {}: {}",
                        self.id,
                        e
                    );
                }
            },

            WalletEvent::WalletDeleted { created_at, .. } => {
                self.deleted_at = Some(created_at);
            }
        }

        self.version += 1;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_wallet() -> Wallet {
        let (wallet, _) = Wallet::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "IRR".to_string(),
            Balance::zero(),
        );
        wallet
    }

    #[test]
    fn test_wallet_create() {
        let wallet_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let (wallet, event) =
            Wallet::create(wallet_id, user_id, "IRR".to_string(), Balance::zero());

        assert_eq!(wallet.id(), wallet_id);
        assert_eq!(wallet.user_id(), user_id);
        assert_eq!(wallet.currency(), "IRR");
        assert_eq!(wallet.balance().value(), Decimal::ZERO);
        assert_eq!(wallet.version(), 1);
        assert!(matches!(event, WalletEvent::WalletCreated { .. }));
    }

    #[test]
    fn test_wallet_create_with_seed() {
        let seed = Balance::new(Decimal::new(500, 0)).unwrap();
        let (wallet, event) =
            Wallet::create(Uuid::new_v4(), Uuid::new_v4(), "IRR".to_string(), seed);

        assert_eq!(wallet.balance().value(), Decimal::new(500, 0));
        match event {
            WalletEvent::WalletCreated { balance, .. } => {
                assert_eq!(balance, Decimal::new(500, 0));
            }
            other => panic!("Expected WalletCreated, got {:?}", other),
        }
    }

    #[test]
    fn test_wallet_deposit() {
        let wallet = new_wallet();
        let amount = Amount::new(Decimal::new(100, 0)).unwrap();

        let event = wallet.deposit(&amount).unwrap();
        assert!(matches!(event, WalletEvent::Deposited { .. }));

        let wallet = wallet.apply(event);
        assert_eq!(wallet.balance().value(), Decimal::new(100, 0));
        assert_eq!(wallet.version(), 2);
    }

    #[test]
    fn test_wallet_withdraw() {
        let wallet = new_wallet();

        let deposit = Amount::new(Decimal::new(100, 0)).unwrap();
        let event = wallet.deposit(&deposit).unwrap();
        let wallet = wallet.apply(event);

        let withdraw = Amount::new(Decimal::new(30, 0)).unwrap();
        let event = wallet.withdraw(&withdraw).unwrap();
        let wallet = wallet.apply(event);

        assert_eq!(wallet.balance().value(), Decimal::new(70, 0));
        assert_eq!(wallet.version(), 3);
    }

    #[test]
    fn test_wallet_deposit_rejected_beyond_max_balance() {
        // A wallet sitting at the maximum representable balance
        let cap = Balance::new(Decimal::new(1_000_000_000_000, 0)).unwrap();
        let wallet = Wallet::from_row(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "IRR".to_string(),
            cap,
            None,
            Utc::now(),
        );

        // A further valid deposit would push the stored balance past
        // what Balance can reconstruct; it must be rejected up front
        let amount = Amount::new(Decimal::ONE).unwrap();
        assert!(matches!(
            wallet.deposit(&amount),
            Err(DomainError::InvalidAmount(_))
        ));
        assert_eq!(wallet.balance().value(), Decimal::new(1_000_000_000_000, 0));
    }

    #[test]
    fn test_wallet_withdraw_insufficient() {
        let wallet = new_wallet();
        let amount = Amount::new(Decimal::new(10, 0)).unwrap();

        let result = wallet.withdraw(&amount);
        assert!(matches!(
            result,
            Err(DomainError::InsufficientFunds { .. })
        ));
        // Balance untouched
        assert_eq!(wallet.balance().value(), Decimal::ZERO);
    }

    #[test]
    fn test_wallet_withdraw_exact_balance() {
        let wallet = new_wallet();
        let amount = Amount::new(Decimal::new(50, 0)).unwrap();
        let event = wallet.deposit(&amount).unwrap();
        let wallet = wallet.apply(event);

        // Withdrawing the full balance is allowed
        let event = wallet.withdraw(&amount).unwrap();
        let wallet = wallet.apply(event);
        assert_eq!(wallet.balance().value(), Decimal::ZERO);
    }

    #[test]
    fn test_wallet_delete_tombstone() {
        let wallet = new_wallet();

        let event = wallet.delete().unwrap();
        let wallet = wallet.apply(event);
        assert!(wallet.is_deleted());

        // Further commands are rejected
        let amount = Amount::new(Decimal::new(10, 0)).unwrap();
        assert!(matches!(
            wallet.deposit(&amount),
            Err(DomainError::WalletDeleted(_))
        ));
        assert!(matches!(
            wallet.withdraw(&amount),
            Err(DomainError::WalletDeleted(_))
        ));
        assert!(matches!(
            wallet.delete(),
            Err(DomainError::WalletDeleted(_))
        ));
    }

    #[test]
    fn test_balance_conserved_over_fold() {
        // balance == sum(deposits) - sum(withdrawals)
        let wallet = new_wallet();
        let d100 = Amount::new(Decimal::new(100, 0)).unwrap();
        let d50 = Amount::new(Decimal::new(50, 0)).unwrap();
        let w30 = Amount::new(Decimal::new(30, 0)).unwrap();

        let event = wallet.deposit(&d100).unwrap();
        let wallet = wallet.apply(event);
        let event = wallet.deposit(&d50).unwrap();
        let wallet = wallet.apply(event);
        let event = wallet.withdraw(&w30).unwrap();
        let wallet = wallet.apply(event);

        assert_eq!(wallet.balance().value(), Decimal::new(120, 0));
    }
}
