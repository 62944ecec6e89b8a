//! Domain Events
//!
//! Event definitions for Event Sourcing.
//! Events are immutable facts that have happened to a wallet.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wallet domain events
///
/// The `event_type` tag is the discriminant used by every downstream fold.
/// It is always serialized explicitly, never inferred from shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum WalletEvent {
    /// Wallet was created with a seed balance (commonly zero)
    WalletCreated {
        wallet_id: Uuid,
        user_id: Uuid,
        currency: String,
        balance: Decimal,
        created_at: DateTime<Utc>,
    },

    /// Funds were deposited into the wallet (balance increased)
    Deposited {
        wallet_id: Uuid,
        transaction_id: Uuid,
        amount: Decimal,
        created_at: DateTime<Utc>,
    },

    /// Funds were withdrawn from the wallet (balance decreased)
    Withdrawn {
        wallet_id: Uuid,
        transaction_id: Uuid,
        amount: Decimal,
        created_at: DateTime<Utc>,
    },

    /// Wallet was tombstoned. The projection row is never removed;
    /// this only blocks further deposits/withdrawals.
    WalletDeleted {
        wallet_id: Uuid,
        created_at: DateTime<Utc>,
    },
}

/// Event type discriminants known to this version of the ledger.
/// Replay rejects anything outside this list rather than skipping it.
pub const KNOWN_EVENT_TYPES: &[&str] =
    &["WalletCreated", "Deposited", "Withdrawn", "WalletDeleted"];

impl WalletEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            WalletEvent::WalletCreated { .. } => "WalletCreated",
            WalletEvent::Deposited { .. } => "Deposited",
            WalletEvent::Withdrawn { .. } => "Withdrawn",
            WalletEvent::WalletDeleted { .. } => "WalletDeleted",
        }
    }

    /// Get the wallet ID this event relates to
    pub fn wallet_id(&self) -> Uuid {
        match self {
            WalletEvent::WalletCreated { wallet_id, .. } => *wallet_id,
            WalletEvent::Deposited { wallet_id, .. } => *wallet_id,
            WalletEvent::Withdrawn { wallet_id, .. } => *wallet_id,
            WalletEvent::WalletDeleted { wallet_id, .. } => *wallet_id,
        }
    }

    /// Timestamp assigned at append time; total order key for replay
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            WalletEvent::WalletCreated { created_at, .. } => *created_at,
            WalletEvent::Deposited { created_at, .. } => *created_at,
            WalletEvent::Withdrawn { created_at, .. } => *created_at,
            WalletEvent::WalletDeleted { created_at, .. } => *created_at,
        }
    }

    /// Unique transaction ID for `Deposited`/`Withdrawn` events
    pub fn transaction_id(&self) -> Option<Uuid> {
        match self {
            WalletEvent::Deposited { transaction_id, .. } => Some(*transaction_id),
            WalletEvent::Withdrawn { transaction_id, .. } => Some(*transaction_id),
            _ => None,
        }
    }

    /// Whether this is a transaction event (carries an amount)
    pub fn is_transaction(&self) -> bool {
        matches!(
            self,
            WalletEvent::Deposited { .. } | WalletEvent::Withdrawn { .. }
        )
    }
}

/// An event row as persisted in the log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: Uuid,
    /// Insertion-order tie-break when `created_at` collides
    pub sequence: i64,
    pub wallet_id: Uuid,
    pub event_type: String,
    pub event_data: serde_json::Value,
    pub context: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_carries_discriminant() {
        let event = WalletEvent::Deposited {
            wallet_id: Uuid::new_v4(),
            transaction_id: Uuid::new_v4(),
            amount: Decimal::new(100, 0),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "Deposited");

        let deserialized: WalletEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.event_type(), deserialized.event_type());
    }

    #[test]
    fn test_unknown_discriminant_rejected() {
        let json = serde_json::json!({
            "event_type": "WalletExploded",
            "wallet_id": Uuid::new_v4(),
            "created_at": Utc::now(),
        });

        let result: Result<WalletEvent, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_discriminant_rejected() {
        let json = serde_json::json!({
            "wallet_id": Uuid::new_v4(),
            "amount": "10",
            "created_at": Utc::now(),
        });

        let result: Result<WalletEvent, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_transaction_id_only_on_transaction_events() {
        let created = WalletEvent::WalletCreated {
            wallet_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            currency: "IRR".to_string(),
            balance: Decimal::ZERO,
            created_at: Utc::now(),
        };
        assert!(created.transaction_id().is_none());
        assert!(!created.is_transaction());

        let withdrawn = WalletEvent::Withdrawn {
            wallet_id: Uuid::new_v4(),
            transaction_id: Uuid::new_v4(),
            amount: Decimal::new(5, 0),
            created_at: Utc::now(),
        };
        assert!(withdrawn.transaction_id().is_some());
        assert!(withdrawn.is_transaction());
    }

    #[test]
    fn test_known_event_types_match_variants() {
        let wallet_id = Uuid::new_v4();
        let now = Utc::now();
        let events = [
            WalletEvent::WalletCreated {
                wallet_id,
                user_id: Uuid::new_v4(),
                currency: "IRR".to_string(),
                balance: Decimal::ZERO,
                created_at: now,
            },
            WalletEvent::Deposited {
                wallet_id,
                transaction_id: Uuid::new_v4(),
                amount: Decimal::ONE,
                created_at: now,
            },
            WalletEvent::Withdrawn {
                wallet_id,
                transaction_id: Uuid::new_v4(),
                amount: Decimal::ONE,
                created_at: now,
            },
            WalletEvent::WalletDeleted {
                wallet_id,
                created_at: now,
            },
        ];

        for event in &events {
            assert!(KNOWN_EVENT_TYPES.contains(&event.event_type()));
        }
    }
}
