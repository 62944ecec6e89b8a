//! Event Replay Engine
//!
//! Reconstructs balance and transaction views purely from the event log,
//! never touching the projection table. This is the audit/reconciliation
//! path: replaying the full history must agree with the live projection,
//! and any drift between the two is a bug.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{StoredEvent, WalletEvent, KNOWN_EVENT_TYPES};
use crate::event_store::{EventStore, EventStoreError};

/// Result of folding a (possibly windowed) event log
#[derive(Debug, Clone, Serialize)]
pub struct ReplayResult {
    pub wallet_id: Uuid,
    pub balance: Decimal,
    pub transactions: Vec<WalletEvent>,
}

/// Errors that can occur during replay
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Unrecognized discriminant in the log. Forward-compatibility must be
    /// explicit: skipping would silently produce a wrong balance.
    #[error("Unknown event type in log: {0}")]
    UnknownEventType(String),

    /// Known discriminant but undecodable payload (data corruption)
    #[error("Corrupt event data for event {event_id}: {source}")]
    CorruptEventData {
        event_id: Uuid,
        source: serde_json::Error,
    },

    /// `from` bound after `to` bound
    #[error("Invalid replay window: from {from} is after to {to}")]
    InvalidWindow {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error(transparent)]
    Store(#[from] EventStoreError),
}

/// Decode a stored row into a domain event, rejecting unknown discriminants
fn decode_event(stored: &StoredEvent) -> Result<WalletEvent, ReplayError> {
    if !KNOWN_EVENT_TYPES.contains(&stored.event_type.as_str()) {
        return Err(ReplayError::UnknownEventType(stored.event_type.clone()));
    }

    serde_json::from_value(stored.event_data.clone()).map_err(|source| {
        ReplayError::CorruptEventData {
            event_id: stored.id,
            source,
        }
    })
}

/// Fold a slice of stored events into a balance and the decoded event list.
///
/// Pure function of its input: `WalletCreated` contributes its seed balance
/// (zero in the common case, so the full-history fold always agrees with
/// the projection), `WalletDeleted` contributes nothing, `Deposited` adds,
/// `Withdrawn` subtracts. The accumulator starts at zero, so a windowed
/// fold reflects only the events inside the window.
pub fn fold_events(stored: &[StoredEvent]) -> Result<(Decimal, Vec<WalletEvent>), ReplayError> {
    let mut balance = Decimal::ZERO;
    let mut events = Vec::with_capacity(stored.len());

    for row in stored {
        let event = decode_event(row)?;
        match &event {
            WalletEvent::WalletCreated { balance: seed, .. } => balance += seed,
            WalletEvent::WalletDeleted { .. } => {}
            WalletEvent::Deposited { amount, .. } => balance += amount,
            WalletEvent::Withdrawn { amount, .. } => balance -= amount,
        }
        events.push(event);
    }

    Ok((balance, events))
}

/// Replay Engine over the event log
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    store: EventStore,
}

impl ReplayEngine {
    /// Create a new ReplayEngine with an injected event store
    pub fn new(store: EventStore) -> Self {
        Self { store }
    }

    /// Replay events for a wallet within `[from, to]` (inclusive bounds
    /// on `created_at`). Idempotent and side-effect-free: the same window
    /// against an unchanged log yields identical output.
    pub async fn replay(
        &self,
        wallet_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ReplayResult, ReplayError> {
        if from > to {
            return Err(ReplayError::InvalidWindow { from, to });
        }

        let stored = self.store.events_in_window(wallet_id, from, to).await?;
        let (balance, transactions) = fold_events(&stored)?;

        Ok(ReplayResult {
            wallet_id,
            balance,
            transactions,
        })
    }

    /// Transaction history for a wallet: the unbounded fold restricted to
    /// `Deposited`/`Withdrawn` events, in log order.
    pub async fn list_transactions(
        &self,
        wallet_id: Uuid,
    ) -> Result<Vec<WalletEvent>, ReplayError> {
        let stored = self.store.events_for_wallet(wallet_id).await?;
        let (_, events) = fold_events(&stored)?;

        Ok(events.into_iter().filter(|e| e.is_transaction()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stored(sequence: i64, event: &WalletEvent) -> StoredEvent {
        StoredEvent {
            id: Uuid::new_v4(),
            sequence,
            wallet_id: event.wallet_id(),
            event_type: event.event_type().to_string(),
            event_data: serde_json::to_value(event).unwrap(),
            context: serde_json::json!({}),
            created_at: event.created_at(),
        }
    }

    fn deposit(wallet_id: Uuid, amount: Decimal) -> WalletEvent {
        WalletEvent::Deposited {
            wallet_id,
            transaction_id: Uuid::new_v4(),
            amount,
            created_at: Utc::now(),
        }
    }

    fn withdraw(wallet_id: Uuid, amount: Decimal) -> WalletEvent {
        WalletEvent::Withdrawn {
            wallet_id,
            transaction_id: Uuid::new_v4(),
            amount,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_fold_deposits_and_withdrawals() {
        let wallet_id = Uuid::new_v4();
        let created = WalletEvent::WalletCreated {
            wallet_id,
            user_id: Uuid::new_v4(),
            currency: "IRR".to_string(),
            balance: Decimal::ZERO,
            created_at: Utc::now(),
        };

        let log = vec![
            stored(1, &created),
            stored(2, &deposit(wallet_id, dec!(100))),
            stored(3, &deposit(wallet_id, dec!(50))),
            stored(4, &withdraw(wallet_id, dec!(30))),
        ];

        let (balance, events) = fold_events(&log).unwrap();
        assert_eq!(balance, dec!(120));
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_fold_creation_contributes_seed() {
        let wallet_id = Uuid::new_v4();
        let created = WalletEvent::WalletCreated {
            wallet_id,
            user_id: Uuid::new_v4(),
            currency: "IRR".to_string(),
            balance: dec!(500),
            created_at: Utc::now(),
        };

        // A seeded wallet's projection starts at the seed, so the fold
        // must count it or full-history replay diverges
        let log = vec![
            stored(1, &created),
            stored(2, &deposit(wallet_id, dec!(100))),
            stored(3, &withdraw(wallet_id, dec!(50))),
        ];
        let (balance, _) = fold_events(&log).unwrap();
        assert_eq!(balance, dec!(550));
    }

    #[test]
    fn test_fold_empty_log() {
        let (balance, events) = fold_events(&[]).unwrap();
        assert_eq!(balance, Decimal::ZERO);
        assert!(events.is_empty());
    }

    #[test]
    fn test_fold_rejects_unknown_event_type() {
        let wallet_id = Uuid::new_v4();
        let mut row = stored(1, &deposit(wallet_id, dec!(10)));
        row.event_type = "FundsTeleported".to_string();

        let result = fold_events(&[row]);
        assert!(matches!(
            result,
            Err(ReplayError::UnknownEventType(ref t)) if t == "FundsTeleported"
        ));
    }

    #[test]
    fn test_fold_rejects_corrupt_payload() {
        let wallet_id = Uuid::new_v4();
        let mut row = stored(1, &deposit(wallet_id, dec!(10)));
        row.event_data = serde_json::json!({ "event_type": "Deposited" });

        let result = fold_events(&[row]);
        assert!(matches!(result, Err(ReplayError::CorruptEventData { .. })));
    }

    #[test]
    fn test_fold_is_deterministic() {
        let wallet_id = Uuid::new_v4();
        let log = vec![
            stored(1, &deposit(wallet_id, dec!(42))),
            stored(2, &withdraw(wallet_id, dec!(2))),
        ];

        let (first, _) = fold_events(&log).unwrap();
        let (second, _) = fold_events(&log).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, dec!(40));
    }

    #[test]
    fn test_fold_windowed_subset_semantics() {
        // Folding only a subset must reflect only that subset
        let wallet_id = Uuid::new_v4();
        let full = vec![
            stored(1, &deposit(wallet_id, dec!(100))),
            stored(2, &deposit(wallet_id, dec!(50))),
            stored(3, &withdraw(wallet_id, dec!(30))),
        ];

        let (window_balance, window_events) = fold_events(&full[1..]).unwrap();
        assert_eq!(window_balance, dec!(20));
        assert_eq!(window_events.len(), 2);
    }
}
