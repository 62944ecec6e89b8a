//! Event Store Repository
//!
//! Append-only persistence for wallet events. Appends run inside a
//! caller-owned transaction so the event insert commits (or aborts)
//! together with the projection update. Reads are ordered by
//! `(created_at, sequence)` — `created_at` is the total order key and
//! the bigserial `sequence` breaks ties at stored time granularity.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{OperationContext, StoredEvent, WalletEvent};

use super::EventStoreError;

type EventRow = (
    Uuid,
    i64,
    Uuid,
    String,
    serde_json::Value,
    serde_json::Value,
    DateTime<Utc>,
);

fn into_stored(row: EventRow) -> StoredEvent {
    let (id, sequence, wallet_id, event_type, event_data, context, created_at) = row;
    StoredEvent {
        id,
        sequence,
        wallet_id,
        event_type,
        event_data,
        context,
        created_at,
    }
}

/// Event Store for persisting and retrieving wallet events
#[derive(Debug, Clone)]
pub struct EventStore {
    pool: PgPool,
}

impl EventStore {
    /// Create a new EventStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one event inside the caller's transaction.
    /// Returns the generated event row ID.
    pub async fn append(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event: &WalletEvent,
        context: &OperationContext,
    ) -> Result<Uuid, EventStoreError> {
        let event_data = serde_json::to_value(event)?;
        let context_json = serde_json::to_value(context)?;

        let event_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO wallet_events (wallet_id, event_type, event_data, context, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(event.wallet_id())
        .bind(event.event_type())
        .bind(&event_data)
        .bind(&context_json)
        .bind(event.created_at())
        .fetch_one(&mut **tx)
        .await?;

        Ok(event_id)
    }

    /// Get all events for a wallet in replay order
    pub async fn events_for_wallet(
        &self,
        wallet_id: Uuid,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT id, sequence, wallet_id, event_type, event_data, context, created_at
            FROM wallet_events
            WHERE wallet_id = $1
            ORDER BY created_at ASC, sequence ASC
            "#,
        )
        .bind(wallet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_stored).collect())
    }

    /// Get events for a wallet whose `created_at` falls within
    /// `[from, to]` (both bounds inclusive), in replay order
    pub async fn events_in_window(
        &self,
        wallet_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT id, sequence, wallet_id, event_type, event_data, context, created_at
            FROM wallet_events
            WHERE wallet_id = $1 AND created_at >= $2 AND created_at <= $3
            ORDER BY created_at ASC, sequence ASC
            "#,
        )
        .bind(wallet_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_stored).collect())
    }
}
