//! Projection Service
//!
//! Maintains the wallet read model (current balance + identity).
//! Mutators take a caller-owned transaction so the projection moves in
//! lockstep with the event log; readers go straight to the pool.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// A wallet projection row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WalletRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub currency: String,
    pub balance: Decimal,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Projection Service for the wallet read model
#[derive(Debug, Clone)]
pub struct ProjectionService {
    pool: PgPool,
}

impl ProjectionService {
    /// Create a new ProjectionService
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new wallet projection row.
    /// A unique violation (wallet id or user id already present) maps to
    /// `ProjectionError::Duplicate` so a racing second create loses cleanly.
    pub async fn insert_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet_id: Uuid,
        user_id: Uuid,
        currency: &str,
        balance: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<(), ProjectionError> {
        sqlx::query(
            r#"
            INSERT INTO wallets (id, user_id, currency, balance, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(wallet_id)
        .bind(user_id)
        .bind(currency)
        .bind(balance)
        .bind(created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ProjectionError::Duplicate(user_id)
            } else {
                ProjectionError::Database(e)
            }
        })?;

        Ok(())
    }

    /// Lock and load a wallet row for the duration of the transaction.
    /// The row lock is the per-wallet serialization point: concurrent
    /// commands against the same wallet queue here, commands against
    /// different wallets never contend.
    pub async fn lock_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet_id: Uuid,
    ) -> Result<Option<WalletRow>, ProjectionError> {
        let row: Option<WalletRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, currency, balance, deleted_at, created_at
            FROM wallets
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row)
    }

    /// Atomically increment the balance, returning the new value
    pub async fn credit_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet_id: Uuid,
        amount: Decimal,
    ) -> Result<Decimal, ProjectionError> {
        let balance: Decimal = sqlx::query_scalar(
            r#"
            UPDATE wallets
            SET balance = balance + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING balance
            "#,
        )
        .bind(wallet_id)
        .bind(amount)
        .fetch_one(&mut **tx)
        .await?;

        Ok(balance)
    }

    /// Atomically decrement the balance, returning the new value.
    /// The caller must have verified sufficiency under the row lock;
    /// the CHECK constraint on the table is the last line of defense.
    pub async fn debit_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet_id: Uuid,
        amount: Decimal,
    ) -> Result<Decimal, ProjectionError> {
        let balance: Decimal = sqlx::query_scalar(
            r#"
            UPDATE wallets
            SET balance = balance - $2, updated_at = NOW()
            WHERE id = $1
            RETURNING balance
            "#,
        )
        .bind(wallet_id)
        .bind(amount)
        .fetch_one(&mut **tx)
        .await?;

        Ok(balance)
    }

    /// Tombstone a wallet. The row is never removed.
    pub async fn mark_deleted(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet_id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<(), ProjectionError> {
        sqlx::query(
            r#"
            UPDATE wallets
            SET deleted_at = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(wallet_id)
        .bind(deleted_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Point lookup by wallet ID
    pub async fn get_wallet(&self, wallet_id: Uuid) -> Result<Option<WalletRow>, ProjectionError> {
        let row: Option<WalletRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, currency, balance, deleted_at, created_at
            FROM wallets
            WHERE id = $1
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Point lookup by owner user ID
    pub async fn get_wallet_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<WalletRow>, ProjectionError> {
        let row: Option<WalletRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, currency, balance, deleted_at, created_at
            FROM wallets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Current balance for a wallet; None when the wallet is absent.
    /// This is a read of cached state, distinct from replay's recomputation.
    pub async fn get_balance(&self, wallet_id: Uuid) -> Result<Option<Decimal>, ProjectionError> {
        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT balance FROM wallets WHERE id = $1
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }
}

/// Postgres unique_violation
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}

/// Projection errors
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Wallet already exists for user {0}")]
    Duplicate(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_error_display() {
        let user_id = Uuid::nil();
        let err = ProjectionError::Duplicate(user_id);
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_non_database_error_not_unique_violation() {
        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
