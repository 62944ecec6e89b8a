//! Wallet Deletion Handler
//!
//! Tombstones a wallet: the projection row keeps its balance and stays
//! queryable for audit, and a `WalletDeleted` marker lands in the log.

use sqlx::PgPool;

use crate::aggregate::Wallet;
use crate::domain::{Balance, OperationContext, WalletEvent};
use crate::error::AppError;
use crate::event_store::EventStore;
use crate::projection::ProjectionService;

use super::{DeleteWalletCommand, DeleteWalletResult};

/// Handler for wallet deletion
pub struct DeleteWalletHandler {
    event_store: EventStore,
    projection: ProjectionService,
    pool: PgPool,
}

impl DeleteWalletHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            event_store: EventStore::new(pool.clone()),
            projection: ProjectionService::new(pool.clone()),
            pool,
        }
    }

    /// Execute the delete wallet command
    pub async fn execute(
        &self,
        command: DeleteWalletCommand,
        context: &OperationContext,
    ) -> Result<DeleteWalletResult, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = self
            .projection
            .lock_wallet(&mut tx, command.wallet_id)
            .await?
            .ok_or_else(|| AppError::WalletNotFound(command.wallet_id.to_string()))?;

        let balance = Balance::new(row.balance)
            .map_err(|e| AppError::Internal(format!("Corrupt projection balance: {}", e)))?;
        let wallet = Wallet::from_row(
            row.id,
            row.user_id,
            row.currency,
            balance,
            row.deleted_at,
            row.created_at,
        );

        let event = wallet.delete()?;
        let deleted_at = match &event {
            WalletEvent::WalletDeleted { created_at, .. } => *created_at,
            other => {
                return Err(AppError::Internal(format!(
                    "Unexpected event from delete: {}",
                    other.event_type()
                )))
            }
        };

        self.projection
            .mark_deleted(&mut tx, command.wallet_id, deleted_at)
            .await?;

        self.event_store.append(&mut tx, &event, context).await?;

        tx.commit().await?;

        tracing::info!(wallet_id = %command.wallet_id, "Wallet tombstoned");

        Ok(DeleteWalletResult {
            wallet_id: command.wallet_id,
            deleted_at,
        })
    }
}
