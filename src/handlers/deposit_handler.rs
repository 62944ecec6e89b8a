//! Deposit Handler
//!
//! Credits a wallet and appends the `Deposited` event in one transaction.

use sqlx::PgPool;

use crate::aggregate::Wallet;
use crate::domain::{Amount, Balance, OperationContext};
use crate::error::AppError;
use crate::event_store::EventStore;
use crate::projection::ProjectionService;

use super::{DepositCommand, TransactionResult};

/// Handler for deposits
pub struct DepositHandler {
    event_store: EventStore,
    projection: ProjectionService,
    pool: PgPool,
}

impl DepositHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            event_store: EventStore::new(pool.clone()),
            projection: ProjectionService::new(pool.clone()),
            pool,
        }
    }

    /// Execute the deposit command
    pub async fn execute(
        &self,
        command: DepositCommand,
        context: &OperationContext,
    ) -> Result<TransactionResult, AppError> {
        // Amount validation happens before any store I/O
        let amount: Amount = command
            .amount
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid amount: {}", e)))?;

        let mut tx = self.pool.begin().await?;

        // Row lock serializes commands against this wallet for the
        // duration of the transaction
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

        let event = wallet.deposit(&amount)?;

        let new_balance = self
            .projection
            .credit_balance(&mut tx, command.wallet_id, amount.value())
            .await?;

        self.event_store.append(&mut tx, &event, context).await?;

        tx.commit().await?;

        let transaction_id = event
            .transaction_id()
            .ok_or_else(|| AppError::Internal("Deposited event missing transaction id".to_string()))?;

        tracing::info!(
            wallet_id = %command.wallet_id,
            transaction_id = %transaction_id,
            amount = %amount,
            "Deposit applied"
        );

        Ok(TransactionResult {
            transaction_id,
            wallet_id: command.wallet_id,
            amount: amount.value(),
            balance: new_balance,
        })
    }
}
