//! Wallet Creation Handler
//!
//! Handles wallet creation: inserts the projection row and appends the
//! `WalletCreated` event in one transaction.

use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::aggregate::{Aggregate, Wallet};
use crate::domain::{Balance, OperationContext};
use crate::error::AppError;
use crate::event_store::EventStore;
use crate::projection::ProjectionService;

use super::{CreateWalletCommand, CreateWalletResult, DEFAULT_CURRENCY};

/// Handler for wallet creation
pub struct CreateWalletHandler {
    event_store: EventStore,
    projection: ProjectionService,
    pool: PgPool,
}

impl CreateWalletHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            event_store: EventStore::new(pool.clone()),
            projection: ProjectionService::new(pool.clone()),
            pool,
        }
    }

    /// Execute the create wallet command
    pub async fn execute(
        &self,
        command: CreateWalletCommand,
        context: &OperationContext,
    ) -> Result<CreateWalletResult, AppError> {
        // Validate the seed balance before any store I/O
        let seed = match command.initial_balance {
            Some(raw) => {
                let value = rust_decimal::Decimal::from_str(&raw).map_err(|e| {
                    AppError::InvalidRequest(format!("Invalid initial balance: {}", e))
                })?;
                Balance::new(value).map_err(|e| {
                    AppError::InvalidRequest(format!("Invalid initial balance: {}", e))
                })?
            }
            None => Balance::zero(),
        };

        let currency = command
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let mut tx = self.pool.begin().await?;

        // One wallet per user; a racing second create loses on the
        // unique index even if it passes this check
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM wallets WHERE user_id = $1")
                .bind(command.user_id)
                .fetch_optional(&mut *tx)
                .await?;

        if existing.is_some() {
            return Err(AppError::DuplicateWallet(command.user_id.to_string()));
        }

        let wallet_id = Uuid::new_v4();
        let (wallet, event) = Wallet::create(wallet_id, command.user_id, currency, seed);

        let created_at = wallet
            .created_at()
            .ok_or_else(|| AppError::Internal("Wallet missing creation time".to_string()))?;

        self.projection
            .insert_wallet(
                &mut tx,
                wallet.id(),
                wallet.user_id(),
                wallet.currency(),
                wallet.balance().value(),
                created_at,
            )
            .await?;

        self.event_store.append(&mut tx, &event, context).await?;

        tx.commit().await?;

        tracing::info!(
            wallet_id = %wallet.id(),
            user_id = %wallet.user_id(),
            "Wallet created"
        );

        Ok(CreateWalletResult {
            wallet_id: wallet.id(),
            user_id: wallet.user_id(),
            currency: wallet.currency().to_string(),
            balance: wallet.balance().value(),
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_currency_applied() {
        let cmd = CreateWalletCommand::new(Uuid::new_v4());
        let currency = cmd.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        assert_eq!(currency, "IRR");
    }
}
