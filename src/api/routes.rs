//! API Routes
//!
//! HTTP endpoint definitions. The transport layer is a thin shim over
//! the command handlers and replay engine; it carries no ledger
//! invariants of its own.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{OperationContext, WalletEvent};
use crate::error::AppError;
use crate::event_store::EventStore;
use crate::handlers::{
    CreateWalletCommand, CreateWalletHandler, DeleteWalletCommand, DeleteWalletHandler,
    DepositCommand, DepositHandler, WithdrawCommand, WithdrawHandler,
};
use crate::projection::{ProjectionService, WalletRow};
use crate::replay::ReplayEngine;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub initial_balance: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub wallet_id: Uuid,
    pub user_id: Uuid,
    pub currency: String,
    pub balance: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<WalletRow> for WalletResponse {
    fn from(row: WalletRow) -> Self {
        Self {
            wallet_id: row.id,
            user_id: row.user_id,
            currency: row.currency,
            balance: row.balance,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WalletLookupQuery {
    #[serde(default)]
    pub wallet_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub transaction_id: Uuid,
    pub wallet_id: Uuid,
    pub amount: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub wallet_id: Uuid,
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub wallet_id: Uuid,
    pub transactions: Vec<WalletEvent>,
}

#[derive(Debug, Deserialize)]
pub struct ReplayQuery {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ReplayResponse {
    pub wallet_id: Uuid,
    pub balance: Decimal,
    pub transactions: Vec<WalletEvent>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        // Commands
        .route("/wallets", post(create_wallet))
        .route("/wallets/:wallet_id", delete(delete_wallet))
        .route("/wallets/:wallet_id/deposit", post(deposit))
        .route("/wallets/:wallet_id/withdraw", post(withdraw))
        // Queries
        .route("/wallets", get(lookup_wallet))
        .route("/wallets/:wallet_id", get(get_wallet))
        .route("/wallets/:wallet_id/balance", get(get_balance))
        .route("/wallets/:wallet_id/transactions", get(list_transactions))
        .route("/wallets/:wallet_id/replay", get(replay_events))
}

// =========================================================================
// POST /wallets
// =========================================================================

/// Create a new wallet
async fn create_wallet(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<CreateWalletRequest>,
) -> Result<(StatusCode, Json<WalletResponse>), AppError> {
    let handler = CreateWalletHandler::new(pool);

    let mut command = CreateWalletCommand::new(request.user_id);
    if let Some(currency) = request.currency {
        command = command.with_currency(currency);
    }
    if let Some(balance) = request.initial_balance {
        command = command.with_initial_balance(balance);
    }

    let result = handler.execute(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(WalletResponse {
            wallet_id: result.wallet_id,
            user_id: result.user_id,
            currency: result.currency,
            balance: result.balance,
            deleted_at: None,
            created_at: result.created_at,
        }),
    ))
}

// =========================================================================
// GET /wallets?wallet_id=&user_id=
// =========================================================================

/// Look up a wallet by wallet ID or owner user ID.
/// `wallet_id` takes precedence when both are given.
async fn lookup_wallet(
    State(pool): State<PgPool>,
    Query(query): Query<WalletLookupQuery>,
) -> Result<Json<WalletResponse>, AppError> {
    let projection = ProjectionService::new(pool);

    let row = match (query.wallet_id, query.user_id) {
        (Some(wallet_id), _) => projection.get_wallet(wallet_id).await?,
        (None, Some(user_id)) => projection.get_wallet_by_user(user_id).await?,
        (None, None) => {
            return Err(AppError::InvalidRequest(
                "Either wallet_id or user_id is required".to_string(),
            ))
        }
    };

    let row = row.ok_or_else(|| {
        let key = query
            .wallet_id
            .or(query.user_id)
            .map(|id| id.to_string())
            .unwrap_or_default();
        AppError::WalletNotFound(key)
    })?;

    Ok(Json(row.into()))
}

// =========================================================================
// GET /wallets/:wallet_id
// =========================================================================

/// Get wallet by ID
async fn get_wallet(
    State(pool): State<PgPool>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<WalletResponse>, AppError> {
    let projection = ProjectionService::new(pool);

    let row = projection
        .get_wallet(wallet_id)
        .await?
        .ok_or_else(|| AppError::WalletNotFound(wallet_id.to_string()))?;

    Ok(Json(row.into()))
}

// =========================================================================
// DELETE /wallets/:wallet_id
// =========================================================================

/// Tombstone a wallet (soft delete; the wallet stays queryable)
async fn delete_wallet(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(wallet_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let handler = DeleteWalletHandler::new(pool);

    handler
        .execute(DeleteWalletCommand { wallet_id }, &context)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// GET /wallets/:wallet_id/balance
// =========================================================================

/// Get the projected balance for a wallet.
/// This reads cached state; use the replay endpoint for recomputation.
async fn get_balance(
    State(pool): State<PgPool>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, AppError> {
    let projection = ProjectionService::new(pool);

    let balance = projection
        .get_balance(wallet_id)
        .await?
        .ok_or_else(|| AppError::WalletNotFound(wallet_id.to_string()))?;

    Ok(Json(BalanceResponse { wallet_id, balance }))
}

// =========================================================================
// POST /wallets/:wallet_id/deposit
// =========================================================================

/// Deposit funds into a wallet
async fn deposit(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(wallet_id): Path<Uuid>,
    Json(request): Json<AmountRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let handler = DepositHandler::new(pool);

    let result = handler
        .execute(DepositCommand::new(wallet_id, request.amount), &context)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            transaction_id: result.transaction_id,
            wallet_id: result.wallet_id,
            amount: result.amount,
            balance: result.balance,
        }),
    ))
}

// =========================================================================
// POST /wallets/:wallet_id/withdraw
// =========================================================================

/// Withdraw funds from a wallet
async fn withdraw(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(wallet_id): Path<Uuid>,
    Json(request): Json<AmountRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let handler = WithdrawHandler::new(pool);

    let result = handler
        .execute(WithdrawCommand::new(wallet_id, request.amount), &context)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            transaction_id: result.transaction_id,
            wallet_id: result.wallet_id,
            amount: result.amount,
            balance: result.balance,
        }),
    ))
}

// =========================================================================
// GET /wallets/:wallet_id/transactions
// =========================================================================

/// Transaction history (deposits and withdrawals only), from the log
async fn list_transactions(
    State(pool): State<PgPool>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let engine = ReplayEngine::new(EventStore::new(pool));

    let transactions = engine.list_transactions(wallet_id).await?;

    Ok(Json(TransactionsResponse {
        wallet_id,
        transactions,
    }))
}

// =========================================================================
// GET /wallets/:wallet_id/replay?from=&to=
// =========================================================================

/// Recompute balance and transactions from the event log within an
/// inclusive time window. Bounds default to the full history.
async fn replay_events(
    State(pool): State<PgPool>,
    Path(wallet_id): Path<Uuid>,
    Query(query): Query<ReplayQuery>,
) -> Result<Json<ReplayResponse>, AppError> {
    let engine = ReplayEngine::new(EventStore::new(pool));

    // Postgres rejects chrono's MIN_UTC as out of range; the epoch
    // predates any possible event, which is all the default needs
    let from = query.from.unwrap_or(DateTime::UNIX_EPOCH);
    let to = query.to.unwrap_or(DateTime::<Utc>::MAX_UTC);

    let result = engine.replay(wallet_id, from, to).await?;

    Ok(Json(ReplayResponse {
        wallet_id: result.wallet_id,
        balance: result.balance,
        transactions: result.transactions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_wallet_request_deserialize() {
        let json = r#"{
            "user_id": "550e8400-e29b-41d4-a716-446655440000"
        }"#;

        let request: CreateWalletRequest = serde_json::from_str(json).unwrap();
        assert!(request.currency.is_none());
        assert!(request.initial_balance.is_none());
    }

    #[test]
    fn test_create_wallet_request_with_seed() {
        let json = r#"{
            "user_id": "550e8400-e29b-41d4-a716-446655440000",
            "currency": "USD",
            "initial_balance": "100.00"
        }"#;

        let request: CreateWalletRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.currency, Some("USD".to_string()));
        assert_eq!(request.initial_balance, Some("100.00".to_string()));
    }

    #[test]
    fn test_replay_query_defaults() {
        let query: ReplayQuery = serde_json::from_str("{}").unwrap();
        assert!(query.from.is_none());
        assert!(query.to.is_none());
    }

    #[test]
    fn test_amount_request_deserialize() {
        let request: AmountRequest = serde_json::from_str(r#"{"amount": "42.5"}"#).unwrap();
        assert_eq!(request.amount, "42.5");
    }
}
