//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Business-rule violations and domain invariant failures.
/// Independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid amount (zero, negative, or exceeds limit)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Insufficient funds for a withdrawal
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    /// A wallet already exists for this identifier
    #[error("Wallet already exists: {0}")]
    DuplicateWallet(String),

    /// Wallet not found
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    /// Wallet has been tombstoned; no further transactions allowed
    #[error("Wallet is deleted: {0}")]
    WalletDeleted(String),

    /// Unrecognized event discriminant encountered during replay
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    ) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InsufficientFunds { .. }
                | Self::DuplicateWallet(_)
                | Self::WalletDeleted(_)
        )
    }
}

impl From<crate::domain::AmountError> for DomainError {
    fn from(err: crate::domain::AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_insufficient_funds_error() {
        let err = DomainError::insufficient_funds(Decimal::new(100, 0), Decimal::new(50, 0));

        assert!(err.is_client_error());
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_unknown_event_type_is_not_client_error() {
        let err = DomainError::UnknownEventType("WalletExploded".to_string());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_not_found_is_not_client_error() {
        let err = DomainError::WalletNotFound("abc".to_string());
        assert!(!err.is_client_error());
    }
}
