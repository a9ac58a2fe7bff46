//! Error types for InstaTip
//!
//! Every validation failure is detected before any state is touched and is
//! surfaced to the caller as one of these variants.

use crate::Amount;
use thiserror::Error;

/// Result type for InstaTip operations
pub type Result<T> = std::result::Result<T, InstaTipError>;

/// InstaTip error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstaTipError {
    // ========================================================================
    // Session Errors
    // ========================================================================

    /// Owner address missing or empty
    #[error("Invalid owner: address must not be empty")]
    InvalidOwner,

    /// No session is open, or the current one is no longer active
    #[error("No active session")]
    NoActiveSession,

    /// Requested allowance is negative or above the configured ceiling
    #[error("Invalid allowance {requested}: {reason}")]
    InvalidAllowance { requested: Amount, reason: String },

    /// Session id does not match the current session
    #[error("Unknown session {session_id}")]
    UnknownSession { session_id: String },

    // ========================================================================
    // Transfer Errors
    // ========================================================================

    /// Amount is zero, negative or not a finite number
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Admitting the transfer would push spent over the allowance
    #[error("Allowance exceeded: requested {requested}, spent {spent} of {allowance}")]
    AllowanceExceeded {
        requested: Amount,
        spent: Amount,
        allowance: Amount,
    },

    // ========================================================================
    // Settlement Errors
    // ========================================================================

    /// Session has already been settled
    #[error("Session {session_id} has already been settled")]
    AlreadySettled { session_id: String },

    /// External settlement call failed; the session is untouched
    #[error("Settlement of session {session_id} failed: {reason}")]
    SettlementFailed { session_id: String, reason: String },

    // ========================================================================
    // Query Errors
    // ========================================================================

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
}

impl InstaTipError {
    /// Create an invalid amount error
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            reason: reason.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Only a failed external settlement may be retried with the same input
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::SettlementFailed { .. })
    }

    /// Get an error code for surfacing to callers
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidOwner => "INVALID_OWNER",
            Self::NoActiveSession => "NO_ACTIVE_SESSION",
            Self::InvalidAllowance { .. } => "INVALID_ALLOWANCE",
            Self::UnknownSession { .. } => "UNKNOWN_SESSION",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::AllowanceExceeded { .. } => "ALLOWANCE_EXCEEDED",
            Self::AlreadySettled { .. } => "ALREADY_SETTLED",
            Self::SettlementFailed { .. } => "SETTLEMENT_FAILED",
            Self::NotFound { .. } => "NOT_FOUND",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(InstaTipError::NoActiveSession.error_code(), "NO_ACTIVE_SESSION");
        assert_eq!(
            InstaTipError::not_found("tip", "tip_1").error_code(),
            "NOT_FOUND"
        );
    }

    #[test]
    fn test_only_settlement_failure_is_retriable() {
        let failed = InstaTipError::SettlementFailed {
            session_id: "s".to_string(),
            reason: "timeout".to_string(),
        };
        assert!(failed.is_retriable());
        assert!(!InstaTipError::InvalidOwner.is_retriable());
        assert!(!InstaTipError::AlreadySettled {
            session_id: "s".to_string()
        }
        .is_retriable());
    }

    #[test]
    fn test_not_found_message() {
        let err = InstaTipError::not_found("transaction", "tx_42");
        assert_eq!(err.to_string(), "transaction tx_42 not found");
    }
}
