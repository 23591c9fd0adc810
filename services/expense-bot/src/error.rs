//! Error types for the expense assistant

use finance_calc::CalcError;
use finance_state::StoreError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, BotError>;

/// Failures of one user turn
///
/// Validation, expression and state errors are answered with a corrective
/// prompt and never touch persisted state. Storage and ledger errors are
/// reported as a generic retryable failure.
#[derive(Debug, Error)]
pub enum BotError {
    /// Malformed user input (date, empty note, unknown category)
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Expression error: {0}")]
    Expression(#[from] CalcError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Input that the current step does not accept, or no entry in progress
    #[error("Unexpected input: {0}")]
    State(String),

    /// Ledger or category catalog failure
    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BotError {
    pub fn validation(msg: impl Into<String>) -> Self {
        BotError::Validation(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        BotError::State(msg.into())
    }

    pub fn ledger(msg: impl Into<String>) -> Self {
        BotError::Ledger(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        BotError::Config(msg.into())
    }

    /// Whether repeating the same action may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, BotError::Storage(_) | BotError::Ledger(_))
    }

    /// Errors caused by what the user typed or pressed
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            BotError::Validation(_) | BotError::Expression(_) | BotError::State(_)
        )
    }
}

impl From<common::Error> for BotError {
    fn from(err: common::Error) -> Self {
        BotError::Config(err.to_string())
    }
}
