//! Error types for finance-calc

use thiserror::Error;

/// Calculation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Invalid characters in expression: {0}")]
    InvalidCharacters(String),

    #[error("Invalid percent usage: {0}")]
    InvalidPercentUsage(String),

    #[error("Mismatched parentheses")]
    MismatchedParentheses,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

/// Coarse classification used by callers to pick a re-prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The user typed something the calculator does not accept at all
    InputValidation,
    /// The input is made of valid symbols but cannot be evaluated
    Expression,
}

impl CalcError {
    pub fn invalid_characters(chars: impl Into<String>) -> Self {
        Self::InvalidCharacters(chars.into())
    }

    pub fn invalid_percent(msg: impl Into<String>) -> Self {
        Self::InvalidPercentUsage(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedExpression(msg.into())
    }

    pub fn invalid_number(literal: impl Into<String>) -> Self {
        Self::InvalidNumber(literal.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCharacters(_) | Self::InvalidPercentUsage(_) => ErrorKind::InputValidation,
            Self::MismatchedParentheses
            | Self::DivisionByZero
            | Self::MalformedExpression(_)
            | Self::InvalidNumber(_) => ErrorKind::Expression,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
