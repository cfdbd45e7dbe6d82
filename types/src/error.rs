//! Validation errors raised while parsing boundary values.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("unknown vote choice: {0}")]
    UnknownChoice(String),

    #[error("unknown proposal status: {0}")]
    UnknownStatus(String),
}
