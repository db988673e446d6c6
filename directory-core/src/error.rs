use crate::models::UserId;
use crate::validation::ValidationError;
use thiserror::Error;

/// Failure reported by a store adapter (relational, cache or event log).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

/// Errors surfaced by [`crate::UserService`] to its callers.
///
/// Cache and event-log failures never appear here; they are reported to the
/// [`crate::SideEffectMonitor`] instead.
#[derive(Error, Debug)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("user {0} not found")]
    NotFound(UserId),

    #[error("transaction failed: {0}")]
    Transaction(#[source] StoreError),

    #[error("repository error: {0}")]
    Store(#[source] StoreError),
}

impl UserError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UserError::NotFound(_))
    }

    /// Stable machine-readable code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            UserError::Validation(_) => "VALIDATION_1001",
            UserError::NotFound(_) => "USER_2001",
            UserError::Transaction(_) => "DB_4002",
            UserError::Store(_) => "DB_4001",
        }
    }
}

pub type Result<T> = std::result::Result<T, UserError>;
