//! Error types for shift-engine operations.

use thiserror::Error;

use crate::model::RequestStatus;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A submission or rule edit was missing required data. No store mutation
    /// is attempted when this is returned.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store read error: {0}")]
    StoreRead(String),

    #[error("Store write error: {0}")]
    StoreWrite(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot {action} a request that is {from}")]
    InvalidTransition {
        from: RequestStatus,
        action: &'static str,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
