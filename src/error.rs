// src/error.rs
//! Error taxonomy for the hiring workflow

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Missing or malformed input, including an absent upstream payload.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("backend request failed ({status}): {message}")]
    Network { status: u16, message: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid transition for {entity}: {from} -> {to}")]
    InvalidTransition {
        entity: String,
        from: String,
        to: String,
    },

    #[error("step {attempted} cannot be completed while on {current}")]
    OutOfOrder { current: String, attempted: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("operation cancelled: {0}")]
    Cancelled(String),
}

impl WorkflowError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Network failure with no HTTP status (connection refused, timeout, bad body).
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Network {
            status: 0,
            message: msg.into(),
        }
    }

    /// Whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Cancelled(_))
    }
}

impl From<reqwest::Error> for WorkflowError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            message: err.to_string(),
        }
    }
}
