use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MarksError>;

/// Errors raised by the marks ingestion core.
#[derive(Debug, Error)]
pub enum MarksError {
    /// Client-supplied submission failed validation. Never reaches a store.
    #[error("{reason}")]
    Validation { reason: String },

    #[error("embedding failed: {reason}")]
    Embedding { reason: String },

    #[error("vector index upsert failed: {reason}")]
    VectorIndex { reason: String },

    #[error("document store error: {reason}")]
    Store { reason: String },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MarksError {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub(crate) fn store(reason: impl Into<String>) -> Self {
        Self::Store {
            reason: reason.into(),
        }
    }

    /// True when the error was caused by the submitting client.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
