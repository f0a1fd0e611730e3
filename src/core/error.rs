use crate::modules::purchase_orders::models::OrderStatus;

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Malformed input (negative quantity, discount above subtotal, non-numeric money)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The entity's lifecycle state forbids the operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Requested status change is not in the transition table
    #[error("Invalid status transition from {current} to {requested}")]
    InvalidTransition {
        current: OrderStatus,
        requested: OrderStatus,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transaction or constraint failure reported by the backing store
    #[error("Storage error: {0}")]
    Storage(String),

    /// Raw driver errors (pool creation, migrations)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Permission check failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        AppError::InvalidState(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        AppError::Storage(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    /// Storage failures may succeed on a second attempt; everything else
    /// needs the caller to change its input first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Storage(_) | AppError::Database(_))
    }
}
