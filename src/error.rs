//! Crate-level error types.
//!
//! [`PricewatchError`] unifies every error source (configuration, HTTP,
//! JSON, storage) behind a single enum so callers can match on the variant
//! they care about while still using the `?` operator for easy propagation.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PricewatchError>;

/// Top-level error type returned by all fallible public APIs.
#[derive(Debug, thiserror::Error)]
pub enum PricewatchError {
    /// An environment variable held a value that could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    /// An HTTP request failed at the transport level or timed out.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A provider answered, but not with a usable price.
    #[error("provider error: {0}")]
    Provider(String),

    /// Reading or writing a persisted collection failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// User input rejected before reaching the core.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
