//! Key-value client interface used by the profile store.
use async_trait::async_trait;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Backend errors (transport/command).
///
/// Kept independent from `AppError`: the role resolver treats these as "default to STAFF",
/// the profile endpoints surface them as a generic 500.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// A minimal string key-value interface.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Get UTF-8 string value.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Overwrite the value stored at `key`.
    async fn set_string(&self, key: &str, value: &str) -> CacheResult<()>;
}
