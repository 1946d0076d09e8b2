//! Error types for driveplus-nav.

use thiserror::Error;

/// Navigation watcher errors.
#[derive(Debug, Error)]
pub enum NavError {
    /// The watcher was started outside a tokio runtime.
    #[error("Navigation watcher requires a running tokio runtime")]
    NoRuntime,
}

/// Result type for navigation operations.
pub type Result<T> = std::result::Result<T, NavError>;
