//! Error types for driveplus-core.

use driveplus_common::ConfigError;
use driveplus_nav::NavError;
use thiserror::Error;

/// Errors raised while assembling or starting Driveplus.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Neither the config nor the platform provides a data directory.
    #[error("Could not determine a data directory; set DRIVEPLUS_HOME or data_dir")]
    NoDataDir,

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),

    /// `folder_url_base` does not produce a valid pattern.
    #[error("Invalid folder URL base: {0}")]
    FolderPattern(#[from] regex::Error),

    #[error(transparent)]
    Nav(#[from] NavError),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
