//! Driveplus configuration.
//!
//! Loaded from a TOML file or from `DRIVEPLUS_*` environment variables on
//! top of built-in defaults. Every field has a default, so an empty file is
//! a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default base URL of the token exchange/refresh API.
pub const DEFAULT_TOKEN_API_URL: &str = "https://driveplusplustokenapi.collin22.dev";

/// Default base URL of the file-provider metadata API.
pub const DEFAULT_DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";

/// Default base URL of the file-provider upload API.
pub const DEFAULT_DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Reserved name of the per-folder metadata document.
pub const DEFAULT_METADATA_FILE_NAME: &str = "drive++meta.json";

/// Origin of the folder-view pages.
pub const DEFAULT_FOLDER_URL_BASE: &str = "https://drive.google.com";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An environment override holds an unusable value.
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveplusConfig {
    /// Base URL hosting `/api/auth/token` and `/api/auth/refresh`.
    pub token_api_url: String,

    /// Base URL hosting `/files`.
    pub drive_api_url: String,

    /// Base URL hosting the `/files` upload endpoints.
    pub drive_upload_url: String,

    /// Name of the metadata document stored in each folder.
    pub metadata_file_name: String,

    /// Origin of folder-view URLs, e.g. `https://drive.google.com`.
    pub folder_url_base: String,

    /// Refresh access tokens expiring within this many seconds.
    pub refresh_skew_secs: i64,

    /// Coalescing window for navigation signals in milliseconds (0 disables it).
    pub navigation_debounce_ms: u64,

    /// Override for the session directory.
    pub data_dir: Option<PathBuf>,

    /// OAuth consent-screen parameters.
    pub oauth: OAuthConfig,
}

impl Default for DriveplusConfig {
    fn default() -> Self {
        Self {
            token_api_url: DEFAULT_TOKEN_API_URL.to_string(),
            drive_api_url: DEFAULT_DRIVE_API_URL.to_string(),
            drive_upload_url: DEFAULT_DRIVE_UPLOAD_URL.to_string(),
            metadata_file_name: DEFAULT_METADATA_FILE_NAME.to_string(),
            folder_url_base: DEFAULT_FOLDER_URL_BASE.to_string(),
            refresh_skew_secs: 60,
            navigation_debounce_ms: 50,
            data_dir: None,
            oauth: OAuthConfig::default(),
        }
    }
}

/// OAuth authorization-code parameters for the consent screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Client registered with the provider.
    pub client_id: String,
    /// Redirect target receiving `?code=...&state=...`.
    pub redirect_uri: String,
    /// Consent-screen endpoint.
    pub authorize_url: String,
    /// Space-separated scopes.
    pub scope: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: "847025199863-7a24hn6s8mle7legvvfgs3hkcr1aiel8.apps.googleusercontent.com"
                .to_string(),
            redirect_uri: "https://nhimlmlbpdkjaefoniielbgghbnljgid.chromiumapp.org".to_string(),
            authorize_url: "https://accounts.google.com/o/oauth2/auth".to_string(),
            scope: "https://www.googleapis.com/auth/drive".to_string(),
        }
    }
}

impl DriveplusConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DRIVEPLUS_TOKEN_API_URL") {
            config.token_api_url = url;
        }

        if let Ok(url) = std::env::var("DRIVEPLUS_DRIVE_API_URL") {
            config.drive_api_url = url;
        }

        if let Ok(url) = std::env::var("DRIVEPLUS_DRIVE_UPLOAD_URL") {
            config.drive_upload_url = url;
        }

        if let Ok(dir) = std::env::var("DRIVEPLUS_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(ms) = std::env::var("DRIVEPLUS_DEBOUNCE_MS") {
            config.navigation_debounce_ms =
                ms.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: "DRIVEPLUS_DEBOUNCE_MS",
                    value: ms.clone(),
                })?;
        }

        Ok(config)
    }

    /// Load from `path` when given, otherwise from the environment.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::from_env(),
        }
    }
}
