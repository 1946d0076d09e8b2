//! Common utilities shared across Driveplus crates.

pub mod config;
pub mod dirs;
pub mod http_client;

pub use config::{ConfigError, DriveplusConfig, OAuthConfig};
pub use dirs::{SESSION_FILE_NAME, data_dir, session_path};
pub use http_client::{
    DEFAULT_TIMEOUT, POOL_IDLE_TIMEOUT, USER_AGENT, create_client_builder,
    create_client_with_timeout, create_default_client,
};
