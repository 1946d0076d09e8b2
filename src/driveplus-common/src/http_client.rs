//! Centralized HTTP client factory for all Driveplus services.
//!
//! Every remote call (token API and file provider) goes through a client
//! built here, so they share the User-Agent and transport timeouts. No other
//! timeouts are applied on top of these.

use reqwest::Client;
use std::time::Duration;

/// User-Agent string for all HTTP requests
pub const USER_AGENT: &str = concat!("driveplus/", env!("CARGO_PKG_VERSION"));

/// Default timeout for API requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection pool idle timeout so DNS is re-resolved periodically.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Creates an HTTP client with default configuration (30s timeout).
pub fn create_default_client() -> Result<Client, String> {
    create_client_with_timeout(DEFAULT_TIMEOUT)
}

/// Creates an HTTP client with a custom timeout.
///
/// The read timeout is capped at 60 seconds to avoid hangs on truncated bodies.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client, String> {
    let read_timeout = timeout.min(Duration::from_secs(60));

    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .read_timeout(read_timeout)
        .tcp_nodelay(true)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {e}"))
}

/// Creates an HTTP client builder with standard configuration.
///
/// Use this when the client needs further customization before building.
pub fn create_client_builder() -> reqwest::ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(DEFAULT_TIMEOUT)
        .read_timeout(DEFAULT_TIMEOUT)
        .tcp_nodelay(true)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(4)
}
