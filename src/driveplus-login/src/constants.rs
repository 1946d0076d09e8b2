//! Constants for the driveplus-login module.

/// Path of the authorization-code exchange endpoint on the token API.
pub const TOKEN_EXCHANGE_PATH: &str = "/api/auth/token";

/// Path of the refresh endpoint on the token API.
pub const TOKEN_REFRESH_PATH: &str = "/api/auth/refresh";

/// Default window before expiry in which an access token is refreshed.
pub const DEFAULT_REFRESH_SKEW_SECS: i64 = 60;

/// Length of the generated OAuth `state` parameter.
pub const STATE_LEN: usize = 12;
