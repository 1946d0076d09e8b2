//! Session type definitions.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// OAuth session held by a [`SessionStore`](crate::SessionStore).
///
/// Token strings are kept behind [`SecretString`] so they never show up in
/// `Debug` output or logs. A session with an access token but no expiry is
/// treated as expired.
#[derive(Debug, Default)]
pub struct Session {
    access_token: Option<SecretString>,
    refresh_token: Option<SecretString>,
    /// Access-token expiry as unix seconds.
    pub expires_at: Option<i64>,
}

impl Session {
    /// Create a session from a login exchange.
    pub fn new(access_token: String, refresh_token: Option<String>, expires_at: i64) -> Self {
        Self {
            access_token: Some(SecretString::from(access_token)),
            refresh_token: refresh_token.map(SecretString::from),
            expires_at: Some(expires_at),
        }
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.expires_at.is_none()
    }

    /// The access token, if any (exposes the secret - use sparingly).
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_ref().map(|s| s.expose_secret())
    }

    /// The refresh token, if any.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(|s| s.expose_secret())
    }

    /// Replace the access token and its expiry together, keeping the refresh token.
    pub fn set_access_token(&mut self, access_token: &str, expires_at: i64) {
        self.access_token = Some(SecretString::from(access_token));
        self.expires_at = Some(expires_at);
    }

    /// Whether the access token is expired or expires within `skew_secs`.
    pub fn expires_within(&self, skew_secs: i64) -> bool {
        self.expires_within_at(skew_secs, chrono::Utc::now().timestamp())
    }

    pub(crate) fn expires_within_at(&self, skew_secs: i64, now: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now + skew_secs,
            None => true,
        }
    }

    /// Seconds until the access token expires.
    pub fn time_until_expiry(&self) -> Option<i64> {
        self.expires_at
            .map(|exp| exp - chrono::Utc::now().timestamp())
    }

    pub(crate) fn to_stored(&self) -> StoredSession {
        StoredSession {
            access_token: self.access_token().map(str::to_string),
            refresh_token: self.refresh_token().map(str::to_string),
            expires_at: self.expires_at,
        }
    }

    pub(crate) fn from_stored(stored: StoredSession) -> Self {
        Self {
            access_token: stored.access_token.map(SecretString::from),
            refresh_token: stored.refresh_token.map(SecretString::from),
            expires_at: stored.expires_at,
        }
    }
}

/// On-disk session format, keyed like the browser storage it replaces.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredSession {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Body returned by the code-exchange endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExchangeResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
}

/// Body returned by the refresh endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub access_token: String,
    pub expires_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_accessors() {
        let session = Session::new("access".to_string(), Some("refresh".to_string()), 100);
        assert_eq!(session.access_token(), Some("access"));
        assert_eq!(session.refresh_token(), Some("refresh"));
        assert_eq!(session.expires_at, Some(100));
        assert!(!session.is_empty());
    }

    #[test]
    fn test_expires_within() {
        let session = Session::new("a".to_string(), None, 1_000);
        assert!(!session.expires_within_at(60, 900));
        assert!(session.expires_within_at(60, 940));
        assert!(session.expires_within_at(60, 2_000));
    }

    #[test]
    fn test_missing_expiry_counts_as_expired() {
        let mut session = Session::default();
        session.access_token = Some(SecretString::from("a"));
        assert!(session.expires_within_at(60, 0));
    }

    #[test]
    fn test_set_access_token_keeps_refresh_token() {
        let mut session = Session::new("old".to_string(), Some("keep".to_string()), 1);
        session.set_access_token("new", 5_000);
        assert_eq!(session.access_token(), Some("new"));
        assert_eq!(session.refresh_token(), Some("keep"));
        assert_eq!(session.expires_at, Some(5_000));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let session = Session::new("super-secret".to_string(), None, 1);
        assert!(!format!("{session:?}").contains("super-secret"));
    }

    #[test]
    fn test_stored_format_uses_storage_keys() {
        let session = Session::new("a".to_string(), Some("r".to_string()), 7);
        let json = serde_json::to_value(session.to_stored()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"accessToken": "a", "refreshToken": "r", "expiresAt": 7})
        );
    }
}
