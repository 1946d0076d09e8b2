//! Access-token lifecycle: validity checks, refresh and code exchange.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_REFRESH_SKEW_SECS, TOKEN_EXCHANGE_PATH, TOKEN_REFRESH_PATH};
use crate::error::{AuthError, Result};
use crate::storage::SessionStore;
use crate::types::{ExchangeResponse, RefreshResponse, Session};

type SharedRefresh = Shared<BoxFuture<'static, Result<String>>>;

/// Hands out valid access tokens, refreshing them through the token API
/// when they are expired or about to expire.
///
/// At most one refresh request is in flight at a time: callers arriving
/// while a refresh is pending await that refresh and share its outcome.
pub struct TokenProvider {
    store: Arc<dyn SessionStore>,
    client: reqwest::Client,
    token_api_url: String,
    refresh_skew_secs: i64,
    inflight: tokio::sync::Mutex<Option<SharedRefresh>>,
}

impl TokenProvider {
    /// Create a provider backed by `store`, talking to the token API at `token_api_url`.
    pub fn new(
        store: Arc<dyn SessionStore>,
        client: reqwest::Client,
        token_api_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            client,
            token_api_url: token_api_url.into(),
            refresh_skew_secs: DEFAULT_REFRESH_SKEW_SECS,
            inflight: tokio::sync::Mutex::new(None),
        }
    }

    /// Override how long before expiry a token is refreshed.
    pub fn with_refresh_skew(mut self, secs: i64) -> Self {
        self.refresh_skew_secs = secs;
        self
    }

    /// The backing session store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.token_api_url.trim_end_matches('/'), path)
    }

    /// Return a usable access token.
    ///
    /// `Ok(None)` means nobody is logged in. A failed refresh leaves the
    /// stored session as it was so a later call can retry.
    pub async fn get_valid_access_token(&self) -> Result<Option<String>> {
        let session = self.store.load().await?;

        let Some(token) = session.access_token() else {
            debug!("No access token stored");
            return Ok(None);
        };

        if !session.expires_within(self.refresh_skew_secs) {
            return Ok(Some(token.to_string()));
        }

        debug!(
            expires_at = ?session.expires_at,
            "Access token expired or expiring soon, refreshing"
        );
        self.refresh_single_flight().await
    }

    async fn refresh_single_flight(&self) -> Result<Option<String>> {
        let refresh = {
            let mut slot = self.inflight.lock().await;
            let pending = slot
                .as_ref()
                .filter(|refresh| refresh.peek().is_none())
                .cloned();

            match pending {
                Some(pending) => {
                    debug!("Joining in-flight token refresh");
                    pending
                }
                None => {
                    // Another caller may have finished a refresh since our first load.
                    let session = self.store.load().await?;
                    let Some(token) = session.access_token() else {
                        return Ok(None);
                    };
                    if !session.expires_within(self.refresh_skew_secs) {
                        return Ok(Some(token.to_string()));
                    }
                    let Some(refresh_token) = session.refresh_token() else {
                        warn!("Access token expired and no refresh token is stored");
                        return Err(AuthError::MissingRefreshToken);
                    };

                    let refresh = request_refresh(
                        self.client.clone(),
                        self.endpoint(TOKEN_REFRESH_PATH),
                        Arc::clone(&self.store),
                        refresh_token.to_string(),
                    )
                    .boxed()
                    .shared();
                    *slot = Some(refresh.clone());
                    refresh
                }
            }
        };

        refresh.await.map(Some)
    }

    /// Exchange an OAuth authorization code for a session and store it.
    pub async fn exchange_code(&self, code: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.endpoint(TOKEN_EXCHANGE_PATH))
            .json(&serde_json::json!({ "code": code }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Authorization code exchange failed");
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                body,
            });
        }

        let exchanged: ExchangeResponse = response.json().await?;
        let (Some(access_token), Some(expires_at)) = (exchanged.access_token, exchanged.expires_at)
        else {
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                body: "response carried no access token or expiry".to_string(),
            });
        };

        let session = Session::new(access_token, exchanged.refresh_token, expires_at);
        self.store.save(&session).await?;
        info!(expires_at, "Logged in");
        Ok(session)
    }

    /// Whether an access token is stored. Never touches the network.
    pub async fn is_authenticated(&self) -> bool {
        match self.store.load().await {
            Ok(session) => session.access_token().is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read session");
                false
            }
        }
    }

    /// The stored session.
    pub async fn session(&self) -> Result<Session> {
        Ok(self.store.load().await?)
    }

    /// Forget the stored session.
    pub async fn logout(&self) -> Result<bool> {
        let removed = self.store.clear().await?;
        info!(removed, "Logged out");
        Ok(removed)
    }
}

async fn request_refresh(
    client: reqwest::Client,
    url: String,
    store: Arc<dyn SessionStore>,
    refresh_token: String,
) -> Result<String> {
    let response = client
        .post(&url)
        .json(&serde_json::json!({ "refresh_token": refresh_token }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "Token refresh request failed");
        return Err(AuthError::Refresh {
            status: status.as_u16(),
            body,
        });
    }

    let refreshed: RefreshResponse = response.json().await?;
    store
        .save_tokens(&refreshed.access_token, refreshed.expires_at)
        .await?;

    info!(expires_at = refreshed.expires_at, "Access token refreshed");
    Ok(refreshed.access_token)
}
