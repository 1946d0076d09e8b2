//! Authorization-code login flow helpers.
//!
//! The interactive part (opening the consent page, receiving the redirect)
//! belongs to the caller. These helpers build the consent URL and pull the
//! authorization code out of the redirect; [`TokenProvider::exchange_code`]
//! turns the code into a stored session.
//!
//! [`TokenProvider::exchange_code`]: crate::TokenProvider::exchange_code

use driveplus_common::OAuthConfig;
use rand::Rng;
use rand::distr::Alphanumeric;
use url::Url;

use crate::constants::STATE_LEN;
use crate::error::{AuthError, Result};

/// Generate a random `state` value for the consent request.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

/// Build the provider consent URL requesting an offline (refreshable) code.
pub fn authorization_url(oauth: &OAuthConfig, state: &str) -> Result<Url> {
    let mut url = Url::parse(&oauth.authorize_url)
        .map_err(|e| AuthError::InvalidRedirect(format!("authorize_url: {e}")))?;

    url.query_pairs_mut()
        .append_pair("state", state)
        .append_pair("client_id", &oauth.client_id)
        .append_pair("redirect_uri", &oauth.redirect_uri)
        .append_pair("scope", &oauth.scope)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("include_granted_scopes", "true")
        .append_pair("prompt", "consent");

    Ok(url)
}

/// Extract the authorization code from the provider redirect.
///
/// When `expected_state` is given the redirect must carry the same value.
pub fn code_from_redirect(redirect_url: &str, expected_state: Option<&str>) -> Result<String> {
    let url = Url::parse(redirect_url).map_err(|e| AuthError::InvalidRedirect(e.to_string()))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(AuthError::InvalidRedirect(format!("provider returned {error}")));
    }

    if let Some(expected) = expected_state
        && state.as_deref() != Some(expected)
    {
        return Err(AuthError::StateMismatch);
    }

    code.filter(|c| !c.is_empty())
        .ok_or_else(|| AuthError::InvalidRedirect("no code found".to_string()))
}
