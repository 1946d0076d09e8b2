//! Login, logout and status commands.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use driveplus_core::Driveplus;
use driveplus_login::{authorization_url, code_from_redirect, generate_state, safe_format_token};

use crate::cli::args::ExchangeArgs;
use crate::styled_output::{print_dim, print_info, print_success, print_warning};

/// Print the consent URL and the state expected back.
pub fn run_login_url(app: &Driveplus) -> Result<()> {
    let state = generate_state();
    let url = authorization_url(&app.config().oauth, &state)
        .context("Failed to build the consent URL")?;

    print_info("Open this URL, approve access, then run `driveplus login exchange`:");
    println!("{url}");
    print_dim(&format!("state: {state}"));
    Ok(())
}

/// Exchange a code (given directly or inside the redirect URL) for a session.
pub async fn run_login_exchange(app: &Driveplus, args: ExchangeArgs) -> Result<()> {
    let code = match (args.code, args.redirect_url) {
        (Some(code), _) => code,
        (None, Some(redirect)) => code_from_redirect(&redirect, args.state.as_deref())
            .context("Could not read the authorization code from the redirect URL")?,
        (None, None) => anyhow::bail!("Pass --code or --redirect-url with --state"),
    };

    let session = app
        .tokens()
        .exchange_code(&code)
        .await
        .context("Login failed")?;

    print_success("Logged in.");
    if let Some(expires_at) = session.expires_at {
        print_dim(&format!("Access token expires {}", format_expiry(expires_at)));
    }
    if session.refresh_token().is_none() {
        print_warning("No refresh token was issued; you will need to log in again when the access token expires.");
    }
    Ok(())
}

pub async fn run_logout(app: &Driveplus) -> Result<()> {
    if app.tokens().logout().await.context("Failed to clear the session")? {
        print_success("Logged out.");
    } else {
        print_info("Not logged in.");
    }
    Ok(())
}

pub async fn run_status(app: &Driveplus) -> Result<()> {
    let session = app.tokens().session().await.context("Failed to read the session")?;

    let Some(token) = session.access_token() else {
        print_info("Not logged in. Run `driveplus login url` to start.");
        return Ok(());
    };

    print_success(&format!("Logged in (access token {})", safe_format_token(token)));
    match (session.expires_at, session.time_until_expiry()) {
        (Some(expires_at), Some(remaining)) if remaining > 0 => {
            print_dim(&format!("Expires {}", format_expiry(expires_at)));
        }
        (Some(expires_at), _) => {
            print_dim(&format!("Expired {}, refreshes on next use", format_expiry(expires_at)));
        }
        (None, _) => print_dim("No expiry stored, refreshes on next use"),
    }
    if session.refresh_token().is_none() {
        print_warning("No refresh token stored.");
    }
    Ok(())
}

fn format_expiry(expires_at: i64) -> String {
    DateTime::<Utc>::from_timestamp(expires_at, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("at {expires_at}"))
}
