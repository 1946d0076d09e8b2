//! Command dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use driveplus_common::DriveplusConfig;
use driveplus_core::Driveplus;
use tracing::debug;

use crate::cli::args::{Cli, Commands, LoginCommand};
use crate::{links_cmd, login_cmd, watch_cmd};

/// Load configuration for this invocation.
pub fn load_config(cli: &Cli) -> Result<DriveplusConfig> {
    let config = DriveplusConfig::load_or_default(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Invalid DRIVEPLUS_* environment configuration".to_string(),
        }
    })?;
    debug!(?config, "Configuration loaded");
    Ok(config)
}

/// Run the parsed command.
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let app = Arc::new(Driveplus::from_config(config).context("Failed to initialize Driveplus")?);

    match cli.command {
        Commands::Login(LoginCommand::Url) => login_cmd::run_login_url(&app),
        Commands::Login(LoginCommand::Exchange(args)) => {
            login_cmd::run_login_exchange(&app, args).await
        }
        Commands::Logout => login_cmd::run_logout(&app).await,
        Commands::Status => login_cmd::run_status(&app).await,
        Commands::Links(command) => links_cmd::run_links(&app, command).await,
        Commands::Watch(args) => watch_cmd::run_watch(app, args).await,
    }
}
