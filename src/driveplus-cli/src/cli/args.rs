//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages
    Info,
    /// Show debug messages and above
    Debug,
    /// Show everything
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Driveplus - bookmark links attached to cloud folders
#[derive(Debug, Parser)]
#[command(name = "driveplus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML). Defaults plus DRIVEPLUS_* variables when omitted.
    #[arg(short, long, global = true, env = "DRIVEPLUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level; RUST_LOG takes precedence when set
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in through the OAuth consent screen
    #[command(subcommand)]
    Login(LoginCommand),

    /// Forget the stored session
    Logout,

    /// Show whether a session is stored and when it expires
    Status,

    /// Manage a folder's links
    #[command(subcommand)]
    Links(LinksCommand),

    /// Follow a simulated page driven by commands on stdin
    Watch(WatchArgs),
}

#[derive(Debug, Subcommand)]
pub enum LoginCommand {
    /// Print the consent URL and the state to pass to `login exchange`
    Url,

    /// Exchange an authorization code for a session
    Exchange(ExchangeArgs),
}

#[derive(Debug, Args)]
pub struct ExchangeArgs {
    /// The authorization code
    #[arg(long, required_unless_present = "redirect_url", conflicts_with = "redirect_url")]
    pub code: Option<String>,

    /// The full redirect URL the provider sent the browser to
    #[arg(long, requires = "state")]
    pub redirect_url: Option<String>,

    /// State printed by `login url`
    #[arg(long, requires = "redirect_url")]
    pub state: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum LinksCommand {
    /// List the folder's links
    List {
        /// Folder id or folder-view URL
        folder: String,
        /// Print JSON instead of a numbered list
        #[arg(long)]
        json: bool,
    },

    /// Append a link
    Add {
        /// Folder id or folder-view URL
        folder: String,
        /// Link to add
        url: String,
    },

    /// Remove the link at a position (0-based, as shown by `links list`)
    Remove {
        /// Folder id or folder-view URL
        folder: String,
        index: usize,
    },
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Initial page URL
    #[arg(long, default_value = "https://drive.google.com/drive/u/0/my-drive")]
    pub url: String,
}
