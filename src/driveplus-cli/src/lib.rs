//! Driveplus CLI library.
//!
//! Command implementations behind the `driveplus` binary:
//! - `login url` / `login exchange` / `logout` / `status`
//! - `links list|add|remove`
//! - `watch`, a simulated folder view driven from stdin

pub mod cli;
pub mod links_cmd;
pub mod login_cmd;
pub mod styled_output;
pub mod watch_cmd;
