//! Driveplus Login - OAuth session handling for Driveplus.
//!
//! Provides:
//! - Session storage behind the [`SessionStore`] trait (JSON file or in-memory)
//! - [`TokenProvider`], which returns valid access tokens and refreshes them
//!   through the token API with at most one refresh in flight
//! - Authorization-code helpers for the login flow
//!
//! Security features:
//! - Tokens held in memory with the secrecy crate
//! - Session file permissions enforced (0600)

// Core modules
pub mod constants;
pub mod error;
pub mod types;
mod utils;

// Storage backends
mod storage;

// Token lifecycle
mod token;

// Authentication flow
pub mod flow;

pub use constants::{DEFAULT_REFRESH_SKEW_SECS, TOKEN_EXCHANGE_PATH, TOKEN_REFRESH_PATH};
pub use error::{AuthError, Result, StoreError};
pub use flow::{authorization_url, code_from_redirect, generate_state};
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore};
pub use token::TokenProvider;
pub use types::Session;
pub use utils::safe_format_token;
