//! Driveplus Drive - per-folder link lists stored as a JSON document.
//!
//! [`MetadataStore`] treats one reserved JSON file per folder as a
//! key-value slot on top of [`DriveClient`], which speaks the file
//! provider's query/read/create/update/delete API.

mod client;
mod error;
mod model;
pub mod multipart;
mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::DriveClient;
pub use error::{DriveError, Result};
pub use model::{LinkEntry, RemoteFile};
pub use store::{MetadataStore, SetOutcome};
