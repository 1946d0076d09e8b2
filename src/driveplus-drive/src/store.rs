//! Per-folder metadata document used as a key-value slot.
//!
//! Each folder holds at most one document named by the reserved file name.
//! An empty list is never written: it is represented by the document being
//! absent. Writes are last-writer-wins with no concurrency token.

use tracing::{debug, error, info, warn};

use crate::client::DriveClient;
use crate::error::{DriveError, Result};
use crate::model::{LinkEntry, RemoteFile};

/// What a write did to the remote document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// Empty list and no document: nothing to do.
    Unchanged,
    /// A new document was created.
    Created(RemoteFile),
    /// The existing document was overwritten.
    Updated,
    /// The existing document was deleted because the list became empty.
    Deleted,
}

/// Reads and writes the link list of a folder.
#[derive(Clone)]
pub struct MetadataStore {
    drive: DriveClient,
    file_name: String,
}

impl MetadataStore {
    /// Store documents named `file_name` through `drive`.
    pub fn new(drive: DriveClient, file_name: impl Into<String>) -> Self {
        Self {
            drive,
            file_name: file_name.into(),
        }
    }

    /// The underlying file client.
    pub fn drive(&self) -> &DriveClient {
        &self.drive
    }

    /// Name of the per-folder document.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    async fn find(&self, folder_id: &str) -> Result<Option<RemoteFile>> {
        self.drive.find_file(folder_id, &self.file_name).await
    }

    /// Fetch the folder's links, failing on any error.
    ///
    /// A folder without a document yields an empty list.
    pub async fn try_get(&self, folder_id: &str) -> Result<Vec<LinkEntry>> {
        let Some(file) = self.find(folder_id).await? else {
            return Ok(Vec::new());
        };
        self.drive.read_json(&file.id).await
    }

    /// Fetch the folder's links, degrading instead of failing.
    ///
    /// Not being logged in, a failed query, or a missing document all yield
    /// an empty list. `None` means the document exists but could not be read
    /// or is not a list of links.
    pub async fn get(&self, folder_id: &str) -> Option<Vec<LinkEntry>> {
        let file = match self.find(folder_id).await {
            Ok(Some(file)) => file,
            Ok(None) => {
                debug!(folder_id, "No metadata document");
                return Some(Vec::new());
            }
            Err(DriveError::Unauthenticated) => {
                debug!(folder_id, "Not logged in, showing no links");
                return Some(Vec::new());
            }
            Err(e) => {
                warn!(folder_id, error = %e, "Failed to query metadata document");
                return Some(Vec::new());
            }
        };

        match self.drive.read_json::<Vec<LinkEntry>>(&file.id).await {
            Ok(entries) => Some(entries),
            Err(e) => {
                error!(folder_id, file_id = %file.id, error = %e, "Failed to read metadata document");
                None
            }
        }
    }

    /// Replace the folder's links, failing on any error.
    ///
    /// The lookup must succeed before anything is written, so a failed query
    /// never leads to a second document.
    pub async fn try_set(&self, folder_id: &str, entries: &[LinkEntry]) -> Result<SetOutcome> {
        let existing = self.find(folder_id).await?;

        let outcome = match (existing, entries.is_empty()) {
            (None, true) => SetOutcome::Unchanged,
            (None, false) => {
                let file = self
                    .drive
                    .create_json(folder_id, &self.file_name, entries)
                    .await?;
                SetOutcome::Created(file)
            }
            (Some(file), true) => {
                self.drive.delete_file(&file.id).await?;
                SetOutcome::Deleted
            }
            (Some(file), false) => {
                self.drive.update_json(&file.id, entries).await?;
                SetOutcome::Updated
            }
        };

        info!(folder_id, links = entries.len(), outcome = ?outcome, "Metadata document written");
        Ok(outcome)
    }

    /// Replace the folder's links, logging failures instead of returning them.
    ///
    /// `None` means the write did not happen. Nothing is retried.
    pub async fn set(&self, folder_id: &str, entries: &[LinkEntry]) -> Option<SetOutcome> {
        match self.try_set(folder_id, entries).await {
            Ok(outcome) => Some(outcome),
            Err(e) if e.is_auth() => {
                debug!(folder_id, error = %e, "Skipping write without a usable session");
                None
            }
            Err(e) => {
                error!(folder_id, error = %e, "Failed to write metadata document");
                None
            }
        }
    }
}
