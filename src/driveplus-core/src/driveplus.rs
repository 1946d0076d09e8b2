//! The Driveplus facade.
//!
//! Everything the UI layer calls: reading and editing a folder's links,
//! checking whether a session exists, and subscribing to navigations. None
//! of the link operations fail; problems are logged and show up as empty
//! lists or skipped writes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use driveplus_common::{DriveplusConfig, create_default_client};
use driveplus_drive::{DriveClient, LinkEntry, MetadataStore, SetOutcome};
use driveplus_login::{FileSessionStore, SessionStore, TokenProvider};
use driveplus_nav::{Location, NavigationEvent, NavigationWatcher};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::folder::FolderMatcher;

/// Entry point for the UI layer.
pub struct Driveplus {
    config: DriveplusConfig,
    store: MetadataStore,
    folders: FolderMatcher,
}

impl Driveplus {
    /// Build from configuration, keeping the session in the data directory.
    pub fn from_config(config: DriveplusConfig) -> Result<Self> {
        let data_dir = driveplus_common::data_dir(&config).ok_or(CoreError::NoDataDir)?;
        let sessions = Arc::new(FileSessionStore::in_dir(&data_dir));
        debug!(path = %sessions.path().display(), "Using session file");
        Self::with_session_store(config, sessions)
    }

    /// Build from configuration with a custom session store.
    pub fn with_session_store(
        config: DriveplusConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let client = create_default_client().map_err(CoreError::HttpClient)?;
        let tokens = Arc::new(
            TokenProvider::new(sessions, client.clone(), &config.token_api_url)
                .with_refresh_skew(config.refresh_skew_secs),
        );
        let drive = DriveClient::from_config(client, tokens, &config);
        let store = MetadataStore::new(drive, &config.metadata_file_name);
        Self::from_parts(config, store)
    }

    /// Build around an existing metadata store.
    pub fn from_parts(config: DriveplusConfig, store: MetadataStore) -> Result<Self> {
        let folders = FolderMatcher::new(&config.folder_url_base)?;
        Ok(Self {
            config,
            store,
            folders,
        })
    }

    pub fn config(&self) -> &DriveplusConfig {
        &self.config
    }

    /// The token provider behind every remote call.
    pub fn tokens(&self) -> &Arc<TokenProvider> {
        self.store.drive().tokens()
    }

    /// The folder id in `url`, if it is a folder view.
    pub fn folder_id<'a>(&self, url: &'a str) -> Option<&'a str> {
        self.folders.folder_id(url)
    }

    /// Whether a session is stored. Makes no network call.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens().is_authenticated().await
    }

    /// The folder's links. Unreadable documents show as an empty list.
    pub async fn get_links(&self, folder_id: &str) -> Vec<LinkEntry> {
        self.store.get(folder_id).await.unwrap_or_default()
    }

    /// Append `url` to the folder's links.
    ///
    /// Blank input is ignored. Returns `None` when nothing was written.
    pub async fn add_link(&self, folder_id: &str, url: &str) -> Option<SetOutcome> {
        if url.trim().is_empty() {
            debug!(folder_id, "Ignoring blank link");
            return None;
        }
        let mut links = self.current_links(folder_id).await?;
        links.push(LinkEntry::new(url));
        let outcome = self.store.set(folder_id, &links).await;
        if outcome.is_some() {
            info!(folder_id, url, "Link added");
        }
        outcome
    }

    /// Remove the link at `index`. Out-of-range indices change nothing.
    pub async fn remove_link(&self, folder_id: &str, index: usize) -> Option<SetOutcome> {
        let mut links = self.current_links(folder_id).await?;
        if index >= links.len() {
            debug!(folder_id, index, len = links.len(), "Link index out of range");
            return None;
        }
        let removed = links.remove(index);
        let outcome = self.store.set(folder_id, &links).await;
        if outcome.is_some() {
            info!(folder_id, url = %removed.url, "Link removed");
        }
        outcome
    }

    // A document that exists but cannot be read is never overwritten.
    async fn current_links(&self, folder_id: &str) -> Option<Vec<LinkEntry>> {
        let links = self.store.get(folder_id).await;
        if links.is_none() {
            warn!(folder_id, "Metadata document unreadable, leaving it untouched");
        }
        links
    }

    /// Watch `location` and run `callback` after each navigation.
    pub fn on_navigate<F, Fut>(
        &self,
        location: Arc<dyn Location>,
        callback: F,
    ) -> Result<NavigationWatcher>
    where
        F: Fn(NavigationEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let debounce = Duration::from_millis(self.config.navigation_debounce_ms);
        Ok(NavigationWatcher::spawn(location, debounce, callback)?)
    }
}
