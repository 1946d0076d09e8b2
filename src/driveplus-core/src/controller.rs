//! Keeps an overlay in sync with the page URL.

use std::sync::Arc;

use driveplus_drive::{LinkEntry, SetOutcome};
use driveplus_nav::{Location, NavigationWatcher};
use parking_lot::Mutex;
use tracing::debug;

use crate::driveplus::Driveplus;
use crate::error::Result;

/// The injected links panel. Drawing it is up to the implementor.
pub trait Overlay: Send + Sync {
    /// Remove any previously rendered panel.
    fn clear(&self);

    /// Show `links` for `folder_id`. An empty list means a collapsed panel.
    fn render(&self, folder_id: &str, links: &[LinkEntry]);
}

/// Renders the overlay for whatever folder the page shows.
pub struct PageController<O: Overlay> {
    app: Arc<Driveplus>,
    overlay: O,
    current_url: Mutex<Option<String>>,
    location: Mutex<Option<Arc<dyn Location>>>,
}

impl<O: Overlay + 'static> PageController<O> {
    pub fn new(app: Arc<Driveplus>, overlay: O) -> Arc<Self> {
        Arc::new(Self {
            app,
            overlay,
            current_url: Mutex::new(None),
            location: Mutex::new(None),
        })
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    /// Render for `url`. Returns the folder id rendered, `None` for other pages.
    ///
    /// Cheap to call repeatedly with the same URL.
    pub async fn handle_url(&self, url: &str) -> Option<String> {
        self.overlay.clear();
        *self.current_url.lock() = Some(url.to_string());

        let Some(folder_id) = self.app.folder_id(url) else {
            debug!(url, "Not a folder view");
            return None;
        };

        let links = self.app.get_links(folder_id).await;
        self.overlay.render(folder_id, &links);
        Some(folder_id.to_string())
    }

    /// Add a link to the current folder, then re-render.
    pub async fn add_link(&self, url: &str) -> Option<SetOutcome> {
        let (page, folder_id) = self.current_folder()?;
        let outcome = self.app.add_link(&folder_id, url).await;
        self.rerender(&page).await;
        outcome
    }

    /// Remove the link at `index` from the current folder, then re-render.
    pub async fn remove_link(&self, index: usize) -> Option<SetOutcome> {
        let (page, folder_id) = self.current_folder()?;
        let outcome = self.app.remove_link(&folder_id, index).await;
        self.rerender(&page).await;
        outcome
    }

    // The page may have moved on while the edit was in flight.
    async fn rerender(&self, edited_page: &str) {
        let location = self.location.lock().clone();
        let url = match location {
            Some(location) => location.href(),
            None if self.current_url.lock().as_deref() == Some(edited_page) => {
                edited_page.to_string()
            }
            None => {
                debug!(edited_page, "Page changed during edit, skipping re-render");
                return;
            }
        };
        self.handle_url(&url).await;
    }

    fn current_folder(&self) -> Option<(String, String)> {
        let page = self.current_url.lock().clone()?;
        let folder_id = self.app.folder_id(&page)?.to_string();
        Some((page, folder_id))
    }

    /// Render the current page, then re-render after every navigation.
    pub async fn start(self: &Arc<Self>, location: Arc<dyn Location>) -> Result<NavigationWatcher> {
        *self.location.lock() = Some(Arc::clone(&location));
        self.handle_url(&location.href()).await;

        let controller = Arc::clone(self);
        self.app.on_navigate(location, move |event| {
            let controller = Arc::clone(&controller);
            async move {
                controller.handle_url(&event.url).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driveplus_common::DriveplusConfig;
    use driveplus_drive::testing::FakeDrive;
    use driveplus_nav::{History, SimulatedPage};
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const FOLDER_A: &str = "https://drive.google.com/drive/u/0/folders/folder-a";
    const FOLDER_B: &str = "https://drive.google.com/drive/u/0/folders/folder-b";

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Clear,
        Render(String, Vec<String>),
    }

    struct RecordingOverlay {
        calls: Mutex<Vec<Call>>,
        renders: mpsc::UnboundedSender<String>,
    }

    impl RecordingOverlay {
        fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
            let (renders, rx) = mpsc::unbounded_channel();
            (
                Self {
                    calls: Mutex::new(Vec::new()),
                    renders,
                },
                rx,
            )
        }

        fn take(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock())
        }
    }

    impl Overlay for RecordingOverlay {
        fn clear(&self) {
            self.calls.lock().push(Call::Clear);
        }

        fn render(&self, folder_id: &str, links: &[LinkEntry]) {
            self.calls.lock().push(Call::Render(
                folder_id.to_string(),
                links.iter().map(|l| l.url.clone()).collect(),
            ));
            let _ = self.renders.send(folder_id.to_string());
        }
    }

    fn render(folder: &str, urls: &[&str]) -> Call {
        Call::Render(folder.to_string(), urls.iter().map(|u| u.to_string()).collect())
    }

    async fn controller(
        fake: &FakeDrive,
        debounce_ms: u64,
    ) -> (Arc<PageController<RecordingOverlay>>, mpsc::UnboundedReceiver<String>) {
        let config = DriveplusConfig {
            navigation_debounce_ms: debounce_ms,
            ..Default::default()
        };
        let app = Arc::new(Driveplus::from_parts(config, fake.store()).unwrap());
        let (overlay, renders) = RecordingOverlay::new();
        (PageController::new(app, overlay), renders)
    }

    #[tokio::test]
    async fn test_handle_url_renders_folder() {
        let fake = FakeDrive::start().await;
        fake.insert_raw("folder-a", "drive++meta.json", br#"[{"url":"https://x.example"}]"#);
        let (controller, _renders) = controller(&fake, 0).await;

        assert_eq!(controller.handle_url(FOLDER_A).await.as_deref(), Some("folder-a"));
        assert_eq!(
            controller.overlay().take(),
            vec![Call::Clear, render("folder-a", &["https://x.example"])]
        );
    }

    #[tokio::test]
    async fn test_non_folder_page_only_clears() {
        let fake = FakeDrive::start().await;
        let (controller, _renders) = controller(&fake, 0).await;

        assert_eq!(
            controller
                .handle_url("https://drive.google.com/drive/u/0/my-drive")
                .await,
            None
        );
        assert_eq!(controller.overlay().take(), vec![Call::Clear]);
        assert_eq!(fake.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_edits_rerender() {
        let fake = FakeDrive::start().await;
        let (controller, _renders) = controller(&fake, 0).await;
        controller.handle_url(FOLDER_A).await;
        controller.overlay().take();

        controller.add_link("https://one.example").await;
        controller.add_link("https://two.example").await;
        controller.remove_link(0).await;

        let calls = controller.overlay().take();
        assert_eq!(
            calls.last(),
            Some(&render("folder-a", &["https://two.example"]))
        );
        assert_eq!(calls.iter().filter(|c| **c == Call::Clear).count(), 3);
    }

    #[tokio::test]
    async fn test_edit_without_folder_does_nothing() {
        let fake = FakeDrive::start().await;
        let (controller, _renders) = controller(&fake, 0).await;

        assert_eq!(controller.add_link("https://x.example").await, None);
        assert!(controller.overlay().take().is_empty());
    }

    #[tokio::test]
    async fn test_navigation_during_edit_keeps_new_page() {
        let fake = FakeDrive::start().await;
        let (controller, _renders) = controller(&fake, 0).await;
        controller.handle_url(FOLDER_A).await;
        fake.set_write_delay(Duration::from_millis(300));

        let edit = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.add_link("https://late.example").await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.handle_url(FOLDER_B).await;
        assert!(edit.await.unwrap().is_some());

        let calls = controller.overlay().take();
        assert_eq!(calls.last(), Some(&render("folder-b", &[])));
        assert_eq!(
            controller.current_folder().map(|(_, folder)| folder).as_deref(),
            Some("folder-b")
        );
        assert!(fake.content_of("folder-a", "drive++meta.json").is_some());
    }

    #[tokio::test]
    async fn test_edit_rerenders_live_location() {
        let fake = FakeDrive::start().await;
        let (controller, mut renders) = controller(&fake, 10).await;
        let page = SimulatedPage::new(FOLDER_A);
        let watcher = controller.start(page.clone()).await.unwrap();
        page.attach(&watcher);
        assert_eq!(renders.recv().await.as_deref(), Some("folder-a"));
        fake.set_write_delay(Duration::from_millis(300));

        let edit = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.add_link("https://late.example").await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        watcher.hook_history(page.clone()).push_state(FOLDER_B);
        let next = tokio::time::timeout(Duration::from_secs(2), renders.recv())
            .await
            .unwrap();
        assert_eq!(next.as_deref(), Some("folder-b"));
        assert!(edit.await.unwrap().is_some());

        let calls = controller.overlay().take();
        assert_eq!(calls.last(), Some(&render("folder-b", &[])));
        assert!(!calls.contains(&render("folder-a", &["https://late.example"])));
    }

    #[tokio::test]
    async fn test_start_follows_navigation() {
        let fake = FakeDrive::start().await;
        fake.insert_raw("folder-b", "drive++meta.json", br#"[{"url":"https://b.example"}]"#);
        let (controller, mut renders) = controller(&fake, 10).await;
        let page = SimulatedPage::new(FOLDER_A);

        let watcher = controller.start(page.clone()).await.unwrap();
        page.attach(&watcher);
        assert_eq!(renders.recv().await.as_deref(), Some("folder-a"));

        let history = watcher.hook_history(page.clone());
        history.push_state(FOLDER_B);
        let next = tokio::time::timeout(Duration::from_secs(2), renders.recv())
            .await
            .unwrap();
        assert_eq!(next.as_deref(), Some("folder-b"));

        let calls = controller.overlay().take();
        assert_eq!(calls.last(), Some(&render("folder-b", &["https://b.example"])));
    }
}
