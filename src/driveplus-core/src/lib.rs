//! Driveplus Core - folder links for a cloud folder view.
//!
//! Ties the pieces together for the UI layer:
//! - [`Driveplus`]: read, add and remove a folder's links; session check;
//!   navigation subscription
//! - [`PageController`]: re-renders an [`Overlay`] whenever the page shows
//!   a different folder
//! - [`folder_id_from_url`]: folder-view URL recognition

pub mod controller;
pub mod driveplus;
pub mod error;
pub mod folder;

pub use controller::{Overlay, PageController};
pub use driveplus::Driveplus;
pub use error::{CoreError, Result};
pub use folder::{FolderMatcher, folder_id_from_url};

pub use driveplus_drive::{LinkEntry, SetOutcome};
