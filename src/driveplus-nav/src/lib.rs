//! Driveplus Nav - detection of in-place navigations in single-page folder views.
//!
//! Four sources report URL changes: a history hook, `popstate` and
//! `hashchange` listeners, and a DOM-mutation fallback. The
//! [`NavigationWatcher`] turns their signals into at most one callback per
//! change, in order, with bursts coalesced.

pub mod error;
pub mod page;
pub mod source;
pub mod watcher;

pub use error::{NavError, Result};
pub use page::SimulatedPage;
pub use source::{
    HashListener, History, HistoryHook, HookedHistory, Location, MutationFallback,
    NavigationSignal, NavigationSource, PopstateListener, SourceKind,
};
pub use watcher::{DEFAULT_DEBOUNCE, NavigationCallback, NavigationEvent, NavigationWatcher};
