//! In-memory page with a session history.
//!
//! Behaves like a browser tab for navigation purposes: `pushState` and
//! `replaceState` change the URL without events, back/forward dispatch
//! `popstate`, fragment changes dispatch `hashchange`, and DOM mutations are
//! reported to observers. Used by the `watch` command and tests.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::source::{History, Location, NavigationSource};
use crate::watcher::NavigationWatcher;

type Listener = Arc<dyn NavigationSource>;

#[derive(Default)]
struct PageState {
    entries: Vec<String>,
    index: usize,
    popstate: Vec<Listener>,
    hashchange: Vec<Listener>,
    observers: Vec<Listener>,
}

impl PageState {
    fn current(&self) -> &str {
        &self.entries[self.index]
    }

    fn push(&mut self, url: String) {
        self.entries.truncate(self.index + 1);
        self.entries.push(url);
        self.index = self.entries.len() - 1;
    }
}

/// A simulated browser tab.
pub struct SimulatedPage {
    state: Mutex<PageState>,
}

impl SimulatedPage {
    /// New page showing `url` with a one-entry history.
    pub fn new(url: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PageState {
                entries: vec![url.into()],
                ..Default::default()
            }),
        })
    }

    /// Register `watcher`'s popstate, hashchange and mutation sources.
    ///
    /// History calls are only observed through [`NavigationWatcher::hook_history`].
    pub fn attach(&self, watcher: &NavigationWatcher) {
        self.add_popstate_listener(Arc::new(watcher.popstate_listener()));
        self.add_hashchange_listener(Arc::new(watcher.hash_listener()));
        self.observe_mutations(Arc::new(watcher.mutation_fallback()));
    }

    pub fn add_popstate_listener(&self, listener: Listener) {
        self.state.lock().popstate.push(listener);
    }

    pub fn add_hashchange_listener(&self, listener: Listener) {
        self.state.lock().hashchange.push(listener);
    }

    pub fn observe_mutations(&self, observer: Listener) {
        self.state.lock().observers.push(observer);
    }

    /// Go back one entry. Returns false at the start of history.
    pub fn back(&self) -> bool {
        self.traverse(-1)
    }

    /// Go forward one entry. Returns false at the end of history.
    pub fn forward(&self) -> bool {
        self.traverse(1)
    }

    fn traverse(&self, delta: isize) -> bool {
        let listeners = {
            let mut state = self.state.lock();
            let Some(index) = state.index.checked_add_signed(delta) else {
                return false;
            };
            if index >= state.entries.len() {
                return false;
            }
            state.index = index;
            trace!(url = state.current(), "History traversal");
            state.popstate.clone()
        };
        notify(&listeners);
        true
    }

    /// Navigate to `#fragment` on the current document.
    pub fn set_hash(&self, fragment: &str) {
        let listeners = {
            let mut state = self.state.lock();
            let base = state
                .current()
                .split_once('#')
                .map_or(state.current(), |(base, _)| base)
                .to_string();
            let fragment = fragment.trim_start_matches('#');
            state.push(format!("{base}#{fragment}"));
            state.hashchange.clone()
        };
        notify(&listeners);
    }

    /// Change the URL without any navigation event.
    pub fn navigate_silently(&self, url: &str) {
        let mut state = self.state.lock();
        let index = state.index;
        state.entries[index] = url.to_string();
    }

    /// Report one DOM mutation batch to observers.
    pub fn mutate_dom(&self) {
        let observers = self.state.lock().observers.clone();
        notify(&observers);
    }

    /// Number of session history entries.
    pub fn history_len(&self) -> usize {
        self.state.lock().entries.len()
    }
}

// Listeners read the location, so they run without the state lock held.
fn notify(listeners: &[Listener]) {
    for listener in listeners {
        listener.emit();
    }
}

impl Location for SimulatedPage {
    fn href(&self) -> String {
        self.state.lock().current().to_string()
    }
}

impl History for SimulatedPage {
    fn push_state(&self, url: &str) {
        self.state.lock().push(url.to_string());
    }

    fn replace_state(&self, url: &str) {
        self.navigate_silently(url);
    }
}
