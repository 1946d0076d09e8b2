//! Navigation watcher.
//!
//! Sources push [`NavigationSignal`]s into an unbounded channel. A single
//! dispatcher task drains it, drops mutation signals whose URL matches the
//! last one seen, coalesces bursts inside the debounce window, and awaits the
//! callback for each surviving change in order.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{NavError, Result};
use crate::source::{
    HashListener, History, HistoryHook, HookedHistory, Location, MutationFallback,
    NavigationSignal, PopstateListener, SignalSink, SourceKind,
};

/// Default coalescing window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// A URL change delivered to the callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    /// The URL now shown.
    pub url: String,
    /// The URL before this change (or before the first change of a coalesced burst).
    pub previous: String,
    /// Source of the last signal in the burst.
    pub kind: SourceKind,
}

/// Callback run for every navigation. Invocations never overlap.
pub type NavigationCallback = Arc<dyn Fn(NavigationEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// Watches a page for in-place navigations.
pub struct NavigationWatcher {
    sink: SignalSink,
    last_url: Arc<Mutex<String>>,
    task: JoinHandle<()>,
}

impl NavigationWatcher {
    /// Start watching `location`, calling `callback` after each navigation.
    ///
    /// The URL at start-up is the initial last-seen URL and does not fire.
    pub fn spawn<F, Fut>(location: Arc<dyn Location>, debounce: Duration, callback: F) -> Result<Self>
    where
        F: Fn(NavigationEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: NavigationCallback = Arc::new(move |event| Box::pin(callback(event)));
        Self::spawn_with(location, debounce, callback)
    }

    /// Like [`spawn`](Self::spawn) with an already boxed callback.
    pub fn spawn_with(
        location: Arc<dyn Location>,
        debounce: Duration,
        callback: NavigationCallback,
    ) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| NavError::NoRuntime)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let last_url = Arc::new(Mutex::new(location.href()));
        info!(url = %last_url.lock(), debounce_ms = debounce.as_millis() as u64, "Navigation watcher started");

        let task = handle.spawn(dispatch(rx, Arc::clone(&last_url), debounce, callback));

        Ok(Self {
            sink: SignalSink::new(tx, location),
            last_url,
            task,
        })
    }

    /// Wrap `history` so its push/replace calls signal this watcher.
    pub fn hook_history<H: History>(&self, history: H) -> HookedHistory<H> {
        HookedHistory::new(history, self.history_hook())
    }

    /// Source fired by a wrapped history.
    pub fn history_hook(&self) -> HistoryHook {
        HistoryHook::new(self.sink.clone())
    }

    /// Source to register for `popstate`.
    pub fn popstate_listener(&self) -> PopstateListener {
        PopstateListener::new(self.sink.clone())
    }

    /// Source to register for `hashchange`.
    pub fn hash_listener(&self) -> HashListener {
        HashListener::new(self.sink.clone())
    }

    /// Source to call on DOM mutations.
    pub fn mutation_fallback(&self) -> MutationFallback {
        MutationFallback::new(self.sink.clone())
    }

    /// Last URL a navigation was accepted for.
    pub fn last_url(&self) -> String {
        self.last_url.lock().clone()
    }

    /// Stop dispatching. Signals still queued are dropped.
    pub fn stop(self) {}
}

impl Drop for NavigationWatcher {
    fn drop(&mut self) {
        self.task.abort();
        debug!("Navigation watcher stopped");
    }
}

async fn dispatch(
    mut rx: mpsc::UnboundedReceiver<NavigationSignal>,
    last_url: Arc<Mutex<String>>,
    debounce: Duration,
    callback: NavigationCallback,
) {
    while let Some(signal) = rx.recv().await {
        let mut pending = accept(&last_url, signal);

        if !debounce.is_zero() {
            let window = tokio::time::sleep(debounce);
            tokio::pin!(window);
            loop {
                tokio::select! {
                    _ = &mut window => break,
                    next = rx.recv() => match next {
                        Some(signal) => {
                            if let Some(event) = accept(&last_url, signal) {
                                pending = Some(merge(pending, event));
                            }
                        }
                        None => break,
                    },
                }
            }
        }

        if let Some(event) = pending {
            debug!(url = %event.url, previous = %event.previous, kind = %event.kind, "Navigation");
            callback(event).await;
        }
    }
}

/// Decide whether `signal` is a navigation, updating the last-seen URL if so.
fn accept(last_url: &Mutex<String>, signal: NavigationSignal) -> Option<NavigationEvent> {
    let mut last = last_url.lock();
    if !signal.kind.is_explicit() && *last == signal.url {
        return None;
    }
    let previous = std::mem::replace(&mut *last, signal.url.clone());
    Some(NavigationEvent {
        url: signal.url,
        previous,
        kind: signal.kind,
    })
}

fn merge(pending: Option<NavigationEvent>, next: NavigationEvent) -> NavigationEvent {
    match pending {
        Some(first) => NavigationEvent {
            previous: first.previous,
            ..next
        },
        None => next,
    }
}
