//! Navigation sources.
//!
//! A single-page app can change its URL in four ways without a page load:
//! `pushState`/`replaceState`, back/forward (`popstate`), fragment changes
//! (`hashchange`), or some other path only visible as DOM churn. Each way is
//! a [`NavigationSource`] feeding the same signal channel; the watcher's
//! dispatcher decides which signals become callbacks.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

/// The browser surface exposing the current URL.
pub trait Location: Send + Sync {
    /// Current `window.location.href`.
    fn href(&self) -> String;
}

/// The two history-mutation primitives.
pub trait History: Send + Sync {
    fn push_state(&self, url: &str);
    fn replace_state(&self, url: &str);
}

impl<H: History + ?Sized> History for Arc<H> {
    fn push_state(&self, url: &str) {
        (**self).push_state(url)
    }

    fn replace_state(&self, url: &str) {
        (**self).replace_state(url)
    }
}

/// Which mechanism reported a URL change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A wrapped `pushState`/`replaceState` call.
    HistoryHook,
    /// A `popstate` event (back/forward).
    PopstateListener,
    /// A `hashchange` event.
    HashListener,
    /// A DOM mutation batch; only counts when the URL differs from the last one seen.
    MutationFallback,
}

impl SourceKind {
    /// Explicit navigation signals fire the callback even for an unchanged URL.
    pub fn is_explicit(self) -> bool {
        !matches!(self, SourceKind::MutationFallback)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::HistoryHook => write!(f, "history"),
            SourceKind::PopstateListener => write!(f, "popstate"),
            SourceKind::HashListener => write!(f, "hashchange"),
            SourceKind::MutationFallback => write!(f, "mutation"),
        }
    }
}

/// A URL-change report sent to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationSignal {
    pub kind: SourceKind,
    pub url: String,
}

/// Shared sending end used by every source.
#[derive(Clone)]
pub struct SignalSink {
    tx: mpsc::UnboundedSender<NavigationSignal>,
    location: Arc<dyn Location>,
}

impl SignalSink {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<NavigationSignal>,
        location: Arc<dyn Location>,
    ) -> Self {
        Self { tx, location }
    }

    fn signal(&self, kind: SourceKind) {
        let url = self.location.href();
        trace!(%kind, %url, "Navigation signal");
        if self.tx.send(NavigationSignal { kind, url }).is_err() {
            debug!(%kind, "Navigation watcher stopped, dropping signal");
        }
    }
}

/// Something that reports URL changes to the watcher.
pub trait NavigationSource: Send + Sync {
    /// Mechanism this source stands for.
    fn kind(&self) -> SourceKind;

    /// Report that the mechanism fired. The URL is read from the location at this moment.
    fn emit(&self);
}

macro_rules! navigation_source {
    ($(#[$doc:meta])* $name:ident => $kind:expr) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name {
            sink: SignalSink,
        }

        impl $name {
            pub(crate) fn new(sink: SignalSink) -> Self {
                Self { sink }
            }
        }

        impl NavigationSource for $name {
            fn kind(&self) -> SourceKind {
                $kind
            }

            fn emit(&self) {
                self.sink.signal($kind);
            }
        }
    };
}

navigation_source!(
    /// Fires after a wrapped `pushState`/`replaceState`. See [`HookedHistory`].
    HistoryHook => SourceKind::HistoryHook
);

navigation_source!(
    /// Register as the page's `popstate` handler.
    PopstateListener => SourceKind::PopstateListener
);

navigation_source!(
    /// Register as the page's `hashchange` handler.
    HashListener => SourceKind::HashListener
);

navigation_source!(
    /// Call once per DOM mutation batch (`childList` + `subtree` on the document).
    MutationFallback => SourceKind::MutationFallback
);

/// History wrapper that delegates to the wrapped primitives, then signals.
pub struct HookedHistory<H: History> {
    inner: H,
    hook: HistoryHook,
}

impl<H: History> HookedHistory<H> {
    pub(crate) fn new(inner: H, hook: HistoryHook) -> Self {
        Self { inner, hook }
    }

    /// The wrapped history.
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: History> History for HookedHistory<H> {
    fn push_state(&self, url: &str) {
        self.inner.push_state(url);
        self.hook.emit();
    }

    fn replace_state(&self, url: &str) {
        self.inner.replace_state(url);
        self.hook.emit();
    }
}
