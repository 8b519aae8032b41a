//! Transient status notifications.
//!
//! A [`Toaster`] holds a single slot: showing a toast replaces whatever is
//! displayed. State changes are published on a `watch` channel so a
//! presentation layer can render them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// How long a toast stays visible unless a duration is given.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(2000);

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
}

/// Current content of the toast slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToastState {
    pub message: String,
    pub kind: ToastKind,
    pub visible: bool,
}

struct ToasterInner {
    state: watch::Sender<ToastState>,
    generation: AtomicU64,
}

impl ToasterInner {
    fn hide_if_current(&self, generation: u64) {
        self.state.send_if_modified(|state| {
            if state.visible && self.generation.load(Ordering::SeqCst) == generation {
                state.visible = false;
                true
            } else {
                false
            }
        });
    }
}

/// Single-slot notification source. Clones share the slot.
#[derive(Clone)]
pub struct Toaster {
    inner: Arc<ToasterInner>,
    default_duration: Duration,
}

impl Toaster {
    /// Create a toaster whose toasts auto-dismiss after `default_duration`.
    #[must_use]
    pub fn new(default_duration: Duration) -> Self {
        let (state, _) = watch::channel(ToastState::default());
        Self {
            inner: Arc::new(ToasterInner {
                state,
                generation: AtomicU64::new(0),
            }),
            default_duration,
        }
    }

    /// Show a toast for the default duration.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind) {
        self.show_for(message, kind, self.default_duration);
    }

    /// Show a toast, replacing the current one, and schedule its dismissal
    /// `duration` after this call.
    ///
    /// A dismissal only hides the toast it was scheduled for; a newer toast
    /// keeps its own timer. Without a Tokio runtime the toast stays visible
    /// until replaced or [`dismiss`](Self::dismiss)ed.
    pub fn show_for(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) {
        let message = message.into();
        tracing::debug!(?kind, "toast: {}", message);

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_replace(ToastState {
            message,
            kind,
            visible: true,
        });

        let inner: Weak<ToasterInner> = Arc::downgrade(&self.inner);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(duration).await;
                    if let Some(inner) = inner.upgrade() {
                        inner.hide_if_current(generation);
                    }
                });
            }
            Err(_) => tracing::debug!("No runtime available; toast will not auto-dismiss"),
        }
    }

    /// Hide the current toast immediately.
    pub fn dismiss(&self) {
        self.inner.state.send_if_modified(|state| {
            let was_visible = state.visible;
            state.visible = false;
            was_visible
        });
    }

    /// Snapshot of the toast slot.
    #[must_use]
    pub fn current(&self) -> ToastState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to toast changes.
    ///
    /// The receiver reports closure once every clone of this toaster is dropped.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ToastState> {
        self.inner.state.subscribe()
    }

    pub const fn default_duration(&self) -> Duration {
        self.default_duration
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl std::fmt::Debug for Toaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toaster")
            .field("current", &self.current())
            .field("default_duration", &self.default_duration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn toast_hides_after_duration() {
        let toaster = Toaster::default();
        toaster.show("Saved", ToastKind::Success);

        let shown = toaster.current();
        assert!(shown.visible);
        assert_eq!(shown.message, "Saved");
        assert_eq!(shown.kind, ToastKind::Success);

        sleep(Duration::from_millis(1999)).await;
        assert!(toaster.current().visible);

        sleep(Duration::from_millis(2)).await;
        let hidden = toaster.current();
        assert!(!hidden.visible);
        assert_eq!(hidden.message, "Saved");
    }

    #[tokio::test(start_paused = true)]
    async fn newer_toast_keeps_its_own_timer() {
        let toaster = Toaster::default();
        toaster.show("first", ToastKind::Info);

        sleep(Duration::from_millis(1000)).await;
        toaster.show("second", ToastKind::Error);

        sleep(Duration::from_millis(1001)).await;
        let state = toaster.current();
        assert!(state.visible);
        assert_eq!(state.message, "second");
        assert_eq!(state.kind, ToastKind::Error);

        sleep(Duration::from_millis(1000)).await;
        assert!(!toaster.current().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_observe_changes() {
        let toaster = Toaster::new(Duration::from_millis(50));
        let mut rx = toaster.subscribe();

        toaster.show("hello", ToastKind::Info);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().visible);

        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn receiver_closes_when_toaster_dropped() {
        let toaster = Toaster::default();
        let mut rx = toaster.subscribe();
        toaster.show("bye", ToastKind::Info);
        drop(toaster);

        assert!(rx.changed().await.is_ok());
        assert!(rx.changed().await.is_err());
    }

    #[test]
    fn show_without_runtime_stays_visible() {
        let toaster = Toaster::default();
        toaster.show("offline", ToastKind::Info);
        assert!(toaster.current().visible);

        toaster.dismiss();
        assert!(!toaster.current().visible);
    }
}
