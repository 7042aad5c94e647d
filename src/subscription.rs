// src/subscription.rs

//! Change-notification handles for presentation layers.
//!
//! Producers hold a `tokio::sync::watch` sender and only publish when a value
//! actually differs from the previous one, so a subscriber wakes once per
//! visible change rather than once per tick.

use tokio::sync::watch;

/// Observer handle returned by `subscribe()`.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) detaches it.
#[derive(Debug, Clone)]
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    pub(crate) fn new(rx: watch::Receiver<T>) -> Self {
        Self { rx }
    }

    /// Latest published value.
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Whether a value was published since this handle last looked.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next change and return the new value.
    ///
    /// Returns `None` once the producer is gone.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Detach from the producer.
    pub fn unsubscribe(self) {}
}

/// Publish `next` into `tx` only if it differs from the current value.
///
/// Returns `true` if subscribers were notified.
pub(crate) fn publish_if_changed<T: PartialEq>(tx: &watch::Sender<T>, next: T) -> bool {
    tx.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    })
}
