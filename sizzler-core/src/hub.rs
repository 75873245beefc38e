//! Fan-out of shared-state changes to whoever is listening.
//!
//! Coordinators call [`ObserverHub::notify_changed`] after a write is visible;
//! they never learn who the observers are. Callbacks are invoked outside the
//! hub's lock, so an observer may unsubscribe from inside its own callback.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::state::{StateChange, StateSnapshot};

type Callback = Arc<dyn Fn(StateChange, &StateSnapshot) + Send + Sync>;

/// Token returned by [`ObserverHub::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

#[derive(Default)]
pub struct ObserverHub {
    next_id: AtomicU64,
    observers: Mutex<Vec<(u64, Callback)>>,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(StateChange, &StateSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers.lock().push((id, Arc::new(callback)));
        SubscriptionHandle(id)
    }

    /// Returns `false` if the handle was already unsubscribed.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|(id, _)| *id != handle.0);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    pub(crate) fn notify_changed(&self, change: StateChange, snapshot: &StateSnapshot) {
        let observers: Vec<Callback> =
            self.observers.lock().iter().map(|(_, cb)| cb.clone()).collect();

        tracing::trace!(?change, observers = observers.len(), "notifying observers");
        for callback in observers {
            callback(change, snapshot);
        }
    }
}

impl std::fmt::Debug for ObserverHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverHub")
            .field("observers", &self.observer_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SharedState;
    use std::sync::atomic::AtomicUsize;

    fn counting(hub: &ObserverHub) -> (SubscriptionHandle, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let handle = hub.subscribe(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (handle, hits)
    }

    #[test]
    fn every_subscriber_is_notified() {
        let hub = ObserverHub::new();
        let (_, a) = counting(&hub);
        let (_, b) = counting(&hub);

        hub.notify_changed(StateChange::Weather, &SharedState::default().snapshot());

        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribed_observer_is_not_notified() {
        let hub = ObserverHub::new();
        let (handle, hits) = counting(&hub);

        assert!(hub.unsubscribe(handle));
        assert!(!hub.unsubscribe(handle));
        hub.notify_changed(StateChange::SearchText, &SharedState::default().snapshot());

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(hub.observer_count(), 0);
    }

    #[test]
    fn observer_can_unsubscribe_itself_during_notification() {
        let hub = Arc::new(ObserverHub::new());
        let slot: Arc<Mutex<Option<SubscriptionHandle>>> = Arc::new(Mutex::new(None));

        let hub_ref = hub.clone();
        let slot_ref = slot.clone();
        let handle = hub.subscribe(move |_, _| {
            if let Some(h) = slot_ref.lock().take() {
                hub_ref.unsubscribe(h);
            }
        });
        *slot.lock() = Some(handle);

        hub.notify_changed(StateChange::Weather, &SharedState::default().snapshot());
        assert_eq!(hub.observer_count(), 0);
    }

    #[test]
    fn snapshot_and_kind_are_forwarded() {
        let hub = ObserverHub::new();
        let seen: Arc<Mutex<Vec<(StateChange, String)>>> = Arc::default();
        let sink = seen.clone();
        hub.subscribe(move |change, snap| sink.lock().push((change, snap.search_text.clone())));

        hub.notify_changed(StateChange::SearchText, &SharedState::new("Paris").snapshot());

        assert_eq!(seen.lock().as_slice(), &[(StateChange::SearchText, "Paris".to_string())]);
    }
}
