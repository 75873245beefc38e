use parking_lot::Mutex;
use std::sync::Arc;
use tokio::{runtime::Handle, sync::watch};

use crate::{
    client::NetworkClient,
    hub::ObserverHub,
    state::{SharedState, StateChange},
};

use super::publish;

/// What happened to a submitted search intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No fetch was running; one was started for this text.
    Started,
    /// A fetch was already running; a single trailing fetch will pick up the
    /// newest text once it finishes.
    Coalesced,
}

#[derive(Debug)]
struct SearchSlot {
    search_text: String,
    in_flight: bool,
    pending_retrigger: bool,
}

#[derive(Debug)]
struct SearchInner {
    client: Arc<dyn NetworkClient>,
    state: Arc<SharedState>,
    hub: Arc<ObserverHub>,
    slot: Mutex<SearchSlot>,
    busy: watch::Sender<bool>,
    runtime: Handle,
}

/// Single-flight scheduler for text-driven fetches with trailing coalesce.
///
/// At most one `fetch_by_query` runs at a time. Intents that arrive while it
/// runs collapse into one follow-up fetch that reads the search text when it
/// starts, so the last text typed is always the last text fetched.
#[derive(Debug, Clone)]
pub struct SearchFetchCoordinator {
    inner: Arc<SearchInner>,
}

impl SearchFetchCoordinator {
    /// Fetches are spawned on the runtime current at construction, so intents
    /// may later be submitted from any thread.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(
        client: Arc<dyn NetworkClient>,
        state: Arc<SharedState>,
        hub: Arc<ObserverHub>,
    ) -> Self {
        let slot = SearchSlot {
            search_text: state.search_text(),
            in_flight: false,
            pending_retrigger: false,
        };

        Self {
            inner: Arc::new(SearchInner {
                client,
                state,
                hub,
                slot: Mutex::new(slot),
                busy: watch::Sender::new(false),
                runtime: Handle::current(),
            }),
        }
    }

    pub fn submit_search_intent(&self, text: impl Into<String>) -> SubmitOutcome {
        let text = text.into();
        let inner = &self.inner;

        let (outcome, snapshot) = {
            let mut slot = inner.slot.lock();
            slot.search_text.clone_from(&text);
            let snapshot = inner.state.set_search_text(text.clone());

            if slot.in_flight {
                slot.pending_retrigger = true;
                (SubmitOutcome::Coalesced, snapshot)
            } else {
                slot.in_flight = true;
                inner.busy.send_replace(true);
                (SubmitOutcome::Started, snapshot)
            }
        };

        inner.hub.notify_changed(StateChange::SearchText, &snapshot);

        match outcome {
            SubmitOutcome::Started => {
                inner.runtime.spawn(SearchInner::run(inner.clone(), text));
            }
            SubmitOutcome::Coalesced => {
                tracing::debug!(query = %text, "search fetch in flight; coalescing");
            }
        }

        outcome
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.inner.slot.lock().in_flight
    }

    /// Resolves once no fetch is running and no retrigger is pending.
    pub async fn settled(&self) {
        let mut busy = self.inner.busy.subscribe();
        let _ = busy.wait_for(|busy| !*busy).await;
    }
}

impl SearchInner {
    async fn run(self: Arc<Self>, mut query: String) {
        loop {
            tracing::debug!(%query, "search fetch started");

            match self.client.fetch_by_query(&query).await {
                Ok(record) => publish(&self.state, &self.hub, record),
                Err(err) => {
                    tracing::warn!(%query, error = %err, "search fetch failed; keeping previous weather");
                }
            }

            // Clearing the flag and claiming it again for the retrigger happen
            // under one lock, so no intent can start a second fetch in between.
            let retrigger = {
                let mut slot = self.slot.lock();
                slot.in_flight = false;
                if slot.pending_retrigger {
                    slot.pending_retrigger = false;
                    slot.in_flight = true;
                    Some(slot.search_text.clone())
                } else {
                    self.busy.send_replace(false);
                    None
                }
            };

            match retrigger {
                Some(latest) => {
                    tracing::debug!(query = %latest, "retriggering search fetch");
                    query = latest;
                }
                None => return,
            }
        }
    }
}
