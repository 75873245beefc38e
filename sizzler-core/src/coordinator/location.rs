use std::sync::Arc;
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};

use crate::{
    client::NetworkClient,
    error::LocationError,
    hub::ObserverHub,
    location::LocationProvider,
    model::Coordinates,
    state::SharedState,
};

use super::publish;

/// What happened to a received location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationOutcome {
    Started,
    /// A location fetch was already running; this one was dropped.
    Suppressed,
}

#[derive(Debug)]
struct LocationInner {
    client: Arc<dyn NetworkClient>,
    provider: Arc<dyn LocationProvider>,
    state: Arc<SharedState>,
    hub: Arc<ObserverHub>,
    in_flight: watch::Sender<bool>,
    runtime: Handle,
}

/// Single-flight scheduler for coordinate-driven fetches.
///
/// Unlike search, there is no trailing fetch: a location that arrives while
/// another is being fetched is simply ignored.
#[derive(Debug, Clone)]
pub struct LocationFetchCoordinator {
    inner: Arc<LocationInner>,
}

impl LocationFetchCoordinator {
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(
        client: Arc<dyn NetworkClient>,
        provider: Arc<dyn LocationProvider>,
        state: Arc<SharedState>,
        hub: Arc<ObserverHub>,
    ) -> Self {
        Self {
            inner: Arc::new(LocationInner {
                client,
                provider,
                state,
                hub,
                in_flight: watch::Sender::new(false),
                runtime: Handle::current(),
            }),
        }
    }

    /// Ask the provider for the device location and fetch weather there.
    ///
    /// Fire-and-forget: the handle only covers the provider round trip and may
    /// be dropped. Use [`settled`](Self::settled) to wait for the fetch.
    pub fn request_location(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        self.inner.runtime.spawn(async move {
            match inner.provider.request_location().await {
                Ok(coordinates) => {
                    inner.receive(coordinates);
                }
                Err(err) => inner.fail(&err),
            }
        })
    }

    pub fn location_received(&self, coordinates: Coordinates) -> LocationOutcome {
        self.inner.receive(coordinates)
    }

    pub fn location_failed(&self, error: &LocationError) {
        self.inner.fail(error);
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        *self.inner.in_flight.borrow()
    }

    pub async fn settled(&self) {
        let mut in_flight = self.inner.in_flight.subscribe();
        let _ = in_flight.wait_for(|busy| !*busy).await;
    }
}

impl LocationInner {
    fn receive(self: &Arc<Self>, coordinates: Coordinates) -> LocationOutcome {
        // Check-and-set happens inside the channel's lock.
        let claimed = self.in_flight.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });

        if !claimed {
            tracing::debug!(%coordinates, "location fetch in flight; suppressing");
            return LocationOutcome::Suppressed;
        }

        self.runtime.spawn(self.clone().run(coordinates));
        LocationOutcome::Started
    }

    fn fail(&self, error: &LocationError) {
        tracing::warn!(%error, "location request failed");
    }

    async fn run(self: Arc<Self>, coordinates: Coordinates) {
        tracing::debug!(%coordinates, "location fetch started");

        match self.client.fetch_by_coordinates(coordinates).await {
            Ok(record) => publish(&self.state, &self.hub, record),
            Err(err) => {
                tracing::warn!(%coordinates, error = %err, "location fetch failed; keeping previous weather");
            }
        }

        self.in_flight.send_replace(false);
    }
}
