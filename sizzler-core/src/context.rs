use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{
    client::NetworkClient,
    coordinator::{LocationFetchCoordinator, SearchFetchCoordinator, SubmitOutcome},
    hub::{ObserverHub, SubscriptionHandle},
    location::LocationProvider,
    state::{DEFAULT_SEARCH_TEXT, SharedState, StateChange, StateSnapshot},
};

/// Process-wide weather state plus the two coordinators that write it.
///
/// Construction immediately submits one search intent for the initial text,
/// so there is data to show without any user action.
#[derive(Debug)]
pub struct WeatherContext {
    state: Arc<SharedState>,
    hub: Arc<ObserverHub>,
    search: SearchFetchCoordinator,
    location: LocationFetchCoordinator,
}

impl WeatherContext {
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(client: Arc<dyn NetworkClient>, provider: Arc<dyn LocationProvider>) -> Self {
        Self::with_search_text(client, provider, DEFAULT_SEARCH_TEXT)
    }

    pub fn with_search_text(
        client: Arc<dyn NetworkClient>,
        provider: Arc<dyn LocationProvider>,
        search_text: impl Into<String>,
    ) -> Self {
        let search_text = search_text.into();
        let state = Arc::new(SharedState::new(search_text.clone()));
        let hub = Arc::new(ObserverHub::new());

        let search = SearchFetchCoordinator::new(client.clone(), state.clone(), hub.clone());
        let location = LocationFetchCoordinator::new(client, provider, state.clone(), hub.clone());

        tracing::debug!(%search_text, "initial search fetch");
        search.submit_search_intent(search_text);

        Self { state, hub, search, location }
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    pub fn search(&self) -> &SearchFetchCoordinator {
        &self.search
    }

    pub fn location(&self) -> &LocationFetchCoordinator {
        &self.location
    }

    pub fn submit_search_intent(&self, text: impl Into<String>) -> SubmitOutcome {
        self.search.submit_search_intent(text)
    }

    pub fn request_location(&self) -> JoinHandle<()> {
        self.location.request_location()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(StateChange, &StateSnapshot) + Send + Sync + 'static,
    {
        self.hub.subscribe(callback)
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.hub.unsubscribe(handle)
    }

    /// Resolves once neither coordinator has work in flight.
    pub async fn settled(&self) {
        tokio::join!(self.search.settled(), self.location.settled());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coordinator::testing::{HERE, ScriptedClient},
        location::FixedLocationProvider,
        model::Coordinates,
    };

    fn provider() -> Arc<dyn LocationProvider> {
        Arc::new(FixedLocationProvider::new(Coordinates::new(48.85, 2.35)))
    }

    #[tokio::test]
    async fn startup_fetches_default_text_exactly_once() {
        let client = Arc::new(ScriptedClient::open());
        let ctx = WeatherContext::new(client.clone(), provider());

        assert_eq!(ctx.snapshot().search_text, "El Segundo");
        ctx.settled().await;

        assert_eq!(client.calls(), vec!["El Segundo"]);
        let weather = ctx.state().current_weather().expect("startup fetch published");
        assert_eq!(weather.city, "El Segundo");
    }

    #[tokio::test]
    async fn startup_fetch_is_in_flight_before_any_intent() {
        let client = Arc::new(ScriptedClient::gated());
        let ctx = WeatherContext::with_search_text(client.clone(), provider(), "Oslo");

        assert!(ctx.search().is_fetch_in_flight());
        assert_eq!(ctx.submit_search_intent("Bergen"), SubmitOutcome::Coalesced);

        client.release(2);
        ctx.settled().await;
        assert_eq!(client.calls(), vec!["Oslo", "Bergen"]);
    }

    #[tokio::test]
    async fn search_and_location_run_independently() {
        let client = Arc::new(ScriptedClient::gated());
        let ctx = WeatherContext::new(client.clone(), provider());

        ctx.request_location().await.expect("round trip task");
        assert!(ctx.search().is_fetch_in_flight());
        assert!(ctx.location().is_fetch_in_flight());

        client.release(2);
        ctx.settled().await;

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.contains(&"El Segundo".to_string()));
        let city = ctx.state().current_weather().map(|w| w.city.clone()).expect("published");
        assert!(city == "El Segundo" || city == HERE);
    }

    #[tokio::test]
    async fn unsubscribed_observer_stops_receiving() {
        let client = Arc::new(ScriptedClient::open());
        let ctx = WeatherContext::new(client, provider());
        ctx.settled().await;

        let hits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = hits.clone();
        let handle = ctx.subscribe(move |_, _| {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        ctx.submit_search_intent("Lima");
        ctx.settled().await;
        let delivered = hits.load(std::sync::atomic::Ordering::SeqCst);
        assert_eq!(delivered, 2);

        assert!(ctx.unsubscribe(handle));
        ctx.submit_search_intent("Quito");
        ctx.settled().await;
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), delivered);
    }
}
