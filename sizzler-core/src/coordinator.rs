//! Fetch coordinators: turn user intents into a bounded set of fetches.
//!
//! Each coordinator owns its own in-flight slot, so a search fetch and a
//! location fetch never block each other. Both publish into the same
//! [`SharedState`]; whichever completes last wins.

use std::sync::Arc;

use crate::{
    hub::ObserverHub,
    model::WeatherRecord,
    state::{SharedState, StateChange},
};

pub mod location;
pub mod search;

pub use location::{LocationFetchCoordinator, LocationOutcome};
pub use search::{SearchFetchCoordinator, SubmitOutcome};

/// Swap in `record` and tell observers with the snapshot of that write.
///
/// Concurrent publishes are delivered in write order, so the last
/// notification an observer gets matches what [`SharedState`] holds.
fn publish(state: &SharedState, hub: &ObserverHub, record: WeatherRecord) {
    tracing::info!(city = %record.city, "publishing weather");
    state.publish_weather_then(Arc::new(record), |snapshot| {
        hub.notify_changed(StateChange::Weather, snapshot);
    });
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    use crate::{
        client::NetworkClient,
        error::NetworkError,
        model::{Coordinates, WeatherRecord, fixtures},
    };

    pub const HERE: &str = "Here";

    /// In-memory client that records calls and can hold them in flight.
    #[derive(Debug, Default)]
    pub struct ScriptedClient {
        calls: Mutex<Vec<String>>,
        failing: Mutex<Vec<String>>,
        gate: Option<Semaphore>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl ScriptedClient {
        /// Every call completes immediately.
        pub fn open() -> Self {
            Self::default()
        }

        /// Every call waits for a permit from [`ScriptedClient::release`].
        pub fn gated() -> Self {
            Self { gate: Some(Semaphore::new(0)), ..Self::default() }
        }

        pub fn release(&self, calls: usize) {
            if let Some(gate) = &self.gate {
                gate.add_permits(calls);
            }
        }

        pub fn fail_on(&self, label: &str) {
            self.failing.lock().push(label.to_string());
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        pub fn max_concurrent(&self) -> usize {
            self.max_active.load(Ordering::SeqCst)
        }

        pub fn coordinate_label(coordinates: Coordinates) -> String {
            format!("@{},{}", coordinates.latitude, coordinates.longitude)
        }

        async fn serve(
            &self,
            label: String,
            city: &str,
            coordinates: Coordinates,
        ) -> Result<WeatherRecord, NetworkError> {
            self.calls.lock().push(label.clone());
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);

            if let Some(gate) = &self.gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }

            self.active.fetch_sub(1, Ordering::SeqCst);
            if self.failing.lock().contains(&label) {
                return Err(NetworkError::Status { status: 404, body: "city not found".into() });
            }
            Ok(fixtures::record(city, coordinates))
        }
    }

    #[async_trait]
    impl NetworkClient for ScriptedClient {
        async fn fetch_by_query(&self, query: &str) -> Result<WeatherRecord, NetworkError> {
            self.serve(query.to_string(), query, Coordinates::new(33.9192, -118.4165)).await
        }

        async fn fetch_by_coordinates(
            &self,
            coordinates: Coordinates,
        ) -> Result<WeatherRecord, NetworkError> {
            self.serve(Self::coordinate_label(coordinates), HERE, coordinates).await
        }
    }
}
