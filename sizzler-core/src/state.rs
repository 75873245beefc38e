use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::model::{MapRegion, WeatherRecord};

pub const DEFAULT_SEARCH_TEXT: &str = "El Segundo";

/// Point-in-time copy of the shared state handed to readers and observers.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub search_text: String,
    pub current_weather: Option<Arc<WeatherRecord>>,
    pub map_region: MapRegion,
}

/// Which field of the shared state a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    SearchText,
    Weather,
}

/// Single source of truth for what the presentation layer shows.
///
/// Only the coordinators in this crate write; everyone else reads snapshots.
/// The weather record and the region derived from it are swapped under one
/// write lock, so a reader never sees one without the other.
#[derive(Debug)]
pub struct SharedState {
    inner: RwLock<StateSnapshot>,
    // Held across a weather write and its delivery so observers see
    // publishes in the order they hit the state.
    publish_order: Mutex<()>,
}

impl SharedState {
    pub fn new(search_text: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(StateSnapshot {
                search_text: search_text.into(),
                current_weather: None,
                map_region: MapRegion::default(),
            }),
            publish_order: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.inner.read().clone()
    }

    pub fn search_text(&self) -> String {
        self.inner.read().search_text.clone()
    }

    pub fn current_weather(&self) -> Option<Arc<WeatherRecord>> {
        self.inner.read().current_weather.clone()
    }

    pub fn map_region(&self) -> MapRegion {
        self.inner.read().map_region
    }

    /// Returns the snapshot as of this write.
    pub(crate) fn set_search_text(&self, text: String) -> StateSnapshot {
        let mut inner = self.inner.write();
        inner.search_text = text;
        inner.clone()
    }

    /// Swap in `record` and its region. Returns the snapshot taken under the
    /// same write lock.
    pub(crate) fn publish_weather(&self, record: Arc<WeatherRecord>) -> StateSnapshot {
        let region = MapRegion::around(&record);
        let mut inner = self.inner.write();
        inner.current_weather = Some(record);
        inner.map_region = region;
        inner.clone()
    }

    /// Publish `record` and hand its snapshot to `deliver` before the next
    /// publish can start.
    ///
    /// `deliver` must not publish weather itself.
    pub(crate) fn publish_weather_then(
        &self,
        record: Arc<WeatherRecord>,
        deliver: impl FnOnce(&StateSnapshot),
    ) {
        let _order = self.publish_order.lock();
        let snapshot = self.publish_weather(record);
        deliver(&snapshot);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_TEXT)
    }
}
