//! Core library for the `sizzler` weather tool.
//!
//! This crate defines:
//! - The weather data model and its display formatting
//! - Shared state and observer fan-out
//! - Single-flight fetch coordinators for search and location intents
//! - Abstractions over the network and location collaborators, with
//!   OpenWeatherMap and IP-lookup implementations
//! - Configuration handling
//!
//! It is used by `sizzler-cli`, but the coordinators work with any
//! [`NetworkClient`] / [`LocationProvider`].

pub mod client;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod hub;
pub mod location;
pub mod model;
pub mod state;

pub use client::{NetworkClient, OpenWeatherClient, TimeoutClient, client_from_config};
pub use config::Config;
pub use context::WeatherContext;
pub use coordinator::{
    LocationFetchCoordinator, LocationOutcome, SearchFetchCoordinator, SubmitOutcome,
};
pub use error::{LocationError, NetworkError};
pub use hub::{ObserverHub, SubscriptionHandle};
pub use location::{FixedLocationProvider, IpLocationProvider, LocationProvider};
pub use model::{Coordinates, Icon, MapRegion, Span, WeatherRecord};
pub use state::{SharedState, StateChange, StateSnapshot};
