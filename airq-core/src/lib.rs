//! Core library for the `airq` air-quality lookup tool.
//!
//! This crate defines:
//! - Shared domain models (locations, pollutant samples, reports)
//! - Selection of the reading reported per pollutant
//! - The Open-Meteo air quality fetcher and place search
//! - The map picker and the host-side view state
//! - Configuration & credentials handling
//!
//! It is used by `airq-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod geocode;
pub mod level;
pub mod model;
pub mod picker;
pub mod provider;
pub mod selector;
pub mod session;

pub use config::{Config, MapConfig};
pub use error::FetchError;
pub use geocode::{OpenMeteoGeocoder, Place, PlaceSearch};
pub use model::{
    AirQualityReport, AirQualityRequest, Location, Pollutant, PollutantReading, PollutantSample,
    PollutantSeries,
};
pub use picker::{MapPicker, MapView, Selection};
pub use provider::{AirQualityProvider, OpenMeteoProvider};
pub use session::{Session, ViewState};
