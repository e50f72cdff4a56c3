//! Business logic services for the Weather Dashboard

pub mod alerts;
pub mod preferences;
pub mod refresh;
pub mod weather;

pub use alerts::{AlertReport, AlertService, LatestReport};
pub use preferences::{PgKeyValueStore, PreferencesService};
pub use refresh::RefreshPoller;
pub use weather::WeatherService;
