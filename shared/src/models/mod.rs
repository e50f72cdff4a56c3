//! Domain models for the Weather Dashboard

mod air_quality;
mod alert;
mod openweather;
mod preferences;
mod weather;

pub use air_quality::*;
pub use alert::*;
pub use openweather::*;
pub use preferences::*;
pub use weather::*;
