//! HTTP request handlers

pub mod alerts;
pub mod health;
pub mod preferences;
pub mod weather;

pub use alerts::*;
pub use health::*;
pub use preferences::*;
pub use weather::*;
