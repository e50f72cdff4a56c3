//! Shared types and alert logic for the Weather Dashboard
//!
//! This crate contains the alert derivation engine and the types shared
//! between the backend, the browser (via WASM), and other components.

pub mod alerts;
pub mod feed;
pub mod models;
pub mod scales;
pub mod settings;
pub mod store;
pub mod types;
pub mod units;

pub use alerts::{derive_alerts, derive_alerts_at};
pub use models::*;
pub use types::*;
