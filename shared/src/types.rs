//! Common types used across the dashboard

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build coordinates from provider floats; `None` for non-finite input
    pub fn from_f64(latitude: f64, longitude: f64) -> Option<Self> {
        Some(Self {
            latitude: Decimal::from_f64_retain(latitude)?,
            longitude: Decimal::from_f64_retain(longitude)?,
        })
    }

    /// Whether both components are within geographic bounds
    pub fn is_valid(&self) -> bool {
        self.latitude >= Decimal::from(-90)
            && self.latitude <= Decimal::from(90)
            && self.longitude >= Decimal::from(-180)
            && self.longitude <= Decimal::from(180)
    }
}

/// Where to ask the provider for weather
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LocationQuery {
    Coordinates(GpsCoordinates),
    City(String),
}

impl LocationQuery {
    pub fn coordinates(&self) -> Option<&GpsCoordinates> {
        match self {
            LocationQuery::Coordinates(coords) => Some(coords),
            LocationQuery::City(_) => None,
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Coordinates(c) => write!(f, "{},{}", c.latitude, c.longitude),
            LocationQuery::City(name) => write!(f, "{}", name),
        }
    }
}
