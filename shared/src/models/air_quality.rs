//! Air quality models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::scales::AirQualityLevel;

/// Pollutant concentrations in μg/m³
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollutantConcentrations {
    pub co: Option<Decimal>,
    pub no2: Option<Decimal>,
    pub o3: Option<Decimal>,
    pub so2: Option<Decimal>,
    pub pm2_5: Option<Decimal>,
    pub pm10: Option<Decimal>,
}

/// Air quality reading from the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub measured_at: DateTime<Utc>,
    /// Provider index, 1 (good) to 5 (very poor)
    pub index: Option<u8>,
    pub level: Option<AirQualityLevel>,
    pub components: PollutantConcentrations,
}
