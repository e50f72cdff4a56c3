//! Threshold scales: AQI, UV index, Beaufort, temperature bands

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// US EPA AQI category (0-500 scale)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    pub fn health_message(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Air quality is satisfactory",
            AqiCategory::Moderate => "Air quality is acceptable for most people",
            AqiCategory::UnhealthyForSensitiveGroups => {
                "Sensitive groups should limit prolonged outdoor exertion"
            }
            AqiCategory::Unhealthy => "Everyone may begin to experience health effects",
            AqiCategory::VeryUnhealthy => "Health alert: everyone may experience serious effects",
            AqiCategory::Hazardous => "Health warning of emergency conditions",
        }
    }
}

/// OpenWeatherMap air quality index level (1-5)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityLevel {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
}

impl AirQualityLevel {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(AirQualityLevel::Good),
            2 => Some(AirQualityLevel::Fair),
            3 => Some(AirQualityLevel::Moderate),
            4 => Some(AirQualityLevel::Poor),
            5 => Some(AirQualityLevel::VeryPoor),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AirQualityLevel::Good => "Good",
            AirQualityLevel::Fair => "Fair",
            AirQualityLevel::Moderate => "Moderate",
            AirQualityLevel::Poor => "Poor",
            AirQualityLevel::VeryPoor => "Very Poor",
        }
    }
}

/// WHO UV index category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum UvCategory {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvCategory {
    pub fn from_index(uv_index: Decimal) -> Self {
        if uv_index <= Decimal::from(2) {
            UvCategory::Low
        } else if uv_index <= Decimal::from(5) {
            UvCategory::Moderate
        } else if uv_index <= Decimal::from(7) {
            UvCategory::High
        } else if uv_index <= Decimal::from(10) {
            UvCategory::VeryHigh
        } else {
            UvCategory::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UvCategory::Low => "Low",
            UvCategory::Moderate => "Moderate",
            UvCategory::High => "High",
            UvCategory::VeryHigh => "Very High",
            UvCategory::Extreme => "Extreme",
        }
    }

    pub fn risk(&self) -> &'static str {
        match self {
            UvCategory::Low => "Minimal risk",
            UvCategory::Moderate => "Low risk",
            UvCategory::High => "Moderate risk",
            UvCategory::VeryHigh => "High risk",
            UvCategory::Extreme => "Very high risk",
        }
    }
}

// Lowest km/h of Beaufort forces 1-12
const BEAUFORT_LOWER_KMH: [i64; 12] = [1, 6, 12, 20, 29, 39, 50, 62, 75, 89, 103, 118];

const BEAUFORT_NAMES: [&str; 13] = [
    "Calm",
    "Light air",
    "Light breeze",
    "Gentle breeze",
    "Moderate breeze",
    "Fresh breeze",
    "Strong breeze",
    "Near gale",
    "Gale",
    "Strong gale",
    "Storm",
    "Violent storm",
    "Hurricane",
];

/// Beaufort force (0-12) for a wind speed in km/h
pub fn beaufort_number(kmh: Decimal) -> u8 {
    let kmh = kmh.max(Decimal::ZERO);
    BEAUFORT_LOWER_KMH
        .iter()
        .position(|lower| kmh < Decimal::from(*lower))
        .unwrap_or(BEAUFORT_LOWER_KMH.len()) as u8
}

/// Name of a Beaufort force; forces above 12 read as hurricane
pub fn beaufort_description(force: u8) -> &'static str {
    BEAUFORT_NAMES[usize::from(force.min(12))]
}

/// Coarse temperature band used for colouring
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureBand {
    Freezing,
    Cold,
    Mild,
    Warm,
    Hot,
}

impl TemperatureBand {
    pub fn from_celsius(celsius: Decimal) -> Self {
        if celsius <= Decimal::ZERO {
            TemperatureBand::Freezing
        } else if celsius <= Decimal::from(10) {
            TemperatureBand::Cold
        } else if celsius <= Decimal::from(20) {
            TemperatureBand::Mild
        } else if celsius <= Decimal::from(30) {
            TemperatureBand::Warm
        } else {
            TemperatureBand::Hot
        }
    }
}
