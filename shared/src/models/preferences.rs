//! Dashboard preference models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Temperature display unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl std::str::FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(format!("unknown temperature unit: {}", other)),
        }
    }
}

/// Wind speed display unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindSpeedUnit {
    #[default]
    Kmh,
    Mph,
    Ms,
}

impl WindSpeedUnit {
    pub fn label(&self) -> &'static str {
        match self {
            WindSpeedUnit::Kmh => "km/h",
            WindSpeedUnit::Mph => "mph",
            WindSpeedUnit::Ms => "m/s",
        }
    }
}

impl std::str::FromStr for WindSpeedUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kmh" | "km/h" => Ok(WindSpeedUnit::Kmh),
            "mph" => Ok(WindSpeedUnit::Mph),
            "ms" | "m/s" => Ok(WindSpeedUnit::Ms),
            other => Err(format!("unknown wind speed unit: {}", other)),
        }
    }
}

/// How often the dashboard refreshes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum UpdateFrequency {
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[default]
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "1hour")]
    Hourly,
}

impl UpdateFrequency {
    pub fn as_secs(&self) -> u64 {
        match self {
            UpdateFrequency::FiveMinutes => 5 * 60,
            UpdateFrequency::FifteenMinutes => 15 * 60,
            UpdateFrequency::ThirtyMinutes => 30 * 60,
            UpdateFrequency::Hourly => 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MapStyle {
    #[default]
    Standard,
    Satellite,
    Terrain,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// User display and location preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
    pub update_frequency: UpdateFrequency,
    pub map_style: MapStyle,
    pub theme: Theme,
    pub default_location: String,
    pub use_current_location: bool,
}

/// Which notifications the user wants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationSettings {
    pub severe_weather: bool,
    pub daily_summary: bool,
    pub app_updates: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            severe_weather: true,
            daily_summary: false,
            app_updates: true,
        }
    }
}

/// Last known device position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedCoordinates {
    pub lat: Decimal,
    pub lon: Decimal,
    /// Epoch milliseconds
    pub timestamp: i64,
}
