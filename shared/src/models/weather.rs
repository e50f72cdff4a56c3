//! Weather observation and forecast models
//!
//! All values are metric: °C, m/s, meters, millimeters. Every measurement is
//! optional because the provider omits fields freely; consumers treat an
//! absent value as "unknown", never as zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::GpsCoordinates;
use crate::units::mps_to_kmh;

/// Primary weather condition group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Drizzle,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Haze,
    Smoke,
    Dust,
    Other(String),
}

impl WeatherCondition {
    pub fn as_str(&self) -> &str {
        match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::Clouds => "Clouds",
            WeatherCondition::Drizzle => "Drizzle",
            WeatherCondition::Rain => "Rain",
            WeatherCondition::Thunderstorm => "Thunderstorm",
            WeatherCondition::Snow => "Snow",
            WeatherCondition::Mist => "Mist",
            WeatherCondition::Fog => "Fog",
            WeatherCondition::Haze => "Haze",
            WeatherCondition::Smoke => "Smoke",
            WeatherCondition::Dust => "Dust",
            WeatherCondition::Other(name) => name,
        }
    }
}

impl From<&str> for WeatherCondition {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "clear" => WeatherCondition::Clear,
            "clouds" => WeatherCondition::Clouds,
            "drizzle" => WeatherCondition::Drizzle,
            "rain" => WeatherCondition::Rain,
            "thunderstorm" => WeatherCondition::Thunderstorm,
            "snow" => WeatherCondition::Snow,
            "mist" => WeatherCondition::Mist,
            "fog" => WeatherCondition::Fog,
            "haze" => WeatherCondition::Haze,
            "smoke" => WeatherCondition::Smoke,
            "dust" | "sand" => WeatherCondition::Dust,
            _ => WeatherCondition::Other(value.trim().to_string()),
        }
    }
}

impl From<String> for WeatherCondition {
    fn from(value: String) -> Self {
        WeatherCondition::from(value.as_str())
    }
}

impl From<WeatherCondition> for String {
    fn from(value: WeatherCondition) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precipitation accumulated over the provider's trailing windows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Precipitation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_1h_mm: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_3h_mm: Option<Decimal>,
}

/// Current conditions at one location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSnapshot {
    pub observed_at: Option<DateTime<Utc>>,
    pub location_name: Option<String>,
    pub coordinates: Option<GpsCoordinates>,
    pub temperature_celsius: Option<Decimal>,
    pub feels_like_celsius: Option<Decimal>,
    pub humidity_percent: Option<i32>,
    pub pressure_hpa: Option<i32>,
    pub wind_speed_mps: Option<Decimal>,
    pub wind_direction_deg: Option<i32>,
    pub wind_gust_mps: Option<Decimal>,
    pub visibility_meters: Option<i32>,
    pub cloud_coverage_percent: Option<i32>,
    pub condition: Option<WeatherCondition>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub precipitation: Precipitation,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

impl WeatherSnapshot {
    pub fn wind_speed_kmh(&self) -> Option<Decimal> {
        self.wind_speed_mps.map(mps_to_kmh)
    }

    pub fn is_condition(&self, condition: &WeatherCondition) -> bool {
        self.condition.as_ref() == Some(condition)
    }
}

/// One upcoming forecast step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub temperature_celsius: Option<Decimal>,
    #[serde(default)]
    pub feels_like_celsius: Option<Decimal>,
    #[serde(default)]
    pub temp_min_celsius: Option<Decimal>,
    #[serde(default)]
    pub temp_max_celsius: Option<Decimal>,
    #[serde(default)]
    pub humidity_percent: Option<i32>,
    #[serde(default)]
    pub wind_speed_mps: Option<Decimal>,
    #[serde(default)]
    pub wind_direction_deg: Option<i32>,
    #[serde(default)]
    pub visibility_meters: Option<i32>,
    #[serde(default)]
    pub condition: Option<WeatherCondition>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Probability of precipitation (0-1)
    #[serde(default)]
    pub pop: Option<Decimal>,
    #[serde(default)]
    pub precipitation: Precipitation,
}

impl ForecastPoint {
    /// A point with only a timestamp; every measurement unknown
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            temperature_celsius: None,
            feels_like_celsius: None,
            temp_min_celsius: None,
            temp_max_celsius: None,
            humidity_percent: None,
            wind_speed_mps: None,
            wind_direction_deg: None,
            visibility_meters: None,
            condition: None,
            description: None,
            icon: None,
            pop: None,
            precipitation: Precipitation::default(),
        }
    }

    pub fn wind_speed_kmh(&self) -> Option<Decimal> {
        self.wind_speed_mps.map(mps_to_kmh)
    }
}

/// Short-range forecast for a location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub location_name: Option<String>,
    pub coordinates: Option<GpsCoordinates>,
    pub timezone_offset_seconds: i32,
    pub points: Vec<ForecastPoint>,
}
