//! Unit conversions for display

use rust_decimal::Decimal;

use crate::models::{TemperatureUnit, WindSpeedUnit};

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Convert Celsius to Fahrenheit
pub fn celsius_to_fahrenheit(celsius: Decimal) -> Decimal {
    celsius * Decimal::from(9) / Decimal::from(5) + Decimal::from(32)
}

/// Convert Fahrenheit to Celsius
pub fn fahrenheit_to_celsius(fahrenheit: Decimal) -> Decimal {
    (fahrenheit - Decimal::from(32)) * Decimal::from(5) / Decimal::from(9)
}

/// Convert m/s to km/h
pub fn mps_to_kmh(mps: Decimal) -> Decimal {
    mps * Decimal::new(36, 1)
}

/// Convert km/h to mph
pub fn kmh_to_mph(kmh: Decimal) -> Decimal {
    kmh * Decimal::new(621371, 6)
}

/// Convert km/h to m/s
pub fn kmh_to_mps(kmh: Decimal) -> Decimal {
    kmh * Decimal::new(277778, 6)
}

/// Temperature in the requested unit, rounded to whole degrees
pub fn display_temperature(celsius: Decimal, unit: TemperatureUnit) -> Decimal {
    match unit {
        TemperatureUnit::Celsius => celsius.round(),
        TemperatureUnit::Fahrenheit => celsius_to_fahrenheit(celsius).round(),
    }
}

/// Wind speed (given in km/h) in the requested unit, rounded
pub fn display_wind_speed(kmh: Decimal, unit: WindSpeedUnit) -> Decimal {
    match unit {
        WindSpeedUnit::Kmh => kmh.round(),
        WindSpeedUnit::Mph => kmh_to_mph(kmh).round(),
        WindSpeedUnit::Ms => kmh_to_mps(kmh).round(),
    }
}

/// 16-point compass name for a bearing in degrees
pub fn compass_direction(degrees: i32) -> &'static str {
    let normalized = f64::from(degrees.rem_euclid(360));
    let index = (normalized / 22.5).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}
