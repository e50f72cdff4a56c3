//! WebAssembly module for the Weather Dashboard
//!
//! Provides client-side computation for:
//! - Weather alert derivation from provider payloads
//! - Alert feeds with dismissal state kept in localStorage
//! - Unit conversions and scale lookups
//! - Preference persistence

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::feed::{build_feed, AlertFilter};
use shared::models::{
    AlertRecord, ForecastPoint, NativeAlert, OwmCurrentResponse, OwmForecastResponse,
    OwmOneCallResponse, Preferences, TemperatureUnit, WeatherForecast, WeatherSnapshot,
    WindSpeedUnit,
};
use shared::scales::{self, AqiCategory, TemperatureBand, UvCategory};
use shared::settings::SettingsRepository;
use shared::units;

mod storage;

pub use storage::LocalStorage;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn float(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn now() -> DateTime<Utc> {
    #[cfg(target_arch = "wasm32")]
    {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Utc::now()
    }
}

fn settings() -> Result<SettingsRepository<LocalStorage>, JsValue> {
    let store = LocalStorage::open().map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(SettingsRepository::new(store))
}

fn store_error(e: shared::store::StoreError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Derive alerts from normalized snapshots
///
/// `forecast_json` is an array of forecast points; `native_json` an optional
/// array of provider alerts. Returns the alert list as JSON.
#[wasm_bindgen]
pub fn derive_alerts(
    current_json: &str,
    forecast_json: &str,
    native_json: Option<String>,
) -> Result<String, JsValue> {
    let current: WeatherSnapshot = parse(current_json, "current weather")?;
    let forecast: Vec<ForecastPoint> = parse(forecast_json, "forecast")?;
    let native: Option<Vec<NativeAlert>> = native_json
        .as_deref()
        .map(|json| parse(json, "native alerts"))
        .transpose()?;

    let alerts = shared::derive_alerts_at(&current, &forecast, native.as_deref(), now());
    to_json(&alerts)
}

/// Derive alerts straight from OpenWeatherMap responses
#[wasm_bindgen]
pub fn derive_alerts_from_openweather(
    weather_json: &str,
    forecast_json: &str,
    onecall_json: Option<String>,
) -> Result<String, JsValue> {
    let current = WeatherSnapshot::from(parse::<OwmCurrentResponse>(weather_json, "weather")?);
    let forecast = WeatherForecast::from(parse::<OwmForecastResponse>(forecast_json, "forecast")?);

    // A broken One Call payload only means no native alerts
    let native = onecall_json.and_then(|json| match serde_json::from_str::<OwmOneCallResponse>(&json) {
        Ok(data) => data.into_native_alerts(),
        Err(e) => {
            web_sys::console::warn_1(&format!("Ignoring One Call payload: {}", e).into());
            None
        }
    });

    let alerts = shared::derive_alerts_at(&current, &forecast.points, native.as_deref(), now());
    to_json(&alerts)
}

/// Filter alerts and attach dismissal state from localStorage
///
/// Dismissals of alerts missing from `alerts_json` are forgotten.
#[wasm_bindgen]
pub fn alert_feed(alerts_json: &str, filter: &str, show_dismissed: bool) -> Result<String, JsValue> {
    let alerts: Vec<AlertRecord> = parse(alerts_json, "alerts")?;
    let filter: AlertFilter = filter.parse().map_err(|e: String| JsValue::from_str(&e))?;
    let dismissed = settings()?
        .prune_dismissed(alerts.iter().map(|a| a.id.as_str()))
        .map_err(store_error)?;

    let feed = build_feed(&alerts, &dismissed, filter, show_dismissed, now());
    to_json(&feed)
}

/// Returns false if the alert was already dismissed
#[wasm_bindgen]
pub fn dismiss_alert(id: &str) -> Result<bool, JsValue> {
    settings()?.dismiss_alert(id).map_err(store_error)
}

#[wasm_bindgen]
pub fn clear_dismissed_alerts() -> Result<(), JsValue> {
    settings()?.clear_dismissed_alerts().map_err(store_error)
}

#[wasm_bindgen]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    float(units::celsius_to_fahrenheit(decimal(celsius)))
}

#[wasm_bindgen]
pub fn mps_to_kmh(mps: f64) -> f64 {
    float(units::mps_to_kmh(decimal(mps)))
}

/// Whole degrees in `celsius` or `fahrenheit`
#[wasm_bindgen]
pub fn display_temperature(celsius: f64, unit: &str) -> Result<f64, JsValue> {
    let unit: TemperatureUnit = unit.parse().map_err(|e: String| JsValue::from_str(&e))?;
    Ok(float(units::display_temperature(decimal(celsius), unit)))
}

/// Convert km/h to `kmh`, `mph` or `ms`, rounded
#[wasm_bindgen]
pub fn convert_wind_speed(kmh: f64, unit: &str) -> Result<f64, JsValue> {
    let unit: WindSpeedUnit = unit.parse().map_err(|e: String| JsValue::from_str(&e))?;
    Ok(float(units::display_wind_speed(decimal(kmh), unit)))
}

#[wasm_bindgen]
pub fn compass_direction(degrees: i32) -> String {
    units::compass_direction(degrees).to_string()
}

#[wasm_bindgen]
pub fn aqi_category(aqi: u16) -> String {
    AqiCategory::from_aqi(aqi).label().to_string()
}

#[wasm_bindgen]
pub fn uv_category(uv_index: f64) -> String {
    UvCategory::from_index(decimal(uv_index)).label().to_string()
}

#[wasm_bindgen]
pub fn uv_risk(uv_index: f64) -> String {
    UvCategory::from_index(decimal(uv_index)).risk().to_string()
}

/// Colour band name: freezing, cold, mild, warm or hot
#[wasm_bindgen]
pub fn temperature_band(celsius: f64) -> Result<String, JsValue> {
    let band = TemperatureBand::from_celsius(decimal(celsius));
    serde_json::to_value(band)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or_else(|| JsValue::from_str("unserializable temperature band"))
}

#[wasm_bindgen]
pub fn beaufort_number(kmh: f64) -> u8 {
    scales::beaufort_number(decimal(kmh))
}

#[wasm_bindgen]
pub fn beaufort_description(force: u8) -> String {
    scales::beaufort_description(force).to_string()
}

/// Stored preferences, defaults filled in
#[wasm_bindgen]
pub fn load_preferences() -> Result<String, JsValue> {
    let prefs = settings()?.preferences().map_err(store_error)?;
    to_json(&prefs)
}

#[wasm_bindgen]
pub fn save_preferences(preferences_json: &str) -> Result<(), JsValue> {
    let prefs: Preferences = parse(preferences_json, "preferences")?;
    settings()?.save_preferences(&prefs).map_err(store_error)
}

#[wasm_bindgen]
pub fn dark_mode() -> Result<bool, JsValue> {
    settings()?.dark_mode().map_err(store_error)
}

#[wasm_bindgen]
pub fn set_dark_mode(enabled: bool) -> Result<(), JsValue> {
    settings()?.set_dark_mode(enabled).map_err(store_error)
}

/// Refresh interval implied by the stored update frequency
#[wasm_bindgen]
pub fn update_interval_secs() -> Result<u32, JsValue> {
    let prefs = settings()?.preferences().map_err(store_error)?;
    Ok(prefs.update_frequency.as_secs() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversions() {
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < 0.001);
        assert!((mps_to_kmh(10.0) - 36.0).abs() < 0.001);
        assert_eq!(compass_direction(90), "E");
        assert_eq!(display_temperature(21.6, "fahrenheit").unwrap(), 71.0);
        assert!(display_temperature(21.6, "kelvin").is_err());
    }

    #[test]
    fn test_scale_labels() {
        assert_eq!(aqi_category(42), "Good");
        assert_eq!(uv_category(8.0), "Very High");
        assert_eq!(uv_risk(1.0), "Minimal risk");
        assert_eq!(temperature_band(-3.0).unwrap(), "freezing");
        assert_eq!(beaufort_number(54.0), 7);
        assert_eq!(beaufort_description(7), "Near gale");
    }

    #[test]
    fn test_derive_alerts_heat() {
        let current = r#"{"temperature_celsius": "36", "condition": "Clear"}"#;
        let json = derive_alerts(current, "[]", None).unwrap();
        let alerts: Vec<AlertRecord> = serde_json::from_str(&json).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "Extreme Heat Warning");
    }

    #[test]
    fn test_derive_alerts_from_openweather_calm() {
        let weather = r#"{"weather":[{"main":"Clear"}],"main":{"temp":20.0},"wind":{"speed":5.0},"visibility":10000,"name":"Oslo"}"#;
        let json = derive_alerts_from_openweather(weather, r#"{"list":[]}"#, None).unwrap();
        let alerts: Vec<AlertRecord> = serde_json::from_str(&json).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "No Active Alerts");
        assert_eq!(alerts[0].location.as_deref(), Some("Oslo"));
    }
}
