//! OpenWeatherMap response payloads
//!
//! Deliberately lenient: every nested field is optional so a partial payload
//! still converts. Missing values stay `None` in the normalized models, `null`
//! arrays read as empty and forecast entries without a time are skipped.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::air_quality::{AirQuality, PollutantConcentrations};
use super::alert::NativeAlert;
use super::weather::{ForecastPoint, Precipitation, WeatherCondition, WeatherForecast, WeatherSnapshot};
use crate::scales::AirQualityLevel;
use crate::types::GpsCoordinates;

/// `GET /weather`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmCurrentResponse {
    pub coord: Option<OwmCoord>,
    #[serde(deserialize_with = "null_as_default")]
    pub weather: Vec<OwmWeather>,
    pub main: Option<OwmMain>,
    pub visibility: Option<i32>,
    pub wind: Option<OwmWind>,
    pub clouds: Option<OwmClouds>,
    pub rain: Option<OwmPrecipitation>,
    pub snow: Option<OwmPrecipitation>,
    pub dt: Option<i64>,
    pub sys: Option<OwmSys>,
    pub timezone: Option<i32>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmCoord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmWeather {
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmMain {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub pressure: Option<i32>,
    pub humidity: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmWind {
    pub speed: Option<f64>,
    pub deg: Option<i32>,
    pub gust: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmClouds {
    pub all: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmPrecipitation {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h")]
    pub three_hour: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmSys {
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

/// `GET /forecast`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmForecastResponse {
    pub city: Option<OwmCity>,
    #[serde(deserialize_with = "null_as_default")]
    pub list: Vec<OwmForecastItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmCity {
    pub name: Option<String>,
    pub coord: Option<OwmCoord>,
    pub timezone: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmForecastItem {
    pub dt: Option<i64>,
    pub main: Option<OwmMain>,
    #[serde(deserialize_with = "null_as_default")]
    pub weather: Vec<OwmWeather>,
    pub wind: Option<OwmWind>,
    pub visibility: Option<i32>,
    pub pop: Option<f64>,
    pub rain: Option<OwmPrecipitation>,
    pub snow: Option<OwmPrecipitation>,
}

/// `GET /air_pollution`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmAirPollutionResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub list: Vec<OwmAirPollutionItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmAirPollutionItem {
    pub dt: Option<i64>,
    pub main: Option<OwmAqiMain>,
    pub components: Option<OwmComponents>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmAqiMain {
    pub aqi: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmComponents {
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
}

/// One Call `alerts` section
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmOneCallResponse {
    pub alerts: Option<Vec<OwmAlert>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwmAlert {
    pub sender_name: Option<String>,
    pub event: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// Reads an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn dec(value: Option<f64>) -> Option<Decimal> {
    value.and_then(Decimal::from_f64_retain).map(|d| d.round_dp(2))
}

fn timestamp(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

fn coords(coord: Option<&OwmCoord>) -> Option<GpsCoordinates> {
    let coord = coord?;
    GpsCoordinates::from_f64(coord.lat?, coord.lon?)
}

fn precipitation(
    rain: Option<&OwmPrecipitation>,
    snow: Option<&OwmPrecipitation>,
) -> Precipitation {
    // Rain wins; snow water equivalent only fills in when no rain is reported
    let source = rain.or(snow);
    Precipitation {
        last_1h_mm: dec(source.and_then(|p| p.one_hour)),
        last_3h_mm: dec(source.and_then(|p| p.three_hour)),
    }
}

impl From<OwmCurrentResponse> for WeatherSnapshot {
    fn from(data: OwmCurrentResponse) -> Self {
        let weather = data.weather.first();
        let main = data.main.as_ref();
        let wind = data.wind.as_ref();
        let sys = data.sys.as_ref();

        WeatherSnapshot {
            observed_at: timestamp(data.dt),
            location_name: data.name.clone().filter(|n| !n.is_empty()),
            coordinates: coords(data.coord.as_ref()),
            temperature_celsius: dec(main.and_then(|m| m.temp)),
            feels_like_celsius: dec(main.and_then(|m| m.feels_like)),
            humidity_percent: main.and_then(|m| m.humidity),
            pressure_hpa: main.and_then(|m| m.pressure),
            wind_speed_mps: dec(wind.and_then(|w| w.speed)),
            wind_direction_deg: wind.and_then(|w| w.deg),
            wind_gust_mps: dec(wind.and_then(|w| w.gust)),
            visibility_meters: data.visibility,
            cloud_coverage_percent: data.clouds.as_ref().and_then(|c| c.all),
            condition: weather
                .and_then(|w| w.main.as_deref())
                .map(WeatherCondition::from),
            description: weather.and_then(|w| w.description.clone()),
            icon: weather.and_then(|w| w.icon.clone()),
            precipitation: precipitation(data.rain.as_ref(), data.snow.as_ref()),
            sunrise: timestamp(sys.and_then(|s| s.sunrise)),
            sunset: timestamp(sys.and_then(|s| s.sunset)),
        }
    }
}

impl OwmForecastItem {
    fn into_point(self) -> Option<ForecastPoint> {
        let timestamp = timestamp(self.dt)?;
        let weather = self.weather.first();
        let main = self.main.as_ref();
        let wind = self.wind.as_ref();

        Some(ForecastPoint {
            timestamp,
            temperature_celsius: dec(main.and_then(|m| m.temp)),
            feels_like_celsius: dec(main.and_then(|m| m.feels_like)),
            temp_min_celsius: dec(main.and_then(|m| m.temp_min)),
            temp_max_celsius: dec(main.and_then(|m| m.temp_max)),
            humidity_percent: main.and_then(|m| m.humidity),
            wind_speed_mps: dec(wind.and_then(|w| w.speed)),
            wind_direction_deg: wind.and_then(|w| w.deg),
            visibility_meters: self.visibility,
            condition: weather
                .and_then(|w| w.main.as_deref())
                .map(WeatherCondition::from),
            description: weather.and_then(|w| w.description.clone()),
            icon: weather.and_then(|w| w.icon.clone()),
            pop: dec(self.pop),
            precipitation: precipitation(self.rain.as_ref(), self.snow.as_ref()),
        })
    }
}

impl From<OwmForecastResponse> for WeatherForecast {
    fn from(data: OwmForecastResponse) -> Self {
        let city = data.city.as_ref();
        WeatherForecast {
            location_name: city.and_then(|c| c.name.clone()).filter(|n| !n.is_empty()),
            coordinates: coords(city.and_then(|c| c.coord.as_ref())),
            timezone_offset_seconds: city.and_then(|c| c.timezone).unwrap_or(0),
            points: data
                .list
                .into_iter()
                .filter_map(OwmForecastItem::into_point)
                .collect(),
        }
    }
}

impl OwmAirPollutionResponse {
    /// Latest reading, if the provider returned any
    pub fn into_air_quality(self) -> Option<AirQuality> {
        let (measured_at, item) = self
            .list
            .into_iter()
            .filter_map(|item| Some((timestamp(item.dt)?, item)))
            .max_by_key(|(at, _)| *at)?;
        let index = item.main.as_ref().and_then(|m| m.aqi);
        let c = item.components.unwrap_or_default();

        Some(AirQuality {
            measured_at,
            index,
            level: index.and_then(AirQualityLevel::from_index),
            components: PollutantConcentrations {
                co: dec(c.co),
                no2: dec(c.no2),
                o3: dec(c.o3),
                so2: dec(c.so2),
                pm2_5: dec(c.pm2_5),
                pm10: dec(c.pm10),
            },
        })
    }
}

impl From<OwmAlert> for NativeAlert {
    fn from(alert: OwmAlert) -> Self {
        NativeAlert {
            sender_name: alert.sender_name,
            event: alert.event.unwrap_or_default(),
            start: alert.start,
            end: alert.end,
            description: alert.description,
            tags: alert.tags,
        }
    }
}

impl OwmOneCallResponse {
    /// `None` when the payload has no alerts section at all
    pub fn into_native_alerts(self) -> Option<Vec<NativeAlert>> {
        self.alerts
            .map(|alerts| alerts.into_iter().map(NativeAlert::from).collect())
    }
}
