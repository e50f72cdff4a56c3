//! Weather service: normalized conditions, forecast and air quality

use serde::Serialize;
use shared::models::{AirQuality, WeatherForecast, WeatherSnapshot};
use shared::scales::AqiCategory;
use shared::{GpsCoordinates, LocationQuery};

use crate::error::{AppError, AppResult};
use crate::external::weather::WeatherClient;

/// Weather service backed by the provider client
#[derive(Clone)]
pub struct WeatherService {
    weather_client: WeatherClient,
}

/// Air quality with display labels
#[derive(Debug, Clone, Serialize)]
pub struct AirQualityReport {
    pub coordinates: GpsCoordinates,
    #[serde(flatten)]
    pub reading: AirQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_message: Option<&'static str>,
}

impl WeatherService {
    pub fn new(weather_client: WeatherClient) -> Self {
        Self { weather_client }
    }

    pub async fn current(&self, location: &LocationQuery) -> AppResult<WeatherSnapshot> {
        self.weather_client.get_current_weather(location).await
    }

    pub async fn forecast(&self, location: &LocationQuery) -> AppResult<WeatherForecast> {
        self.weather_client.get_forecast(location).await
    }

    /// Air quality for a location; city names are resolved through current weather
    pub async fn air_quality(&self, location: &LocationQuery) -> AppResult<AirQualityReport> {
        let coordinates = match location {
            LocationQuery::Coordinates(coords) => coords.clone(),
            LocationQuery::City(_) => self
                .weather_client
                .get_current_weather(location)
                .await?
                .coordinates
                .ok_or_else(|| AppError::NotFound(format!("Coordinates for {}", location)))?,
        };

        let reading = self
            .weather_client
            .get_air_quality(&coordinates)
            .await?
            .ok_or_else(|| AppError::NotFound("Air quality data".to_string()))?;

        Ok(build_air_quality_report(coordinates, reading))
    }
}

fn build_air_quality_report(coordinates: GpsCoordinates, reading: AirQuality) -> AirQualityReport {
    let label = reading.level.map(|l| l.label());
    // Provider levels 1-5 line up with the first five US AQI bands
    let health_message = reading.index.map(|i| {
        let aqi = match i {
            1 => 50,
            2 => 100,
            3 => 150,
            4 => 200,
            _ => 300,
        };
        AqiCategory::from_aqi(aqi).health_message()
    });

    AirQualityReport {
        coordinates,
        reading,
        label,
        health_message,
    }
}
