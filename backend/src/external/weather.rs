//! Weather API client for fetching weather data
//!
//! Integrates with OpenWeatherMap: current conditions, 5-day/3-hour
//! forecast, air pollution and One Call alerts.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::models::{
    AirQuality, NativeAlert, OwmAirPollutionResponse, OwmCurrentResponse, OwmForecastResponse,
    OwmOneCallResponse, WeatherForecast, WeatherSnapshot,
};
use shared::{GpsCoordinates, LocationQuery};
use std::time::Duration;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    onecall_url: String,
}

impl WeatherClient {
    /// Create a new WeatherClient from configuration
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
            onecall_url: config.onecall_endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Create a new WeatherClient with custom base URLs (for testing)
    pub fn with_base_url(api_key: String, base_url: String, onecall_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            onecall_url,
        }
    }

    /// Fetch current weather conditions
    pub async fn get_current_weather(&self, location: &LocationQuery) -> AppResult<WeatherSnapshot> {
        let url = format!("{}/weather", self.base_url);
        let data: OwmCurrentResponse = self.fetch(&url, location_params(location), location).await?;

        Ok(WeatherSnapshot::from(data))
    }

    /// Fetch the 5-day / 3-hour forecast
    pub async fn get_forecast(&self, location: &LocationQuery) -> AppResult<WeatherForecast> {
        let url = format!("{}/forecast", self.base_url);
        let data: OwmForecastResponse = self.fetch(&url, location_params(location), location).await?;

        Ok(WeatherForecast::from(data))
    }

    /// Fetch the latest air quality reading
    pub async fn get_air_quality(&self, coords: &GpsCoordinates) -> AppResult<Option<AirQuality>> {
        let url = format!("{}/air_pollution", self.base_url);
        let location = LocationQuery::Coordinates(coords.clone());
        let data: OwmAirPollutionResponse =
            self.fetch(&url, coordinate_params(coords), &location).await?;

        Ok(data.into_air_quality())
    }

    /// Fetch provider-issued alerts
    ///
    /// The One Call API needs its own subscription, so any failure here is
    /// logged and reported as "no alerts supplied" instead of an error.
    pub async fn get_native_alerts(&self, coords: &GpsCoordinates) -> Option<Vec<NativeAlert>> {
        let url = format!("{}/onecall", self.onecall_url);
        let mut params = coordinate_params(coords);
        params.push(("exclude", "current,minutely,hourly,daily".to_string()));
        let location = LocationQuery::Coordinates(coords.clone());

        match self.fetch::<OwmOneCallResponse>(&url, params, &location).await {
            Ok(data) => data.into_native_alerts(),
            Err(e) => {
                tracing::warn!("Native alerts unavailable for {}: {}", location, e);
                None
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        mut params: Vec<(&'static str, String)>,
        location: &LocationQuery,
    ) -> AppResult<T> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "weather API key is not set".to_string(),
            ));
        }

        params.push(("units", "metric".to_string()));
        params.push(("appid", self.api_key.clone()));

        tracing::debug!("Weather API request: {} ({})", url, location);

        let response = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Weather API request failed: {}", e);
                AppError::WeatherServiceUnavailable
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body, location));
        }

        response.json::<T>().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse weather response: {}", e))
        })
    }
}

/// Query parameters selecting a location
pub fn location_params(location: &LocationQuery) -> Vec<(&'static str, String)> {
    match location {
        LocationQuery::Coordinates(coords) => coordinate_params(coords),
        LocationQuery::City(name) => vec![("q", name.trim().to_string())],
    }
}

fn coordinate_params(coords: &GpsCoordinates) -> Vec<(&'static str, String)> {
    vec![
        ("lat", coords.latitude.to_string()),
        ("lon", coords.longitude.to_string()),
    ]
}

/// Map a non-success provider response to an application error
fn status_error(status: StatusCode, body: &str, location: &LocationQuery) -> AppError {
    match (status, location) {
        (StatusCode::NOT_FOUND, LocationQuery::City(name)) => {
            AppError::CityNotFound(name.trim().to_string())
        }
        (StatusCode::TOO_MANY_REQUESTS, _) | (StatusCode::SERVICE_UNAVAILABLE, _) => {
            AppError::WeatherServiceUnavailable
        }
        _ => AppError::ExternalService(format!("Weather API error: {} - {}", status, body)),
    }
}
