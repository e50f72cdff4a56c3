//! HTTP handlers for weather endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::models::{WeatherForecast, WeatherSnapshot};
use shared::{GpsCoordinates, LocationQuery};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::weather::{AirQualityReport, WeatherService};
use crate::AppState;

/// Location selector shared by weather and alert endpoints
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LocationParams {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lon: Option<f64>,

    #[validate(length(min = 1, max = 100, message = "City must be 1-100 characters"))]
    pub city: Option<String>,
}

impl LocationParams {
    /// Coordinates win when both are given; otherwise a non-blank city
    pub fn to_location(&self) -> AppResult<LocationQuery> {
        self.validate()?;

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => GpsCoordinates::from_f64(lat, lon)
                .map(LocationQuery::Coordinates)
                .ok_or_else(|| AppError::Validation {
                    field: "lat".to_string(),
                    message: "Coordinates must be finite numbers".to_string(),
                }),
            (Some(_), None) | (None, Some(_)) => Err(AppError::Validation {
                field: if self.lat.is_some() { "lon" } else { "lat" }.to_string(),
                message: "Both lat and lon are required".to_string(),
            }),
            (None, None) => self
                .city
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| LocationQuery::City(c.to_string()))
                .ok_or(AppError::LocationRequired),
        }
    }
}

/// Get current conditions
pub async fn get_current_weather(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> AppResult<Json<WeatherSnapshot>> {
    let location = params.to_location()?;
    let service = WeatherService::new(state.weather_client);
    Ok(Json(service.current(&location).await?))
}

/// Get the 5-day / 3-hour forecast
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> AppResult<Json<WeatherForecast>> {
    let location = params.to_location()?;
    let service = WeatherService::new(state.weather_client);
    Ok(Json(service.forecast(&location).await?))
}

/// Get the latest air quality reading
pub async fn get_air_quality(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> AppResult<Json<AirQualityReport>> {
    let location = params.to_location()?;
    let service = WeatherService::new(state.weather_client);
    Ok(Json(service.air_quality(&location).await?))
}
