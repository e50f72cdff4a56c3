//! HTTP handlers for dashboard preferences

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{NotificationSettings, Preferences, SavedCoordinates};
use shared::GpsCoordinates;

use crate::error::{AppError, AppResult};
use crate::middleware::ClientId;
use crate::services::PreferencesService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveLocationInput {
    pub lat: Decimal,
    pub lon: Decimal,
    /// Epoch milliseconds; defaults to now
    pub timestamp: Option<i64>,
}

impl SaveLocationInput {
    fn into_saved(self) -> AppResult<SavedCoordinates> {
        if !GpsCoordinates::new(self.lat, self.lon).is_valid() {
            return Err(AppError::Validation {
                field: "lat".to_string(),
                message: "Coordinates are out of range".to_string(),
            });
        }

        Ok(SavedCoordinates {
            lat: self.lat,
            lon: self.lon,
            timestamp: self
                .timestamp
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
        })
    }
}

pub async fn get_preferences(
    State(state): State<AppState>,
    client: ClientId,
) -> AppResult<Json<Preferences>> {
    let service = PreferencesService::new(state.db, client.as_str());
    Ok(Json(service.preferences().await?))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    client: ClientId,
    Json(input): Json<Preferences>,
) -> AppResult<Json<Preferences>> {
    if input.default_location.chars().count() > 100 {
        return Err(AppError::Validation {
            field: "defaultLocation".to_string(),
            message: "Default location must be at most 100 characters".to_string(),
        });
    }

    let service = PreferencesService::new(state.db, client.as_str());
    Ok(Json(service.save_preferences(&input).await?))
}

pub async fn get_notifications(
    State(state): State<AppState>,
    client: ClientId,
) -> AppResult<Json<NotificationSettings>> {
    let service = PreferencesService::new(state.db, client.as_str());
    Ok(Json(service.notifications().await?))
}

pub async fn update_notifications(
    State(state): State<AppState>,
    client: ClientId,
    Json(input): Json<NotificationSettings>,
) -> AppResult<Json<NotificationSettings>> {
    let service = PreferencesService::new(state.db, client.as_str());
    Ok(Json(service.save_notifications(&input).await?))
}

/// Save the device position
pub async fn update_location(
    State(state): State<AppState>,
    client: ClientId,
    Json(input): Json<SaveLocationInput>,
) -> AppResult<Json<SavedCoordinates>> {
    let saved = input.into_saved()?;
    let service = PreferencesService::new(state.db, client.as_str());
    service.save_coordinates(&saved).await?;
    Ok(Json(saved))
}

pub async fn get_location(
    State(state): State<AppState>,
    client: ClientId,
) -> AppResult<Json<SavedCoordinates>> {
    let service = PreferencesService::new(state.db, client.as_str());
    service
        .coordinates()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Saved location".to_string()))
}

/// Remove all stored settings for the client
pub async fn reset_preferences(
    State(state): State<AppState>,
    client: ClientId,
) -> AppResult<StatusCode> {
    let service = PreferencesService::new(state.db, client.as_str());
    service.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}
