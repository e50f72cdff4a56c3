//! HTTP handlers for weather alert endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::feed::{build_feed, AlertFeed, AlertFilter};

use crate::error::{AppError, AppResult};
use crate::handlers::weather::LocationParams;
use crate::middleware::ClientId;
use crate::services::{AlertReport, AlertService, PreferencesService};
use crate::AppState;

// Location fields are repeated here; flattening breaks typed query parsing
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub city: Option<String>,

    #[serde(rename = "type")]
    pub alert_type: Option<String>,

    #[serde(default)]
    pub show_dismissed: bool,
}

impl AlertQuery {
    fn location_params(&self) -> LocationParams {
        LocationParams {
            lat: self.lat,
            lon: self.lon,
            city: self.city.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlertFeedResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(flatten)]
    pub feed: AlertFeed,
}

#[derive(Debug, Serialize)]
pub struct DismissResponse {
    pub id: String,
    pub newly_dismissed: bool,
}

fn parse_filter(raw: Option<&str>) -> AppResult<AlertFilter> {
    raw.unwrap_or_default()
        .parse()
        .map_err(|message| AppError::Validation {
            field: "type".to_string(),
            message,
        })
}

/// Derive alerts for a location and return them as a feed
pub async fn get_alerts(
    State(state): State<AppState>,
    client: ClientId,
    Query(query): Query<AlertQuery>,
) -> AppResult<Json<AlertFeedResponse>> {
    let filter = parse_filter(query.alert_type.as_deref())?;
    let location = query.location_params().to_location()?;

    let report = AlertService::new(state.weather_client)
        .derive_for(&location)
        .await?;
    let live_ids: Vec<String> = report.alerts.iter().map(|a| a.id.clone()).collect();
    let dismissed = PreferencesService::new(state.db, client.as_str())
        .prune_dismissed(&live_ids)
        .await?;

    let feed = build_feed(
        &report.alerts,
        &dismissed,
        filter,
        query.show_dismissed,
        report.generated_at,
    );

    Ok(Json(AlertFeedResponse {
        location_name: report.location_name,
        feed,
    }))
}

/// Latest report produced by the background refresh
pub async fn get_latest_alerts(State(state): State<AppState>) -> AppResult<Json<AlertReport>> {
    state
        .latest_report
        .read()
        .await
        .clone()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Alert report".to_string()))
}

/// Re-derive alerts for the configured default location now
pub async fn refresh_alerts(State(state): State<AppState>) -> AppResult<Json<AlertReport>> {
    let location = state.config.refresh.location().ok_or_else(|| {
        AppError::Configuration("no default refresh location is configured".to_string())
    })?;

    let report = AlertService::new(state.weather_client)
        .refresh(&location, &state.latest_report)
        .await?;
    Ok(Json(report))
}

pub async fn dismiss_alert(
    State(state): State<AppState>,
    client: ClientId,
    Path(alert_id): Path<String>,
) -> AppResult<Json<DismissResponse>> {
    let id = alert_id.trim();
    if id.is_empty() {
        return Err(AppError::Validation {
            field: "id".to_string(),
            message: "Alert id is required".to_string(),
        });
    }

    let newly_dismissed = PreferencesService::new(state.db, client.as_str())
        .dismiss_alert(id)
        .await?;

    Ok(Json(DismissResponse {
        id: id.to_string(),
        newly_dismissed,
    }))
}

pub async fn clear_dismissed_alerts(
    State(state): State<AppState>,
    client: ClientId,
) -> AppResult<StatusCode> {
    PreferencesService::new(state.db, client.as_str())
        .clear_dismissed_alerts()
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter(None).unwrap(), AlertFilter::All);
        assert_eq!(parse_filter(Some("watch")).unwrap(), AlertFilter::Watch);
        assert!(matches!(
            parse_filter(Some("tornado")),
            Err(AppError::Validation { field, .. }) if field == "type"
        ));
    }
}
