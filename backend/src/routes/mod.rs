//! Route definitions for the Weather Dashboard API

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/weather", weather_routes())
        .nest("/alerts", alert_routes())
        .nest("/preferences", preference_routes())
}

/// Weather data routes
fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/current", get(handlers::get_current_weather))
        .route("/forecast", get(handlers::get_forecast))
        .route("/air-quality", get(handlers::get_air_quality))
}

/// Alert derivation and dismissal routes
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_alerts))
        .route("/latest", get(handlers::get_latest_alerts))
        .route("/refresh", post(handlers::refresh_alerts))
        .route("/dismissed", delete(handlers::clear_dismissed_alerts))
        .route("/:alert_id/dismiss", post(handlers::dismiss_alert))
}

/// Per-client settings routes
fn preference_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_preferences)
                .put(handlers::update_preferences)
                .delete(handlers::reset_preferences),
        )
        .route(
            "/notifications",
            get(handlers::get_notifications).put(handlers::update_notifications),
        )
        .route(
            "/location",
            get(handlers::get_location).put(handlers::update_location),
        )
}
