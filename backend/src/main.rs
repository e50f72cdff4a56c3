//! Weather Dashboard - Backend Server
//!
//! Serves normalized weather data, derived weather alerts and per-client
//! dashboard settings.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod middleware;
mod routes;
mod services;

pub use config::Config;

use external::WeatherClient;
use services::{AlertService, LatestReport, RefreshPoller};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub weather_client: WeatherClient,
    pub latest_report: LatestReport,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wxd_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Weather Dashboard Server");
    tracing::info!("Environment: {}", config.environment);

    if config.weather.api_key.trim().is_empty() {
        tracing::warn!("WXD_WEATHER__API_KEY is not set; weather requests will fail");
    }

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let weather_client = WeatherClient::new(&config.weather)?;
    let latest_report: LatestReport = Arc::new(RwLock::new(None));

    // Background refresh of the default location
    if config.refresh.enabled {
        match config.refresh.location() {
            Some(location) => {
                RefreshPoller::new(
                    AlertService::new(weather_client.clone()),
                    location,
                    Duration::from_secs(config.refresh.interval_secs.max(60)),
                    latest_report.clone(),
                )
                .spawn();
            }
            None => tracing::warn!("Alert refresh enabled but no location configured"),
        }
    }

    // Create application state
    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
        weather_client,
        latest_report,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Weather Dashboard API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = Config {
            environment: "test".to_string(),
            server: config::ServerConfig::default(),
            database: config::DatabaseConfig {
                url: "postgres://localhost/wxd_test".to_string(),
                max_connections: 1,
                min_connections: 0,
            },
            weather: config::WeatherConfig {
                api_endpoint: "http://localhost:9".to_string(),
                onecall_endpoint: "http://localhost:9".to_string(),
                api_key: String::new(),
                timeout_secs: 1,
            },
            refresh: config::RefreshConfig::default(),
        };

        AppState {
            db: PgPoolOptions::new()
                .connect_lazy(&config.database.url)
                .unwrap(),
            weather_client: WeatherClient::new(&config.weather).unwrap(),
            config: Arc::new(config),
            latest_report: Arc::new(RwLock::new(None)),
        }
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        create_app(test_state()).oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_root_and_liveness() {
        assert_eq!(status_of("GET", "/").await, StatusCode::OK);
        assert_eq!(status_of("GET", "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_alerts_require_location() {
        assert_eq!(status_of("GET", "/api/v1/alerts").await, StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of("GET", "/api/v1/alerts?lat=120&lon=0").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of("GET", "/api/v1/alerts?city=Oslo&type=tornado").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_latest_report_missing_before_first_refresh() {
        assert_eq!(
            status_of("GET", "/api/v1/alerts/latest").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_manual_refresh_without_location_is_server_error() {
        assert_eq!(
            status_of("POST", "/api/v1/alerts/refresh").await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_weather_without_api_key_is_server_error() {
        assert_eq!(
            status_of("GET", "/api/v1/weather/current?city=Oslo").await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
