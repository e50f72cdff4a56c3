//! Alert service: fetch weather for a location and run the derivation engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::alerts::derive_alerts_at;
use shared::models::{AlertRecord, WeatherSnapshot};
use shared::LocationQuery;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::external::weather::WeatherClient;

/// Result of one derivation pass for a location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertReport {
    pub location: LocationQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub current: WeatherSnapshot,
    pub alerts: Vec<AlertRecord>,
}

/// Most recent report; later writes replace earlier ones
pub type LatestReport = Arc<RwLock<Option<AlertReport>>>;

#[derive(Clone)]
pub struct AlertService {
    weather_client: WeatherClient,
}

impl AlertService {
    pub fn new(weather_client: WeatherClient) -> Self {
        Self { weather_client }
    }

    /// Fetch current conditions, forecast and native alerts, then derive
    pub async fn derive_for(&self, location: &LocationQuery) -> AppResult<AlertReport> {
        let (current, forecast) = tokio::try_join!(
            self.weather_client.get_current_weather(location),
            self.weather_client.get_forecast(location),
        )?;

        // One Call only takes coordinates; city lookups use the resolved position
        let coords = location
            .coordinates()
            .cloned()
            .or_else(|| current.coordinates.clone());
        let native = match coords {
            Some(coords) => self.weather_client.get_native_alerts(&coords).await,
            None => None,
        };

        let generated_at = Utc::now();
        let alerts = derive_alerts_at(&current, &forecast.points, native.as_deref(), generated_at);

        tracing::info!(
            "Derived {} alert(s) for {} ({} native)",
            alerts.len(),
            location,
            native.as_ref().map(Vec::len).unwrap_or(0)
        );

        Ok(AlertReport {
            location: location.clone(),
            location_name: current.location_name.clone().or(forecast.location_name),
            generated_at,
            current,
            alerts,
        })
    }

    /// Derive and publish as the latest report
    pub async fn refresh(
        &self,
        location: &LocationQuery,
        latest: &LatestReport,
    ) -> AppResult<AlertReport> {
        let report = self.derive_for(location).await?;
        *latest.write().await = Some(report.clone());
        Ok(report)
    }
}
