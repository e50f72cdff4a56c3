//! Periodic alert refresh for the configured default location

use shared::LocationQuery;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::alerts::{AlertService, LatestReport};

/// Re-derives alerts on a fixed interval
///
/// Overlapping refreshes are not serialized: whichever finishes last owns
/// the latest report.
pub struct RefreshPoller {
    service: AlertService,
    location: LocationQuery,
    interval: Duration,
    latest: LatestReport,
    shutdown: Arc<Notify>,
}

impl RefreshPoller {
    pub fn new(
        service: AlertService,
        location: LocationQuery,
        interval: Duration,
        latest: LatestReport,
    ) -> Self {
        Self {
            service,
            location,
            interval,
            latest,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle used to stop the loop
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        tracing::info!(
            "Alert refresh every {}s for {}",
            self.interval.as_secs(),
            self.location
        );

        loop {
            self.refresh_once().await;

            tokio::select! {
                biased;

                _ = self.shutdown.notified() => {
                    tracing::debug!("Alert refresh received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::debug!("Alert refresh loop stopped");
    }

    async fn refresh_once(&self) {
        if let Err(e) = self.service.refresh(&self.location, &self.latest).await {
            // Keep the previous report on failure
            tracing::warn!(error = %e, "Alert refresh failed for {}", self.location);
        }
    }
}
