//! Rule-based weather alert derivation
//!
//! Fixed threshold rules run against the current conditions, then a short
//! scan of the upcoming forecast adds watches, then alerts issued by the
//! provider are appended. A pass that produces nothing yields a single
//! "No Active Alerts" record so the list is never empty.
//!
//! Ids are name-based UUIDs over what the alert describes, so the same
//! ongoing hazard keeps its id across passes and a dismissal sticks.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::models::{
    AlertClassification, AlertRecord, AlertSeverity, ForecastPoint, HazardCategory, NativeAlert,
    WeatherCondition, WeatherSnapshot,
};

/// Forecast points considered by the watch scan (24h at 3h steps)
pub const FORECAST_SCAN_POINTS: usize = 8;

pub const NO_ACTIVE_ALERTS_TITLE: &str = "No Active Alerts";

const ALERT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a7e_93d4_4b8a_b5e0_7c21_d9a4_3f58);

/// Derive alerts as of now
pub fn derive_alerts(
    current: &WeatherSnapshot,
    forecast: &[ForecastPoint],
    native_alerts: Option<&[NativeAlert]>,
) -> Vec<AlertRecord> {
    derive_alerts_at(current, forecast, native_alerts, Utc::now())
}

/// Derive alerts with an explicit reference time
pub fn derive_alerts_at(
    current: &WeatherSnapshot,
    forecast: &[ForecastPoint],
    native_alerts: Option<&[NativeAlert]>,
    now: DateTime<Utc>,
) -> Vec<AlertRecord> {
    let mut pass = DerivationPass::new(now, current.location_name.clone());

    evaluate_current(current, &mut pass);
    scan_forecast(forecast, &mut pass);

    for native in native_alerts.unwrap_or_default() {
        pass.push_native(native);
    }

    if pass.alerts.is_empty() {
        pass.push_all_clear();
    }

    pass.alerts
}

/// Accumulates the records of one derivation call
struct DerivationPass {
    now: DateTime<Utc>,
    location: Option<String>,
    alerts: Vec<AlertRecord>,
}

/// A fired threshold rule before it becomes a record
struct Triggered {
    category: HazardCategory,
    classification: AlertClassification,
    severity: AlertSeverity,
    title: &'static str,
    description: String,
    valid_from: DateTime<Utc>,
    valid_hours: i64,
    tags: &'static [&'static str],
}

impl DerivationPass {
    fn new(now: DateTime<Utc>, location: Option<String>) -> Self {
        Self {
            now,
            location,
            alerts: Vec::new(),
        }
    }

    fn contains(&self, category: HazardCategory) -> bool {
        self.alerts.iter().any(|a| a.category == category)
    }

    /// Name-based id; repeats within the pass get an occurrence suffix
    fn stable_id(&self, name: String) -> String {
        let location = self
            .location
            .as_deref()
            .map(|l| l.trim().to_lowercase())
            .unwrap_or_default();
        let base = format!("{}|{}", location, name);

        let mut occurrence = 0usize;
        loop {
            let key = if occurrence == 0 {
                base.clone()
            } else {
                format!("{}#{}", base, occurrence)
            };
            let id = Uuid::new_v5(&ALERT_ID_NAMESPACE, key.as_bytes()).to_string();
            if !self.alerts.iter().any(|a| a.id == id) {
                return id;
            }
            occurrence += 1;
        }
    }

    /// Adds a rule alert unless its category already fired in this pass
    fn push_rule(&mut self, rule: Triggered) {
        if self.contains(rule.category) {
            return;
        }

        // Current conditions are one ongoing hazard; forecast watches are tied to their window
        let name = if rule.category.is_forecast() {
            format!("{}|{}", rule.category.as_str(), rule.valid_from.timestamp())
        } else {
            rule.category.as_str().to_string()
        };

        self.alerts.push(AlertRecord {
            id: self.stable_id(name),
            category: rule.category,
            classification: rule.classification,
            severity: rule.severity,
            title: rule.title.to_string(),
            description: rule.description,
            location: self.location.clone(),
            sender: None,
            issued_at: self.now,
            valid_from: rule.valid_from,
            valid_to: rule.valid_from + Duration::hours(rule.valid_hours),
            urgent: rule.severity.is_urgent(),
            source_tags: rule.tags.iter().map(|t| t.to_string()).collect(),
        });
    }

    fn push_native(&mut self, native: &NativeAlert) {
        let severity = native_severity(&native.tags);
        let valid_from = native
            .start
            .and_then(|s| DateTime::from_timestamp(s, 0))
            .unwrap_or(self.now);
        let valid_to = native
            .end
            .and_then(|e| DateTime::from_timestamp(e, 0))
            .unwrap_or(valid_from + Duration::hours(24));

        let mut source_tags: BTreeSet<String> = native
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        source_tags.insert("official".to_string());

        let title = if native.event.trim().is_empty() {
            "Weather Alert".to_string()
        } else {
            native.event.trim().to_string()
        };

        let name = format!(
            "native|{}|{}|{}",
            native.event.trim().to_lowercase(),
            native.start.map(|s| s.to_string()).unwrap_or_default(),
            native.sender_name.as_deref().unwrap_or_default().trim(),
        );

        self.alerts.push(AlertRecord {
            id: self.stable_id(name),
            category: HazardCategory::Native,
            classification: native_classification(&native.event),
            severity,
            title,
            description: native.description.clone().unwrap_or_default(),
            location: self.location.clone(),
            sender: native.sender_name.clone(),
            issued_at: self.now,
            valid_from,
            valid_to,
            urgent: severity.is_urgent(),
            source_tags,
        });
    }

    fn push_all_clear(&mut self) {
        self.push_rule(Triggered {
            category: HazardCategory::AllClear,
            classification: AlertClassification::Advisory,
            severity: AlertSeverity::Minor,
            title: NO_ACTIVE_ALERTS_TITLE,
            description: "There are currently no weather alerts for your area.".to_string(),
            valid_from: self.now,
            valid_hours: 24,
            tags: &["all-clear"],
        });
    }
}

fn evaluate_current(current: &WeatherSnapshot, pass: &mut DerivationPass) {
    let now = pass.now;

    if let Some(temp) = current.temperature_celsius {
        if temp > Decimal::from(35) {
            pass.push_rule(Triggered {
                category: HazardCategory::ExtremeHeat,
                classification: AlertClassification::Warning,
                severity: AlertSeverity::Severe,
                title: "Extreme Heat Warning",
                description: format!(
                    "Temperature has reached {}°C. Stay hydrated, avoid strenuous activity and limit sun exposure.",
                    temp.round_dp(1)
                ),
                valid_from: now,
                valid_hours: 8,
                tags: &["heat", "temperature"],
            });
        }

        if temp < Decimal::from(-10) {
            pass.push_rule(Triggered {
                category: HazardCategory::ExtremeCold,
                classification: AlertClassification::Warning,
                severity: AlertSeverity::Severe,
                title: "Extreme Cold Warning",
                description: format!(
                    "Temperature has dropped to {}°C. Risk of frostbite and hypothermia on exposed skin.",
                    temp.round_dp(1)
                ),
                valid_from: now,
                valid_hours: 12,
                tags: &["cold", "temperature"],
            });
        }
    }

    if let Some(kmh) = current.wind_speed_kmh() {
        if kmh > Decimal::from(50) {
            pass.push_rule(Triggered {
                category: HazardCategory::HighWind,
                classification: AlertClassification::Warning,
                severity: AlertSeverity::Severe,
                title: "High Wind Warning",
                description: format!(
                    "Sustained winds of {} km/h. Secure loose objects and avoid travel if possible.",
                    kmh.round()
                ),
                valid_from: now,
                valid_hours: 6,
                tags: &["wind"],
            });
        } else if kmh > Decimal::from(30) {
            pass.push_rule(Triggered {
                category: HazardCategory::StrongWind,
                classification: AlertClassification::Watch,
                severity: AlertSeverity::Moderate,
                title: "Strong Wind Watch",
                description: format!(
                    "Strong winds of {} km/h. Use caution when driving high-sided vehicles.",
                    kmh.round()
                ),
                valid_from: now,
                valid_hours: 4,
                tags: &["wind"],
            });
        }
    }

    if let Some(visibility) = current.visibility_meters {
        if visibility < 1000 {
            pass.push_rule(Triggered {
                category: HazardCategory::DenseFog,
                classification: AlertClassification::Advisory,
                severity: AlertSeverity::Moderate,
                title: "Dense Fog Advisory",
                description: format!(
                    "Visibility reduced to {} m. Drive slowly and use low-beam headlights.",
                    visibility
                ),
                valid_from: now,
                valid_hours: 3,
                tags: &["fog", "visibility"],
            });
        }
    }

    if current.is_condition(&WeatherCondition::Thunderstorm) {
        pass.push_rule(Triggered {
            category: HazardCategory::Thunderstorm,
            classification: AlertClassification::Warning,
            severity: AlertSeverity::Severe,
            title: "Thunderstorm Warning",
            description: "Thunderstorms in the area with lightning and possible hail. Seek shelter indoors."
                .to_string(),
            valid_from: now,
            valid_hours: 4,
            tags: &["thunderstorm", "lightning"],
        });
    }

    if current.is_condition(&WeatherCondition::Rain) {
        if let Some(rain) = current.precipitation.last_1h_mm {
            if rain > Decimal::from(10) {
                pass.push_rule(Triggered {
                    category: HazardCategory::HeavyRain,
                    classification: AlertClassification::Warning,
                    severity: AlertSeverity::Moderate,
                    title: "Heavy Rain Warning",
                    description: format!(
                        "{} mm of rain in the last hour. Flooding possible in low-lying areas.",
                        rain.round_dp(1)
                    ),
                    valid_from: now,
                    valid_hours: 6,
                    tags: &["rain", "flood"],
                });
            }
        }
    }

    if current.is_condition(&WeatherCondition::Snow) {
        pass.push_rule(Triggered {
            category: HazardCategory::Snow,
            classification: AlertClassification::Watch,
            severity: AlertSeverity::Moderate,
            title: "Winter Weather Watch",
            description: "Snowfall in progress. Expect slippery roads and reduced visibility."
                .to_string(),
            valid_from: now,
            valid_hours: 8,
            tags: &["snow", "winter"],
        });
    }
}

fn scan_forecast(forecast: &[ForecastPoint], pass: &mut DerivationPass) {
    let heat_warning_active = pass.contains(HazardCategory::ExtremeHeat);
    let wind_warning_active = pass.contains(HazardCategory::HighWind);

    for point in forecast.iter().take(FORECAST_SCAN_POINTS) {
        if !heat_warning_active {
            if let Some(temp) = point.temperature_celsius {
                if temp > Decimal::from(38) {
                    pass.push_rule(Triggered {
                        category: HazardCategory::HeatWatch,
                        classification: AlertClassification::Watch,
                        severity: AlertSeverity::Severe,
                        title: "Heat Watch",
                        description: format!(
                            "Temperatures up to {}°C expected from {}.",
                            temp.round_dp(1),
                            point.timestamp.format("%Y-%m-%d %H:%M UTC")
                        ),
                        valid_from: point.timestamp,
                        valid_hours: 12,
                        tags: &["heat", "forecast"],
                    });
                }
            }
        }

        if !wind_warning_active {
            if let Some(kmh) = point.wind_speed_kmh() {
                if kmh > Decimal::from(60) {
                    pass.push_rule(Triggered {
                        category: HazardCategory::HighWindWatch,
                        classification: AlertClassification::Watch,
                        severity: AlertSeverity::Severe,
                        title: "High Wind Watch",
                        description: format!(
                            "Winds of {} km/h expected from {}.",
                            kmh.round(),
                            point.timestamp.format("%Y-%m-%d %H:%M UTC")
                        ),
                        valid_from: point.timestamp,
                        valid_hours: 6,
                        tags: &["wind", "forecast"],
                    });
                }
            }
        }
    }
}

fn native_severity(tags: &[String]) -> AlertSeverity {
    let has = |name: &str| tags.iter().any(|t| t.trim().eq_ignore_ascii_case(name));

    if has("Extreme") {
        AlertSeverity::Extreme
    } else if has("Severe") {
        AlertSeverity::Severe
    } else if has("Moderate") {
        AlertSeverity::Moderate
    } else {
        AlertSeverity::Minor
    }
}

fn native_classification(event: &str) -> AlertClassification {
    let event = event.to_lowercase();
    if event.contains("warning") {
        AlertClassification::Warning
    } else if event.contains("watch") {
        AlertClassification::Watch
    } else {
        AlertClassification::Advisory
    }
}
