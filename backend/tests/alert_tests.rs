//! Alert derivation integration tests
//!
//! Tests for the rule engine including:
//! - Current-condition thresholds and validity windows
//! - Forecast watches and their deduplication
//! - Native alert conversion and ordering
//! - The "No Active Alerts" fallback

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;

use shared::alerts::{derive_alerts_at, FORECAST_SCAN_POINTS, NO_ACTIVE_ALERTS_TITLE};
use shared::models::{
    AlertClassification, AlertRecord, AlertSeverity, ForecastPoint, HazardCategory, NativeAlert,
    Precipitation, WeatherCondition, WeatherSnapshot,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
}

/// Calm, clear conditions that trigger nothing
fn calm() -> WeatherSnapshot {
    WeatherSnapshot {
        location_name: Some("Springfield".to_string()),
        temperature_celsius: Some(dec("20")),
        wind_speed_mps: Some(dec("5")),
        visibility_meters: Some(10000),
        humidity_percent: Some(50),
        condition: Some(WeatherCondition::Clear),
        ..Default::default()
    }
}

fn point(hours_ahead: i64, temp: &str, wind_mps: &str) -> ForecastPoint {
    ForecastPoint {
        temperature_celsius: Some(dec(temp)),
        wind_speed_mps: Some(dec(wind_mps)),
        ..ForecastPoint::at(now() + Duration::hours(hours_ahead))
    }
}

fn derive(current: &WeatherSnapshot, forecast: &[ForecastPoint]) -> Vec<AlertRecord> {
    derive_alerts_at(current, forecast, None, now())
}

fn categories(alerts: &[AlertRecord]) -> Vec<HazardCategory> {
    alerts.iter().map(|a| a.category).collect()
}

// ============================================================================
// Current conditions
// ============================================================================

#[cfg(test)]
mod current_condition_tests {
    use super::*;

    #[test]
    fn test_extreme_heat_alone() {
        let current = WeatherSnapshot {
            temperature_celsius: Some(dec("36")),
            ..calm()
        };
        let alerts = derive(&current, &[]);

        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.classification, AlertClassification::Warning);
        assert_eq!(alert.severity, AlertSeverity::Severe);
        assert!(alert.has_tag("heat"));
        assert!(alert.urgent);
        assert_eq!(alert.valid_from, now());
        assert_eq!(alert.valid_to, now() + Duration::hours(8));
        assert_eq!(alert.location.as_deref(), Some("Springfield"));
    }

    #[test]
    fn test_heat_threshold_is_strict() {
        let current = WeatherSnapshot {
            temperature_celsius: Some(dec("35")),
            ..calm()
        };
        assert_eq!(derive(&current, &[])[0].title, NO_ACTIVE_ALERTS_TITLE);
    }

    #[test]
    fn test_extreme_cold() {
        let current = WeatherSnapshot {
            temperature_celsius: Some(dec("-12.5")),
            ..calm()
        };
        let alerts = derive(&current, &[]);

        assert_eq!(categories(&alerts), vec![HazardCategory::ExtremeCold]);
        assert_eq!(alerts[0].valid_to - alerts[0].valid_from, Duration::hours(12));
        assert!(alerts[0].has_tag("cold"));

        let boundary = WeatherSnapshot {
            temperature_celsius: Some(dec("-10")),
            ..calm()
        };
        assert_eq!(derive(&boundary, &[])[0].category, HazardCategory::AllClear);
    }

    #[test]
    fn test_high_wind_warning_not_watch() {
        // 15 m/s = 54 km/h
        let current = WeatherSnapshot {
            wind_speed_mps: Some(dec("15")),
            ..calm()
        };
        let alerts = derive(&current, &[]);

        assert_eq!(categories(&alerts), vec![HazardCategory::HighWind]);
        assert_eq!(alerts[0].classification, AlertClassification::Warning);
        assert_eq!(alerts[0].severity, AlertSeverity::Severe);
        assert_eq!(alerts[0].valid_to - alerts[0].valid_from, Duration::hours(6));
    }

    #[test]
    fn test_strong_wind_watch() {
        // 10 m/s = 36 km/h
        let current = WeatherSnapshot {
            wind_speed_mps: Some(dec("10")),
            ..calm()
        };
        let alerts = derive(&current, &[]);

        assert_eq!(categories(&alerts), vec![HazardCategory::StrongWind]);
        assert_eq!(alerts[0].classification, AlertClassification::Watch);
        assert_eq!(alerts[0].severity, AlertSeverity::Moderate);
        assert!(!alerts[0].urgent);
        assert_eq!(alerts[0].valid_to - alerts[0].valid_from, Duration::hours(4));
    }

    #[test]
    fn test_dense_fog() {
        let current = WeatherSnapshot {
            visibility_meters: Some(999),
            condition: Some(WeatherCondition::Fog),
            ..calm()
        };
        let alerts = derive(&current, &[]);

        assert_eq!(categories(&alerts), vec![HazardCategory::DenseFog]);
        assert_eq!(alerts[0].classification, AlertClassification::Advisory);
        assert_eq!(alerts[0].valid_to - alerts[0].valid_from, Duration::hours(3));

        let clear_enough = WeatherSnapshot {
            visibility_meters: Some(1000),
            ..calm()
        };
        assert_eq!(derive(&clear_enough, &[])[0].category, HazardCategory::AllClear);
    }

    #[test]
    fn test_thunderstorm() {
        let current = WeatherSnapshot {
            condition: Some(WeatherCondition::Thunderstorm),
            ..calm()
        };
        let alerts = derive(&current, &[]);

        assert_eq!(categories(&alerts), vec![HazardCategory::Thunderstorm]);
        assert_eq!(alerts[0].severity, AlertSeverity::Severe);
        assert!(alerts[0].has_tag("lightning"));
    }

    #[test]
    fn test_heavy_rain_needs_rain_and_intensity() {
        let heavy = WeatherSnapshot {
            condition: Some(WeatherCondition::Rain),
            precipitation: Precipitation {
                last_1h_mm: Some(dec("12.4")),
                last_3h_mm: None,
            },
            ..calm()
        };
        let alerts = derive(&heavy, &[]);
        assert_eq!(categories(&alerts), vec![HazardCategory::HeavyRain]);
        assert_eq!(alerts[0].classification, AlertClassification::Warning);
        assert_eq!(alerts[0].severity, AlertSeverity::Moderate);

        let light = WeatherSnapshot {
            precipitation: Precipitation {
                last_1h_mm: Some(dec("4")),
                last_3h_mm: Some(dec("40")),
            },
            ..heavy.clone()
        };
        assert_eq!(derive(&light, &[])[0].category, HazardCategory::AllClear);

        let unmeasured = WeatherSnapshot {
            precipitation: Precipitation::default(),
            ..heavy.clone()
        };
        assert_eq!(derive(&unmeasured, &[])[0].category, HazardCategory::AllClear);

        let drizzle = WeatherSnapshot {
            condition: Some(WeatherCondition::Drizzle),
            ..heavy
        };
        assert_eq!(derive(&drizzle, &[])[0].category, HazardCategory::AllClear);
    }

    #[test]
    fn test_snow_watch() {
        let current = WeatherSnapshot {
            condition: Some(WeatherCondition::Snow),
            temperature_celsius: Some(dec("-2")),
            ..calm()
        };
        let alerts = derive(&current, &[]);

        assert_eq!(categories(&alerts), vec![HazardCategory::Snow]);
        assert_eq!(alerts[0].classification, AlertClassification::Watch);
        assert_eq!(alerts[0].valid_to - alerts[0].valid_from, Duration::hours(8));
    }

    #[test]
    fn test_rules_fire_independently_in_fixed_order() {
        let current = WeatherSnapshot {
            temperature_celsius: Some(dec("-15")),
            wind_speed_mps: Some(dec("20")),
            visibility_meters: Some(200),
            condition: Some(WeatherCondition::Snow),
            ..calm()
        };
        let alerts = derive(&current, &[]);

        assert_eq!(
            categories(&alerts),
            vec![
                HazardCategory::ExtremeCold,
                HazardCategory::HighWind,
                HazardCategory::DenseFog,
                HazardCategory::Snow,
            ]
        );
        let ids: HashSet<_> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), alerts.len());
    }

    #[test]
    fn test_missing_fields_do_not_fire() {
        let alerts = derive(&WeatherSnapshot::default(), &[]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category, HazardCategory::AllClear);
        assert!(alerts[0].location.is_none());
    }

    #[test]
    fn test_condition_matching_is_case_insensitive() {
        let current: WeatherSnapshot =
            serde_json::from_str(r#"{"condition": "THUNDERSTORM"}"#).unwrap();
        assert_eq!(derive(&current, &[])[0].category, HazardCategory::Thunderstorm);
    }
}

// ============================================================================
// Forecast scan
// ============================================================================

#[cfg(test)]
mod forecast_tests {
    use super::*;

    #[test]
    fn test_heat_watch_deduplicated() {
        let forecast = vec![point(3, "39", "2"), point(6, "40", "2")];
        let alerts = derive(&calm(), &forecast);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "Heat Watch");
        assert_eq!(alerts[0].classification, AlertClassification::Watch);
        assert_eq!(alerts[0].severity, AlertSeverity::Severe);
        // First qualifying point sets the window
        assert_eq!(alerts[0].valid_from, now() + Duration::hours(3));
        assert_eq!(alerts[0].valid_to, now() + Duration::hours(15));
    }

    #[test]
    fn test_heat_watch_suppressed_by_current_heat_warning() {
        let current = WeatherSnapshot {
            temperature_celsius: Some(dec("37")),
            ..calm()
        };
        let alerts = derive(&current, &[point(3, "41", "2")]);

        assert_eq!(categories(&alerts), vec![HazardCategory::ExtremeHeat]);
    }

    #[test]
    fn test_high_wind_watch() {
        // 20 m/s = 72 km/h
        let alerts = derive(&calm(), &[point(9, "20", "20")]);

        assert_eq!(categories(&alerts), vec![HazardCategory::HighWindWatch]);
        assert_eq!(alerts[0].valid_to - alerts[0].valid_from, Duration::hours(6));
        assert!(alerts[0].has_tag("forecast"));
    }

    #[test]
    fn test_forecast_wind_threshold_is_strict() {
        // 16 m/s = 57.6 km/h, not above 60
        let alerts = derive(&calm(), &[point(3, "20", "16")]);
        assert_eq!(alerts[0].category, HazardCategory::AllClear);
    }

    #[test]
    fn test_high_wind_watch_suppressed_by_current_warning() {
        let current = WeatherSnapshot {
            wind_speed_mps: Some(dec("15")),
            ..calm()
        };
        let alerts = derive(&current, &[point(3, "20", "25")]);
        assert_eq!(categories(&alerts), vec![HazardCategory::HighWind]);
    }

    #[test]
    fn test_strong_wind_watch_does_not_suppress_forecast_wind() {
        let current = WeatherSnapshot {
            wind_speed_mps: Some(dec("10")),
            ..calm()
        };
        let alerts = derive(&current, &[point(3, "20", "25")]);
        assert_eq!(
            categories(&alerts),
            vec![HazardCategory::StrongWind, HazardCategory::HighWindWatch]
        );
    }

    #[test]
    fn test_only_first_points_scanned() {
        let mut forecast: Vec<ForecastPoint> = (0..FORECAST_SCAN_POINTS as i64)
            .map(|i| point(3 * (i + 1), "25", "3"))
            .collect();
        forecast.push(point(27, "45", "30"));

        let alerts = derive(&calm(), &forecast);
        assert_eq!(alerts[0].category, HazardCategory::AllClear);
    }

    #[test]
    fn test_forecast_points_with_missing_values() {
        let forecast = vec![ForecastPoint::at(now() + Duration::hours(3)), point(6, "39", "1")];
        let alerts = derive(&calm(), &forecast);
        assert_eq!(categories(&alerts), vec![HazardCategory::HeatWatch]);
    }
}

// ============================================================================
// Native alerts
// ============================================================================

#[cfg(test)]
mod native_alert_tests {
    use super::*;

    fn native(event: &str, tags: &[&str]) -> NativeAlert {
        NativeAlert {
            sender_name: Some("Met Office".to_string()),
            event: event.to_string(),
            start: Some(now().timestamp()),
            end: Some((now() + Duration::hours(10)).timestamp()),
            description: Some("Take care.".to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_native_conversion() {
        let natives = vec![
            native("Severe Thunderstorm Warning", &["Extreme", "Thunderstorm"]),
            native("Flood Watch", &["Moderate"]),
            native("Air Quality Statement", &[]),
        ];
        let alerts = derive_alerts_at(&calm(), &[], Some(natives.as_slice()), now());

        assert_eq!(alerts.len(), 3);
        assert!(alerts.iter().all(|a| a.category == HazardCategory::Native));

        assert_eq!(alerts[0].severity, AlertSeverity::Extreme);
        assert_eq!(alerts[0].classification, AlertClassification::Warning);
        assert!(alerts[0].urgent);
        assert!(alerts[0].has_tag("official"));
        assert!(alerts[0].has_tag("thunderstorm"));
        assert_eq!(alerts[0].sender.as_deref(), Some("Met Office"));
        assert_eq!(alerts[0].valid_to, now() + Duration::hours(10));

        assert_eq!(alerts[1].severity, AlertSeverity::Moderate);
        assert_eq!(alerts[1].classification, AlertClassification::Watch);
        assert!(!alerts[1].urgent);

        assert_eq!(alerts[2].severity, AlertSeverity::Minor);
        assert_eq!(alerts[2].classification, AlertClassification::Advisory);
    }

    #[test]
    fn test_native_alerts_follow_rule_alerts() {
        let current = WeatherSnapshot {
            temperature_celsius: Some(dec("38")),
            ..calm()
        };
        let natives = vec![native("Excessive Heat Warning", &["Severe"])];
        let alerts = derive_alerts_at(&current, &[point(3, "20", "20")], Some(natives.as_slice()), now());

        assert_eq!(
            categories(&alerts),
            vec![
                HazardCategory::ExtremeHeat,
                HazardCategory::HighWindWatch,
                HazardCategory::Native,
            ]
        );
    }

    #[test]
    fn test_native_alerts_replace_sentinel() {
        let natives = vec![native("Wind Advisory", &["Minor"])];
        let alerts = derive_alerts_at(&calm(), &[], Some(natives.as_slice()), now());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "Wind Advisory");
    }

    #[test]
    fn test_empty_native_list_still_yields_sentinel() {
        let alerts = derive_alerts_at(&calm(), &[], Some(&[][..]), now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, NO_ACTIVE_ALERTS_TITLE);
    }

    #[test]
    fn test_native_missing_window_and_event() {
        let alert = NativeAlert {
            tags: vec!["severe".to_string()],
            ..Default::default()
        };
        let alerts = derive_alerts_at(&calm(), &[], Some(std::slice::from_ref(&alert)), now());

        assert_eq!(alerts[0].title, "Weather Alert");
        assert_eq!(alerts[0].severity, AlertSeverity::Severe);
        assert_eq!(alerts[0].valid_from, now());
        assert_eq!(alerts[0].valid_to, now() + Duration::hours(24));
    }

    #[test]
    fn test_duplicate_native_alerts_are_kept() {
        let natives = vec![native("Flood Watch", &[]), native("Flood Watch", &[])];
        let alerts = derive_alerts_at(&calm(), &[], Some(natives.as_slice()), now());
        assert_eq!(alerts.len(), 2);
        assert_ne!(alerts[0].id, alerts[1].id);
    }
}

// ============================================================================
// Sentinel
// ============================================================================

#[cfg(test)]
mod sentinel_tests {
    use super::*;

    #[test]
    fn test_calm_conditions_yield_single_sentinel() {
        let alerts = derive(&calm(), &[]);

        assert_eq!(alerts.len(), 1);
        let sentinel = &alerts[0];
        assert_eq!(sentinel.title, NO_ACTIVE_ALERTS_TITLE);
        assert_eq!(sentinel.classification, AlertClassification::Advisory);
        assert_eq!(sentinel.severity, AlertSeverity::Minor);
        assert!(!sentinel.urgent);
        assert_eq!(sentinel.valid_to - sentinel.valid_from, Duration::hours(24));
        assert!(sentinel.is_valid_at(now() + Duration::hours(1)));
    }

    #[test]
    fn test_ongoing_hazard_keeps_id_across_passes() {
        let current = WeatherSnapshot {
            temperature_celsius: Some(dec("40")),
            ..calm()
        };
        let first = derive_alerts_at(&current, &[], None, now());
        let next = derive_alerts_at(&current, &[], None, now() + Duration::minutes(10));

        assert_eq!(first[0].id, next[0].id);
        assert_eq!(derive(&calm(), &[])[0].id, derive(&calm(), &[])[0].id);
    }

    #[test]
    fn test_forecast_watch_id_follows_window() {
        let early = derive(&calm(), &[point(3, "39", "2")]);
        let same = derive(&calm(), &[point(3, "40", "2")]);
        let later = derive(&calm(), &[point(6, "39", "2")]);

        assert_eq!(early[0].id, same[0].id);
        assert_ne!(early[0].id, later[0].id);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

fn condition_strategy() -> impl Strategy<Value = Option<WeatherCondition>> {
    prop_oneof![
        Just(None),
        Just(Some(WeatherCondition::Clear)),
        Just(Some(WeatherCondition::Clouds)),
        Just(Some(WeatherCondition::Rain)),
        Just(Some(WeatherCondition::Thunderstorm)),
        Just(Some(WeatherCondition::Snow)),
        Just(Some(WeatherCondition::Fog)),
    ]
}

fn decimal_strategy(min: i64, max: i64) -> impl Strategy<Value = Option<Decimal>> {
    prop::option::of((min * 10..max * 10).prop_map(|v| Decimal::new(v, 1)))
}

prop_compose! {
    fn snapshot_strategy()(
        temp in decimal_strategy(-40, 50),
        wind in decimal_strategy(0, 40),
        visibility in prop::option::of(0i32..20000),
        rain_1h in decimal_strategy(0, 30),
        condition in condition_strategy(),
    ) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_celsius: temp,
            wind_speed_mps: wind,
            visibility_meters: visibility,
            condition,
            precipitation: Precipitation { last_1h_mm: rain_1h, last_3h_mm: None },
            ..Default::default()
        }
    }
}

prop_compose! {
    fn forecast_strategy()(
        points in prop::collection::vec((decimal_strategy(-10, 50), decimal_strategy(0, 40)), 0..16)
    ) -> Vec<ForecastPoint> {
        points
            .into_iter()
            .enumerate()
            .map(|(i, (temp, wind))| ForecastPoint {
                temperature_celsius: temp,
                wind_speed_mps: wind,
                ..ForecastPoint::at(now() + Duration::hours(3 * (i as i64 + 1)))
            })
            .collect()
    }
}

proptest! {
    /// The result is never empty and the sentinel only ever stands alone
    #[test]
    fn prop_never_empty_sentinel_alone(current in snapshot_strategy(), forecast in forecast_strategy()) {
        let alerts = derive(&current, &forecast);

        prop_assert!(!alerts.is_empty());
        let sentinel_count = alerts.iter().filter(|a| a.category == HazardCategory::AllClear).count();
        prop_assert!(sentinel_count <= 1);
        if sentinel_count == 1 {
            prop_assert_eq!(alerts.len(), 1);
        }
    }

    /// Rule categories appear at most once per pass
    #[test]
    fn prop_rule_categories_unique(current in snapshot_strategy(), forecast in forecast_strategy()) {
        let alerts = derive(&current, &forecast);
        let mut seen = HashSet::new();

        for alert in alerts.iter().filter(|a| a.category != HazardCategory::Native) {
            prop_assert!(seen.insert(alert.category), "duplicate {:?}", alert.category);
        }
    }

    /// Urgency follows severity and windows are well formed
    #[test]
    fn prop_urgency_and_windows(current in snapshot_strategy(), forecast in forecast_strategy()) {
        for alert in derive(&current, &forecast) {
            prop_assert_eq!(alert.urgent, alert.severity.is_urgent());
            prop_assert!(alert.valid_to > alert.valid_from);
            prop_assert_eq!(alert.issued_at, now());
        }
    }

    /// Identical inputs give the same alerts apart from ids
    #[test]
    fn prop_derivation_idempotent(current in snapshot_strategy(), forecast in forecast_strategy()) {
        let shape = |alerts: Vec<AlertRecord>| {
            alerts
                .into_iter()
                .map(|a| (a.category, a.severity, a.classification, a.source_tags, a.valid_from, a.valid_to))
                .collect::<Vec<_>>()
        };

        prop_assert_eq!(shape(derive(&current, &forecast)), shape(derive(&current, &forecast)));
    }

    /// Wind warning and strong-wind watch are mutually exclusive
    #[test]
    fn prop_wind_rules_exclusive(current in snapshot_strategy()) {
        let cats = categories(&derive(&current, &[]));
        prop_assert!(!(cats.contains(&HazardCategory::HighWind) && cats.contains(&HazardCategory::StrongWind)));
    }

    /// A forecast heat watch never accompanies a current heat warning
    #[test]
    fn prop_heat_watch_suppressed(current in snapshot_strategy(), forecast in forecast_strategy()) {
        let cats = categories(&derive(&current, &forecast));
        prop_assert!(!(cats.contains(&HazardCategory::ExtremeHeat) && cats.contains(&HazardCategory::HeatWatch)));
    }
}
