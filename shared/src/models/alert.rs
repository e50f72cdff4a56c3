//! Weather alert models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Severity tier of the rule that produced an alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertClassification {
    Warning,
    Watch,
    Advisory,
}

impl fmt::Display for AlertClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertClassification::Warning => "warning",
            AlertClassification::Watch => "watch",
            AlertClassification::Advisory => "advisory",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AlertClassification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warning" => Ok(AlertClassification::Warning),
            "watch" => Ok(AlertClassification::Watch),
            "advisory" => Ok(AlertClassification::Advisory),
            other => Err(format!("unknown alert classification: {}", other)),
        }
    }
}

/// How dangerous the hazard is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Minor,
    Moderate,
    Severe,
    Extreme,
}

impl AlertSeverity {
    /// Extreme and severe alerts demand immediate action
    pub fn is_urgent(&self) -> bool {
        matches!(self, AlertSeverity::Extreme | AlertSeverity::Severe)
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertSeverity::Minor => "minor",
            AlertSeverity::Moderate => "moderate",
            AlertSeverity::Severe => "severe",
            AlertSeverity::Extreme => "extreme",
        };
        write!(f, "{}", s)
    }
}

/// Hazard bucket used to keep one alert per kind in a derivation pass
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HazardCategory {
    ExtremeHeat,
    ExtremeCold,
    HighWind,
    StrongWind,
    DenseFog,
    Thunderstorm,
    HeavyRain,
    Snow,
    HeatWatch,
    HighWindWatch,
    /// Issued by the upstream weather authority
    Native,
    /// Placeholder emitted when nothing fired
    AllClear,
}

impl HazardCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardCategory::ExtremeHeat => "extreme_heat",
            HazardCategory::ExtremeCold => "extreme_cold",
            HazardCategory::HighWind => "high_wind",
            HazardCategory::StrongWind => "strong_wind",
            HazardCategory::DenseFog => "dense_fog",
            HazardCategory::Thunderstorm => "thunderstorm",
            HazardCategory::HeavyRain => "heavy_rain",
            HazardCategory::Snow => "snow",
            HazardCategory::HeatWatch => "heat_watch",
            HazardCategory::HighWindWatch => "high_wind_watch",
            HazardCategory::Native => "native",
            HazardCategory::AllClear => "all_clear",
        }
    }

    /// Raised from a forecast point rather than current conditions
    pub fn is_forecast(&self) -> bool {
        matches!(self, HazardCategory::HeatWatch | HazardCategory::HighWindWatch)
    }
}

/// A derived or provider-issued alert
///
/// Ids are unique within a pass and stable across passes for the same
/// hazard at the same location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertRecord {
    pub id: String,
    pub category: HazardCategory,
    pub classification: AlertClassification,
    pub severity: AlertSeverity,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub urgent: bool,
    pub source_tags: BTreeSet<String>,
}

impl AlertRecord {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.source_tags.contains(tag)
    }

    /// Whether `at` falls inside the validity window
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        at >= self.valid_from && at <= self.valid_to
    }
}

/// Alert issued directly by the upstream weather provider
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NativeAlert {
    pub sender_name: Option<String>,
    pub event: String,
    /// Epoch seconds
    pub start: Option<i64>,
    /// Epoch seconds
    pub end: Option<i64>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}
