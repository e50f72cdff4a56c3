//! Alert feed: filtering, dismissal state and summary counts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::models::{AlertClassification, AlertRecord, AlertSeverity};

/// Which alerts a feed shows
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertFilter {
    #[default]
    All,
    Warning,
    Watch,
    Advisory,
}

impl AlertFilter {
    pub fn matches(&self, alert: &AlertRecord) -> bool {
        match self {
            AlertFilter::All => true,
            AlertFilter::Warning => alert.classification == AlertClassification::Warning,
            AlertFilter::Watch => alert.classification == AlertClassification::Watch,
            AlertFilter::Advisory => alert.classification == AlertClassification::Advisory,
        }
    }
}

impl fmt::Display for AlertFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertFilter::All => "all",
            AlertFilter::Warning => "warning",
            AlertFilter::Watch => "watch",
            AlertFilter::Advisory => "advisory",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AlertFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(AlertFilter::All),
            "warning" | "warnings" => Ok(AlertFilter::Warning),
            "watch" | "watches" => Ok(AlertFilter::Watch),
            "advisory" | "advisories" => Ok(AlertFilter::Advisory),
            other => Err(format!("unknown alert filter: {}", other)),
        }
    }
}

/// An alert as shown in a feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertView {
    #[serde(flatten)]
    pub alert: AlertRecord,
    pub dismissed: bool,
}

/// Counts over the undismissed alerts of a derivation pass
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertSummary {
    pub total: usize,
    pub active: usize,
    pub urgent: usize,
    pub severe: usize,
    pub watches: usize,
    pub advisories: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertFeed {
    pub filter: AlertFilter,
    pub show_dismissed: bool,
    pub generated_at: DateTime<Utc>,
    pub alerts: Vec<AlertView>,
    pub summary: AlertSummary,
}

/// Apply dismissal state and a filter to a derived alert list
///
/// The summary counts all alerts regardless of the filter; `active`,
/// `urgent`, `severe`, `watches` and `advisories` skip dismissed ones.
pub fn build_feed(
    alerts: &[AlertRecord],
    dismissed: &HashSet<String>,
    filter: AlertFilter,
    show_dismissed: bool,
    generated_at: DateTime<Utc>,
) -> AlertFeed {
    let mut summary = AlertSummary {
        total: alerts.len(),
        ..AlertSummary::default()
    };

    for alert in alerts.iter().filter(|a| !dismissed.contains(&a.id)) {
        summary.active += 1;
        if alert.urgent {
            summary.urgent += 1;
        }
        if alert.severity == AlertSeverity::Severe {
            summary.severe += 1;
        }
        match alert.classification {
            AlertClassification::Watch => summary.watches += 1,
            AlertClassification::Advisory => summary.advisories += 1,
            AlertClassification::Warning => {}
        }
    }

    let views = alerts
        .iter()
        .filter(|a| filter.matches(a))
        .map(|a| AlertView {
            dismissed: dismissed.contains(&a.id),
            alert: a.clone(),
        })
        .filter(|v| show_dismissed || !v.dismissed)
        .collect();

    AlertFeed {
        filter,
        show_dismissed,
        generated_at,
        alerts: views,
        summary,
    }
}
