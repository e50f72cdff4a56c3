//! Typed access to persisted dashboard settings

use std::collections::HashSet;

use crate::models::{NotificationSettings, Preferences, SavedCoordinates};
use crate::store::{load_json, save_json, KeyValueStore, StoreError};

pub const PREFERENCES_KEY: &str = "weatherPreferences";
pub const NOTIFICATIONS_KEY: &str = "weatherNotifications";
pub const COORDINATES_KEY: &str = "userCoordinates";
pub const DISMISSED_ALERTS_KEY: &str = "dismissedAlerts";
pub const DARK_MODE_KEY: &str = "darkMode";

/// Settings stored under fixed keys of a [`KeyValueStore`]
///
/// Absent or unreadable entries fall back to defaults.
pub struct SettingsRepository<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn preferences(&self) -> Result<Preferences, StoreError> {
        Ok(load_json(&self.store, PREFERENCES_KEY)?.unwrap_or_default())
    }

    pub fn save_preferences(&self, preferences: &Preferences) -> Result<(), StoreError> {
        save_json(&self.store, PREFERENCES_KEY, preferences)
    }

    pub fn notifications(&self) -> Result<NotificationSettings, StoreError> {
        Ok(load_json(&self.store, NOTIFICATIONS_KEY)?.unwrap_or_default())
    }

    pub fn save_notifications(&self, settings: &NotificationSettings) -> Result<(), StoreError> {
        save_json(&self.store, NOTIFICATIONS_KEY, settings)
    }

    pub fn coordinates(&self) -> Result<Option<SavedCoordinates>, StoreError> {
        load_json(&self.store, COORDINATES_KEY)
    }

    pub fn save_coordinates(&self, coordinates: &SavedCoordinates) -> Result<(), StoreError> {
        save_json(&self.store, COORDINATES_KEY, coordinates)
    }

    /// Dismissed alert ids in insertion order
    pub fn dismissed_alerts(&self) -> Result<Vec<String>, StoreError> {
        Ok(load_json(&self.store, DISMISSED_ALERTS_KEY)?.unwrap_or_default())
    }

    pub fn dismissed_set(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self.dismissed_alerts()?.into_iter().collect())
    }

    /// Returns false when the id was already dismissed
    pub fn dismiss_alert(&self, id: &str) -> Result<bool, StoreError> {
        let mut ids = self.dismissed_alerts()?;
        if ids.iter().any(|existing| existing == id) {
            return Ok(false);
        }
        ids.push(id.to_string());
        save_json(&self.store, DISMISSED_ALERTS_KEY, &ids)?;
        Ok(true)
    }

    /// Forget dismissals of alerts no longer present; returns what remains
    pub fn prune_dismissed<'a>(
        &self,
        live_ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<HashSet<String>, StoreError> {
        let live: HashSet<&str> = live_ids.into_iter().collect();
        let ids = self.dismissed_alerts()?;
        let kept: Vec<String> = ids
            .iter()
            .filter(|id| live.contains(id.as_str()))
            .cloned()
            .collect();

        if kept.len() != ids.len() {
            save_json(&self.store, DISMISSED_ALERTS_KEY, &kept)?;
        }
        Ok(kept.into_iter().collect())
    }

    pub fn clear_dismissed_alerts(&self) -> Result<(), StoreError> {
        self.store.remove(DISMISSED_ALERTS_KEY)
    }

    pub fn dark_mode(&self) -> Result<bool, StoreError> {
        Ok(load_json(&self.store, DARK_MODE_KEY)?.unwrap_or(false))
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), StoreError> {
        save_json(&self.store, DARK_MODE_KEY, &enabled)
    }

    /// Remove every setting this repository owns
    pub fn reset(&self) -> Result<(), StoreError> {
        for key in [
            PREFERENCES_KEY,
            NOTIFICATIONS_KEY,
            COORDINATES_KEY,
            DISMISSED_ALERTS_KEY,
            DARK_MODE_KEY,
        ] {
            self.store.remove(key)?;
        }
        Ok(())
    }
}
