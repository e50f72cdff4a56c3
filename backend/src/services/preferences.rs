//! Server-side persistence for dashboard settings and alert dismissals
//!
//! Uses the same keys and JSON documents as browser storage so a client can
//! move its settings between the two.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use shared::models::{NotificationSettings, Preferences, SavedCoordinates};
use shared::settings::{
    COORDINATES_KEY, DISMISSED_ALERTS_KEY, NOTIFICATIONS_KEY, PREFERENCES_KEY,
};
use sqlx::PgPool;
use std::collections::HashSet;

use crate::error::AppResult;

/// Key-value rows in `kv_store`, scoped by namespace
#[derive(Clone)]
pub struct PgKeyValueStore {
    db: PgPool,
    namespace: String,
}

impl PgKeyValueStore {
    pub fn new(db: PgPool, namespace: impl Into<String>) -> Self {
        Self {
            db,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT value::text FROM kv_store
            WHERE namespace = $1 AND key = $2
            "#,
        )
        .bind(&self.namespace)
        .bind(key)
        .fetch_optional(&self.db)
        .await?;

        Ok(value)
    }

    pub async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (namespace, key, value, updated_at)
            VALUES ($1, $2, $3::jsonb, $4)
            ON CONFLICT (namespace, key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn remove(&self, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM kv_store WHERE namespace = $1 AND key = $2")
            .bind(&self.namespace)
            .bind(key)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Remove every key in this namespace
    pub async fn clear(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM kv_store WHERE namespace = $1")
            .bind(&self.namespace)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    /// Append `item` to the JSON string array under `key` unless present
    ///
    /// Runs as one upsert so concurrent appends cannot drop each other.
    /// Returns false when the item was already in the list.
    pub async fn append_unique(&self, key: &str, item: &str) -> AppResult<bool> {
        let appended = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO kv_store (namespace, key, value, updated_at)
            VALUES ($1, $2, jsonb_build_array($3::text), $4)
            ON CONFLICT (namespace, key)
            DO UPDATE SET
                value = CASE
                    WHEN jsonb_typeof(kv_store.value) = 'array' THEN kv_store.value || EXCLUDED.value
                    ELSE EXCLUDED.value
                END,
                updated_at = EXCLUDED.updated_at
            WHERE jsonb_typeof(kv_store.value) <> 'array' OR NOT kv_store.value ? $3
            RETURNING key
            "#,
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(item)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(appended.is_some())
    }

    /// Keep only the array items found in `keep`; returns the remaining items
    pub async fn retain_in_list(&self, key: &str, keep: &[String]) -> AppResult<Vec<String>> {
        let remaining = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE kv_store
            SET value = COALESCE(
                    (SELECT jsonb_agg(item)
                     FROM jsonb_array_elements(kv_store.value) AS item
                     WHERE item #>> '{}' = ANY($3)),
                    '[]'::jsonb),
                updated_at = $4
            WHERE namespace = $1 AND key = $2 AND jsonb_typeof(value) = 'array'
            RETURNING value::text
            "#,
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(keep)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(remaining
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default())
    }

    /// Missing or malformed documents read as `None`
    pub async fn load_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let raw = self.get(key).await?;
        Ok(raw.and_then(|r| match serde_json::from_str(&r) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring malformed {} in {}: {}", key, self.namespace, e);
                None
            }
        }))
    }

    pub async fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| anyhow::anyhow!("serialize {}: {}", key, e))?;
        self.set(key, &raw).await
    }
}

/// Typed settings for one client namespace
#[derive(Clone)]
pub struct PreferencesService {
    store: PgKeyValueStore,
}

impl PreferencesService {
    pub fn new(db: PgPool, client_id: &str) -> Self {
        Self {
            store: PgKeyValueStore::new(db, client_id),
        }
    }

    pub async fn preferences(&self) -> AppResult<Preferences> {
        Ok(self.store.load_json(PREFERENCES_KEY).await?.unwrap_or_default())
    }

    pub async fn save_preferences(&self, preferences: &Preferences) -> AppResult<Preferences> {
        self.store.save_json(PREFERENCES_KEY, preferences).await?;
        Ok(preferences.clone())
    }

    pub async fn notifications(&self) -> AppResult<NotificationSettings> {
        Ok(self
            .store
            .load_json(NOTIFICATIONS_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn save_notifications(
        &self,
        settings: &NotificationSettings,
    ) -> AppResult<NotificationSettings> {
        self.store.save_json(NOTIFICATIONS_KEY, settings).await?;
        Ok(settings.clone())
    }

    pub async fn coordinates(&self) -> AppResult<Option<SavedCoordinates>> {
        self.store.load_json(COORDINATES_KEY).await
    }

    pub async fn save_coordinates(&self, coordinates: &SavedCoordinates) -> AppResult<()> {
        self.store.save_json(COORDINATES_KEY, coordinates).await
    }

    pub async fn dismissed_alerts(&self) -> AppResult<Vec<String>> {
        Ok(self
            .store
            .load_json(DISMISSED_ALERTS_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn dismissed_set(&self) -> AppResult<HashSet<String>> {
        Ok(self.dismissed_alerts().await?.into_iter().collect())
    }

    /// Returns false when the id was already dismissed
    pub async fn dismiss_alert(&self, id: &str) -> AppResult<bool> {
        self.store.append_unique(DISMISSED_ALERTS_KEY, id).await
    }

    /// Forget dismissals of alerts that are no longer reported
    pub async fn prune_dismissed(&self, live_ids: &[String]) -> AppResult<HashSet<String>> {
        let remaining = self
            .store
            .retain_in_list(DISMISSED_ALERTS_KEY, live_ids)
            .await?;
        Ok(remaining.into_iter().collect())
    }

    pub async fn clear_dismissed_alerts(&self) -> AppResult<()> {
        self.store.remove(DISMISSED_ALERTS_KEY).await
    }

    /// Drop every stored setting for this client
    pub async fn reset(&self) -> AppResult<u64> {
        let removed = self.store.clear().await?;
        tracing::info!("Cleared {} setting(s) for {}", removed, self.store.namespace());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    async fn test_pool() -> PgPool {
        let url = std::env::var("WXD_TEST_DATABASE_URL").expect("WXD_TEST_DATABASE_URL");
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(&url)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    #[ignore = "requires WXD_TEST_DATABASE_URL"]
    async fn test_concurrent_dismissals_keep_every_id() {
        let service = PreferencesService::new(test_pool().await, "concurrent-dismiss");
        service.clear_dismissed_alerts().await.unwrap();

        let (a, b, again) = tokio::try_join!(
            service.dismiss_alert("alert-a"),
            service.dismiss_alert("alert-b"),
            service.dismiss_alert("alert-a"),
        )
        .unwrap();

        assert!(a ^ again);
        assert!(b);
        let dismissed = service.dismissed_set().await.unwrap();
        assert_eq!(dismissed.len(), 2);
    }

    #[tokio::test]
    #[ignore = "requires WXD_TEST_DATABASE_URL"]
    async fn test_prune_drops_stale_dismissals() {
        let service = PreferencesService::new(test_pool().await, "prune-dismissed");
        service.clear_dismissed_alerts().await.unwrap();
        service.dismiss_alert("stale").await.unwrap();
        service.dismiss_alert("live").await.unwrap();

        let remaining = service
            .prune_dismissed(&["live".to_string()])
            .await
            .unwrap();

        assert_eq!(remaining, HashSet::from(["live".to_string()]));
        assert_eq!(service.dismissed_alerts().await.unwrap(), vec!["live"]);
    }
}
