//! `localStorage` backend for dashboard settings

use shared::store::{KeyValueStore, StoreError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DomException, Storage};

/// Browser `window.localStorage`
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage not available".to_string()))?;

        Ok(Self { storage })
    }
}

fn is_quota_exceeded(err: &JsValue) -> bool {
    if let Some(dom_exception) = err.dyn_ref::<DomException>() {
        return dom_exception.name() == "QuotaExceededError";
    }
    format!("{:?}", err).contains("QuotaExceededError")
}

fn unavailable(op: &str, err: JsValue) -> StoreError {
    StoreError::Unavailable(format!("localStorage {} failed: {:?}", op, err))
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(|e| unavailable("get", e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(|e| {
            if is_quota_exceeded(&e) {
                StoreError::QuotaExceeded(key.to_string())
            } else {
                unavailable("set", e)
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(|e| unavailable("remove", e))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.storage.clear().map_err(|e| unavailable("clear", e))
    }
}
