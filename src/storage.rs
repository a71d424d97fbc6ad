//! Browser Storage
//!
//! `localStorage` behind the core key-value trait, plus the persisted auth session.

use coach_core::backend::AuthSession;
use coach_core::cache::{KeyValueStore, RoleCache};

const SESSION_KEY: &str = "coach.session";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// `window.localStorage`; every operation is a no-op when storage is unavailable
#[derive(Clone, Copy, Default)]
pub struct LocalStore;

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = local_storage() {
            if storage.set_item(key, value).is_err() {
                log::warn!("[STORAGE] could not write {}", key);
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

pub fn role_cache() -> RoleCache<LocalStore> {
    RoleCache::new(LocalStore)
}

pub fn save_session(session: &AuthSession) {
    match serde_json::to_string(session) {
        Ok(json) => LocalStore.set(SESSION_KEY, &json),
        Err(e) => log::error!("[STORAGE] session not saved: {}", e),
    }
}

pub fn load_session() -> Option<AuthSession> {
    let json = LocalStore.get(SESSION_KEY)?;
    serde_json::from_str(&json)
        .map_err(|e| log::warn!("[STORAGE] dropping unreadable session: {}", e))
        .ok()
}

pub fn clear_session() {
    LocalStore.remove(SESSION_KEY);
}
