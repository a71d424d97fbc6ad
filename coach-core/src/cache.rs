//! Role Cache
//!
//! Last known user id and role, kept in a key-value store (browser `localStorage` in the
//! PWA) so the right half of the app can render before the profile read returns.
//! The cache is advisory: it is always reconciled against a fresh profile.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::domain::{Profile, Role};

pub const USER_ID_KEY: &str = "coach.user_id";
pub const USER_ROLE_KEY: &str = "coach.user_role";

/// String key-value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Process-local store for tests and native tools
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok().and_then(|v| v.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedRole {
    pub user_id: Uuid,
    pub role: Role,
}

/// What reconciling the cache against a fresh profile did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// Cache already matched
    Unchanged,
    /// Cache was empty or stale and has been rewritten
    Updated { previous: Option<Role> },
}

pub struct RoleCache<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> RoleCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Both keys present and parseable, else None
    pub fn read(&self) -> Option<CachedRole> {
        let user_id = self.store.get(USER_ID_KEY)?;
        let role = self.store.get(USER_ROLE_KEY)?;
        let user_id = Uuid::parse_str(&user_id).ok()?;
        Some(CachedRole {
            user_id,
            role: Role::parse(&role),
        })
    }

    pub fn write(&self, user_id: Uuid, role: Role) {
        self.store.set(USER_ID_KEY, &user_id.to_string());
        self.store.set(USER_ROLE_KEY, role.as_str());
    }

    pub fn clear(&self) {
        self.store.remove(USER_ID_KEY);
        self.store.remove(USER_ROLE_KEY);
    }

    /// Bring the cache in line with a freshly read profile
    pub fn reconcile(&self, profile: &Profile) -> Reconciled {
        let cached = self.read();
        let fresh = CachedRole {
            user_id: profile.id,
            role: profile.role,
        };
        if cached == Some(fresh) {
            return Reconciled::Unchanged;
        }
        let previous = cached.filter(|c| c.user_id == profile.id).map(|c| c.role);
        if previous.is_some() {
            log::warn!("[ROLE] cached role for {} was stale", profile.id);
        }
        self.write(profile.id, profile.role);
        Reconciled::Updated { previous }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> RoleCache<MemoryStore> {
        RoleCache::new(MemoryStore::new())
    }

    #[test]
    fn test_read_write_clear() {
        let cache = cache();
        assert_eq!(cache.read(), None);
        let id = Uuid::new_v4();
        cache.write(id, Role::Admin);
        assert_eq!(cache.read(), Some(CachedRole { user_id: id, role: Role::Admin }));
        cache.clear();
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn test_half_written_cache_reads_as_empty() {
        let store = MemoryStore::new();
        store.set(USER_ROLE_KEY, "admin");
        let cache = RoleCache::new(store);
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn test_reconcile_fixes_stale_role() {
        let cache = cache();
        let profile = Profile::new(Uuid::new_v4(), "a@b.co".into(), "A".into(), Role::Client);
        cache.write(profile.id, Role::Admin);

        assert_eq!(cache.reconcile(&profile), Reconciled::Updated { previous: Some(Role::Admin) });
        assert_eq!(cache.read().map(|c| c.role), Some(Role::Client));
        assert_eq!(cache.reconcile(&profile), Reconciled::Unchanged);
    }

    #[test]
    fn test_reconcile_other_user() {
        let cache = cache();
        cache.write(Uuid::new_v4(), Role::Admin);
        let profile = Profile::new(Uuid::new_v4(), "c@d.co".into(), "C".into(), Role::Client);
        assert_eq!(cache.reconcile(&profile), Reconciled::Updated { previous: None });
        assert_eq!(cache.read().map(|c| c.user_id), Some(profile.id));
    }
}
