//! In-memory entity cache shared by a proxy's list and get paths
//!
//! Entries have no TTL. A bulk list fills the cache so the per-id reads that
//! follow during export don't each cost a GET; delete evicts.

use std::collections::HashMap;
use std::sync::Mutex;

pub trait CacheInterface<T>: Send + Sync {
    fn get(&self, id: &str) -> Option<T>;
    fn set(&self, id: &str, value: T);
    fn delete(&self, id: &str);
}

#[derive(Debug)]
pub struct ResourceCache<T> {
    entries: Mutex<HashMap<String, T>>,
}

impl<T> Default for ResourceCache<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> ResourceCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned map is still a consistent map
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, T>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Clone + Send> CacheInterface<T> for ResourceCache<T> {
    fn get(&self, id: &str) -> Option<T> {
        let hit = self.lock().get(id).cloned();
        if hit.is_some() {
            tracing::debug!("Cache hit for {}", id);
        }
        hit
    }

    fn set(&self, id: &str, value: T) {
        self.lock().insert(id.to_string(), value);
    }

    fn delete(&self, id: &str) {
        self.lock().remove(id);
    }
}
