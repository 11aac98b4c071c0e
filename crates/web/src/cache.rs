//! A TTL cache keyed by `<path>-<format>`, storing the serialized response
//! bytes plus the MIME type that goes with them. A small hand-rolled
//! `std::sync::Mutex`-protected map rather than a ready-made crate, in
//! keeping with the rest of this codebase's in-memory lookup tables.
//! `caching.caching_server_endpoint` is accepted by config for forward
//! compatibility but nothing here actually dials out to it.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct Entry {
    body: Vec<u8>,
    content_type: &'static str,
    stored_at: Instant,
}

pub struct ResponseCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached body if present and still within `ttl` of when it
    /// was stored.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<(Vec<u8>, &'static str)> {
        let entries = self.entries.lock().unwrap();
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() > ttl {
            return None;
        }
        Some((entry.body.clone(), entry.content_type))
    }

    pub fn put(&self, key: String, body: Vec<u8>, content_type: &'static str) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key,
            Entry {
                body,
                content_type,
                stored_at: Instant::now(),
            },
        );
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_is_returned() {
        let cache = ResponseCache::new();
        cache.put("trip-updates-pbf".to_owned(), vec![1, 2, 3], "application/octet-stream");
        let (body, content_type) = cache
            .get("trip-updates-pbf", Duration::from_secs(30))
            .expect("entry present");
        assert_eq!(body, vec![1, 2, 3]);
        assert_eq!(content_type, "application/octet-stream");
    }

    #[test]
    fn expired_entry_is_not_returned() {
        let cache = ResponseCache::new();
        cache.put("trip-updates-pbf".to_owned(), vec![1], "application/octet-stream");
        assert!(cache.get("trip-updates-pbf", Duration::from_secs(0)).is_none());
    }

    #[test]
    fn missing_key_is_not_returned() {
        let cache = ResponseCache::new();
        assert!(cache.get("missing", Duration::from_secs(60)).is_none());
    }
}
