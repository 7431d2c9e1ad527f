use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::SageError;

pub const RESPONSE_CACHE_CAPACITY: usize = 200;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CachedResponse {
    pub data: String,
    pub timestamp: i64,
}

/// Bounded cache of parsed model answers keyed by (model, prompt).
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<Mutex<LruCache<u64, CachedResponse>>>,
}

fn cache_key(model: &str, prompt: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    prompt.hash(&mut hasher);
    hasher.finish()
}

impl ResponseCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        ResponseCache {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn get<T: for<'de> Deserialize<'de>>(&self, model: &str, prompt: &str) -> Option<T> {
        let key = cache_key(model, prompt);
        let data = self.entries.lock().get(&key).map(|cached| cached.data.clone())?;

        match serde_json::from_str::<T>(&data) {
            Ok(parsed) => {
                tracing::debug!(model = model, "Cache hit");
                Some(parsed)
            }
            Err(e) => {
                tracing::warn!(model = model, error = %e, "Failed to parse cached response");
                None
            }
        }
    }

    pub fn put<T: Serialize>(&self, model: &str, prompt: &str, response: &T) -> Result<(), SageError> {
        let data = serde_json::to_string(response)
            .map_err(|e| SageError::new(
                format!("Failed to serialize response for cache: {}", e),
                "json_serialize"
            ))?;

        self.entries.lock().put(
            cache_key(model, prompt),
            CachedResponse {
                data,
                timestamp: chrono::Utc::now().timestamp(),
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(RESPONSE_CACHE_CAPACITY).expect("capacity > 0"))
    }
}
