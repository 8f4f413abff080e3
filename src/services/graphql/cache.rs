use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::RwLock;

use super::types::{CacheKey, QueryRequest};

#[derive(Debug, Clone)]
struct CachedResponse {
    data: Value,
    keys: Vec<CacheKey>,
    stored_at: Instant,
    sequence: u64,
}

/// Entries kept before the oldest one is evicted.
pub const DEFAULT_MAX_ENTRIES: usize = 128;

/// In-process response cache keyed by operation and variables.
///
/// Each entry remembers the root fields it covers so a single
/// [`CacheKey`] can drop every response that touched it. Holds at most
/// `max_entries` responses; storing past that evicts the oldest write.
#[derive(Debug)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CachedResponse>>,
    max_entries: usize,
    next_sequence: AtomicU64,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
            next_sequence: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, request: &QueryRequest) -> Option<Value> {
        let entries = self.entries.read().await;
        entries.get(&fingerprint(request)).map(|entry| {
            tracing::trace!(
                "Cache hit for {} (age {:?})",
                request.operation_name,
                entry.stored_at.elapsed()
            );
            entry.data.clone()
        })
    }

    pub async fn store(&self, request: &QueryRequest, data: Value) {
        let fingerprint = fingerprint(request);
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&fingerprint) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.sequence)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                tracing::trace!("Response cache full, evicting {}", oldest);
                entries.remove(&oldest);
            }
        }

        entries.insert(
            fingerprint,
            CachedResponse {
                data,
                keys: request.cache_keys.clone(),
                stored_at: Instant::now(),
                sequence,
            },
        );
    }

    /// Remove every entry covering `key`. Returns how many were dropped.
    pub async fn invalidate(&self, key: &CacheKey) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.keys.contains(key));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn fingerprint(request: &QueryRequest) -> String {
    format!("{}:{}", request.operation_name, request.variables)
}
