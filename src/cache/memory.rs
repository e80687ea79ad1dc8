use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::cache::{CacheError, CacheLookup, CachedPatternRecord, Fingerprint, PatternCache};

/// Process-local pattern cache.
#[derive(Clone, Default)]
pub struct InMemoryPatternCache {
    store: Arc<DashMap<Fingerprint, CachedPatternRecord>>,
}

impl InMemoryPatternCache {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl PatternCache for InMemoryPatternCache {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<CacheLookup, CacheError> {
        Ok(match self.store.get(fingerprint) {
            Some(entry) => CacheLookup::Hit(entry.value().clone()),
            None => CacheLookup::Miss,
        })
    }

    async fn set(&self, record: CachedPatternRecord) -> Result<(), CacheError> {
        self.store.insert(record.fingerprint.clone(), record);
        Ok(())
    }
}
