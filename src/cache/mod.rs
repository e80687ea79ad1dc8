pub mod errors;
pub mod fingerprint;
pub mod memory;
pub mod record;
pub mod resolver;

pub use errors::CacheError;
pub use fingerprint::Fingerprint;
pub use memory::InMemoryPatternCache;
pub use record::CachedPatternRecord;
pub use resolver::{CachePolicy, PatternResolver, PatternSource, ResolvedPattern};

use async_trait::async_trait;

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(CachedPatternRecord),
    Miss,
}

/// Key-value store for generated patterns. Last write wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatternCache: Send + Sync {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<CacheLookup, CacheError>;

    async fn set(&self, record: CachedPatternRecord) -> Result<(), CacheError>;
}
