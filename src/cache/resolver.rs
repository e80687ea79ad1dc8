//! Get-or-generate protocol around the pattern cache.

use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheLookup, CachedPatternRecord, Fingerprint, PatternCache};
use crate::errors::ScrapeError;
use crate::pattern::{Pattern, PatternGenerator};

pub const DEFAULT_MAX_SAMPLE_CHARS: usize = 100_000;

/// How a single call interacts with the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Look up first, generate and store on a miss.
    #[default]
    Use,
    /// Always generate and overwrite the stored pattern.
    Refresh,
    /// Always generate, never read or write the cache.
    Bypass,
}

impl FromStr for CachePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "use" => Ok(Self::Use),
            "refresh" => Ok(Self::Refresh),
            "bypass" => Ok(Self::Bypass),
            other => Err(format!("unknown cache policy '{other}', expected use, refresh or bypass")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSource {
    Cache,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPattern {
    pub pattern: Pattern,
    pub fingerprint: Fingerprint,
    pub source: PatternSource,
}

#[derive(Clone)]
pub struct PatternResolver {
    generator: Arc<dyn PatternGenerator>,
    cache: Arc<dyn PatternCache>,
    max_sample_chars: usize,
}

impl PatternResolver {
    pub fn new(generator: Arc<dyn PatternGenerator>, cache: Arc<dyn PatternCache>) -> Self {
        Self {
            generator,
            cache,
            max_sample_chars: DEFAULT_MAX_SAMPLE_CHARS,
        }
    }

    pub fn with_max_sample_chars(mut self, max_sample_chars: usize) -> Self {
        self.max_sample_chars = max_sample_chars;
        self
    }

    /// Return the pattern for `schema_description`, generating it from
    /// `document_sample` when the cache cannot supply one.
    ///
    /// Cache failures never abort the call. A generated tree that breaks the
    /// instruction contract does, and is not stored.
    #[instrument(skip_all, fields(policy = ?policy))]
    pub async fn resolve(
        &self,
        document_sample: &str,
        schema_description: &str,
        policy: CachePolicy,
    ) -> Result<ResolvedPattern, ScrapeError> {
        let fingerprint = Fingerprint::of(schema_description);

        if policy == CachePolicy::Use
            && let Some(pattern) = self.lookup(&fingerprint).await
        {
            info!(%fingerprint, "Using cached pattern");
            return Ok(ResolvedPattern {
                pattern,
                fingerprint,
                source: PatternSource::Cache,
            });
        }

        let sample = truncate_chars(document_sample, self.max_sample_chars);
        debug!(
            %fingerprint,
            sample_chars = sample.chars().count(),
            "Requesting pattern generation"
        );
        let wire = self
            .generator
            .generate_pattern(sample, schema_description)
            .await
            .map_err(ScrapeError::Generation)?;

        let pattern = Pattern::try_from(wire).inspect_err(|e| {
            warn!(%fingerprint, error = %e, "Generator returned an invalid pattern");
        })?;

        if policy != CachePolicy::Bypass {
            self.store(&pattern, schema_description).await;
        }

        info!(%fingerprint, instructions = pattern.instructions().len(), "Generated new pattern");
        Ok(ResolvedPattern {
            pattern,
            fingerprint,
            source: PatternSource::Generated,
        })
    }

    /// Overwrite the stored pattern for a schema. Unlike the writes made
    /// while resolving, a failed write is returned to the caller.
    pub async fn put(&self, schema_description: &str, pattern: &Pattern) -> Result<(), ScrapeError> {
        let record = CachedPatternRecord::new(pattern, schema_description)?;
        let fingerprint = record.fingerprint.clone();
        self.cache.set(record).await?;
        info!(%fingerprint, "Replaced cached pattern");
        Ok(())
    }

    async fn lookup(&self, fingerprint: &Fingerprint) -> Option<Pattern> {
        match self.cache.get(fingerprint).await {
            Ok(CacheLookup::Hit(record)) => match record.pattern() {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(%fingerprint, error = %e, "Ignoring unreadable cached pattern");
                    None
                }
            },
            Ok(CacheLookup::Miss) => {
                debug!(%fingerprint, "Pattern cache miss");
                None
            }
            Err(e) => {
                warn!(%fingerprint, error = %e, "Pattern cache unavailable, regenerating");
                None
            }
        }
    }

    async fn store(&self, pattern: &Pattern, schema_description: &str) {
        let record = match CachedPatternRecord::new(pattern, schema_description) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Could not encode pattern for caching");
                return;
            }
        };
        if let Err(e) = self.cache.set(record).await {
            warn!(error = %e, "Failed to store pattern");
        }
    }
}

/// Cut `text` to at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
