//! One-call scrape: pattern resolution, extraction and validation.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};
use url::Url;

use crate::cache::{CachePolicy, Fingerprint, PatternResolver, PatternSource};
use crate::cleaner::{AmmoniaCleaner, DocumentCleaner};
use crate::engine::{self, FieldFault, PaginationHints};
use crate::errors::ScrapeError;
use crate::validation::{ValidationLoop, ValidationReport};

#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    html: String,
    schema_description: String,
    url: Option<Url>,
    cache_policy: CachePolicy,
    validate: bool,
    clean_html: bool,
}

impl ScrapeRequest {
    pub fn new(html: impl Into<String>, schema_description: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            schema_description: schema_description.into(),
            url: None,
            cache_policy: CachePolicy::Use,
            validate: true,
            clean_html: false,
        }
    }

    /// Address the document was loaded from. Used to resolve the next page link.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_cleaning(mut self, clean_html: bool) -> Self {
        self.clean_html = clean_html;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutcome {
    pub fingerprint: Fingerprint,
    pub pattern_source: PatternSource,
    /// Extracted data, or the last repaired version when validation ran.
    pub data: Value,
    pub faults: Vec<FieldFault>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
    pub pagination: PaginationHints,
}

#[derive(Clone)]
pub struct PatternScraper {
    resolver: PatternResolver,
    validator: ValidationLoop,
    cleaner: Arc<dyn DocumentCleaner>,
}

impl PatternScraper {
    pub fn new(resolver: PatternResolver, validator: ValidationLoop) -> Self {
        Self {
            resolver,
            validator,
            cleaner: Arc::new(AmmoniaCleaner::new()),
        }
    }

    pub fn with_cleaner(mut self, cleaner: Arc<dyn DocumentCleaner>) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// The resolver behind this scraper, for explicit cache invalidation.
    pub fn resolver(&self) -> &PatternResolver {
        &self.resolver
    }

    /// Only an unusable pattern fails the call. Selector faults, coercion
    /// ambiguity and validation failures come back inside the outcome.
    #[instrument(skip_all, fields(url = request.url.as_ref().map(Url::as_str)))]
    pub async fn scrape(&self, request: ScrapeRequest) -> Result<ScrapeOutcome, ScrapeError> {
        let html = if request.clean_html {
            self.cleaner.clean(&request.html, request.url.as_ref())
        } else {
            request.html
        };

        let resolved = self
            .resolver
            .resolve(&html, &request.schema_description, request.cache_policy)
            .await?;

        let (report, pagination) =
            engine::extract_with_pagination(&html, &resolved.pattern, request.url.as_ref());
        let faults = report.faults;
        let extracted = Value::Object(report.data);

        let (data, validation) = if request.validate {
            let validation = self.validator.run(extracted, &request.schema_description).await;
            (validation.data.clone(), Some(validation))
        } else {
            (extracted, None)
        };

        info!(
            fingerprint = %resolved.fingerprint,
            source = ?resolved.source,
            faults = faults.len(),
            accepted = validation.as_ref().map(ValidationReport::is_accepted),
            has_more_data = pagination.has_more_data,
            "Scrape finished"
        );

        Ok(ScrapeOutcome {
            fingerprint: resolved.fingerprint,
            pattern_source: resolved.source,
            data,
            faults,
            validation,
            pagination,
        })
    }
}
