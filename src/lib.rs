pub mod cache;
pub mod cleaner;
pub mod coerce;
pub mod config;
pub mod engine;
pub mod errors;
pub mod llm;
pub mod pattern;
pub mod service;
pub mod validation;

pub use cache::{CachePolicy, Fingerprint, InMemoryPatternCache, PatternCache, PatternResolver};
pub use engine::{ExtractionReport, FieldFault, PaginationHints, extract};
pub use errors::{CapabilityError, ScrapeError};
pub use pattern::{InstructionNode, Pattern, ValueType};
pub use service::{PatternScraper, ScrapeOutcome, ScrapeRequest};
pub use validation::{ValidationLoop, ValidationReport, ValidationSettings, ValidationVerdict};
