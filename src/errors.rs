use thiserror::Error;

use crate::cache::CacheError;
use crate::pattern::PatternError;

/// Failure of one of the external generative capabilities (pattern
/// generation, judging, repairing).
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors that abort a whole scrape, plus failures of explicit cache writes.
/// Everything else degrades into data.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid instruction: {0}")]
    InvalidInstruction(#[from] PatternError),

    #[error("pattern generation failed: {0}")]
    Generation(#[source] CapabilityError),

    #[error("pattern cache write failed: {0}")]
    Cache(#[from] CacheError),
}
