pub mod errors;
pub mod pagination;
pub mod resolve;

#[cfg(test)]
mod tests;

pub use errors::{FaultKind, FieldFault};
pub use pagination::PaginationHints;

use scraper::Html;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::pattern::Pattern;

/// Result of walking one document with one pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    pub data: Map<String, Value>,
    pub faults: Vec<FieldFault>,
}

impl ExtractionReport {
    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }
}

pub fn extract(html: &str, pattern: &Pattern) -> ExtractionReport {
    let document = Html::parse_document(html);
    extract_document(&document, pattern)
}

/// Resolve every top-level instruction against the document root.
pub fn extract_document(document: &Html, pattern: &Pattern) -> ExtractionReport {
    let mut faults = Vec::new();
    let data = resolve::resolve_pattern(document, pattern, &mut faults);

    debug!(
        pattern = pattern.name(),
        fields = data.len(),
        faults = faults.len(),
        "Extraction finished"
    );

    ExtractionReport { data, faults }
}

/// Extract data and pagination hints in one parse of the document.
pub fn extract_with_pagination(
    html: &str,
    pattern: &Pattern,
    document_url: Option<&Url>,
) -> (ExtractionReport, PaginationHints) {
    let document = Html::parse_document(html);
    let mut report = extract_document(&document, pattern);
    let hints = pagination::find_pagination(
        &document,
        pattern.pagination(),
        document_url,
        &mut report.faults,
    );
    (report, hints)
}
