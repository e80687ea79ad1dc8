use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::engine::errors::{FaultKind, FieldFault};
use crate::pattern::PaginationRule;

const PAGINATION_PATH: &str = "pagination";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationHints {
    pub has_more_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor_url: Option<String>,
}

impl PaginationHints {
    fn next(url: String) -> Self {
        Self {
            has_more_data: true,
            next_cursor_url: Some(url),
        }
    }
}

/// Look up the "next page" link described by `rule` and resolve it against
/// the document URL. Relative links are dropped when no base is known.
pub fn find_pagination(
    document: &Html,
    rule: Option<&PaginationRule>,
    document_url: Option<&Url>,
    faults: &mut Vec<FieldFault>,
) -> PaginationHints {
    let Some(rule) = rule else {
        return PaginationHints::default();
    };

    let selector = match Selector::parse(rule.selector()) {
        Ok(selector) => selector,
        Err(e) => {
            warn!(selector = rule.selector(), error = %e, "Invalid pagination selector");
            faults.push(FieldFault {
                path: PAGINATION_PATH.to_string(),
                kind: FaultKind::Selector {
                    selector: rule.selector().to_string(),
                    reason: e.to_string(),
                },
            });
            return PaginationHints::default();
        }
    };

    let Some(link) = document
        .select(&selector)
        .filter_map(|element| element.value().attr(rule.attribute()))
        .map(str::trim)
        .find(|link| !link.is_empty())
    else {
        return PaginationHints::default();
    };

    if link.starts_with('#') || link.to_ascii_lowercase().starts_with("javascript:") {
        return PaginationHints::default();
    }

    let resolved = match document_url {
        Some(base) => base.join(link),
        None => Url::parse(link),
    };

    match resolved {
        Ok(url) => {
            debug!(next = %url, "Found next page");
            PaginationHints::next(url.to_string())
        }
        Err(e) => {
            debug!(link, error = %e, "Could not resolve next page link");
            PaginationHints::default()
        }
    }
}
