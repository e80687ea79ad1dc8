//! Best-effort conversion of raw extracted text into typed scalars.
//!
//! Nothing in here fails. A value that cannot be read as its declared type
//! degrades to a sentinel (empty text for numbers, the cleaned text for
//! dates) and the ambiguity is reported alongside it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Number, Value};
use std::sync::LazyLock;

use crate::pattern::ValueType;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static NON_NUMERIC_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d.,-]").unwrap());

const ISO_OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
];

/// A coerced leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Text(String),
    Number(f64),
    Timestamp(DateTime<Utc>),
}

impl ScalarValue {
    /// The "nothing usable here" sentinel.
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    pub fn is_empty_sentinel(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    /// JSON form. Integral numbers are written without a fractional part and
    /// timestamps as ISO-8601 in UTC with millisecond precision.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Number(n) => number_to_json(*n),
            Self::Timestamp(ts) => Value::String(ts.format(ISO_OUTPUT_FORMAT).to_string()),
        }
    }
}

/// A raw value that did not read as its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoercionAmbiguity {
    pub value_type: ValueType,
    pub cleaned: String,
}

pub fn coerce(raw: &str, value_type: ValueType) -> ScalarValue {
    coerce_checked(raw, value_type).0
}

/// Like [`coerce`], also returning the ambiguity when the declared type could
/// not be honoured.
pub fn coerce_checked(raw: &str, value_type: ValueType) -> (ScalarValue, Option<CoercionAmbiguity>) {
    if raw.is_empty() {
        return (ScalarValue::empty(), None);
    }

    let cleaned = normalize_whitespace(raw);
    if cleaned.is_empty() {
        return (ScalarValue::empty(), None);
    }

    match value_type {
        ValueType::String => (ScalarValue::Text(cleaned), None),
        ValueType::Number => match parse_number(&cleaned) {
            Some(n) => (ScalarValue::Number(n), None),
            None => (
                ScalarValue::empty(),
                Some(CoercionAmbiguity {
                    value_type,
                    cleaned,
                }),
            ),
        },
        ValueType::Date => match parse_date(&cleaned) {
            Some(ts) => (ScalarValue::Timestamp(ts), None),
            None => (
                ScalarValue::Text(cleaned.clone()),
                Some(CoercionAmbiguity {
                    value_type,
                    cleaned,
                }),
            ),
        },
    }
}

/// Collapse runs of whitespace into one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_string()
}

/// Keep digits, `.`, `,` and a leading `-`, turn the first comma into a
/// decimal point and parse what is left. `"1,234.5"` becomes `"1.234.5"`
/// and is rejected.
fn parse_number(cleaned: &str) -> Option<f64> {
    let numeric = NON_NUMERIC_REGEX.replace_all(cleaned, "");
    let (sign, digits) = numeric.split_at(usize::from(numeric.starts_with('-')));
    let numeric = format!("{sign}{}", digits.replace('-', "")).replacen(',', ".", 1);
    numeric.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_date(cleaned: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(cleaned) {
        return Some(ts.with_timezone(&Utc));
    }

    // Zone-less input is read as UTC so results do not depend on the host.
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cleaned, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

fn number_to_json(n: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or_else(|| Value::String(String::new()), Value::Number)
}
