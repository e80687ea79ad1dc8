#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use pattern_scraper::engine::extract_with_pagination;
use pattern_scraper::pattern::Pattern;

const PATTERN: &str = r#"{
    "name": "fuzz",
    "instructions": [
        { "fieldName": "title", "selector": "title" },
        { "fieldName": "items", "selector": "li", "isList": true, "childInstructions": [
            { "fieldName": "text", "selector": "span" },
            { "fieldName": "price", "selector": ".price", "type": "number" },
            { "fieldName": "when", "selector": "time", "attribute": "datetime", "type": "date" }
        ] }
    ],
    "pagination": { "selector": "a[rel=next]" }
}"#;

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);
    let pattern = Pattern::from_json(PATTERN).unwrap();
    let base = Url::parse("https://example.com/list").unwrap();

    // Extraction should never panic regardless of input
    let _ = extract_with_pagination(&html, &pattern, Some(&base));
});
