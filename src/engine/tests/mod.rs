use serde_json::json;
use std::fs;
use url::Url;

use crate::engine::{FaultKind, extract, extract_with_pagination};
use crate::pattern::{InstructionNode, PaginationRule, Pattern, ValueType};

fn reviews_fixture() -> String {
    fs::read_to_string("src/engine/tests/fixtures/reviews.html").expect("Failed to read test fixture")
}

fn leaf(field: &str, selector: &str, value_type: ValueType) -> InstructionNode {
    InstructionNode::leaf(field, selector, value_type).unwrap()
}

fn pattern(instructions: Vec<InstructionNode>) -> Pattern {
    Pattern::new("test", "test pattern", instructions).unwrap()
}

#[test]
fn test_three_reviews_with_nested_rating() {
    let pattern = Pattern::from_json(
        &json!({
            "name": "reviews",
            "description": "ratings of each review",
            "instructions": [{
                "fieldName": "reviews",
                "selector": "li.review",
                "isList": true,
                "childInstructions": [
                    { "fieldName": "rating", "selector": "span.rating", "type": "number" }
                ]
            }]
        })
        .to_string(),
    )
    .unwrap();

    let report = extract(&reviews_fixture(), &pattern);

    assert!(report.faults.is_empty());
    assert_eq!(
        report.into_value(),
        json!({ "reviews": [ { "rating": 4 }, { "rating": 4 }, { "rating": 4 } ] })
    );
}

#[test]
fn test_full_review_pattern() {
    let review = InstructionNode::composite(
        "reviews",
        "li.review",
        vec![
            leaf("username", "a.username", ValueType::String),
            leaf("profile", "a.username", ValueType::String).with_attribute("href"),
            leaf("rating", "span.rating", ValueType::Number),
            leaf("title", "h3.title", ValueType::String),
            leaf("dateOfVisit", "span.visited", ValueType::Date),
            leaf("text", "p.text", ValueType::String),
        ],
    )
    .unwrap()
    .list();
    let pattern = pattern(vec![
        leaf("placeName", "h1.place-name", ValueType::String),
        leaf("averageRating", ".summary .average", ValueType::Number),
        leaf("reviewCount", ".summary .count", ValueType::Number),
        review,
    ]);

    let data = extract(&reviews_fixture(), &pattern).into_value();

    assert_eq!(data["placeName"], json!("Le Petit Bistro"));
    // "4,3 / 5" keeps "4,35" and the first comma becomes the decimal point.
    assert_eq!(data["averageRating"], json!(4.35));
    assert_eq!(data["reviewCount"], json!(128));
    assert_eq!(
        data["reviews"][0],
        json!({
            "username": "Marie L.",
            "profile": "/profile/marie",
            "rating": 4,
            "title": "Lovely dinner",
            "dateOfVisit": "2024-03-05T00:00:00.000Z",
            "text": "Great food and friendly staff."
        })
    );
    assert_eq!(data["reviews"][1]["dateOfVisit"], json!("2024-02-17T00:00:00.000Z"));
}

#[test]
fn test_absent_child_is_null_and_bad_date_is_reported() {
    let review = InstructionNode::composite(
        "reviews",
        "li.review",
        vec![
            leaf("title", "h3.title", ValueType::String),
            leaf("dateOfVisit", "span.visited", ValueType::Date),
        ],
    )
    .unwrap()
    .list();

    let report = extract(&reviews_fixture(), &pattern(vec![review]));
    let data = report.data;

    assert_eq!(data["reviews"][2]["title"], json!(null));
    assert_eq!(data["reviews"][2]["dateOfVisit"], json!("last summer"));
    assert_eq!(report.faults.len(), 1);
    assert_eq!(report.faults[0].path, "reviews[2].dateOfVisit");
    assert_eq!(
        report.faults[0].kind,
        FaultKind::Coercion {
            value_type: ValueType::Date,
            raw: "last summer".to_string()
        }
    );
}

#[test]
fn test_missing_scalar_match_is_null_and_children_are_not_attempted() {
    let owner = InstructionNode::composite(
        "owner",
        "div.owner",
        vec![leaf("since", "span", ValueType::Number)],
    )
    .unwrap();

    let report = extract(&reviews_fixture(), &pattern(vec![owner]));

    assert_eq!(report.data["owner"], json!(null));
    assert!(report.faults.is_empty());
}

#[test]
fn test_list_keeps_document_order_and_match_count() {
    let pattern = pattern(vec![
        leaf("ids", "li.review", ValueType::String).with_attribute("data-review-id").list(),
        leaf("photos", "img.photo", ValueType::String).with_attribute("src").list(),
    ]);

    let data = extract(&reviews_fixture(), &pattern).into_value();

    assert_eq!(data["ids"], json!(["r-101", "r-102", "r-103"]));
    assert_eq!(data["photos"], json!([]));
}

#[test]
fn test_child_selectors_are_scoped_to_their_element() {
    let html = r#"
        <div class="card"><b>5</b></div>
        <div class="card"><b>3</b></div>
        <div class="card"><i>no score</i></div>
    "#;
    let card = InstructionNode::composite("cards", "div.card", vec![leaf("score", "b", ValueType::Number)])
        .unwrap()
        .list();

    let data = extract(html, &pattern(vec![card])).into_value();

    assert_eq!(data["cards"], json!([{ "score": 5 }, { "score": 3 }, { "score": null }]));
}

#[test]
fn test_invalid_selector_does_not_abort_siblings() {
    let review = InstructionNode::composite(
        "reviews",
        "li.review",
        vec![
            leaf("rating", "span.rating", ValueType::Number),
            leaf("broken", "span[[", ValueType::String),
        ],
    )
    .unwrap()
    .list();
    let pattern = pattern(vec![
        leaf("placeName", "h1.place-name", ValueType::String),
        leaf("badTop", "div[", ValueType::String),
        review,
    ]);

    let report = extract(&reviews_fixture(), &pattern);

    assert_eq!(report.data["placeName"], json!("Le Petit Bistro"));
    assert_eq!(report.data["badTop"], json!(null));
    assert_eq!(report.data["reviews"][1], json!({ "rating": 4, "broken": null }));

    let paths: Vec<&str> = report.faults.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["badTop", "reviews[].broken"]);
    assert!(report.faults.iter().all(|f| f.is_selector_fault()));
}

#[test]
fn test_extraction_is_deterministic() {
    let pattern = Pattern::from_json(
        &json!({
            "name": "reviews",
            "instructions": [
                { "fieldName": "placeName", "selector": "h1" },
                {
                    "fieldName": "reviews",
                    "selector": "li.review",
                    "isList": true,
                    "childInstructions": [
                        { "fieldName": "username", "selector": ".username" },
                        { "fieldName": "visited", "selector": ".visited", "type": "date" }
                    ]
                }
            ]
        })
        .to_string(),
    )
    .unwrap();
    let html = reviews_fixture();

    let first = serde_json::to_string(&extract(&html, &pattern)).unwrap();
    let second = serde_json::to_string(&extract(&html, &pattern)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_output_follows_instruction_order() {
    let pattern = pattern(vec![
        leaf("zeta", "h1", ValueType::String),
        leaf("alpha", "title", ValueType::String),
    ]);

    let data = extract(&reviews_fixture(), &pattern).data;
    let keys: Vec<&String> = data.keys().collect();

    assert_eq!(keys, vec!["zeta", "alpha"]);
}

#[test]
fn test_pagination_is_resolved_with_extraction() {
    let pattern = pattern(vec![leaf("placeName", "h1", ValueType::String)])
        .with_pagination(PaginationRule::new("nav.pagination a.next").unwrap());
    let url = Url::parse("https://www.example.com/restaurant/le-petit-bistro/reviews").unwrap();

    let (report, hints) = extract_with_pagination(&reviews_fixture(), &pattern, Some(&url));

    assert_eq!(report.data["placeName"], json!("Le Petit Bistro"));
    assert!(hints.has_more_data);
    assert_eq!(
        hints.next_cursor_url.as_deref(),
        Some("https://www.example.com/restaurant/le-petit-bistro/reviews?page=2")
    );
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><title>Broken</title><body><ul><li class=review><span class=rating>2<li class=review>";
    let pattern = pattern(vec![
        leaf("ratings", "li.review span.rating", ValueType::Number).list(),
        leaf("reviews", "li.review", ValueType::String).list(),
    ]);

    let data = extract(html, &pattern).into_value();

    assert_eq!(data["ratings"], json!([2]));
    assert_eq!(data["reviews"].as_array().map(Vec::len), Some(2));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let pattern = pattern(vec![
                leaf("title", "title", ValueType::String),
                leaf("numbers", "span", ValueType::Number).list(),
                leaf("dates", "time", ValueType::Date).with_attribute("datetime").list(),
            ]);
            let _ = extract(&html, &pattern);
        }

        #[test]
        fn test_list_length_matches_element_count(count in 0usize..20) {
            let html = "<li>x</li>".repeat(count);
            let pattern = pattern(vec![leaf("items", "li", ValueType::String).list()]);
            let data = extract(&format!("<ul>{html}</ul>"), &pattern).into_value();
            prop_assert_eq!(data["items"].as_array().map(Vec::len), Some(count));
        }
    }
}
