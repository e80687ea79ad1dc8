use serde_json::Value;

pub const PATTERN_SYSTEM_PROMPT: &str = r#"You write extraction plans for HTML pages.
Given a page sample and a description of the wanted data, answer with one JSON object:

{
  "name": "short name for the plan",
  "description": "what the plan extracts",
  "instructions": [
    {
      "fieldName": "output key",
      "selector": "CSS selector, relative to the parent match for nested fields",
      "attribute": "attribute to read instead of the text (optional)",
      "type": "string | number | date",
      "isList": false,
      "childInstructions": [ ... nested instructions for object values (optional) ]
    }
  ],
  "pagination": { "selector": "CSS selector of the next page link", "attribute": "href" }
}

Use childInstructions with isList true for repeated records such as reviews.
Leave out "pagination" when the page has no next page link.
Answer with the JSON object only."#;

pub const JUDGE_SYSTEM_PROMPT: &str = r#"You check scraped data against the schema it was scraped for.
Look at structure, missing or empty fields, value types, plausibility of values
(dates look like dates, ratings stay within their scale) and consistency of
formats across records.

Answer with one JSON object: {"isValid": boolean, "issues": [string]}"#;

pub const REPAIR_SYSTEM_PROMPT: &str = r#"You fix scraped data so that it matches its schema.
Correct type mismatches, normalize dates and numbers, clean up text and keep
formats consistent across records. Do not invent values that are not present.

Answer with one JSON object: {"sanitizedData": <the full corrected data>, "changes": [string]}"#;

pub fn pattern_user_prompt(document_sample: &str, schema_description: &str) -> String {
    format!(
        "--- HTML START ---\n{document_sample}\n--- HTML END ---\n\n--- SCHEMA ---\n{schema_description}\n\nWrite the extraction plan."
    )
}

pub fn judge_user_prompt(data: &Value, schema_description: &str) -> String {
    format!(
        "Schema:\n{schema_description}\n\nScraped data:\n{}\n\nList every structural or data quality issue.",
        pretty(data)
    )
}

pub fn repair_user_prompt(data: &Value, schema_description: &str, issues: &[String]) -> String {
    format!(
        "Schema:\n{schema_description}\n\nData:\n{}\n\nIssues to fix:\n{}",
        pretty(data),
        issues.join("\n")
    )
}

fn pretty(data: &Value) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}
