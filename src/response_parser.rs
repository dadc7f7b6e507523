// src/response_parser.rs

use crate::error::ParseError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::warn;

/// Opening "```json" markers at line starts and closing "```" at line ends.
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```json\s*|```$").expect("fence pattern is valid"));

/// Strip markdown code fences the model wraps around its JSON.
pub fn strip_fences(raw: &str) -> String {
    FENCE.replace_all(raw.trim(), "").trim().to_string()
}

/// Decode model output (or a submitted report) as JSON.
///
/// A failure is logged with the cleaned text and returned to the caller,
/// which decides whether to recover.
pub fn parse_response(raw: &str) -> Result<Value, ParseError> {
    let cleaned = strip_fences(raw);
    serde_json::from_str(&cleaned).map_err(|source| {
        warn!(error = %source, raw = %cleaned, "Response is not valid JSON");
        ParseError {
            raw: cleaned,
            source,
        }
    })
}
