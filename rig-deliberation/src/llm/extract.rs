//! Structured output extraction
//!
//! Models wrap JSON in prose, fenced code blocks, or nothing at all. The
//! extractor tries three strategies in a fixed order and returns the first
//! that parses:
//!
//! 1. the whole text as JSON
//! 2. the body of the first fenced code block (```json or bare ```)
//! 3. the span from the first `{` to the last `}`
//!
//! It never panics; callers branch on the `Result`.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::ParseError;

fn fenced_block() -> Option<&'static Regex> {
    static FENCED: OnceLock<Option<Regex>> = OnceLock::new();
    FENCED
        .get_or_init(|| Regex::new(r"(?s)```(?:[a-zA-Z]+)?[ \t]*\n?(.*?)```").ok())
        .as_ref()
}

fn parse_structured(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(value) if value.is_object() || value.is_array() => Some(value),
        _ => None,
    }
}

/// Extract a JSON object or array from free-form model output
pub fn extract_structured(text: &str) -> Result<Value, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::NoStructuredContent);
    }

    if let Some(value) = parse_structured(text) {
        return Ok(value);
    }

    if let Some(re) = fenced_block() {
        if let Some(value) = re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|body| parse_structured(body.as_str()))
        {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Some(value) = parse_structured(&text[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(ParseError::NoStructuredContent)
}

/// Extract and decode into `T`
pub fn extract_as<T: DeserializeOwned>(text: &str) -> Result<T, ParseError> {
    let value = extract_structured(text)?;
    serde_json::from_value(value).map_err(|e| ParseError::InvalidShape(e.to_string()))
}

/// Flatten a model `content` field into plain text
///
/// Handles plain strings, arrays of text parts (`[{"type":"text","text":..}]`
/// or bare strings) and objects carrying `text` or `content`.
pub fn content_to_string(content: &Value) -> String {
    match content {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                Value::Object(obj) => obj
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                _ => String::new(),
            })
            .collect(),
        Value::Object(obj) => match obj.get("text").or_else(|| obj.get("content")) {
            Some(inner) => content_to_string(inner),
            None => content.to_string(),
        },
        other => other.to_string(),
    }
}

/// Truncate to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_direct_json() {
        let value = extract_structured(r#"{"queries": ["a", "b"]}"#).unwrap();
        assert_eq!(value, json!({"queries": ["a", "b"]}));
    }

    #[test]
    fn test_fenced_json_with_prose() {
        let text = "prefix ```json\n{\"answer\":\"x\"}\n``` suffix";
        assert_eq!(extract_structured(text).unwrap(), json!({"answer": "x"}));
    }

    #[test]
    fn test_fenced_without_language() {
        let text = "Here you go:\n```\n{\"winner\": \"draw\"}\n```";
        assert_eq!(extract_structured(text).unwrap(), json!({"winner": "draw"}));
    }

    #[test]
    fn test_brace_scan() {
        let text = "The verdict is {\"should_continue\": false} as discussed.";
        assert_eq!(
            extract_structured(text).unwrap(),
            json!({"should_continue": false})
        );
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert_eq!(
            extract_structured("{invalid json}"),
            Err(ParseError::NoStructuredContent)
        );
        assert_eq!(extract_structured(""), Err(ParseError::NoStructuredContent));
        assert_eq!(
            extract_structured("no braces here"),
            Err(ParseError::NoStructuredContent)
        );
    }

    #[test]
    fn test_scalar_json_is_not_structured() {
        assert!(extract_structured("42").is_err());
        assert!(extract_structured("\"just a string\"").is_err());
    }

    #[test]
    fn test_extract_as_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Verdict {
            #[allow(dead_code)]
            winner: String,
        }

        let err = extract_as::<Verdict>(r#"{"loser": "x"}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidShape(_)));
    }

    #[test]
    fn test_content_to_string_variants() {
        assert_eq!(content_to_string(&json!("plain")), "plain");
        assert_eq!(content_to_string(&json!(null)), "");
        assert_eq!(
            content_to_string(&json!([{"type": "text", "text": "a"}, "b"])),
            "ab"
        );
        assert_eq!(content_to_string(&json!({"text": "inner"})), "inner");
        assert_eq!(content_to_string(&json!({"other": 1})), r#"{"other":1}"#);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("什么是ETF", 3), "什么是");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
