//! Single-line JSON parsing.

use serde_json::{Map, Value};

use crate::error::FrameError;

/// A parsed NDJSON frame.
pub type JsonObject = Map<String, Value>;

/// Parse one framed line.
///
/// Returns `None` for blank lines, which carry no frame and are skipped
/// silently. Everything else is either an object or a [`FrameError`].
pub fn parse_frame(line: &str) -> Option<Result<JsonObject, FrameError>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(FrameError::NotAnObject(kind(&other))),
        Err(e) => Err(FrameError::InvalidJson(e)),
    };
    Some(parsed)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_skipped() {
        assert!(parse_frame("").is_none());
        assert!(parse_frame("   \t").is_none());
    }

    #[test]
    fn object_is_parsed() {
        let obj = parse_frame(r#"{"status":"success"}"#)
            .expect("frame")
            .expect("object");
        assert_eq!(obj["status"], "success");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let obj = parse_frame("  {\"done\":true}  ").expect("frame").expect("object");
        assert_eq!(obj["done"], true);
    }

    #[test]
    fn garbage_is_invalid_json() {
        let err = parse_frame("not json at all").expect("frame").unwrap_err();
        assert!(matches!(err, FrameError::InvalidJson(_)));
    }

    #[test]
    fn scalar_is_not_an_object() {
        let err = parse_frame("42").expect("frame").unwrap_err();
        assert!(matches!(err, FrameError::NotAnObject("number")));
        let err = parse_frame("[1,2]").expect("frame").unwrap_err();
        assert!(matches!(err, FrameError::NotAnObject("array")));
    }

    #[test]
    fn replacement_character_line_is_invalid() {
        let err = parse_frame("{\"response\":\"a\"\u{FFFD}}").expect("frame").unwrap_err();
        assert!(matches!(err, FrameError::InvalidJson(_)));
    }
}
