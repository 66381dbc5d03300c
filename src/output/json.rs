//! JSON output formatting
//!
//! JSON is the default output format.

use serde::Serialize;

/// Format a result as pretty JSON
pub fn format_json<T: Serialize>(result: &T) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|e| {
        format!(
            r#"{{"error": true, "code": "SERIALIZATION_ERROR", "message": "{}"}}"#,
            e
        )
    })
}

/// Format a result as compact JSON (single line), used for errors on stderr
pub fn format_json_compact<T: Serialize>(result: &T) -> String {
    serde_json::to_string(result).unwrap_or_else(|e| {
        format!(
            r#"{{"error": true, "code": "SERIALIZATION_ERROR", "message": "{}"}}"#,
            e
        )
    })
}
