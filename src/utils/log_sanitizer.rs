//! Log sanitization utilities
//!
//! Prevents sensitive data (instance passwords, API credentials, session
//! tokens) from being fully exposed in debug/error logs.

use serde_json::Value;

/// Maximum number of characters to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

/// Wire field names whose values must never reach the logs.
const SENSITIVE_FIELDS: &[&str] = &["Password", "AdminPassword", "SecretKey", "Token"];

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Returns the original string if it's within the limit,
/// otherwise returns the first `TRUNCATE_LIMIT` characters with a suffix
/// indicating the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask sensitive fields in a JSON payload before logging.
///
/// 非 JSON 输入原样返回（调用方只在 debug 日志里使用）。
pub fn mask_sensitive(payload: &str) -> String {
    match serde_json::from_str::<Value>(payload) {
        Ok(mut value) => {
            mask_value(&mut value);
            serde_json::to_string(&value).unwrap_or_else(|_| payload.to_string())
        }
        Err(_) => payload.to_string(),
    }
}

fn mask_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if SENSITIVE_FIELDS.contains(&key.as_str()) {
                    *v = Value::String("***".to_string());
                } else {
                    mask_value(v);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                mask_value(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- truncate_for_log ----

    #[test]
    fn short_string_unchanged() {
        let s = "hello world";
        assert_eq!(truncate_for_log(s), s);
    }

    #[test]
    fn exactly_at_limit() {
        let s = "a".repeat(TRUNCATE_LIMIT);
        assert_eq!(truncate_for_log(&s), s);
    }

    #[test]
    fn over_limit_truncated() {
        let s = "a".repeat(TRUNCATE_LIMIT + 100);
        let result = truncate_for_log(&s);
        assert!(result.contains("... [truncated, total"));
        assert!(result.contains(&format!("{} bytes]", TRUNCATE_LIMIT + 100)));
        assert!(result.len() < s.len());
    }

    #[test]
    fn multibyte_chars_safe() {
        // Ensure truncation doesn't split multi-byte characters
        let s = "你".repeat(200); // Each '你' is 3 bytes
        let result = truncate_for_log(&s);
        assert!(result.contains("... [truncated, total"));
    }

    // ---- mask_sensitive ----

    #[test]
    fn masks_password_fields() {
        let payload = r#"{"InstanceId":"mssql-1","Password":"Hunter2!","Memory":4}"#;
        let masked = mask_sensitive(payload);
        assert!(!masked.contains("Hunter2!"));
        assert!(masked.contains(r#""Password":"***""#));
        assert!(masked.contains("mssql-1"));
    }

    #[test]
    fn masks_nested_and_array_fields() {
        let payload = r#"{"Instances":[{"AdminPassword":"p@ss"},{"AdminPassword":"w0rd"}]}"#;
        let masked = mask_sensitive(payload);
        assert!(!masked.contains("p@ss"));
        assert!(!masked.contains("w0rd"));
    }

    #[test]
    fn non_json_passthrough() {
        assert_eq!(mask_sensitive("plain text"), "plain text");
    }
}
