//! Escaping for data embedded in HTML.
//!
//! JSON placed inside a `<script>` element must never contain `</script`,
//! and must not contain raw U+2028 / U+2029, which are line terminators in
//! older JavaScript engines.

use serde::Serialize;

use crate::error::{Result, SsrCoreError};

/// Rewrites serialized JSON so it is safe inside a `<script>` element.
///
/// `/` becomes `\/`, U+2028 becomes `\u2028` and U+2029 becomes `\u2029`.
/// Each replacement is a valid JSON escape, so the text still parses to the
/// same value.
pub fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len() + json.len() / 8);
    for c in json.chars() {
        match c {
            '/' => out.push_str("\\/"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

/// Serializes a value to script-safe JSON.
pub fn script_safe_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json =
        serde_json::to_string(value).map_err(|e| SsrCoreError::Serialization(e.to_string()))?;
    Ok(escape_script_json(&json))
}

/// Encodes a string as a script-safe JSON string literal.
pub fn escape(s: &str) -> String {
    // A str always serializes.
    escape_script_json(&serde_json::Value::String(s.to_string()).to_string())
}

/// Inverse of [`escape`].
pub fn unescape(s: &str) -> Result<String> {
    serde_json::from_str(s).map_err(|e| SsrCoreError::Serialization(e.to_string()))
}

/// Escapes text for use in HTML content or a double-quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_slash() {
        assert_eq!(escape("</script>"), r#""<\/script>""#);
    }

    #[test]
    fn test_escape_line_separators() {
        assert_eq!(escape("a\u{2028}b\u{2029}c"), r#""a\u2028b\u2029c""#);
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            "",
            "plain",
            "</script><script>alert(1)</script>",
            "a\u{2028}b\u{2029}c",
            "quotes \" and \\ backslashes \\/",
            "unicode ✓ and\nnewlines\ttabs",
            "\\u2028 literal text",
        ];
        for sample in samples {
            assert_eq!(unescape(&escape(sample)).unwrap(), sample);
        }
    }

    #[test]
    fn test_script_safe_json_never_closes_script() {
        let value = serde_json::json!({
            "content": "</script><script>alert(1)</script>",
            "nested": ["</SCRIPT>", "a/b"]
        });
        let json = script_safe_json(&value).unwrap();

        assert!(!json.contains("</"));
        assert!(!json.contains('\u{2028}'));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }
}
