//! Text coercion for untrusted input and HTML-bound output.

use serde_json::Value;

/// Strip markup and collapse whitespace into single spaces.
pub fn sanitize_text(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            _ => stripped.push(c),
        }
    }

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scalar JSON value as sanitized text. Objects, arrays and null become empty.
pub fn value_as_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => sanitize_text(s),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "1".to_string(),
        _ => String::new(),
    }
}

/// Coerce a JSON value to a non-negative integer id; anything unusable is 0.
///
/// Numeric strings contribute their leading integer (`"42abc"` is 42).
pub fn absint(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i.unsigned_abs()
            } else if let Some(u) = n.as_u64() {
                u
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map_or(0, |f| f.abs().trunc() as u64)
            }
        }
        Some(Value::String(s)) => leading_integer(s.trim()),
        Some(Value::Bool(true)) => 1,
        _ => 0,
    }
}

fn leading_integer(s: &str) -> u64 {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().unwrap_or(0)
}

/// Escape text for inclusion in HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode the handful of entities stores keep in their display name.
pub fn decode_entities(input: &str) -> String {
    input
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("  ORDER_COMPLETED\n"), "ORDER_COMPLETED");
        assert_eq!(sanitize_text("<script>x</script>SW1"), "xSW1");
        assert_eq!(sanitize_text("a \t\n b"), "a b");
    }

    #[test]
    fn test_absint() {
        assert_eq!(absint(Some(&json!(42))), 42);
        assert_eq!(absint(Some(&json!(-42))), 42);
        assert_eq!(absint(Some(&json!(42.9))), 42);
        assert_eq!(absint(Some(&json!("42"))), 42);
        assert_eq!(absint(Some(&json!("42abc"))), 42);
        assert_eq!(absint(Some(&json!("abc"))), 0);
        assert_eq!(absint(Some(&json!(null))), 0);
        assert_eq!(absint(Some(&json!({"id": 42}))), 0);
        assert_eq!(absint(None), 0);
    }

    #[test]
    fn test_value_as_text() {
        assert_eq!(value_as_text(Some(&json!(0.01))), "0.01");
        assert_eq!(value_as_text(Some(&json!("LTC"))), "LTC");
        assert_eq!(value_as_text(Some(&json!(["LTC"]))), "");
        assert_eq!(value_as_text(None), "");
    }

    #[test]
    fn test_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry&#039;s"), "Tom & Jerry's");
        assert_eq!(escape_html("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
