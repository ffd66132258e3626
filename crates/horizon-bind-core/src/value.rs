//! Rendering of model values into element state.
//!
//! Model values are [`serde_json::Value`]s and a property that is not set is
//! `None`. Values are never guarded or defaulted on their way to the element
//! tree; they are coerced to strings the way a browser script would coerce
//! them (`String(value)`), with one exception: text content treats a missing
//! or `null` value as the empty string, matching `textContent` assignment.

use serde_json::Value;

/// Render a value as attribute or class text.
///
/// | value   | rendering         |
/// |---------|-------------------|
/// | missing | `undefined`       |
/// | null    | `null`            |
/// | number  | `3` for `3.0`     |
/// | array   | items joined by `,` |
/// | object  | `[object Object]` |
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(value) => render_json(value),
    }
}

/// Render a value as text content.
pub fn render_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(value) => render_json(value),
    }
}

fn render_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(render_float).unwrap_or_else(|| n.to_string())
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => render_json(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn render_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }

    // Shortest round-trip digits and decimal exponent, e.g. "1.25e-7".
    let scientific = format!("{:e}", f.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let k = digits.len() as i32;
    let n = exponent + 1;
    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        format!("{first}{fraction}e{sign}{}", (n - 1).abs())
    };

    if f < 0.0 { format!("-{body}") } else { body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_value_renders_undefined() {
        assert_eq!(render_value(None), "undefined");
        assert_eq!(render_text(None), "");
    }

    #[test]
    fn test_null_renders() {
        assert_eq!(render_value(Some(&Value::Null)), "null");
        assert_eq!(render_text(Some(&Value::Null)), "");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(render_value(Some(&json!("baz"))), "baz");
        assert_eq!(render_value(Some(&json!(true))), "true");
        assert_eq!(render_value(Some(&json!(42))), "42");
        assert_eq!(render_value(Some(&json!(-7))), "-7");
        assert_eq!(render_value(Some(&json!(3.0))), "3");
        assert_eq!(render_value(Some(&json!(2.5))), "2.5");
    }

    #[test]
    fn test_float_exponent_ranges() {
        let cases = [
            (0.1, "0.1"),
            (-0.5, "-0.5"),
            (123.456, "123.456"),
            (0.000001, "0.000001"),
            (1e-7, "1e-7"),
            (-2.5e-8, "-2.5e-8"),
            (1e21, "1e+21"),
            (1.5e300, "1.5e+300"),
            (123456789012345680000.0, "123456789012345680000"),
            (-0.0, "0"),
        ];
        for (value, expected) in cases {
            assert_eq!(render_value(Some(&json!(value))), expected, "{value}");
        }
    }

    #[test]
    fn test_compound_values() {
        assert_eq!(render_value(Some(&json!([1, "a", null]))), "1,a,");
        assert_eq!(render_text(Some(&json!({"a": 1}))), "[object Object]");
    }
}
