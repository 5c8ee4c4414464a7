//! Console argument formatting
//!
//! Log arguments are joined with a single space. Strings are written
//! verbatim; everything else goes through JSON-like stringification:
//! - `{"a":1}` for objects, `[1,2]` for arrays, integers without a fraction
//! - magnitudes from 1e21 up and below 1e-6 in exponent form (`1e+21`, `1e-7`)
//! - `undefined` and functions have no JSON form: at top level they render as
//!   `undefined` / `[Function]`, inside arrays as `null`, inside objects the
//!   property is skipped
//! - non-finite numbers render as `NaN` / `Infinity` / `-Infinity` at top
//!   level and as `null` when nested

use crate::value::Value;

/// Format a list of console arguments into one line
pub fn format_log_args(args: &[Value]) -> String {
    args.iter()
        .map(|arg| match arg {
            Value::String(s) => s.as_str().to_string(),
            other => stringify(other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a single value the way the console does for non-string arguments
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Number(n) if !n.is_finite() => non_finite(*n).to_string(),
        _ => json_fragment(value).unwrap_or_else(|| match value {
            Value::NativeFunction(_) => "[Function]".to_string(),
            _ => "undefined".to_string(),
        }),
    }
}

fn non_finite(n: f64) -> &'static str {
    if n.is_nan() {
        "NaN"
    } else if n.is_sign_negative() {
        "-Infinity"
    } else {
        "Infinity"
    }
}

/// JSON text of a value, or `None` when the value has no JSON form
fn json_fragment(value: &Value) -> Option<String> {
    match value {
        Value::Undefined | Value::NativeFunction(_) => None,
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(json_number(*n)),
        Value::String(s) => Some(json_string(s)),
        Value::Array(arr) => {
            let elements: Vec<String> = arr
                .iter()
                .map(|v| json_fragment(v).unwrap_or_else(|| "null".to_string()))
                .collect();
            Some(format!("[{}]", elements.join(",")))
        }
        Value::Object(obj) => {
            let pairs: Vec<String> = obj
                .iter()
                .filter_map(|(k, v)| json_fragment(v).map(|v| format!("{}:{}", json_string(k), v)))
                .collect();
            Some(format!("{{{}}}", pairs.join(",")))
        }
    }
}

fn json_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    if n == 0.0 {
        // Covers -0 as well
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&n.abs()) {
        n.to_string()
    } else {
        exponent_form(n)
    }
}

/// `1e+21`, `-2.5e-7`: shortest mantissa, signed exponent
fn exponent_form(n: f64) -> String {
    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
