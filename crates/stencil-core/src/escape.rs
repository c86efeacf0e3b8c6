//! Output escaping and value stringification.

use serde_json::Value;

/// Convert an evaluated value to output text.
///
/// Strings are appended as-is, `null` renders as the empty string, and
/// everything else uses the JSON display form. This is the
/// stringification used for raw-output instructions.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Default escaping function: HTML-entity escaping of `& < > " '`.
///
/// The quote characters use numeric entities so the output is safe in
/// both attribute and text positions.
pub fn escape_html(value: &Value) -> String {
    let raw = stringify(value);
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
