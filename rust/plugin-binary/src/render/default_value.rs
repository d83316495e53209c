//! Text rendering of the `default` values shown in `# Default: ...` comments.
//!
//! Each declared type has its own rule, so the comment reads the same no matter how the API
//! server chose to encode the value. A default that does not match its declared type is shown in
//! its plain form.
use serde_json::Value;

use crate::schema::SchemaType;

pub fn format_default(ty: SchemaType, value: &Value) -> String {
    match (ty, value) {
        (SchemaType::Boolean, Value::Bool(flag)) => bool_literal(*flag).to_owned(),
        (SchemaType::String, Value::String(text)) => text.clone(),
        (SchemaType::Integer | SchemaType::Number, Value::Number(number)) => number.to_string(),
        (SchemaType::Array, Value::Array(elements)) => list_literal(elements),
        // arrays are always shown as a list, even if the server only published a single element
        (SchemaType::Array, other) => format!("[{}]", plain(other)),
        (_, other) => plain(other),
    }
}

/// Strings unquoted, everything else as a literal.
fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => literal(other),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_owned(),
        Value::Bool(flag) => bool_literal(*flag).to_owned(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => quoted(text),
        Value::Array(elements) => list_literal(elements),
        Value::Object(entries) => {
            let entries = entries
                .iter()
                .map(|(key, value)| format!("{}: {}", quoted(key), literal(value)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{entries}}}")
        }
    }
}

fn list_literal(elements: &[Value]) -> String {
    let elements = elements.iter().map(literal).collect::<Vec<_>>().join(", ");
    format!("[{elements}]")
}

fn bool_literal(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}

/// Single quotes, unless the text contains a single quote and no double quote.
fn quoted(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
