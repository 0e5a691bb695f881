//! Canonical JSON encoding for the ledger's `data_hash`.
//!
//! Independent implementations must agree byte-for-byte on the serialized
//! result body, so the encoding is pinned here rather than left to the JSON
//! library's defaults:
//!
//! - Object keys are sorted lexicographically (byte order)
//! - No whitespace between tokens
//! - Strings use minimal escaping per RFC 8785 section 3.2.2.2 (only `"`,
//!   `\`, and control characters U+0000 through U+001F)
//! - Integers are emitted in plain decimal form
//! - Floats are emitted in `serde_json`'s shortest round-trip form (the
//!   result body carries exactly one float field, `processing_time_ms`)
//!
//! The canonical form is pinned by test vectors; changing it changes every
//! `data_hash` and requires a chain format version bump.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Serializes `value` to its canonical JSON string.
///
/// # Panics
///
/// Panics if `value` cannot be represented as a JSON tree. The types fed
/// through this function (the result body and its components) serialize
/// infallibly.
#[must_use]
pub fn canonical_json<T: Serialize>(value: &T) -> String {
    let tree = serde_json::to_value(value).expect("failed to serialize canonical payload");
    let mut output = String::new();
    emit_value(&tree, &mut output);
    output
}

/// Emits a JSON value in canonical form.
fn emit_value(value: &Value, output: &mut String) {
    match value {
        Value::Null => output.push_str("null"),
        Value::Bool(b) => output.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => emit_number(n, output),
        Value::String(s) => emit_string(s, output),
        Value::Array(arr) => emit_array(arr, output),
        Value::Object(obj) => emit_object(obj, output),
    }
}

/// Emits a number in canonical form.
///
/// Integers use plain decimal. Floats fall through to `serde_json`'s Ryu
/// formatting, which is the shortest representation that round-trips.
fn emit_number(n: &Number, output: &mut String) {
    if let Some(i) = n.as_i64() {
        let _ = write!(output, "{i}");
    } else if let Some(u) = n.as_u64() {
        let _ = write!(output, "{u}");
    } else {
        output.push_str(&n.to_string());
    }
}

/// Emits a string with minimal escaping per RFC 8785 section 3.2.2.2.
fn emit_string(s: &str, output: &mut String) {
    output.push('"');
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\u{0008}' => output.push_str("\\b"),
            '\u{000C}' => output.push_str("\\f"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if ('\u{0000}'..='\u{001F}').contains(&c) => {
                let _ = write!(output, "\\u{:04x}", c as u32);
            },
            c => output.push(c),
        }
    }
    output.push('"');
}

/// Emits an array in canonical form; element order is preserved.
fn emit_array(arr: &[Value], output: &mut String) {
    output.push('[');
    for (i, item) in arr.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        emit_value(item, output);
    }
    output.push(']');
}

/// Emits an object with keys sorted in byte order.
fn emit_object(obj: &Map<String, Value>, output: &mut String) {
    let mut sorted_keys: Vec<&String> = obj.keys().collect();
    sorted_keys.sort();

    output.push('{');
    for (i, key) in sorted_keys.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        emit_string(key, output);
        output.push(':');
        emit_value(&obj[*key], output);
    }
    output.push('}');
}
