//! Record formatter: `key<TAB><TAB>{json object}` on one line.
//!
//! Single-valued names encode as JSON strings, multi-valued names as arrays of strings; the
//! [`AttributeValue`] variant decides, nothing is inferred from the values.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::utils::config::KEY_SEPARATOR;
use crate::{AttributeSet, AttributeValue};

/// Compact one-line JSON with a space after `:` and `,` (`{"a": ["x", "y"]}`).
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn to_json_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Single(v) => Value::String(v.clone()),
        AttributeValue::Multi(vs) => Value::Array(vs.iter().cloned().map(Value::String).collect()),
    }
}

/// Encode an attribute set as a single-line JSON object.
pub fn encode_attributes(attrs: &AttributeSet) -> Result<String> {
    let object: Map<String, Value> = attrs
        .iter()
        .map(|(name, value)| (name.to_string(), to_json_value(value)))
        .collect();
    let mut ser = Serializer::with_formatter(Vec::new(), SpacedFormatter);
    Value::Object(object)
        .serialize(&mut ser)
        .map_err(io::Error::from)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&ser.into_inner()).into_owned())
}

/// Keys are paths. Backslash, LF, CR and TAB are escaped (`\\`, `\n`, `\r`, `\t`) so a key never
/// splits its line or runs into the separator, and escaped keys stay distinct.
fn escape_key(key: &str) -> String {
    if !key.contains(['\\', '\n', '\r', '\t']) {
        return key.to_string();
    }
    let mut escaped = String::with_capacity(key.len() + 8);
    for c in key.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Format one output line (without trailing newline).
pub fn format_record(key: &str, attrs: &AttributeSet) -> Result<String> {
    Ok(format!(
        "{}{}{}",
        escape_key(key),
        KEY_SEPARATOR,
        encode_attributes(attrs)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplicity_selects_encoding() {
        let mut attrs = AttributeSet::new();
        attrs.set("TITLE", "x");
        attrs.set_multi("OBJECT", ["gun", "knife"]);
        let line = format_record("/data/gun.jpg", &attrs).unwrap();

        assert!(line.starts_with("/data/gun.jpg\t\t{"));
        assert!(line.contains(r#""TITLE": "x""#));
        assert!(line.contains(r#""OBJECT": ["gun", "knife"]"#));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn one_element_multi_is_still_an_array() {
        let mut attrs = AttributeSet::new();
        attrs.set_multi("OBJECT", ["gun"]);
        assert_eq!(encode_attributes(&attrs).unwrap(), r#"{"OBJECT": ["gun"]}"#);
    }

    #[test]
    fn values_are_escaped_and_parse_back() {
        let mut attrs = AttributeSet::new();
        attrs.set("CONTENT", "line one\nline \"two\"\t\u{1}");
        let encoded = encode_attributes(&attrs).unwrap();
        assert!(!encoded.contains('\n'));

        let parsed: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed["CONTENT"], "line one\nline \"two\"\t\u{1}");
    }

    #[test]
    fn empty_set_is_empty_object() {
        assert_eq!(encode_attributes(&AttributeSet::new()).unwrap(), "{}");
    }

    #[test]
    fn newline_in_key_is_escaped() {
        let line = format_record("a\nb", &AttributeSet::new()).unwrap();
        assert_eq!(line, "a\\nb\t\t{}");
    }

    #[test]
    fn escaped_keys_stay_distinct() {
        let real_newline = format_record("a\nb", &AttributeSet::new()).unwrap();
        let backslash_n = format_record("a\\nb", &AttributeSet::new()).unwrap();
        assert_ne!(real_newline, backslash_n);
        assert_eq!(backslash_n, "a\\\\nb\t\t{}");

        let tabbed = format_record("x\t\ty", &AttributeSet::new()).unwrap();
        assert_eq!(tabbed, "x\\t\\ty\t\t{}");
        assert_eq!(tabbed.matches("\t\t").count(), 1);
    }
}
