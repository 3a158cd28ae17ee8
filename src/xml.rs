//! XML rendering of response envelopes.
//!
//! The element layout mirrors the JSON envelope field by field:
//!
//! | value | XML |
//! |---|---|
//! | `null` | element omitted |
//! | scalar | `<tag>text</tag>` |
//! | array | one `<tag>` per item, flattened |
//! | object | `<tag>` with one child element per key |

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value;

pub(crate) const ROOT: &str = "response";

/// The value tree cannot be expressed as XML (e.g. a map key that is not a
/// valid element name).
#[derive(Debug)]
pub(crate) struct Unencodable;

/// Renders `<response>` with one element group per field, in order.
pub(crate) fn envelope(fields: &[(&str, &Value)]) -> Result<String, Unencodable> {
    let mut w = Writer::new(Vec::new());
    open(&mut w, ROOT)?;
    for (tag, value) in fields {
        element(&mut w, tag, value)?;
    }
    close(&mut w, ROOT)?;
    String::from_utf8(w.into_inner()).map_err(|_| Unencodable)
}

fn element(w: &mut Writer<Vec<u8>>, tag: &str, value: &Value) -> Result<(), Unencodable> {
    if !is_name(tag) {
        return Err(Unencodable);
    }
    match value {
        Value::Null => Ok(()),
        Value::Array(items) => items.iter().try_for_each(|item| element(w, tag, item)),
        Value::Object(map) => {
            open(w, tag)?;
            for (key, child) in map {
                element(w, key, child)?;
            }
            close(w, tag)
        }
        Value::String(s) => leaf(w, tag, s),
        Value::Bool(_) | Value::Number(_) => leaf(w, tag, &value.to_string()),
    }
}

fn leaf(w: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), Unencodable> {
    open(w, tag)?;
    if !text.is_empty() {
        w.write_event(Event::Text(BytesText::new(text))).map_err(|_| Unencodable)?;
    }
    close(w, tag)
}

fn open(w: &mut Writer<Vec<u8>>, tag: &str) -> Result<(), Unencodable> {
    w.write_event(Event::Start(BytesStart::new(tag))).map_err(|_| Unencodable)
}

fn close(w: &mut Writer<Vec<u8>>, tag: &str) -> Result<(), Unencodable> {
    w.write_event(Event::End(BytesEnd::new(tag))).map_err(|_| Unencodable)
}

fn is_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_objects_and_arrays() {
        let value = json!({ "id": 1, "tags": ["a", "b"], "owner": { "name": "x" }, "gone": null });
        assert_eq!(
            envelope(&[("data", &value)]).unwrap(),
            "<response><data><id>1</id><tags>a</tags><tags>b</tags>\
             <owner><name>x</name></owner></data></response>"
        );
    }

    #[test]
    fn text_is_escaped() {
        let value = json!("a < b & c");
        assert_eq!(
            envelope(&[("data", &value)]).unwrap(),
            "<response><data>a &lt; b &amp; c</data></response>"
        );
    }

    #[test]
    fn invalid_element_names_are_unencodable() {
        let value = json!({ "not a name": 1 });
        assert!(envelope(&[("data", &value)]).is_err());
        assert!(envelope(&[("data", &json!({ "1st": true }))]).is_err());
    }
}
