//! Data model for the slice of the pandoc AST the filter interprets.
//!
//! The filter only understands the inline kinds that can occur inside a
//! table caption annotation: text runs, spaces, and quoted spans. Every
//! other inline kind is carried through as an opaque JSON value and written
//! back byte-identically.

use serde::{
    Deserialize, Serialize,
    de::{self, Deserializer},
    ser::{SerializeMap, SerializeSeq, Serializer},
};
use serde_json::Value;

use crate::Error;

/// Quote flavor of a pandoc `Quoted` inline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteKind {
    Single,
    Double,
}

impl QuoteKind {
    /// The literal character this quote kind renders as.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            QuoteKind::Single => '\'',
            QuoteKind::Double => '"',
        }
    }

    fn tag(self) -> &'static str {
        match self {
            QuoteKind::Single => "SingleQuote",
            QuoteKind::Double => "DoubleQuote",
        }
    }
}

impl Serialize for QuoteKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("t", self.tag())?;
        map.end()
    }
}

/// One unit of caption content.
///
/// A closed union: the kinds the filter interprets are explicit variants,
/// everything else pandoc can produce lands in [`Inline::Other`] and is
/// never inspected.
#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    /// A literal text run (`{"t": "Str", "c": "..."}`).
    Str(String),
    /// An inter-word space (`{"t": "Space"}`).
    Space,
    /// A quoted span with nested inline content.
    Quoted(QuoteKind, Vec<Inline>),
    /// Any other inline kind, kept verbatim.
    Other(Value),
}

impl Inline {
    /// Converts a raw pandoc inline value into an [`Inline`].
    ///
    /// Unknown tags become [`Inline::Other`]; a recognized tag with the
    /// wrong content shape is a contract violation and fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInline`] when a `Str` or `Quoted` element
    /// does not carry the content pandoc guarantees for it.
    pub fn from_value(value: Value) -> Result<Inline, Error> {
        let Some(tag) = value.get("t").and_then(Value::as_str).map(ToOwned::to_owned) else {
            return Ok(Inline::Other(value));
        };
        match tag.as_str() {
            "Str" => match value.get("c").and_then(Value::as_str) {
                Some(text) => Ok(Inline::Str(text.to_owned())),
                None => Err(Error::MalformedInline(
                    "Str element without string content".to_owned(),
                )),
            },
            "Space" => Ok(Inline::Space),
            "Quoted" => {
                let Some(Value::Array(parts)) = value.get("c") else {
                    return Err(Error::MalformedInline(
                        "Quoted element without [kind, content] pair".to_owned(),
                    ));
                };
                let (Some(kind), Some(Value::Array(inner))) = (parts.first(), parts.get(1)) else {
                    return Err(Error::MalformedInline(
                        "Quoted element without [kind, content] pair".to_owned(),
                    ));
                };
                let kind = match kind.get("t").and_then(Value::as_str) {
                    Some("SingleQuote") => QuoteKind::Single,
                    Some("DoubleQuote") => QuoteKind::Double,
                    Some(_) | None => {
                        return Err(Error::MalformedInline(
                            "Quoted element with unknown quote kind".to_owned(),
                        ));
                    }
                };
                let content = inner
                    .iter()
                    .cloned()
                    .map(Inline::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Inline::Quoted(kind, content))
            }
            _ => Ok(Inline::Other(value)),
        }
    }
}

impl Serialize for Inline {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Inline::Str(text) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("t", "Str")?;
                map.serialize_entry("c", text)?;
                map.end()
            }
            Inline::Space => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("t", "Space")?;
                map.end()
            }
            Inline::Quoted(kind, content) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("t", "Quoted")?;
                map.serialize_entry("c", &(kind, content))?;
                map.end()
            }
            Inline::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Inline {
    fn deserialize<D>(deserializer: D) -> Result<Inline, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Inline::from_value(value).map_err(de::Error::custom)
    }
}

/// One flattened caption segment: merged plain text, or an inline the
/// flattener does not interpret.
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Text(String),
    Opaque(Value),
}

/// A parsed attribute block: identifier, classes, and key/value pairs.
///
/// Serializes to pandoc's attribute triple `[id, [classes], [[k, v], ...]]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attr {
    /// The `#identifier`, empty when the block carries none.
    pub identifier: String,
    /// The `.class` names, in source order, duplicates preserved.
    pub classes: Vec<String>,
    /// The `key=val` pairs. A key keeps the position of its first
    /// occurrence; a later occurrence only overwrites the value.
    pub key_values: Vec<(String, String)>,
}

impl Attr {
    /// Records a `key=val` pair, overwriting the value of an already-seen
    /// key in place.
    pub fn set_key_value(&mut self, key: &str, value: &str) {
        if let Some((_, existing)) = self.key_values.iter_mut().find(|(k, _)| k.as_str() == key) {
            value.clone_into(existing);
        } else {
            self.key_values.push((key.to_owned(), value.to_owned()));
        }
    }
}

impl Serialize for Attr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.identifier)?;
        seq.serialize_element(&self.classes)?;
        seq.serialize_element(&self.key_values)?;
        seq.end()
    }
}
