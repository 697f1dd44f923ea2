//! Caption extraction and attribute-block parsing.

use serde_json::Value;

use crate::{
    Error, grammar,
    model::{Attr, Inline, Segment},
    stringify::{destringify, stringify},
};

/// Extracts a table's caption and splits off a trailing attribute block.
///
/// Returns the clean caption content (absent when the caption is empty or
/// consists of the block alone) and the attribute text between the braces
/// (absent when the caption carries no block). A caption without a block
/// passes through content-equal.
///
/// # Errors
///
/// Returns [`Error::MalformedTable`] when the payload does not have the
/// pandoc table shape, and [`Error::Json`] when caption inlines cannot be
/// interpreted.
#[allow(clippy::type_complexity)]
pub fn parse_caption(table: &Value) -> Result<(Option<Vec<Inline>>, Option<String>), Error> {
    let Some(content) = caption_inlines(table)? else {
        return Ok((None, None));
    };
    if content.is_empty() {
        return Ok((None, None));
    }

    let mut segments = stringify(content);
    let block = match segments.last() {
        Some(Segment::Text(last)) => grammar::find_block(last).map(|block| {
            let remainder = last
                .get(..block.start)
                .unwrap_or_default()
                .trim_end_matches(' ')
                .to_owned();
            (block.attr.to_owned(), remainder)
        }),
        Some(Segment::Opaque(_)) | None => None,
    };
    let Some((attr_text, remainder)) = block else {
        return Ok((Some(destringify(segments)), None));
    };

    segments.pop();
    if !remainder.is_empty() {
        segments.push(Segment::Text(remainder));
    }
    let clean = if segments.is_empty() {
        None
    } else {
        Some(destringify(segments))
    };
    Ok((clean, Some(attr_text)))
}

/// Reads the caption inlines out of a pandoc table payload
/// (`payload[1][1][0]["c"]`). An empty caption block list means the table
/// has no caption; a payload that deviates from the table shape fails fast.
fn caption_inlines(table: &Value) -> Result<Option<Vec<Inline>>, Error> {
    let items = table
        .as_array()
        .ok_or_else(|| Error::MalformedTable("payload is not an array".to_owned()))?;
    let caption = items
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::MalformedTable("missing [short-caption, blocks] slot".to_owned()))?;
    let blocks = caption
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::MalformedTable("caption slot has no block list".to_owned()))?;
    let Some(first) = blocks.first() else {
        return Ok(None);
    };
    let content = first
        .get("c")
        .ok_or_else(|| Error::MalformedTable("caption block has no inline content".to_owned()))?;
    let inlines: Vec<Inline> = serde_json::from_value(content.clone())?;
    Ok(Some(inlines))
}

/// Parses the text between the braces of an attribute block.
///
/// The identifier is the first boundary-valid `#token` (empty when absent),
/// classes keep source order and duplicates, and a repeated key keeps its
/// first position while the last value wins.
#[must_use]
pub fn parse_attr(attr_text: &str) -> Attr {
    let mut attr = Attr {
        identifier: grammar::identifiers(attr_text)
            .next()
            .unwrap_or_default()
            .to_owned(),
        classes: grammar::classes(attr_text).map(ToOwned::to_owned).collect(),
        ..Attr::default()
    };
    for (key, value) in grammar::key_values(attr_text) {
        attr.set_key_value(key, value);
    }
    attr
}
