//! The per-element filter action and the JSON-tree walk driver.

use serde_json::{Value, json};
use tracing::{debug, trace};

use crate::{
    Error,
    caption::{parse_attr, parse_caption},
};

/// Filter action invoked once per AST element.
///
/// Receives the element kind tag, the element payload, the output format
/// pandoc is converting to, and the document metadata. Returns a replacement
/// element, or `None` to leave the element unchanged.
pub type Action = fn(&str, &Value, &str, &Value) -> Result<Option<Value>, Error>;

/// Applies `action` to every tagged element of a pandoc document.
///
/// The walk visits the whole document tree in order, substitutes returned
/// replacements in place, and walks the replacements too. Top-level fields
/// other than the walked tree (`pandoc-api-version`, `meta`) pass through
/// untouched unless the action rewrites elements inside them.
///
/// # Errors
///
/// Propagates the first error the action raises.
#[tracing::instrument(skip(doc, action))]
pub fn filter(doc: Value, format: &str, action: Action) -> Result<Value, Error> {
    let meta = doc.get("meta").cloned().unwrap_or(Value::Null);
    walk(doc, format, &meta, action)
}

fn walk(value: Value, format: &str, meta: &Value, action: Action) -> Result<Value, Error> {
    match value {
        Value::Array(items) => {
            let mut walked = Vec::with_capacity(items.len());
            for item in items {
                walked.push(walk(item, format, meta, action)?);
            }
            Ok(Value::Array(walked))
        }
        Value::Object(map) => {
            if let Some(tag) = map.get("t").and_then(Value::as_str) {
                let payload = map.get("c").cloned().unwrap_or(Value::Null);
                if let Some(replacement) = action(tag, &payload, format, meta)? {
                    return walk(replacement, format, meta, action);
                }
            }
            let mut walked = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                walked.insert(key, walk(item, format, meta, action)?);
            }
            Ok(Value::Object(walked))
        }
        scalar @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)) => Ok(scalar),
    }
}

/// Attaches attributes to a table whose caption ends in an attribute block.
///
/// For a `Table` element with a caption ending in `{#id .class key=val}`,
/// returns a replacement table carrying the parsed attribute triple and the
/// caption cleaned of the annotation. Everything else, including tables
/// without a block, is left unchanged.
///
/// # Errors
///
/// Returns [`Error::MalformedTable`] when a `Table` payload violates the
/// pandoc table shape.
#[tracing::instrument(level = "trace", skip(payload, _meta))]
pub fn add_table_attr(
    tag: &str,
    payload: &Value,
    _format: &str,
    _meta: &Value,
) -> Result<Option<Value>, Error> {
    if tag != "Table" {
        return Ok(None);
    }

    let (caption, attr_text) = parse_caption(payload)?;
    let Some(attr_text) = attr_text else {
        trace!("caption carries no attribute block");
        return Ok(None);
    };
    let attr = parse_attr(&attr_text);
    debug!(
        identifier = %attr.identifier,
        classes = ?attr.classes,
        key_values = ?attr.key_values,
        "attaching attributes to table"
    );

    let caption_blocks = match caption {
        Some(content) => json!([{"t": "Plain", "c": content}]),
        None => json!([]),
    };
    let items = payload
        .as_array()
        .ok_or_else(|| Error::MalformedTable("payload is not an array".to_owned()))?;
    let mut content = vec![serde_json::to_value(&attr)?, json!([null, caption_blocks])];
    content.extend(items.get(2..).unwrap_or_default().iter().cloned());
    Ok(Some(json!({"t": "Table", "c": content})))
}
