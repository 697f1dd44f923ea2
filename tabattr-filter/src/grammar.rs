//! Surface grammar of the `{#id .class key=val}` caption annotation.
//!
//! Token shapes follow what pandoc itself accepts for attributes: HTML 4
//! identifiers, CSS class names, and lowercase data-attribute style keys.
//! Values may be bare (no spaces, quotes, `=`, or braces) or single- or
//! double-quoted.
//!
//! Malformed blocks must fail to match as a whole rather than mis-parse:
//! a block may contain at most one identifier, and a component token only
//! counts when flanked by a space or a string boundary on both sides (so
//! `.classkey=val` never yields the class `.class`).

use once_cell::sync::Lazy;
use regex::Regex;

const IDENT: &str = "#[a-zA-Z][a-zA-Z0-9_:.-]*";
const CLASS: &str = r"\.[_a-zA-Z][_a-zA-Z0-9-]*";
const KEYVAL: &str = r#"[_a-z][_a-z0-9.-]* *= *(?:"[^"]*"|'[^']*'|[^ "'=}{]+)"#;

/// The whole-block matcher, anchored at the end of the subject string.
static BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    let token = format!("(?:{IDENT}|{CLASS}|{KEYVAL})");
    compile(&format!(r"\{{ *(?P<attr>(?:{token} +)*{token} *)\}}$"))
});

/// Identifier occurrences anywhere, boundaries ignored. Used to reject
/// blocks carrying more than one identifier token.
static IDENT_ANYWHERE_RE: Lazy<Regex> = Lazy::new(|| compile(IDENT));

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| compile("#(?P<id>[a-zA-Z][a-zA-Z0-9_:.-]*)"));
static CLASS_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"\.(?P<class>[_a-zA-Z][_a-zA-Z0-9-]*)"));
static KEYVAL_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r#"(?P<key>[_a-z][_a-z0-9.-]*) *= *(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<raw>[^ "'=}{]+))"#)
});

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    // All patterns in this module are fixed at compile time.
    Regex::new(pattern).expect("built-in regex must compile")
}

/// A matched attribute block at the end of a subject string.
#[derive(Debug, PartialEq, Eq)]
pub struct BlockMatch<'a> {
    /// The attribute text between the braces.
    pub attr: &'a str,
    /// Byte offset of the opening brace in the subject string.
    pub start: usize,
}

/// Finds the attribute block anchored at the very end of `text`.
///
/// Returns `None` for anything the grammar cannot interpret unambiguously:
/// unterminated blocks, glued tokens, or a block carrying more than one
/// identifier.
#[must_use]
pub fn find_block(text: &str) -> Option<BlockMatch<'_>> {
    let caps = BLOCK_RE.captures(text)?;
    let attr = caps.name("attr")?;
    if IDENT_ANYWHERE_RE.find_iter(attr.as_str()).count() > 1 {
        return None;
    }
    Some(BlockMatch {
        attr: attr.as_str(),
        start: caps.get(0)?.start(),
    })
}

/// Identifier tokens in `text`, boundary-checked, in source order.
#[must_use]
pub fn identifiers(text: &str) -> impl Iterator<Item = &str> {
    IDENT_RE.captures_iter(text).filter_map(move |caps| {
        let whole = caps.get(0)?;
        if !flanked(text, whole.start(), whole.end()) {
            return None;
        }
        Some(caps.name("id")?.as_str())
    })
}

/// Class tokens in `text`, boundary-checked, in source order.
#[must_use]
pub fn classes(text: &str) -> impl Iterator<Item = &str> {
    CLASS_RE.captures_iter(text).filter_map(move |caps| {
        let whole = caps.get(0)?;
        if !flanked(text, whole.start(), whole.end()) {
            return None;
        }
        Some(caps.name("class")?.as_str())
    })
}

/// Key/value tokens in `text`, boundary-checked, in source order. Quote
/// characters around a value are stripped.
#[must_use]
pub fn key_values(text: &str) -> impl Iterator<Item = (&str, &str)> {
    KEYVAL_RE.captures_iter(text).filter_map(move |caps| {
        let whole = caps.get(0)?;
        if !flanked(text, whole.start(), whole.end()) {
            return None;
        }
        let key = caps.name("key")?.as_str();
        let value = caps
            .name("dq")
            .or_else(|| caps.name("sq"))
            .or_else(|| caps.name("raw"))?
            .as_str();
        Some((key, value))
    })
}

/// A token only counts when a space or the string boundary sits on both
/// sides of it.
fn flanked(text: &str, start: usize, end: usize) -> bool {
    let before = start == 0 || text.as_bytes().get(start.wrapping_sub(1)) == Some(&b' ');
    let after = end == text.len() || text.as_bytes().get(end) == Some(&b' ');
    before && after
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Caption. {#id}")]
    #[case("Caption.{#id}")]
    #[case("Caption. {.class1 .class2}")]
    #[case("Caption{}. {#id}")]
    #[case("{#id .class key=val}")]
    #[case("{#id .class key = val}")]
    #[case("{#id .class key1 = \"val1\" key2 = \"val2\"}")]
    #[case("{key=\"val1' val2\"}")]
    fn block_grammar_accepts(#[case] caption: &str) {
        assert!(find_block(caption).is_some(), "should match: {caption}");
    }

    #[rstest]
    #[case("Caption. {#id #id}")]
    #[case("Caption. {#id, .class}")]
    #[case("Caption. {#id .class")]
    #[case("Caption. {#id .class klass}")]
    #[case("Caption. {key=val\"}")]
    #[case("Caption. {key=val=val}")]
    #[case("Caption. {#id .classkey=val}")]
    #[case("Caption. {#id .class key= val1 val2}")]
    #[case("Caption. {}")]
    #[case("Caption. {#id} trailing")]
    fn block_grammar_rejects(#[case] caption: &str) {
        assert!(find_block(caption).is_none(), "should not match: {caption}");
    }

    #[test]
    fn block_match_reports_attr_text_and_start() {
        let caption = "Caption. {#id .class key=\"val\"}";
        let block = find_block(caption);
        assert_eq!(
            Some(BlockMatch {
                attr: "#id .class key=\"val\"",
                start: 9,
            }),
            block
        );
    }

    #[test]
    fn duplicate_identifier_hides_in_quoted_value() {
        // The second `#` token sits inside a value, but the block is still
        // ambiguous and must be rejected outright.
        assert!(find_block("{#id key=\"#other\"}").is_none());
    }

    #[test]
    fn components_require_flanking_boundaries() {
        assert_eq!(Vec::<&str>::new(), classes(".classkey=val").collect::<Vec<_>>());
        assert_eq!(None, identifiers("key=#id").next());
        assert_eq!(
            vec![("key", "val")],
            key_values("#id .class key=val").collect::<Vec<_>>()
        );
    }

    #[rstest]
    #[case("key=val", "key", "val")]
    #[case("key = val", "key", "val")]
    #[case("key=\"val with spaces\"", "key", "val with spaces")]
    #[case("key='val'", "key", "val")]
    #[case("key=\"val1' val2\"", "key", "val1' val2")]
    fn key_value_variants(#[case] text: &str, #[case] key: &str, #[case] value: &str) {
        assert_eq!(vec![(key, value)], key_values(text).collect::<Vec<_>>());
    }
}
