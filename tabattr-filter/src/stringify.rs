//! The tree ↔ string round trip for caption content.
//!
//! The attribute grammar works on plain strings, but a caption is a tree of
//! inline nodes. [`stringify`] flattens the tree into segments the grammar
//! can scan; [`destringify`] rebuilds the tree afterwards, reconstituting
//! quoted spans before word/space boundaries (a string like
//! `{#id .class key="foo bar"}` would otherwise split inside the value).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Inline, QuoteKind, Segment};

/// A maximal quoted run: the first quote character of either kind opens the
/// run, the nearest following identical character closes it. An unmatched
/// quote character opens nothing.
static QUOTED_RUN: Lazy<Regex> = Lazy::new(|| compile(r#""[^"]*"|'[^']*'"#));

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    // All patterns in this crate are fixed at compile time.
    Regex::new(pattern).expect("built-in regex must compile")
}

/// Flattens inline content into segments suitable for pattern matching.
///
/// Consecutive text runs and spaces merge into single strings; quoted spans
/// unwrap into their quote characters plus flattened inner content; every
/// other inline kind passes through as an opaque boundary. The output never
/// contains two adjacent [`Segment::Text`] entries.
#[must_use]
pub fn stringify(inlines: Vec<Inline>) -> Vec<Segment> {
    let mut segments = Vec::new();
    flatten_into(inlines, &mut segments);
    segments
}

fn flatten_into(inlines: Vec<Inline>, segments: &mut Vec<Segment>) {
    for inline in inlines {
        match inline {
            Inline::Str(text) => push_text(segments, &text),
            Inline::Space => push_text(segments, " "),
            Inline::Quoted(kind, content) => {
                let quote = kind.as_char().to_string();
                push_text(segments, &quote);
                flatten_into(content, segments);
                push_text(segments, &quote);
            }
            Inline::Other(value) => segments.push(Segment::Opaque(value)),
        }
    }
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if let Some(Segment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_owned()));
    }
}

/// Rebuilds inline content from flattened segments.
///
/// Plain-text segments go through [`dequotify`]; opaque segments pass
/// through unchanged, in order.
#[must_use]
pub fn destringify(segments: Vec<Segment>) -> Vec<Inline> {
    let mut inlines = Vec::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => inlines.extend(dequotify(&text)),
            Segment::Opaque(value) => inlines.push(Inline::Other(value)),
        }
    }
    inlines
}

/// Rebuilds inline content from a plain string, reconstituting quoted spans.
///
/// Partitions the string into alternating quoted/unquoted stretches. Each
/// quoted stretch becomes a [`Inline::Quoted`] whose inner text is dequotified
/// recursively (the other quote character may nest inside); unquoted
/// stretches go through [`despacify`].
#[must_use]
pub fn dequotify(text: &str) -> Vec<Inline> {
    let mut runs = QUOTED_RUN.find_iter(text).peekable();
    if runs.peek().is_none() {
        return despacify(text);
    }

    let mut inlines = Vec::new();
    let mut rest = 0;
    for run in runs {
        let before = text.get(rest..run.start()).unwrap_or_default();
        inlines.extend(despacify(before));

        let quoted = run.as_str();
        let kind = if quoted.starts_with('\'') {
            QuoteKind::Single
        } else {
            QuoteKind::Double
        };
        let inner = quoted.get(1..quoted.len() - 1).unwrap_or_default();
        inlines.push(Inline::Quoted(kind, dequotify(inner)));
        rest = run.end();
    }
    let after = text.get(rest..).unwrap_or_default();
    inlines.extend(despacify(after));
    inlines
}

/// Rebuilds text-run and space nodes from a quote-free string.
///
/// Splits on single spaces, keeping boundary spaces as explicit markers:
/// unlike pandoc's own whitespace handling, a leading or trailing space is
/// preserved, never collapsed.
#[must_use]
pub fn despacify(text: &str) -> Vec<Inline> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut inlines = Vec::new();
    for (i, word) in text.split(' ').enumerate() {
        if i > 0 {
            inlines.push(Inline::Space);
        }
        if !word.is_empty() {
            inlines.push(Inline::Str(word.to_owned()));
        }
    }
    inlines
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn s(text: &str) -> Inline {
        Inline::Str(text.to_owned())
    }

    #[test]
    fn stringify_merges_words_and_spaces() {
        let segments = stringify(vec![s("a"), Inline::Space, s("meaningless"), Inline::Space, s("string")]);
        assert_eq!(vec![Segment::Text("a meaningless string".to_owned())], segments);
    }

    #[test]
    fn stringify_unwraps_quoted_spans() {
        let segments = stringify(vec![
            s("Double"),
            Inline::Space,
            Inline::Quoted(
                QuoteKind::Double,
                vec![
                    s("quotes"),
                    Inline::Space,
                    Inline::Quoted(QuoteKind::Single, vec![s("inside")]),
                ],
            ),
            s("."),
        ]);
        assert_eq!(
            vec![Segment::Text("Double \"quotes 'inside'\".".to_owned())],
            segments
        );
    }

    #[test]
    fn stringify_keeps_opaque_nodes_as_boundaries() {
        let emph = json!({"t": "Emph", "c": [{"t": "Str", "c": "emphasized"}]});
        let segments = stringify(vec![
            s("before"),
            Inline::Space,
            Inline::Other(emph.clone()),
            Inline::Space,
            s("after"),
        ]);
        assert_eq!(
            vec![
                Segment::Text("before ".to_owned()),
                Segment::Opaque(emph),
                Segment::Text(" after".to_owned()),
            ],
            segments
        );
    }

    #[rstest]
    #[case("", vec![])]
    #[case("word", vec![s("word")])]
    #[case("two words", vec![s("two"), Inline::Space, s("words")])]
    #[case(" leading", vec![Inline::Space, s("leading")])]
    #[case("trailing ", vec![s("trailing"), Inline::Space])]
    #[case(" ", vec![Inline::Space])]
    fn despacify_preserves_boundary_spaces(#[case] text: &str, #[case] expected: Vec<Inline>) {
        assert_eq!(expected, despacify(text));
    }

    #[test]
    fn dequotify_without_quotes_is_despacify() {
        assert_eq!(despacify("No quotes."), dequotify("No quotes."));
    }

    #[test]
    fn dequotify_wraps_quoted_runs() {
        assert_eq!(
            vec![
                s("More"),
                Inline::Space,
                Inline::Quoted(QuoteKind::Double, vec![s("quotes")]),
                s("."),
            ],
            dequotify("More \"quotes\".")
        );
    }

    #[test]
    fn dequotify_recurses_into_nested_quotes() {
        // A double-quoted span nested inside a single-quoted one.
        assert_eq!(
            vec![
                Inline::Quoted(
                    QuoteKind::Single,
                    vec![
                        s("Another"),
                        Inline::Space,
                        Inline::Quoted(QuoteKind::Double, vec![s("quote"), Inline::Space, s("inside")]),
                    ],
                ),
                Inline::Space,
                s("quotes."),
            ],
            dequotify("'Another \"quote inside\"' quotes.")
        );
    }

    #[test]
    fn dequotify_leaves_unmatched_quotes_alone() {
        // The lone double quote inside the single-quoted run is not a pair.
        assert_eq!(
            vec![
                Inline::Quoted(
                    QuoteKind::Single,
                    vec![
                        s("Another"),
                        Inline::Space,
                        s("\""),
                        Inline::Space,
                        s("quote"),
                        Inline::Space,
                        s("inside"),
                    ],
                ),
                Inline::Space,
                s("quotes."),
            ],
            dequotify("'Another \" quote inside' quotes.")
        );
    }

    #[test]
    fn destringify_round_trips_flattened_content() {
        let emph = json!({"t": "Emph", "c": [{"t": "Str", "c": "emphasized"}]});
        let original = vec![
            Inline::Quoted(QuoteKind::Double, vec![s("val"), Inline::Space, s("'"), Inline::Space, s("val")]),
            Inline::Space,
            s("Caption"),
            Inline::Space,
            Inline::Other(emph),
            Inline::Space,
            s("test."),
        ];
        assert_eq!(original.clone(), destringify(stringify(original)));
    }
}
