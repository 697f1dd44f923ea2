//! Pandoc JSON filter core that turns table caption annotations into table
//! attributes.
//!
//! Pandoc has no native syntax for table attributes. This crate understands
//! a lightweight annotation at the end of a table caption:
//!
//! ```text
//! Table: Caption {#id .class key=val}
//!
//! FirstCol  SecondCol
//! --------- ----------
//! ```
//!
//! and rewrites the table element so that the identifier, classes, and
//! key/value pairs land in the table's attribute slot while the caption is
//! cleaned of the annotation.
//!
//! The pipeline: a caption is a tree of inline nodes, so [`stringify()`]
//! flattens it into plain strings for the attribute grammar, the trailing
//! `{...}` block is matched and parsed, and [`destringify()`] rebuilds the
//! clean caption tree. Annotations the grammar cannot interpret
//! unambiguously are left in the caption as plain text; a structurally
//! invalid table payload is an [`Error`].
//!
//! [`filter()`] is the walk driver: it applies [`add_table_attr`] (or any
//! other [`Action`]) to every element of a pandoc JSON document.

mod caption;
mod error;
mod filter;
mod grammar;
mod model;
mod stringify;

pub use caption::{parse_attr, parse_caption};
pub use error::Error;
pub use filter::{Action, add_table_attr, filter};
pub use grammar::{BlockMatch, classes, find_block, identifiers, key_values};
pub use model::{Attr, Inline, QuoteKind, Segment};
pub use stringify::{despacify, dequotify, destringify, stringify};
