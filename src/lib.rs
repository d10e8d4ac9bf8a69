//! cdoc — extract kernel-doc style documentation comments from C sources.
//!
//! The pipeline scans a source unit for `/** ... */` comment blocks, pairs
//! each block with the declaration that follows it, resolves nested
//! aggregate members, and rewrites the inline markup shorthand to reST.
//! Snippet extraction runs independently over the raw text.

pub mod markup;
pub mod model;
pub mod parser;
pub mod render;
pub mod snippet;

pub use model::{Dialect, DocRecord, Document, Snippet, Warning};
pub use parser::parse_unit;
pub use snippet::snippets;
