//! Source position tracking for the region splicer.
//!
//! A transform leaves most of a file untouched and rewrites one or two
//! regions. The map produced here records a 1:1 mapping for every
//! untouched span, so positions in generated output can be traced back
//! to the original file.

mod builder;
mod span;

pub use builder::{Mapping, SourceMap, SourceMapBuilder};
pub use span::{ByteOffset, Span};
