//! Script-side analysis and transformation: identifier analysis, the
//! macro processor and the script merger.

pub mod identifiers;
pub mod merge;
pub mod setup;
