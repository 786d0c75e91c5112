#[macro_use]
extern crate lazy_static;

pub mod atoms;
pub mod error;
pub mod reactivity;
pub mod script;
pub mod template;

#[cfg(test)]
mod test_utils;

pub use error::{ScriptError, ScriptErrorKind, TransformError};
pub use reactivity::apply_reactivity_sugar;
pub use script::{
    merge::{merge_scripts, MergeInput},
    setup::{apply_macros, MacroExtraction},
};
pub use template::analyze_template;
