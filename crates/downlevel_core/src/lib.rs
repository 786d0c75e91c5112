mod atom;
mod directives;
mod html_tags;
mod options;
mod sfc;
mod template;
mod utils;

pub use atom::{atom_to_propname, DownlevelAtom, IntoIdent};
pub use directives::is_builtin_directive;
pub use html_tags::is_native_tag;
pub use options::*;
pub use sfc::*;
pub use template::TemplateReferences;
pub use utils::{camelize, capitalize, pascalize};
