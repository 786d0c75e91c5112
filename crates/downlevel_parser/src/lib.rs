mod comments;
mod error;
mod script;
mod sfc;

pub use comments::strip_comments;
pub use error::{ParseError, ParseErrorKind};
pub use script::{parse_expr, parse_module, recognize_lang, syntax_for_lang};
pub use sfc::{parse_html_document_fragment, SfcParser};

use downlevel_core::SfcDescriptor;

/// Parses an SFC into its regions. Convenience wrapper around [`SfcParser`].
pub fn parse_sfc(input: &str, id: Option<&str>) -> Result<SfcDescriptor, ParseError> {
    SfcParser::new(input, id).parse_sfc()
}
