use downlevel_core::DownlevelAtom;
use swc_core::common::{Span, Spanned};

#[derive(Debug)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

#[derive(Debug)]
pub enum ParseErrorKind {
    /// `<script setup>` and `<script>` declare different languages
    LangMismatch,
    /// A `lang` attribute other than `js`, `ts`, `jsx` or `tsx`
    UnsupportedLang(DownlevelAtom),
    /// More than one setup-marked script region
    DuplicateScriptSetup,
    /// More than one plain script region
    DuplicateScript,
    /// Error while parsing EcmaScript/TypeScript
    BadExpr(swc_ecma_parser::error::SyntaxError),
    /// Unrecoverable error while parsing the file markup
    InvalidHtml(Box<swc_html_parser::error::ErrorKind>),
}

impl From<swc_ecma_parser::error::Error> for ParseError {
    fn from(value: swc_ecma_parser::error::Error) -> ParseError {
        let span = value.span();

        ParseError {
            kind: ParseErrorKind::BadExpr(value.into_kind()),
            span,
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::LangMismatch => {
                write!(f, "<script setup> language must be the same as <script>")
            }
            ParseErrorKind::UnsupportedLang(lang) => {
                write!(f, "Unsupported script language: {}", lang)
            }
            ParseErrorKind::DuplicateScriptSetup => {
                write!(f, "Duplicate <script setup> region")
            }
            ParseErrorKind::DuplicateScript => {
                write!(f, "Duplicate <script> region")
            }
            ParseErrorKind::BadExpr(e) => write!(f, "{:?}", e),
            ParseErrorKind::InvalidHtml(e) => write!(f, "{:?}", e),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}
