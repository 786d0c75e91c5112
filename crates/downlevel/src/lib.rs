//! Transforms a `<script setup>` single-file component into an
//! equivalent explicit Options API component consumable by Vue 2 with
//! `@vue/composition-api`.
//!
//! ```
//! use downlevel::{transform, TransformOptions};
//!
//! let input = r#"
//! <script setup>const a = 1</script>
//! <template><div>{{ a }}</div></template>
//! "#;
//!
//! let result = transform(input, Some("App.vue"), &TransformOptions::default())
//!     .expect("transform should succeed")
//!     .expect("file contains applicable syntax");
//!
//! assert!(result.code.contains("export default __sfc_main"));
//! assert!(!result.code.contains("<script setup>"));
//! ```

#[macro_use]
extern crate lazy_static;

mod codegen;
mod splice;

use regex::Regex;
use tracing::debug;

use downlevel_core::empty_module;
pub use downlevel_core::{
    AstTransforms, ScriptAstTransform, SfcDescriptor, TemplatePreprocessor, TransformOptions,
};
pub use downlevel_parser::{parse_sfc, ParseError, ParseErrorKind};
pub use downlevel_sourcemap::{ByteOffset, SourceMap};
pub use downlevel_transform::{ScriptError, ScriptErrorKind, TransformError};

use downlevel_transform::{
    analyze_template, apply_macros, apply_reactivity_sugar, merge_scripts, MergeInput,
};
use swc_core::common::{Span, Spanned};

lazy_static! {
    /// Matches a setup-marked script tag, tolerant of attribute order
    /// and multi-line tags
    static ref SCRIPT_SETUP_RE: Regex =
        Regex::new(r"<script\s([^>]*\s)?setup(\s[^>]*)?>").expect("Static pattern");

    /// Matches reactivity shorthand calls like `$ref(`
    static ref REF_SUGAR_RE: Regex =
        Regex::new(r"\$(ref|computed|shallowRef|customRef|toRef)\s*\(").expect("Static pattern");
}

/// An error raised by [`transform`]
#[derive(Debug)]
pub enum CompileError {
    /// Malformed regions, unsupported/mismatched script languages, or
    /// script/template text that does not parse
    Parse(ParseError),
    /// Invalid compiler-macro usage
    Transform(TransformError),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Parse(e) => write!(f, "{}", e),
            CompileError::Transform(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<ParseError> for CompileError {
    fn from(value: ParseError) -> Self {
        CompileError::Parse(value)
    }
}

impl From<TransformError> for CompileError {
    fn from(value: TransformError) -> Self {
        CompileError::Transform(value)
    }
}

impl Spanned for CompileError {
    fn span(&self) -> Span {
        match self {
            CompileError::Parse(e) => e.span,
            CompileError::Transform(e) => e.span(),
        }
    }
}

pub struct TransformResult {
    pub code: String,
    pub map: Option<SourceMap>,
}

/// Whether [`transform`] would do anything for this source text.
/// Callers use this to skip files without applicable syntax.
pub fn should_transform(source: &str, options: &TransformOptions) -> bool {
    SCRIPT_SETUP_RE.is_match(source)
        || (options.reactivity_transform && REF_SUGAR_RE.is_match(source))
}

/// Rewrites one component file. Returns `Ok(None)` when the file
/// contains no applicable syntax or needs no change; the caller should
/// then use the original text. This is also what makes the transform
/// idempotent: its own output contains no setup-marked region.
pub fn transform(
    source: &str,
    id: Option<&str>,
    options: &TransformOptions,
) -> Result<Option<TransformResult>, CompileError> {
    if !should_transform(source, options) {
        return Ok(None);
    }

    debug!(file = id.unwrap_or("<unnamed>"), "transforming script setup");

    let mut descriptor = downlevel_parser::parse_sfc(source, id)?;

    if let Some(hook) = &options.ast_transforms.before_setup_script {
        let program = std::mem::replace(&mut descriptor.script_setup.program, empty_module());
        descriptor.script_setup.program = hook(program);
    }
    if let Some(hook) = &options.ast_transforms.before_script {
        let program = std::mem::replace(&mut descriptor.script.program, empty_module());
        descriptor.script.program = hook(program);
    }

    if options.reactivity_transform {
        apply_reactivity_sugar(&mut descriptor, &options.import_helpers_from);
    }

    let template_refs = analyze_template(
        descriptor.template.as_ref(),
        id,
        options.template_preprocessor.as_ref(),
    )?;

    debug!(
        components = template_refs.components.len(),
        directives = template_refs.directives.len(),
        identifiers = template_refs.identifiers.len(),
        "analyzed template references"
    );

    let extraction = apply_macros(std::mem::take(&mut descriptor.script_setup.program.body))?;
    let script_items = std::mem::take(&mut descriptor.script.program.body);
    let extra_declarations = std::mem::take(&mut descriptor.extra_declarations);

    let merged = merge_scripts(MergeInput {
        extraction,
        script_items,
        extra_declarations,
        template: template_refs,
        force_output: !options.ast_transforms.is_empty(),
    });

    let Some(mut merged) = merged else {
        debug!("nothing to rewrite, keeping the original text");
        return Ok(None);
    };

    if let Some(hook) = &options.ast_transforms.after_merge {
        merged = hook(merged);
    }

    let code = codegen::stringify(&merged);
    let spliced = splice::splice_script_regions(source, &descriptor, &code);

    Ok(Some(TransformResult {
        code: spliced.code,
        map: options.source_map.then_some(spliced.map),
    }))
}
