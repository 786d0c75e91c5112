use swc_core::ecma::ast::Module;

/// Rewrites a script module before or after the merge step
pub type ScriptAstTransform = Box<dyn Fn(Module) -> Module>;

/// Compiles an alternate template dialect (e.g. pug) to plain markup.
/// Receives the raw template content and the file identifier.
pub type TemplatePreprocessor = Box<dyn Fn(&str, Option<&str>) -> Result<String, String>>;

/// Caller-supplied AST rewriting hooks
#[derive(Default)]
pub struct AstTransforms {
    /// Runs on the parsed `<script setup>` module before macro processing
    pub before_setup_script: Option<ScriptAstTransform>,
    /// Runs on the parsed plain `<script>` module before merging
    pub before_script: Option<ScriptAstTransform>,
    /// Runs on the merged module right before serialization
    pub after_merge: Option<ScriptAstTransform>,
}

impl AstTransforms {
    pub fn is_empty(&self) -> bool {
        self.before_setup_script.is_none()
            && self.before_script.is_none()
            && self.after_merge.is_none()
    }
}

/// Transform configuration, resolved once per call.
pub struct TransformOptions {
    /// Whether to produce a source map (default `true`)
    pub source_map: bool,
    /// Enables the `$ref`/`$computed` reactivity sugar expansion pass
    /// (default `false`)
    pub reactivity_transform: bool,
    /// Module specifier the reactivity helpers are imported from
    /// (default `@vue/composition-api`)
    pub import_helpers_from: String,
    pub ast_transforms: AstTransforms,
    /// Compiler for non-HTML template dialects. When absent, such
    /// templates contribute no references.
    pub template_preprocessor: Option<TemplatePreprocessor>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions {
            source_map: true,
            reactivity_transform: false,
            import_helpers_from: "@vue/composition-api".into(),
            ast_transforms: AstTransforms::default(),
            template_preprocessor: None,
        }
    }
}
