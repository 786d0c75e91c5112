use swc_core::common::{Span, Spanned};

#[derive(Debug)]
pub enum TransformError {
    ScriptError(ScriptError),
}

#[derive(Debug)]
pub struct ScriptError {
    pub span: Span,
    pub kind: ScriptErrorKind,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScriptErrorKind {
    /// Duplicate `defineProps` call
    DuplicateDefineProps,
    /// Duplicate `defineEmits` call
    DuplicateDefineEmits,
    /// Duplicate `defineExpose` call
    DuplicateDefineExpose,
    /// `defineProps` was called with both runtime and type arguments
    DefinePropsTypeAndNonTypeArguments,
    /// `defineEmits` was called with both runtime and type arguments
    DefineEmitsTypeAndNonTypeArguments,
    /// The type argument of `defineProps` did not resolve to a literal
    /// type or an interface
    DefinePropsTypeArgumentUnresolvable,
    /// The type argument of `defineEmits` did not resolve to a function
    /// type or a literal type with call signatures
    DefineEmitsTypeArgumentUnresolvable,
    /// `defineExpose` called without exactly one argument
    DefineExposeRequiresOneArgument,
    /// The first argument of `withDefaults` was not a `defineProps` call
    WithDefaultsWithoutDefineProps,
    /// `withDefaults` used together with a runtime props declaration
    WithDefaultsNeedsTypeOnlyDefineProps,
    /// `await` at the top level of `<script setup>`
    TopLevelAwait,
}

impl std::fmt::Display for ScriptErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptErrorKind::DuplicateDefineProps => write!(f, "duplicate defineProps() call"),
            ScriptErrorKind::DuplicateDefineEmits => write!(f, "duplicate defineEmits() call"),
            ScriptErrorKind::DuplicateDefineExpose => write!(f, "duplicate defineExpose() call"),
            ScriptErrorKind::DefinePropsTypeAndNonTypeArguments => write!(
                f,
                "defineProps() cannot accept both type and non-type arguments at the same time. Use one or the other."
            ),
            ScriptErrorKind::DefineEmitsTypeAndNonTypeArguments => write!(
                f,
                "defineEmits() cannot accept both type and non-type arguments at the same time. Use one or the other."
            ),
            ScriptErrorKind::DefinePropsTypeArgumentUnresolvable => write!(
                f,
                "type argument passed to defineProps() must be a literal type, or a reference to an interface or literal type."
            ),
            ScriptErrorKind::DefineEmitsTypeArgumentUnresolvable => write!(
                f,
                "type argument passed to defineEmits() must be a function type, a literal type with call signatures, or a reference to the above types."
            ),
            ScriptErrorKind::DefineExposeRequiresOneArgument => {
                write!(f, "defineExpose() requires one argument")
            }
            ScriptErrorKind::WithDefaultsWithoutDefineProps => {
                write!(f, "withDefaults' first argument must be a defineProps call.")
            }
            ScriptErrorKind::WithDefaultsNeedsTypeOnlyDefineProps => write!(
                f,
                "withDefaults can only be used with type-based defineProps declaration."
            ),
            ScriptErrorKind::TopLevelAwait => {
                write!(f, "top-level await is not supported in Vue 2")
            }
        }
    }
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::ScriptError(e) => write!(f, "{}", e.kind),
        }
    }
}

impl From<ScriptError> for TransformError {
    fn from(value: ScriptError) -> Self {
        TransformError::ScriptError(value)
    }
}

impl Spanned for TransformError {
    fn span(&self) -> Span {
        match self {
            TransformError::ScriptError(e) => e.span,
        }
    }
}
