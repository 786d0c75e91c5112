//! The macro processor: recognizes the four compiler macros in
//! `<script setup>`, validates their usage, captures the runtime props
//! schema and the expose expression, and erases/rewrites the call sites.

mod await_detection;
mod define_props;
mod resolve_type;

pub use await_detection::detect_await_module_item;
pub use define_props::{DefinePropsCapture, PropTypeData};
pub use resolve_type::{DeclaredTypes, Types, TypesSet};

use downlevel_core::IntoIdent;
use swc_core::{
    common::{Spanned, DUMMY_SP},
    ecma::ast::{
        CallExpr, Callee, Decl, Expr, IdentName, MemberExpr, MemberProp, ModuleItem, Stmt, TsType,
    },
};

use crate::{
    atoms::{
        CTX_HELPER, DEFINE_EMITS, DEFINE_EXPOSE, DEFINE_PROPS, EMIT, PROPS_HELPER, WITH_DEFAULTS,
    },
    error::{ScriptError, ScriptErrorKind, TransformError},
};

use self::{
    define_props::{extract_prop_types, generate_runtime_props},
    resolve_type::{is_emits_type_resolvable, resolve_props_type},
};

macro_rules! script_error {
    ($kind: ident, $span: expr) => {
        return Err(TransformError::ScriptError(ScriptError {
            span: $span,
            kind: ScriptErrorKind::$kind,
        }))
    };
}

/// What macro processing leaves behind: the statements with macro call
/// sites erased/rewritten, plus the captured runtime declarations.
pub struct MacroExtraction {
    pub remaining: Vec<ModuleItem>,
    pub props: Option<Box<Expr>>,
    pub expose: Option<Box<Expr>>,
}

/// Mutable processing state, scoped strictly to one invocation
#[derive(Default)]
struct MacroContext {
    props: Option<DefinePropsCapture>,
    has_define_emits: bool,
    emits_type: Option<Box<TsType>>,
    expose: Option<Box<Expr>>,
}

/// Runs the single-pass macro scan over the setup script's items.
pub fn apply_macros(setup_items: Vec<ModuleItem>) -> Result<MacroExtraction, TransformError> {
    let mut ctx = MacroContext::default();
    let mut remaining = Vec::with_capacity(setup_items.len());

    for item in setup_items {
        let stmt = match item {
            // Imports and exports are never macro sites
            ModuleItem::ModuleDecl(_) => {
                remaining.push(item);
                continue;
            }
            ModuleItem::Stmt(stmt) => stmt,
        };

        match stmt {
            Stmt::Expr(expr_stmt) => {
                if process_macro_statement(&expr_stmt.expr, &mut ctx)? {
                    // Macro call sites are erased
                } else {
                    remaining.push(ModuleItem::Stmt(Stmt::Expr(expr_stmt)));
                }
            }

            Stmt::Decl(Decl::Var(mut var_decl)) if !var_decl.declare => {
                for declarator in var_decl.decls.iter_mut() {
                    let Some(init) = &declarator.init else {
                        continue;
                    };

                    if let Some(replacement) = rewrite_macro_initializer(init, &mut ctx)? {
                        declarator.init = Some(replacement);
                    }
                }

                remaining.push(ModuleItem::Stmt(Stmt::Decl(Decl::Var(var_decl))));
            }

            other => remaining.push(ModuleItem::Stmt(other)),
        }
    }

    // The target runtime cannot represent an async setup
    for item in remaining.iter() {
        if let Some(await_span) = detect_await_module_item(item) {
            script_error!(TopLevelAwait, await_span);
        }
    }

    let props = resolve_props(&remaining, ctx.props)?;

    if let Some(emits_type) = &ctx.emits_type {
        if !is_emits_type_resolvable(&remaining, emits_type) {
            script_error!(DefineEmitsTypeArgumentUnresolvable, emits_type.span());
        }
    }

    Ok(MacroExtraction {
        remaining,
        props,
        expose: ctx.expose,
    })
}

/// Handles a macro used as a bare statement. Returns `true` when the
/// statement was a macro call and must be dropped.
fn process_macro_statement(expr: &Expr, ctx: &mut MacroContext) -> Result<bool, TransformError> {
    let Some((sym, call)) = callee_ident_of(expr) else {
        return Ok(false);
    };

    if DEFINE_PROPS.eq(sym) {
        process_define_props(call, ctx)?;
    } else if WITH_DEFAULTS.eq(sym) {
        process_with_defaults(call, ctx)?;
    } else if DEFINE_EMITS.eq(sym) {
        process_define_emits(call, ctx)?;
    } else if DEFINE_EXPOSE.eq(sym) {
        process_define_expose(call, ctx)?;
    } else {
        return Ok(false);
    }

    Ok(true)
}

/// Handles a macro used as a variable initializer. `defineEmits` becomes
/// a reference to the context's `emit`, `defineProps`/`withDefaults`
/// become a reference to the synthesized props parameter.
fn rewrite_macro_initializer(
    init: &Expr,
    ctx: &mut MacroContext,
) -> Result<Option<Box<Expr>>, TransformError> {
    let Some((sym, call)) = callee_ident_of(init) else {
        return Ok(None);
    };

    if DEFINE_EMITS.eq(sym) {
        process_define_emits(call, ctx)?;

        // `const emit = defineEmits(...)` -> `const emit = __ctx.emit`
        Ok(Some(Box::new(Expr::Member(MemberExpr {
            span: call.span,
            obj: Box::new(Expr::Ident(CTX_HELPER.to_owned().into_ident())),
            prop: MemberProp::Ident(IdentName {
                span: DUMMY_SP,
                sym: EMIT.to_owned(),
            }),
        }))))
    } else if DEFINE_PROPS.eq(sym) {
        process_define_props(call, ctx)?;

        Ok(Some(Box::new(Expr::Ident(
            PROPS_HELPER.to_owned().into_ident_spanned(call.span),
        ))))
    } else if WITH_DEFAULTS.eq(sym) {
        process_with_defaults(call, ctx)?;

        Ok(Some(Box::new(Expr::Ident(
            PROPS_HELPER.to_owned().into_ident_spanned(call.span),
        ))))
    } else {
        Ok(None)
    }
}

fn process_define_props(call: &CallExpr, ctx: &mut MacroContext) -> Result<(), TransformError> {
    if ctx.props.is_some() {
        script_error!(DuplicateDefineProps, call.span);
    }

    let mut capture = DefinePropsCapture {
        span: call.span,
        ..Default::default()
    };

    if let Some(first_argument) = call.args.first() {
        capture.runtime_decl = Some(first_argument.expr.clone());
    }

    if let Some(type_args) = &call.type_args {
        capture.type_decl = type_args.params.first().cloned();
    }

    if capture.runtime_decl.is_some() {
        if let Some(type_decl) = &capture.type_decl {
            script_error!(DefinePropsTypeAndNonTypeArguments, type_decl.span());
        }
    }

    ctx.props = Some(capture);

    Ok(())
}

fn process_with_defaults(call: &CallExpr, ctx: &mut MacroContext) -> Result<(), TransformError> {
    macro_rules! bail_no_define_props {
        () => {
            script_error!(WithDefaultsWithoutDefineProps, call.span)
        };
    }

    let Some(first_arg) = call.args.first() else {
        bail_no_define_props!();
    };

    let Expr::Call(define_props_call) = first_arg.expr.as_ref() else {
        bail_no_define_props!();
    };

    let Callee::Expr(callee_expr) = &define_props_call.callee else {
        bail_no_define_props!();
    };

    if !matches!(callee_expr.as_ref(), Expr::Ident(i) if DEFINE_PROPS.eq(&i.sym)) {
        bail_no_define_props!();
    }

    process_define_props(define_props_call, ctx)?;

    if let Some(capture) = ctx.props.as_mut() {
        if capture.runtime_decl.is_some() {
            script_error!(WithDefaultsNeedsTypeOnlyDefineProps, call.span);
        }

        capture.defaults = call.args.get(1).map(|arg| arg.expr.clone());
    }

    Ok(())
}

fn process_define_emits(call: &CallExpr, ctx: &mut MacroContext) -> Result<(), TransformError> {
    if ctx.has_define_emits {
        script_error!(DuplicateDefineEmits, call.span);
    }

    ctx.has_define_emits = true;

    let has_runtime_arg = !call.args.is_empty();

    if has_runtime_arg && call.type_args.is_some() {
        script_error!(DefineEmitsTypeAndNonTypeArguments, call.span);
    }

    // The runtime argument needs no further validation; a type argument
    // is checked for resolvability after the scan. Neither produces an
    // `emits` option on the target runtime.
    if !has_runtime_arg {
        if let Some(type_args) = &call.type_args {
            ctx.emits_type = type_args.params.first().cloned();
        }
    }

    Ok(())
}

fn process_define_expose(call: &CallExpr, ctx: &mut MacroContext) -> Result<(), TransformError> {
    if ctx.expose.is_some() {
        script_error!(DuplicateDefineExpose, call.span);
    }

    if call.args.len() != 1 {
        script_error!(DefineExposeRequiresOneArgument, call.span);
    }

    ctx.expose = call.args.first().map(|arg| arg.expr.clone());

    Ok(())
}

fn resolve_props(
    items: &[ModuleItem],
    capture: Option<DefinePropsCapture>,
) -> Result<Option<Box<Expr>>, TransformError> {
    let Some(capture) = capture else {
        return Ok(None);
    };

    // A runtime declaration is passed straight through
    if let Some(runtime_decl) = capture.runtime_decl {
        return Ok(Some(runtime_decl));
    }

    let Some(type_decl) = capture.type_decl else {
        // Bare `defineProps()` declares nothing
        return Ok(None);
    };

    let Some(resolved) = resolve_props_type(items, &type_decl) else {
        script_error!(DefinePropsTypeArgumentUnresolvable, type_decl.span());
    };

    let mut declared = DeclaredTypes::default();
    let props = extract_prop_types(&resolved, items, &mut declared);

    Ok(generate_runtime_props(props, capture.defaults.as_deref()))
}

fn callee_ident_of(expr: &Expr) -> Option<(&downlevel_core::DownlevelAtom, &CallExpr)> {
    let Expr::Call(call) = expr else {
        return None;
    };

    let Callee::Expr(callee_expr) = &call.callee else {
        return None;
    };

    let Expr::Ident(callee_ident) = callee_expr.as_ref() else {
        return None;
    };

    Some((&callee_ident.sym, call))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parser::parse_typescript_module;
    use swc_core::ecma::ast::{Lit, ObjectLit, Prop, PropName, PropOrSpread};

    fn apply(code: &str) -> Result<MacroExtraction, TransformError> {
        apply_macros(parse_typescript_module(code).body)
    }

    fn error_kind(result: Result<MacroExtraction, TransformError>) -> ScriptErrorKind {
        match result {
            Err(TransformError::ScriptError(e)) => e.kind,
            Ok(_) => panic!("Expected an error"),
        }
    }

    fn props_object(extraction: &MacroExtraction) -> &ObjectLit {
        match extraction.props.as_deref() {
            Some(Expr::Object(obj)) => obj,
            other => panic!("Expected an object props schema, got {:?}", other),
        }
    }

    fn prop_entry<'a>(obj: &'a ObjectLit, name: &str) -> &'a ObjectLit {
        for prop_or_spread in &obj.props {
            let PropOrSpread::Prop(prop) = prop_or_spread else {
                continue;
            };
            let Prop::KeyValue(key_value) = prop.as_ref() else {
                continue;
            };
            let PropName::Ident(ident) = &key_value.key else {
                continue;
            };
            if ident.sym.eq(name) {
                let Expr::Object(entry) = key_value.value.as_ref() else {
                    panic!("Prop {} is not an object entry", name);
                };
                return entry;
            }
        }
        panic!("Prop {} not found", name)
    }

    fn field<'a>(entry: &'a ObjectLit, name: &str) -> &'a Expr {
        for prop_or_spread in &entry.props {
            let PropOrSpread::Prop(prop) = prop_or_spread else {
                continue;
            };
            let Prop::KeyValue(key_value) = prop.as_ref() else {
                continue;
            };
            let PropName::Ident(ident) = &key_value.key else {
                continue;
            };
            if ident.sym.eq(name) {
                return &key_value.value;
            }
        }
        panic!("Field {} not found", name)
    }

    #[test]
    fn it_erases_macro_statements() {
        let extraction = apply("defineProps(['foo'])\nconst a = 1").expect("Should apply");
        assert_eq!(1, extraction.remaining.len());
        assert!(extraction.props.is_some());
    }

    #[test]
    fn it_passes_runtime_props_through() {
        let extraction = apply("defineProps(['foo', 'bar'])").expect("Should apply");
        assert!(matches!(extraction.props.as_deref(), Some(Expr::Array(_))));
    }

    #[test]
    fn it_rejects_duplicate_define_props() {
        assert_eq!(
            ScriptErrorKind::DuplicateDefineProps,
            error_kind(apply("defineProps(['a'])\ndefineProps(['b'])"))
        );
    }

    #[test]
    fn it_rejects_mixed_type_and_runtime_arguments() {
        assert_eq!(
            ScriptErrorKind::DefinePropsTypeAndNonTypeArguments,
            error_kind(apply("defineProps<{ foo: string }>(['foo'])"))
        );
        assert_eq!(
            ScriptErrorKind::DefineEmitsTypeAndNonTypeArguments,
            error_kind(apply("defineEmits<(e: 'up') => void>(['up'])"))
        );
    }

    #[test]
    fn it_derives_props_from_types() {
        let extraction =
            apply("interface Props { foo: string, bar?: number }\ndefineProps<Props>()")
                .expect("Should apply");

        let schema = props_object(&extraction);
        assert_eq!(2, schema.props.len());

        let foo = prop_entry(schema, "foo");
        assert!(matches!(field(foo, "type"), Expr::Ident(i) if i.sym.eq("String")));
        assert!(
            matches!(field(foo, "required"), Expr::Lit(Lit::Bool(b)) if b.value)
        );

        let bar = prop_entry(schema, "bar");
        assert!(matches!(field(bar, "type"), Expr::Ident(i) if i.sym.eq("Number")));
        assert!(
            matches!(field(bar, "required"), Expr::Lit(Lit::Bool(b)) if !b.value)
        );
    }

    #[test]
    fn it_derives_union_props_and_null_fallbacks() {
        let extraction = apply(
            "defineProps<{ id: string | number, anything: SomeImported }>()",
        )
        .expect("Should apply");

        let schema = props_object(&extraction);

        let id = prop_entry(schema, "id");
        assert!(matches!(field(id, "type"), Expr::Array(arr) if arr.elems.len() == 2));

        // Unresolvable member types degrade to a bare `null`
        let has_null_prop = schema.props.iter().any(|p| {
            let PropOrSpread::Prop(prop) = p else { return false };
            let Prop::KeyValue(kv) = prop.as_ref() else { return false };
            matches!(&kv.key, PropName::Ident(i) if i.sym.eq("anything"))
                && matches!(kv.value.as_ref(), Expr::Lit(Lit::Null(_)))
        });
        assert!(has_null_prop);
    }

    #[test]
    fn it_merges_static_defaults() {
        let extraction = apply(
            "interface Props { foo?: string, bar: number }\n\
             const props = withDefaults(defineProps<Props>(), { foo: 'def' })",
        )
        .expect("Should apply");

        let schema = props_object(&extraction);

        let foo = prop_entry(schema, "foo");
        assert!(
            matches!(field(foo, "required"), Expr::Lit(Lit::Bool(b)) if !b.value)
        );
        assert!(matches!(field(foo, "default"), Expr::Lit(Lit::Str(s)) if s.value.eq("def")));

        let bar = prop_entry(schema, "bar");
        assert!(
            matches!(field(bar, "required"), Expr::Lit(Lit::Bool(b)) if b.value)
        );
    }

    #[test]
    fn it_rejects_with_defaults_misuse() {
        assert_eq!(
            ScriptErrorKind::WithDefaultsNeedsTypeOnlyDefineProps,
            error_kind(apply("const p = withDefaults(defineProps(['a']), {})"))
        );
        assert_eq!(
            ScriptErrorKind::WithDefaultsWithoutDefineProps,
            error_kind(apply("const p = withDefaults(somethingElse(), {})"))
        );
    }

    #[test]
    fn it_rewrites_macro_initializers() {
        let extraction = apply(
            "const props = defineProps(['foo'])\nconst emit = defineEmits(['change'])",
        )
        .expect("Should apply");

        assert_eq!(2, extraction.remaining.len());
        let code = crate::test_utils::stringify_module(&swc_core::ecma::ast::Module {
            span: DUMMY_SP,
            body: extraction.remaining,
            shebang: None,
        });
        assert_eq!("const props = __props;\nconst emit = __ctx.emit;\n", code);
    }

    #[test]
    fn it_captures_expose() {
        let extraction = apply("defineExpose({ count: 1 })").expect("Should apply");
        assert!(extraction.expose.is_some());
        assert!(extraction.remaining.is_empty());

        assert_eq!(
            ScriptErrorKind::DuplicateDefineExpose,
            error_kind(apply("defineExpose({})\ndefineExpose({})"))
        );
        assert_eq!(
            ScriptErrorKind::DefineExposeRequiresOneArgument,
            error_kind(apply("defineExpose()"))
        );
    }

    #[test]
    fn it_rejects_top_level_await() {
        assert_eq!(
            ScriptErrorKind::TopLevelAwait,
            error_kind(apply("await loadThing()"))
        );
        assert!(apply("const f = async () => { await loadThing() }").is_ok());
    }

    #[test]
    fn it_rejects_unresolvable_type_arguments() {
        assert_eq!(
            ScriptErrorKind::DefinePropsTypeArgumentUnresolvable,
            error_kind(apply("defineProps<ImportedProps>()"))
        );
        assert_eq!(
            ScriptErrorKind::DefineEmitsTypeArgumentUnresolvable,
            error_kind(apply("defineEmits<ImportedEmits>()"))
        );
        assert!(apply("defineEmits<(e: 'up', value: number) => void>()").is_ok());
        assert!(apply("defineEmits<{ (e: 'up'): void }>()").is_ok());
    }
}
