//! The script merger: combines the macro-processed setup statements, the
//! plain script body and the template's references into one component
//! definition module.

use downlevel_core::{atom_to_propname, pascalize, DownlevelAtom, IntoIdent, TemplateReferences};
use swc_core::{
    common::DUMMY_SP,
    ecma::ast::{
        ArrowExpr, AssignExpr, AssignOp, AssignTarget, BindingIdent, BlockStmt, BlockStmtOrExpr,
        CallExpr, Callee, Decl, DefaultDecl, ExportDefaultDecl, ExportDefaultExpr, Expr,
        ExprOrSpread, ExprStmt, IdentName, KeyValueProp, MemberExpr, MemberProp, Module,
        ModuleDecl, ModuleItem, ObjectLit, Pat, Prop, PropOrSpread, ReturnStmt,
        SimpleAssignTarget, Stmt, VarDecl, VarDeclKind, VarDeclarator,
    },
};

use crate::{
    atoms::{
        ASSIGN, COMPONENTS, CTX_HELPER, DEFINE_ASYNC_COMPONENT, DIRECTIVES, OBJECT, PROPS,
        PROPS_HELPER, SETUP, SFC_MAIN,
    },
    script::{
        identifiers::{collect_declarations, Declarations},
        setup::MacroExtraction,
    },
};

pub struct MergeInput {
    pub extraction: MacroExtraction,
    /// The plain `<script>` body
    pub script_items: Vec<ModuleItem>,
    /// Module items synthesized by auxiliary passes, placed first
    pub extra_declarations: Vec<ModuleItem>,
    pub template: TemplateReferences,
    /// Emit a module even when no assignment was produced
    /// (a post-merge hook is registered)
    pub force_output: bool,
}

/// Synthesizes the merged component definition, or `None` when the file
/// needs no transformation at all.
pub fn merge_scripts(input: MergeInput) -> Option<Module> {
    let MergeInput {
        extraction,
        script_items,
        extra_declarations,
        template,
        force_output,
    } = input;

    let had_setup_statements = !extraction.remaining.is_empty();

    // Imports, re-exports, type-only declarations and async-component
    // loads must stay visible at module scope
    let mut hoisted: Vec<ModuleItem> = vec![];
    let mut setup_body: Vec<ModuleItem> = vec![];

    for item in extraction.remaining {
        match item {
            ModuleItem::ModuleDecl(_) => hoisted.push(item),
            ModuleItem::Stmt(stmt) => {
                if is_hoistable_stmt(&stmt) {
                    hoisted.push(ModuleItem::Stmt(stmt));
                } else {
                    setup_body.push(ModuleItem::Stmt(stmt));
                }
            }
        }
    }

    // All declared names across both scripts, in declaration order
    let mut declarations = Declarations::default();
    collect_declarations(&hoisted, &mut declarations);
    collect_declarations(&setup_body, &mut declarations);
    collect_declarations(&script_items, &mut declarations);

    // Script declarations the template actually references
    let returns: Vec<DownlevelAtom> = declarations
        .names()
        .iter()
        .filter(|name| template.identifiers.contains(*name))
        .cloned()
        .collect();

    // Declarations matching a referenced component tag, directly or
    // through PascalCase normalization
    let components: Vec<DownlevelAtom> = declarations
        .names()
        .iter()
        .filter(|name| {
            template.components.contains(*name)
                || template
                    .components
                    .contains(&DownlevelAtom::from(pascalize(name)))
        })
        .cloned()
        .collect();

    // Declarations shaped `vSomething` matching a custom directive
    let directives: Vec<(DownlevelAtom, DownlevelAtom)> = declarations
        .names()
        .iter()
        .filter_map(|name| {
            let key = directive_key_of(name)?;
            template
                .directives
                .contains(&key)
                .then(|| (key, name.clone()))
        })
        .collect();

    //
    // Assemble the merged module
    //

    let mut body: Vec<ModuleItem> = Vec::with_capacity(
        extra_declarations.len() + hoisted.len() + script_items.len() + 6,
    );
    body.extend(extra_declarations);
    body.extend(hoisted);

    let mut has_body = false;
    let mut found_default_export = false;

    // The plain script's default export becomes `const __sfc_main = ...`
    for item in script_items {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                found_default_export = true;
                body.push(const_sfc_main(export.expr));
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match export.decl {
                DefaultDecl::Class(class_expr) => {
                    found_default_export = true;
                    body.push(const_sfc_main(Box::new(Expr::Class(class_expr))));
                }
                DefaultDecl::Fn(fn_expr) => {
                    found_default_export = true;
                    body.push(const_sfc_main(Box::new(Expr::Fn(fn_expr))));
                }
                // A type-only default export has no runtime value to bind
                DefaultDecl::TsInterfaceDecl(interface) => {
                    body.push(ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(
                        ExportDefaultDecl {
                            span: export.span,
                            decl: DefaultDecl::TsInterfaceDecl(interface),
                        },
                    )));
                }
            },
            other => body.push(other),
        }
    }

    has_body |= found_default_export;

    if !found_default_export {
        body.push(const_sfc_main(Box::new(Expr::Object(ObjectLit {
            span: DUMMY_SP,
            props: vec![],
        }))));
    }

    // `__sfc_main.props = { ... }`
    if let Some(props) = extraction.props {
        has_body = true;
        body.push(assign_stmt(PROPS.to_owned(), props));
    }

    // `__sfc_main.setup = (__props, __ctx) => { ...; return { ... } }`
    if had_setup_statements {
        has_body = true;

        let returns_object = shorthand_object(&returns);
        let return_expr: Box<Expr> = match extraction.expose {
            Some(expose) => object_assign(Box::new(Expr::Object(returns_object)), expose),
            None => Box::new(Expr::Object(returns_object)),
        };

        let mut stmts: Vec<Stmt> = setup_body
            .into_iter()
            .filter_map(|item| match item {
                ModuleItem::Stmt(stmt) => Some(stmt),
                ModuleItem::ModuleDecl(_) => None,
            })
            .collect();

        stmts.push(Stmt::Return(ReturnStmt {
            span: DUMMY_SP,
            arg: Some(return_expr),
        }));

        let setup_fn = Expr::Arrow(ArrowExpr {
            span: DUMMY_SP,
            ctxt: Default::default(),
            params: vec![param_pat(PROPS_HELPER.to_owned()), param_pat(CTX_HELPER.to_owned())],
            body: Box::new(BlockStmtOrExpr::BlockStmt(BlockStmt {
                span: DUMMY_SP,
                ctxt: Default::default(),
                stmts,
            })),
            is_async: false,
            is_generator: false,
            type_params: None,
            return_type: None,
        });

        body.push(assign_stmt(SETUP.to_owned(), Box::new(setup_fn)));
    }

    // `__sfc_main.components = Object.assign({ ... }, __sfc_main.components)`
    if !components.is_empty() {
        has_body = true;

        body.push(assign_stmt(
            COMPONENTS.to_owned(),
            object_assign(
                Box::new(Expr::Object(shorthand_object(&components))),
                Box::new(Expr::Member(sfc_member(COMPONENTS.to_owned()))),
            ),
        ));
    }

    // `__sfc_main.directives = Object.assign({ ... }, __sfc_main.directives)`
    if !directives.is_empty() {
        has_body = true;

        let directive_props = directives
            .into_iter()
            .map(|(key, ident)| {
                PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
                    key: atom_to_propname(key, DUMMY_SP),
                    value: Box::new(Expr::Ident(ident.into_ident())),
                })))
            })
            .collect();

        body.push(assign_stmt(
            DIRECTIVES.to_owned(),
            object_assign(
                Box::new(Expr::Object(ObjectLit {
                    span: DUMMY_SP,
                    props: directive_props,
                })),
                Box::new(Expr::Member(sfc_member(DIRECTIVES.to_owned()))),
            ),
        ));
    }

    // A vacuous wrapper would only churn the file
    if !has_body && !force_output {
        return None;
    }

    // `export default __sfc_main`
    body.push(ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(
        ExportDefaultExpr {
            span: DUMMY_SP,
            expr: Box::new(Expr::Ident(SFC_MAIN.to_owned().into_ident())),
        },
    )));

    Some(Module {
        span: DUMMY_SP,
        body,
        shebang: None,
    })
}

fn is_hoistable_stmt(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Decl(
            Decl::TsInterface(_) | Decl::TsTypeAlias(_) | Decl::TsEnum(_) | Decl::TsModule(_),
        ) => true,
        Stmt::Decl(Decl::Var(var_decl)) => is_async_component_load(var_decl),
        _ => false,
    }
}

/// `const Comp = defineAsyncComponent(...)` must stay at module scope
fn is_async_component_load(var_decl: &VarDecl) -> bool {
    let Some(declarator) = var_decl.decls.first() else {
        return false;
    };
    let Some(init) = &declarator.init else {
        return false;
    };
    let Expr::Call(call) = init.as_ref() else {
        return false;
    };
    let Callee::Expr(callee) = &call.callee else {
        return false;
    };

    matches!(callee.as_ref(), Expr::Ident(i) if DEFINE_ASYNC_COMPONENT.eq(&i.sym))
}

/// A declaration named `vSomething` can back the directive `something`
fn directive_key_of(name: &DownlevelAtom) -> Option<DownlevelAtom> {
    let rest = name.strip_prefix('v')?;
    let mut chars = rest.chars();
    let first = chars.next()?;

    if !first.is_ascii_uppercase() {
        return None;
    }

    let mut key = String::with_capacity(rest.len());
    key.extend(first.to_lowercase());
    key.push_str(chars.as_str());

    Some(DownlevelAtom::from(key))
}

/// `const __sfc_main = <init>;`
fn const_sfc_main(init: Box<Expr>) -> ModuleItem {
    ModuleItem::Stmt(Stmt::Decl(Decl::Var(Box::new(VarDecl {
        span: DUMMY_SP,
        ctxt: Default::default(),
        kind: VarDeclKind::Const,
        declare: false,
        decls: vec![VarDeclarator {
            span: DUMMY_SP,
            name: Pat::Ident(BindingIdent {
                id: SFC_MAIN.to_owned().into_ident(),
                type_ann: None,
            }),
            init: Some(init),
            definite: false,
        }],
    }))))
}

fn sfc_member(prop: DownlevelAtom) -> MemberExpr {
    MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(Expr::Ident(SFC_MAIN.to_owned().into_ident())),
        prop: MemberProp::Ident(IdentName {
            span: DUMMY_SP,
            sym: prop,
        }),
    }
}

/// `__sfc_main.<field> = <value>;`
fn assign_stmt(field: DownlevelAtom, value: Box<Expr>) -> ModuleItem {
    ModuleItem::Stmt(Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(Expr::Assign(AssignExpr {
            span: DUMMY_SP,
            op: AssignOp::Assign,
            left: AssignTarget::Simple(SimpleAssignTarget::Member(sfc_member(field))),
            right: value,
        })),
    }))
}

/// `Object.assign(<first>, <second>)`
fn object_assign(first: Box<Expr>, second: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: Default::default(),
        callee: Callee::Expr(Box::new(Expr::Member(MemberExpr {
            span: DUMMY_SP,
            obj: Box::new(Expr::Ident(OBJECT.to_owned().into_ident())),
            prop: MemberProp::Ident(IdentName {
                span: DUMMY_SP,
                sym: ASSIGN.to_owned(),
            }),
        }))),
        args: vec![
            ExprOrSpread {
                spread: None,
                expr: first,
            },
            ExprOrSpread {
                spread: None,
                expr: second,
            },
        ],
        type_args: None,
    }))
}

fn shorthand_object(names: &[DownlevelAtom]) -> ObjectLit {
    ObjectLit {
        span: DUMMY_SP,
        props: names
            .iter()
            .map(|name| PropOrSpread::Prop(Box::new(Prop::Shorthand(name.clone().into_ident()))))
            .collect(),
    }
}

fn param_pat(sym: DownlevelAtom) -> Pat {
    Pat::Ident(BindingIdent {
        id: sym.into_ident(),
        type_ann: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        script::setup::apply_macros,
        test_utils::{parser::parse_typescript_module, stringify_module},
    };
    use downlevel_core::downlevel_atom;

    fn merge(
        setup_code: &str,
        script_code: &str,
        template: TemplateReferences,
    ) -> Option<Module> {
        let extraction =
            apply_macros(parse_typescript_module(setup_code).body).expect("Macros should apply");

        merge_scripts(MergeInput {
            extraction,
            script_items: parse_typescript_module(script_code).body,
            extra_declarations: vec![],
            template,
            force_output: false,
        })
    }

    /// Strips all whitespace, making assertions independent of the
    /// emitter's formatting
    fn compact(code: &str) -> String {
        code.split_whitespace().collect()
    }

    fn template_with_identifiers(identifiers: &[&str]) -> TemplateReferences {
        let mut refs = TemplateReferences::default();
        for ident in identifiers {
            refs.identifiers.insert(downlevel_atom!(*ident));
        }
        refs
    }

    #[test]
    fn it_returns_template_referenced_bindings() {
        let module = merge("const a = 1\nconst unused = 2", "", template_with_identifiers(&["a"]))
            .expect("Should produce a module");
        let code = stringify_module(&module);

        assert!(code.contains("const __sfc_main = {}"));
        assert!(code.contains("__sfc_main.setup"));
        assert!(code.contains("export default __sfc_main"));

        // Only `a` makes it into the return object
        let compacted = compact(&code);
        assert!(compacted.contains("return{a};"), "Unexpected return shape:\n{code}");
        assert!(!compacted.contains("return{a,unused};"));
    }

    #[test]
    fn it_rewrites_the_plain_script_default_export() {
        let module = merge(
            "const a = 1",
            "export default { name: 'Comp' }",
            template_with_identifiers(&["a"]),
        )
        .expect("Should produce a module");
        let code = stringify_module(&module);

        assert!(compact(&code).contains("const__sfc_main={name:'Comp'}"));
        assert!(!code.contains("const __sfc_main = {}\n"));
    }

    #[test]
    fn it_attaches_props_without_setup_return_entries() {
        let module = merge("defineProps(['foo'])", "", TemplateReferences::default())
            .expect("Should produce a module");
        let code = stringify_module(&module);

        assert!(compact(&code).contains("__sfc_main.props=['foo'];"));
        assert!(!code.contains("__sfc_main.setup"));
    }

    #[test]
    fn it_matches_components_case_flexibly() {
        let mut template = TemplateReferences::default();
        template.components.insert(downlevel_atom!("dynamic-style"));
        template.components.insert(downlevel_atom!("DynamicStyle"));

        let module = merge("const DynamicStyle = defineComponentStub()", "", template)
            .expect("Should produce a module");
        let code = stringify_module(&module);

        assert!(compact(&code)
            .contains("__sfc_main.components=Object.assign({DynamicStyle},__sfc_main.components);"));
    }

    #[test]
    fn it_does_not_match_buttons_to_builtin_tags() {
        // The template analyzer never registers built-in tags, so a
        // `button` declaration produces no components assignment
        let template = template_with_identifiers(&[]);
        let module = merge("const button = 1", "", template);
        assert!(module.is_none() || {
            let code = stringify_module(&module.expect("checked above"));
            !code.contains("components")
        });
    }

    #[test]
    fn it_matches_directives() {
        let mut template = TemplateReferences::default();
        template.directives.insert(downlevel_atom!("clickOutside"));

        let module = merge("const vClickOutside = { bind() {} }", "", template)
            .expect("Should produce a module");
        let code = stringify_module(&module);

        assert!(compact(&code).contains(
            "__sfc_main.directives=Object.assign({clickOutside:vClickOutside},__sfc_main.directives);"
        ));
    }

    #[test]
    fn it_hoists_imports_types_and_async_components() {
        let module = merge(
            "import { ref } from '@vue/composition-api'\n\
             type Row = { id: number }\n\
             const Lazy = defineAsyncComponent(() => import('./Lazy.vue'))\n\
             const rows = ref([])",
            "",
            template_with_identifiers(&["rows"]),
        )
        .expect("Should produce a module");
        let code = stringify_module(&module);

        // Hoisted before the component object
        let import_pos = code.find("import { ref }").expect("Should keep import");
        let type_pos = code.find("type Row").expect("Should keep type");
        let lazy_pos = code.find("const Lazy").expect("Should keep async component");
        let main_pos = code.find("const __sfc_main").expect("Should bind main");
        assert!(import_pos < main_pos);
        assert!(type_pos < main_pos);
        assert!(lazy_pos < main_pos);

        // Only `rows` stays in the setup body
        let setup_pos = code.find("__sfc_main.setup").expect("Should assign setup");
        assert!(code[setup_pos..].contains("const rows = ref([])"));
    }

    #[test]
    fn it_merges_expose_into_the_return() {
        let module = merge(
            "const a = 1\ndefineExpose({ manual: true })",
            "",
            template_with_identifiers(&["a"]),
        )
        .expect("Should produce a module");
        let code = stringify_module(&module);

        assert!(
            compact(&code).contains("returnObject.assign({a},{manual:true});"),
            "Unexpected expose merge:\n{code}"
        );
    }

    #[test]
    fn it_returns_the_sentinel_when_there_is_nothing_to_do() {
        assert!(merge("", "", TemplateReferences::default()).is_none());
        assert!(merge("", "function helper() {}", TemplateReferences::default()).is_none());
    }
}
