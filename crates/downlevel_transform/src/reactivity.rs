//! The reactivity shorthand expansion pass: rewrites `$ref`-style sugar
//! into aliased helper calls plus `.value` access, and injects the
//! helper import.
//!
//! Supported forms: `$ref`, `$computed`, `$shallowRef`, `$customRef`
//! and `$toRef` as call expressions, with `$$()` as the escape hatch.
//! Destructuring sugar (`const { x } = $(...)`) is not expanded.

use downlevel_core::{DownlevelAtom, IntoIdent, SfcDescriptor};
use swc_core::{
    common::DUMMY_SP,
    ecma::{
        ast::{
            ArrowExpr, AssignTarget, BlockStmt, BlockStmtOrExpr, Callee, Decl, Expr, Function,
            IdentName, ImportDecl, ImportNamedSpecifier, ImportSpecifier, KeyValueProp,
            MemberExpr, MemberProp, Module, ModuleDecl, ModuleExportName, ModuleItem, Param, Pat,
            Prop, PropName, SimpleAssignTarget, Stmt, Str,
        },
        visit::{VisitMut, VisitMutWith},
    },
};

use crate::script::identifiers::{collect_pat_names, Declarations};

/// `$macro` -> (aliased local name, imported helper name)
fn helper_for(name: &str) -> Option<(&'static str, &'static str)> {
    match name {
        "$ref" => Some(("_ref", "ref")),
        "$computed" => Some(("_computed", "computed")),
        "$shallowRef" => Some(("_shallowRef", "shallowRef")),
        "$customRef" => Some(("_customRef", "customRef")),
        "$toRef" => Some(("_toRef", "toRef")),
        _ => None,
    }
}

/// Expands the sugar in both script regions and records the helper
/// import in `descriptor.extra_declarations`.
pub fn apply_reactivity_sugar(descriptor: &mut SfcDescriptor, import_helpers_from: &str) {
    let mut helpers: Vec<&'static str> = vec![];

    expand_module(&mut descriptor.script.program, &mut helpers);
    expand_module(&mut descriptor.script_setup.program, &mut helpers);

    if helpers.is_empty() {
        return;
    }

    // `import { ref as _ref, ... } from '<import_helpers_from>'`
    let specifiers = helpers
        .iter()
        .map(|helper| {
            ImportSpecifier::Named(ImportNamedSpecifier {
                span: DUMMY_SP,
                local: DownlevelAtom::from(format!("_{helper}")).into_ident(),
                imported: Some(ModuleExportName::Ident(
                    DownlevelAtom::from(*helper).into_ident(),
                )),
                is_type_only: false,
            })
        })
        .collect();

    descriptor
        .extra_declarations
        .push(ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
            span: DUMMY_SP,
            specifiers,
            src: Box::new(Str {
                span: DUMMY_SP,
                value: DownlevelAtom::from(import_helpers_from),
                raw: None,
            }),
            type_only: false,
            with: None,
            phase: Default::default(),
        })));
}

fn expand_module(module: &mut Module, helpers: &mut Vec<&'static str>) {
    // Top-level bindings initialized by a reactivity macro get their
    // reads and writes rewritten to `.value`
    let mut ref_bindings = Declarations::default();

    for item in module.body.iter() {
        let ModuleItem::Stmt(Stmt::Decl(Decl::Var(var_decl))) = item else {
            continue;
        };

        for declarator in var_decl.decls.iter() {
            let Pat::Ident(ident) = &declarator.name else {
                continue;
            };
            let Some(init) = &declarator.init else {
                continue;
            };
            let Expr::Call(call) = init.as_ref() else {
                continue;
            };
            let Callee::Expr(callee) = &call.callee else {
                continue;
            };
            let Expr::Ident(callee_ident) = callee.as_ref() else {
                continue;
            };

            if helper_for(&callee_ident.sym).is_some() {
                ref_bindings.insert(ident.sym.clone());
            }
        }
    }

    let mut expander = SugarExpander {
        ref_bindings,
        scopes: vec![],
        helpers,
    };
    module.visit_mut_with(&mut expander);
}

struct SugarExpander<'h> {
    ref_bindings: Declarations,
    /// Function scopes whose bindings shadow the rewritten names
    scopes: Vec<Declarations>,
    helpers: &'h mut Vec<&'static str>,
}

impl SugarExpander<'_> {
    fn should_rewrite(&self, sym: &DownlevelAtom) -> bool {
        self.ref_bindings.contains(sym) && !self.scopes.iter().any(|scope| scope.contains(sym))
    }

    fn use_helper(&mut self, helper: &'static str) {
        if !self.helpers.contains(&helper) {
            self.helpers.push(helper);
        }
    }
}

impl VisitMut for SugarExpander<'_> {
    fn visit_mut_function(&mut self, n: &mut Function) {
        self.scopes.push(function_scope(&n.params, n.body.as_ref()));
        n.visit_mut_children_with(self);
        self.scopes.pop();
    }

    fn visit_mut_arrow_expr(&mut self, n: &mut ArrowExpr) {
        let mut scope = Declarations::default();
        for pat in &n.params {
            collect_pat_names(pat, &mut scope);
        }
        if let BlockStmtOrExpr::BlockStmt(block) = n.body.as_ref() {
            collect_block_decl_names(block, &mut scope);
        }

        self.scopes.push(scope);
        n.visit_mut_children_with(self);
        self.scopes.pop();
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        // `$$(x)` escapes the `.value` rewriting
        if let Some(escaped) = take_escape(expr) {
            *expr = escaped;
            if !matches!(expr, Expr::Ident(_)) {
                expr.visit_mut_children_with(self);
            }
            return;
        }

        // `$ref(...)` becomes `_ref(...)`
        if let Expr::Call(call) = expr {
            if let Callee::Expr(callee) = &mut call.callee {
                if let Expr::Ident(callee_ident) = callee.as_mut() {
                    if let Some((alias, helper)) = helper_for(&callee_ident.sym) {
                        callee_ident.sym = DownlevelAtom::from(alias);
                        self.use_helper(helper);
                    }
                }
            }
        }

        expr.visit_mut_children_with(self);

        // Reads become `.value` accesses
        if let Expr::Ident(ident) = expr {
            if self.should_rewrite(&ident.sym) {
                *expr = Expr::Member(MemberExpr {
                    span: ident.span,
                    obj: Box::new(Expr::Ident(ident.clone())),
                    prop: MemberProp::Ident(IdentName {
                        span: DUMMY_SP,
                        sym: DownlevelAtom::from("value"),
                    }),
                });
            }
        }
    }

    // `{ c }` becomes `{ c: c.value }`
    fn visit_mut_prop(&mut self, prop: &mut Prop) {
        if let Prop::Shorthand(ident) = prop {
            if self.should_rewrite(&ident.sym) {
                *prop = Prop::KeyValue(KeyValueProp {
                    key: PropName::Ident(IdentName {
                        span: ident.span,
                        sym: ident.sym.clone(),
                    }),
                    value: Box::new(Expr::Member(MemberExpr {
                        span: ident.span,
                        obj: Box::new(Expr::Ident(ident.clone())),
                        prop: MemberProp::Ident(IdentName {
                            span: DUMMY_SP,
                            sym: DownlevelAtom::from("value"),
                        }),
                    })),
                });
                return;
            }
        }

        prop.visit_mut_children_with(self);
    }

    // Writes become `.value` assignments
    fn visit_mut_assign_target(&mut self, target: &mut AssignTarget) {
        if let AssignTarget::Simple(SimpleAssignTarget::Ident(binding_ident)) = target {
            if self.should_rewrite(&binding_ident.id.sym) {
                *target = AssignTarget::Simple(SimpleAssignTarget::Member(MemberExpr {
                    span: binding_ident.id.span,
                    obj: Box::new(Expr::Ident(binding_ident.id.clone())),
                    prop: MemberProp::Ident(IdentName {
                        span: DUMMY_SP,
                        sym: DownlevelAtom::from("value"),
                    }),
                }));
                return;
            }
        }

        target.visit_mut_children_with(self);
    }
}

fn function_scope(params: &[Param], body: Option<&BlockStmt>) -> Declarations {
    let mut scope = Declarations::default();

    for param in params {
        collect_pat_names(&param.pat, &mut scope);
    }
    if let Some(body) = body {
        collect_block_decl_names(body, &mut scope);
    }

    scope
}

fn collect_block_decl_names(block: &BlockStmt, out: &mut Declarations) {
    for stmt in &block.stmts {
        let Stmt::Decl(decl) = stmt else {
            continue;
        };

        match decl {
            Decl::Var(var_decl) => {
                for declarator in &var_decl.decls {
                    collect_pat_names(&declarator.name, out);
                }
            }
            Decl::Fn(fn_decl) => out.insert(fn_decl.ident.sym.clone()),
            Decl::Class(class_decl) => out.insert(class_decl.ident.sym.clone()),
            _ => {}
        }
    }
}

fn take_escape(expr: &mut Expr) -> Option<Expr> {
    {
        let Expr::Call(call) = &*expr else {
            return None;
        };
        let Callee::Expr(callee) = &call.callee else {
            return None;
        };
        let Expr::Ident(ident) = callee.as_ref() else {
            return None;
        };
        if !ident.sym.eq("$$") || call.args.len() != 1 || call.args[0].spread.is_some() {
            return None;
        }
    }

    let Expr::Call(call) = expr else {
        unreachable!()
    };

    Some(*call.args.remove(0).expr)
}
