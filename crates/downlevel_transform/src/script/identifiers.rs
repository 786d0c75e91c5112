//! The identifier analyzer: which names a scope declares and which free
//! identifiers an expression references.
//!
//! Both walks are written as exhaustive matches over the AST node kinds,
//! so a parser upgrade introducing a new kind fails to compile here
//! instead of silently returning nothing.

use downlevel_core::DownlevelAtom;
use fxhash::FxHashSet;
use swc_core::ecma::ast::{
    AssignTarget, BlockStmtOrExpr, Callee, Decl, Expr, MemberExpr, ModuleDecl, ModuleItem,
    ObjectPatProp, OptChainBase, Pat, Prop, PropName, PropOrSpread, SimpleAssignTarget, Stmt,
    TsModuleName, VarDeclOrExpr,
};

pub type IdentSet = FxHashSet<DownlevelAtom>;

/// An ordered, deduplicated set of declared names. Order follows the
/// declaration order in the source, which keeps generated objects stable.
#[derive(Debug, Default)]
pub struct Declarations {
    names: Vec<DownlevelAtom>,
    seen: IdentSet,
}

impl Declarations {
    pub fn insert(&mut self, name: DownlevelAtom) {
        if self.seen.insert(name.clone()) {
            self.names.push(name);
        }
    }

    pub fn contains(&self, name: &DownlevelAtom) -> bool {
        self.seen.contains(name)
    }

    pub fn names(&self) -> &[DownlevelAtom] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Collects the names bound at the top level of a module: import
/// specifiers, (destructured) variable declarations, function/class
/// declarations and enum/module declarations. Does not descend into
/// nested blocks.
pub fn collect_declarations(items: &[ModuleItem], out: &mut Declarations) {
    for item in items {
        match item {
            ModuleItem::ModuleDecl(module_decl) => match module_decl {
                ModuleDecl::Import(import) => {
                    for specifier in &import.specifiers {
                        use swc_core::ecma::ast::ImportSpecifier;
                        match specifier {
                            ImportSpecifier::Named(named) => {
                                out.insert(named.local.sym.clone());
                            }
                            ImportSpecifier::Default(default) => {
                                out.insert(default.local.sym.clone());
                            }
                            ImportSpecifier::Namespace(namespace) => {
                                out.insert(namespace.local.sym.clone());
                            }
                        }
                    }
                }
                ModuleDecl::ExportDecl(export) => collect_decl_names(&export.decl, out),
                ModuleDecl::ExportNamed(_)
                | ModuleDecl::ExportDefaultDecl(_)
                | ModuleDecl::ExportDefaultExpr(_)
                | ModuleDecl::ExportAll(_)
                | ModuleDecl::TsImportEquals(_)
                | ModuleDecl::TsExportAssignment(_)
                | ModuleDecl::TsNamespaceExport(_) => {}
            },
            ModuleItem::Stmt(Stmt::Decl(decl)) => collect_decl_names(decl, out),
            ModuleItem::Stmt(_) => {}
        }
    }
}

fn collect_decl_names(decl: &Decl, out: &mut Declarations) {
    match decl {
        Decl::Class(class) => {
            out.insert(class.ident.sym.clone());
        }
        Decl::Fn(fn_decl) => {
            out.insert(fn_decl.ident.sym.clone());
        }
        Decl::Var(var_decl) => {
            for declarator in &var_decl.decls {
                collect_pat_names(&declarator.name, out);
            }
        }
        Decl::Using(using) => {
            for declarator in &using.decls {
                collect_pat_names(&declarator.name, out);
            }
        }
        Decl::TsEnum(ts_enum) => {
            out.insert(ts_enum.id.sym.clone());
        }
        Decl::TsModule(ts_module) => {
            if let TsModuleName::Ident(id) = &ts_module.id {
                out.insert(id.sym.clone());
            }
        }
        // Type-only declarations do not produce runtime bindings
        Decl::TsInterface(_) | Decl::TsTypeAlias(_) => {}
    }
}

/// Collects the names bound by a (possibly nested) destructuring pattern.
/// Array holes produce no binding; rest elements do.
pub fn collect_pat_names(pat: &Pat, out: &mut Declarations) {
    match pat {
        Pat::Ident(ident) => {
            out.insert(ident.sym.clone());
        }

        Pat::Array(arr) => {
            for elem in arr.elems.iter().flatten() {
                collect_pat_names(elem, out);
            }
        }

        Pat::Rest(rest) => collect_pat_names(&rest.arg, out),

        Pat::Object(obj) => {
            for prop in &obj.props {
                match prop {
                    // `foo: bar` in `const { foo: bar } = {}`
                    ObjectPatProp::KeyValue(key_value) => {
                        collect_pat_names(&key_value.value, out);
                    }
                    // `foo` in `const { foo } = {}` and `const { foo = 1 } = {}`
                    ObjectPatProp::Assign(assign) => {
                        out.insert(assign.key.sym.clone());
                    }
                    // `rest` in `const { foo, ...rest } = {}`
                    ObjectPatProp::Rest(rest) => collect_pat_names(&rest.arg, out),
                }
            }
        }

        Pat::Assign(assign) => collect_pat_names(&assign.left, out),

        Pat::Invalid(_) | Pat::Expr(_) => {}
    }
}

/// Collects the free identifier names referenced by an expression.
///
/// Member access contributes its root object only (plus computed
/// property expressions). Function parameters are not subtracted from
/// body usage, so the set over-approximates.
pub fn collect_expr_usages(expr: &Expr, out: &mut IdentSet) {
    match expr {
        Expr::Ident(ident) => {
            out.insert(ident.sym.clone());
        }

        Expr::Member(member) => collect_member_usages(member, out),

        Expr::OptChain(opt_chain) => match opt_chain.base.as_ref() {
            OptChainBase::Member(member) => collect_member_usages(member, out),
            OptChainBase::Call(call) => {
                collect_expr_usages(&call.callee, out);
                for arg in &call.args {
                    collect_expr_usages(&arg.expr, out);
                }
            }
        },

        Expr::Call(call) => {
            if let Callee::Expr(callee) = &call.callee {
                collect_expr_usages(callee, out);
            }
            for arg in &call.args {
                collect_expr_usages(&arg.expr, out);
            }
        }

        Expr::New(new_expr) => {
            collect_expr_usages(&new_expr.callee, out);
            if let Some(args) = &new_expr.args {
                for arg in args {
                    collect_expr_usages(&arg.expr, out);
                }
            }
        }

        Expr::Bin(bin) => {
            collect_expr_usages(&bin.left, out);
            collect_expr_usages(&bin.right, out);
        }

        Expr::Unary(unary) => collect_expr_usages(&unary.arg, out),

        Expr::Update(update) => collect_expr_usages(&update.arg, out),

        Expr::Cond(cond) => {
            collect_expr_usages(&cond.test, out);
            collect_expr_usages(&cond.cons, out);
            collect_expr_usages(&cond.alt, out);
        }

        Expr::Assign(assign) => {
            match &assign.left {
                AssignTarget::Simple(simple) => match simple {
                    SimpleAssignTarget::Ident(ident) => {
                        out.insert(ident.sym.clone());
                    }
                    SimpleAssignTarget::Member(member) => collect_member_usages(member, out),
                    // Other targets carry no analyzable root identifier
                    _ => {}
                },
                // Destructuring targets introduce bindings, not usages
                AssignTarget::Pat(_) => {}
            }
            collect_expr_usages(&assign.right, out);
        }

        Expr::Object(obj) => {
            for prop in &obj.props {
                match prop {
                    PropOrSpread::Spread(spread) => collect_expr_usages(&spread.expr, out),
                    PropOrSpread::Prop(prop) => match prop.as_ref() {
                        Prop::Shorthand(ident) => {
                            out.insert(ident.sym.clone());
                        }
                        Prop::KeyValue(key_value) => {
                            collect_propname_usages(&key_value.key, out);
                            collect_expr_usages(&key_value.value, out);
                        }
                        Prop::Getter(getter) => {
                            collect_propname_usages(&getter.key, out);
                            if let Some(body) = &getter.body {
                                for stmt in &body.stmts {
                                    collect_stmt_usages(stmt, out);
                                }
                            }
                        }
                        Prop::Setter(setter) => {
                            collect_propname_usages(&setter.key, out);
                            if let Some(body) = &setter.body {
                                for stmt in &body.stmts {
                                    collect_stmt_usages(stmt, out);
                                }
                            }
                        }
                        Prop::Method(method) => {
                            collect_propname_usages(&method.key, out);
                            if let Some(body) = &method.function.body {
                                for stmt in &body.stmts {
                                    collect_stmt_usages(stmt, out);
                                }
                            }
                        }
                        Prop::Assign(_) => {}
                    },
                }
            }
        }

        Expr::Array(arr) => {
            for elem in arr.elems.iter().flatten() {
                collect_expr_usages(&elem.expr, out);
            }
        }

        Expr::Tpl(tpl) => {
            for interpolated in &tpl.exprs {
                collect_expr_usages(interpolated, out);
            }
        }

        Expr::TaggedTpl(tagged) => {
            collect_expr_usages(&tagged.tag, out);
            for interpolated in &tagged.tpl.exprs {
                collect_expr_usages(interpolated, out);
            }
        }

        Expr::Arrow(arrow) => match arrow.body.as_ref() {
            BlockStmtOrExpr::BlockStmt(block) => {
                for stmt in &block.stmts {
                    collect_stmt_usages(stmt, out);
                }
            }
            BlockStmtOrExpr::Expr(body_expr) => collect_expr_usages(body_expr, out),
        },

        Expr::Fn(fn_expr) => {
            if let Some(body) = &fn_expr.function.body {
                for stmt in &body.stmts {
                    collect_stmt_usages(stmt, out);
                }
            }
        }

        Expr::Seq(seq) => {
            for sub_expr in &seq.exprs {
                collect_expr_usages(sub_expr, out);
            }
        }

        Expr::Paren(paren) => collect_expr_usages(&paren.expr, out),

        Expr::Await(await_expr) => collect_expr_usages(&await_expr.arg, out),

        Expr::Yield(yield_expr) => {
            if let Some(arg) = &yield_expr.arg {
                collect_expr_usages(arg, out);
            }
        }

        Expr::SuperProp(super_prop) => {
            if let swc_core::ecma::ast::SuperProp::Computed(computed) = &super_prop.prop {
                collect_expr_usages(&computed.expr, out);
            }
        }

        // TS-only wrappers are transparent
        Expr::TsTypeAssertion(e) => collect_expr_usages(&e.expr, out),
        Expr::TsConstAssertion(e) => collect_expr_usages(&e.expr, out),
        Expr::TsNonNull(e) => collect_expr_usages(&e.expr, out),
        Expr::TsAs(e) => collect_expr_usages(&e.expr, out),
        Expr::TsInstantiation(e) => collect_expr_usages(&e.expr, out),
        Expr::TsSatisfies(e) => collect_expr_usages(&e.expr, out),

        // Class bodies are not analyzable template expressions
        Expr::Class(_) => {}

        Expr::Lit(_)
        | Expr::This(_)
        | Expr::MetaProp(_)
        | Expr::PrivateName(_)
        | Expr::JSXMember(_)
        | Expr::JSXNamespacedName(_)
        | Expr::JSXEmpty(_)
        | Expr::JSXElement(_)
        | Expr::JSXFragment(_)
        | Expr::Invalid(_) => {}
    }
}

/// Computed object keys are usages, static keys are not
fn collect_propname_usages(prop_name: &PropName, out: &mut IdentSet) {
    if let PropName::Computed(computed) = prop_name {
        collect_expr_usages(&computed.expr, out);
    }
}

fn collect_member_usages(member: &MemberExpr, out: &mut IdentSet) {
    collect_expr_usages(&member.obj, out);

    if let swc_core::ecma::ast::MemberProp::Computed(computed) = &member.prop {
        collect_expr_usages(&computed.expr, out);
    }
}

/// Statement-level usage walk. `for..in`/`for..of` contribute their
/// iterable source only; the loop variable is a binding, not a use.
pub fn collect_stmt_usages(stmt: &Stmt, out: &mut IdentSet) {
    match stmt {
        Stmt::Block(block) => {
            for inner in &block.stmts {
                collect_stmt_usages(inner, out);
            }
        }

        Stmt::Expr(expr_stmt) => collect_expr_usages(&expr_stmt.expr, out),

        Stmt::Return(ret) => {
            if let Some(arg) = &ret.arg {
                collect_expr_usages(arg, out);
            }
        }

        Stmt::If(if_stmt) => {
            collect_expr_usages(&if_stmt.test, out);
            collect_stmt_usages(&if_stmt.cons, out);
            if let Some(alt) = &if_stmt.alt {
                collect_stmt_usages(alt, out);
            }
        }

        Stmt::Switch(switch) => {
            collect_expr_usages(&switch.discriminant, out);
            for case in &switch.cases {
                if let Some(test) = &case.test {
                    collect_expr_usages(test, out);
                }
                for cons in &case.cons {
                    collect_stmt_usages(cons, out);
                }
            }
        }

        Stmt::Throw(throw) => collect_expr_usages(&throw.arg, out),

        Stmt::Try(try_stmt) => {
            for inner in &try_stmt.block.stmts {
                collect_stmt_usages(inner, out);
            }
            if let Some(handler) = &try_stmt.handler {
                for inner in &handler.body.stmts {
                    collect_stmt_usages(inner, out);
                }
            }
            if let Some(finalizer) = &try_stmt.finalizer {
                for inner in &finalizer.stmts {
                    collect_stmt_usages(inner, out);
                }
            }
        }

        Stmt::While(while_stmt) => {
            collect_expr_usages(&while_stmt.test, out);
            collect_stmt_usages(&while_stmt.body, out);
        }

        Stmt::DoWhile(do_while) => {
            collect_expr_usages(&do_while.test, out);
            collect_stmt_usages(&do_while.body, out);
        }

        Stmt::For(for_stmt) => {
            match &for_stmt.init {
                Some(VarDeclOrExpr::Expr(init)) => collect_expr_usages(init, out),
                Some(VarDeclOrExpr::VarDecl(var_decl)) => {
                    for declarator in &var_decl.decls {
                        if let Some(init) = &declarator.init {
                            collect_expr_usages(init, out);
                        }
                    }
                }
                None => {}
            }
            if let Some(test) = &for_stmt.test {
                collect_expr_usages(test, out);
            }
            if let Some(update) = &for_stmt.update {
                collect_expr_usages(update, out);
            }
            collect_stmt_usages(&for_stmt.body, out);
        }

        Stmt::ForIn(for_in) => collect_expr_usages(&for_in.right, out),
        Stmt::ForOf(for_of) => collect_expr_usages(&for_of.right, out),

        Stmt::Labeled(labeled) => collect_stmt_usages(&labeled.body, out),

        Stmt::With(with) => {
            collect_expr_usages(&with.obj, out);
            collect_stmt_usages(&with.body, out);
        }

        Stmt::Decl(decl) => match decl {
            Decl::Var(var_decl) => {
                for declarator in &var_decl.decls {
                    if let Some(init) = &declarator.init {
                        collect_expr_usages(init, out);
                    }
                }
            }
            Decl::Fn(fn_decl) => {
                if let Some(body) = &fn_decl.function.body {
                    for inner in &body.stmts {
                        collect_stmt_usages(inner, out);
                    }
                }
            }
            Decl::Using(using) => {
                for declarator in &using.decls {
                    if let Some(init) = &declarator.init {
                        collect_expr_usages(init, out);
                    }
                }
            }
            Decl::Class(_)
            | Decl::TsInterface(_)
            | Decl::TsTypeAlias(_)
            | Decl::TsEnum(_)
            | Decl::TsModule(_) => {}
        },

        Stmt::Empty(_) | Stmt::Debugger(_) | Stmt::Break(_) | Stmt::Continue(_) => {}
    }
}

/// Usage walk over whole module items; module declarations contribute
/// nothing (imports/exports are bindings, not uses).
pub fn collect_module_item_usages(item: &ModuleItem, out: &mut IdentSet) {
    match item {
        ModuleItem::Stmt(stmt) => collect_stmt_usages(stmt, out),
        ModuleItem::ModuleDecl(_) => {}
    }
}
