use swc_core::{
    common::Span,
    ecma::{
        ast::{Expr, ModuleItem},
        visit::{Visit, VisitWith},
    },
};

/// Finds an `await` expression outside of any function body.
/// Returns the span of the first one discovered.
pub fn detect_await_module_item(module_item: &ModuleItem) -> Option<Span> {
    let mut await_detector = AwaitDetector::default();
    module_item.visit_with(&mut await_detector);
    await_detector.found
}

#[derive(Default)]
struct AwaitDetector {
    found: Option<Span>,
}

impl Visit for AwaitDetector {
    fn visit_await_expr(&mut self, n: &swc_core::ecma::ast::AwaitExpr) {
        if self.found.is_none() {
            self.found = Some(n.span);
        }
    }

    // `await` inside a nested function is legal; only params can leak out
    fn visit_function(&mut self, n: &swc_core::ecma::ast::Function) {
        for param in n.params.iter() {
            if self.found.is_some() {
                return;
            }

            param.visit_with(self);
        }
    }

    fn visit_expr(&mut self, n: &Expr) {
        if self.found.is_some() {
            return;
        }

        n.visit_children_with(self);
    }

    fn visit_arrow_expr(&mut self, n: &swc_core::ecma::ast::ArrowExpr) {
        for param in n.params.iter() {
            if self.found.is_some() {
                return;
            }

            param.visit_with(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parser::parse_typescript_module;

    fn has_top_level_await(input: &str) -> bool {
        let module = parse_typescript_module(input);
        module
            .body
            .iter()
            .any(|module_item| detect_await_module_item(module_item).is_some())
    }

    #[test]
    fn it_detects_expression_statements() {
        assert!(has_top_level_await("await foo"));
        assert!(has_top_level_await("foo()\nawait 1 + await 2"));
    }

    #[test]
    fn it_detects_variable_initializers() {
        assert!(has_top_level_await("const a = 1 + (await foo)"));
        assert!(has_top_level_await("let a = ref(1 + (await foo))"));
    }

    #[test]
    fn it_detects_nested_awaits() {
        assert!(has_top_level_await("await (await foo)"));
        assert!(has_top_level_await("await (await (await foo))"));
    }

    #[test]
    fn it_detects_awaits_in_control_flow() {
        assert!(has_top_level_await("if (false) await foo()"));
        assert!(has_top_level_await("if (ok) { await foo } else { await bar }"));
        assert!(has_top_level_await("while (d) {\n  await tick()\n}"));
        assert!(has_top_level_await("for (const a of [1, 2]) {\n  await a\n}"));
    }

    #[test]
    fn it_ignores_awaits_inside_functions() {
        assert!(!has_top_level_await("async function foo() { await bar }"));
        assert!(!has_top_level_await("const foo = async () => { await bar }"));
        assert!(!has_top_level_await("const obj = { async method() { await bar } }"));
        assert!(!has_top_level_await(
            "const cls = class Foo { async method() { await bar } }"
        ));
    }
}
