use downlevel_core::ScriptLang;
use downlevel_parser::{parse_expr, parse_module, syntax_for_lang};
use swc_core::{
    common::{BytePos, Span},
    ecma::ast::{Expr, Module},
};

fn input_span(input: &str) -> Span {
    Span::new(BytePos(1), BytePos(input.len() as u32 + 1))
}

pub fn parse_javascript_module(input: &str) -> Module {
    parse_module(input, syntax_for_lang(ScriptLang::Es), input_span(input))
        .expect("Test input should be parseable as JavaScript")
}

pub fn parse_typescript_module(input: &str) -> Module {
    parse_module(
        input,
        syntax_for_lang(ScriptLang::Typescript),
        input_span(input),
    )
    .expect("Test input should be parseable as TypeScript")
}

pub fn parse_javascript_expr(input: &str) -> Box<Expr> {
    parse_expr(input, syntax_for_lang(ScriptLang::Es), input_span(input))
        .expect("Test input should be parseable as an expression")
}
