use downlevel_core::{DownlevelAtom, ScriptLang};
use swc_core::{
    common::Span,
    ecma::ast::{EsVersion, Expr, Module},
};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, PResult, Parser, StringInput, Syntax, TsSyntax};

/// Maps a raw `lang` attribute value to a recognized dialect.
/// `None` means the language is unsupported.
pub fn recognize_lang(raw: Option<&DownlevelAtom>) -> Option<ScriptLang> {
    let Some(raw) = raw else {
        return Some(ScriptLang::Es);
    };

    match raw.as_ref() {
        "js" => Some(ScriptLang::Es),
        "jsx" => Some(ScriptLang::Jsx),
        "ts" => Some(ScriptLang::Typescript),
        "tsx" => Some(ScriptLang::Tsx),
        _ => None,
    }
}

pub fn syntax_for_lang(lang: ScriptLang) -> Syntax {
    match lang {
        ScriptLang::Es => Syntax::Es(EsSyntax::default()),
        ScriptLang::Jsx => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
        ScriptLang::Typescript => Syntax::Typescript(TsSyntax::default()),
        ScriptLang::Tsx => Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
    }
}

pub fn parse_module(raw: &str, syntax: Syntax, span: Span) -> PResult<Module> {
    let lexer = Lexer::new(
        syntax,
        EsVersion::EsNext,
        StringInput::new(raw, span.lo, span.hi),
        None,
    );

    let mut parser = Parser::new_from(lexer);
    let module = parser.parse_module()?;

    // Recovered errors are still errors: a silently dropped binding
    // would surface as a runtime failure in the generated component
    if let Some(error) = parser.take_errors().into_iter().next() {
        return Err(error);
    }

    Ok(module)
}

pub fn parse_expr(raw: &str, syntax: Syntax, span: Span) -> PResult<Box<Expr>> {
    let lexer = Lexer::new(
        syntax,
        EsVersion::EsNext,
        StringInput::new(raw, span.lo, span.hi),
        None,
    );

    let mut parser = Parser::new_from(lexer);
    let expr = parser.parse_expr()?;

    if let Some(error) = parser.take_errors().into_iter().next() {
        return Err(error);
    }

    Ok(expr)
}
