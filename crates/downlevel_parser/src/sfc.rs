use downlevel_core::{
    downlevel_atom, RegionSpan, ScriptLang, SfcAttribute, SfcDescriptor, SfcScriptRegion,
    SfcTemplateRegion,
};
use swc_core::common::{BytePos, Span, DUMMY_SP};
use swc_ecma_parser::StringInput;
use swc_html_ast::{Child, DocumentFragment, DocumentMode, Element, Namespace};
use swc_html_parser::{
    lexer::Lexer,
    parser::{Parser, ParserConfig},
};

use crate::{
    comments::strip_comments,
    error::{ParseError, ParseErrorKind},
    script::{parse_module, recognize_lang, syntax_for_lang},
};

type SwcHtmlParserError = swc_html_parser::error::Error;

pub struct SfcParser<'a> {
    input: &'a str,
    id: Option<&'a str>,
}

impl<'a> SfcParser<'a> {
    pub fn new(input: &'a str, id: Option<&'a str>) -> SfcParser<'a> {
        SfcParser { input, id }
    }

    /// Locates the template and script regions of `self.input` and parses
    /// both script programs. `Err(ParseError)` means an unrecoverable
    /// structural or syntactic problem was discovered.
    pub fn parse_sfc(&mut self) -> Result<SfcDescriptor, ParseError> {
        // Tags inside comments must not confuse the region scan.
        // Stripping is length-preserving, so all spans of the stripped
        // parse are valid offsets into the original input.
        let stripped = strip_comments(self.input);

        let parsed_html = parse_html_document_fragment(&stripped).map_err(|e| {
            let kind = e.into_inner().1;

            ParseError {
                kind: ParseErrorKind::InvalidHtml(Box::new(kind)),
                span: Span::new(BytePos(1), BytePos(self.input.len() as u32 + 1)),
            }
        })?;

        let mut descriptor = SfcDescriptor {
            id: self.id.map(String::from),
            ..Default::default()
        };

        for root_node in parsed_html.children.into_iter() {
            // Only root elements are supported
            let Child::Element(root_element) = root_node else {
                continue;
            };

            let root_span = root_element.span;
            let tag_name = &root_element.tag_name;

            if tag_name.eq("template") {
                // First top-level template wins
                if descriptor.template.is_none() {
                    descriptor.template = self.extract_template_region(root_element);
                }
            } else if tag_name.eq("script") {
                let (region, is_setup) = self.extract_script_region(root_element);

                if is_setup {
                    if descriptor.script_setup.found {
                        return Err(ParseError {
                            kind: ParseErrorKind::DuplicateScriptSetup,
                            span: root_span,
                        });
                    }
                    descriptor.script_setup = region;
                } else {
                    if descriptor.script.found {
                        return Err(ParseError {
                            kind: ParseErrorKind::DuplicateScript,
                            span: root_span,
                        });
                    }
                    descriptor.script = region;
                }
            }
        }

        // When both regions exist, their declared languages must agree
        if descriptor.script.found
            && descriptor.script_setup.found
            && descriptor.script_setup.lang_attr() != descriptor.script.lang_attr()
        {
            return Err(ParseError {
                kind: ParseErrorKind::LangMismatch,
                span: region_swc_span(&descriptor.script.span),
            });
        }

        let raw_lang = descriptor
            .script_setup
            .lang_attr()
            .or_else(|| descriptor.script.lang_attr())
            .cloned();

        let lang = match recognize_lang(raw_lang.as_ref()) {
            Some(lang) => lang,
            None => {
                let declared_by = if descriptor.script_setup.lang_attr().is_some() {
                    &descriptor.script_setup
                } else {
                    &descriptor.script
                };

                return Err(ParseError {
                    kind: ParseErrorKind::UnsupportedLang(raw_lang.unwrap_or_default()),
                    span: region_swc_span(&declared_by.span),
                });
            }
        };

        self.parse_script_program(&mut descriptor.script_setup, lang)?;
        self.parse_script_program(&mut descriptor.script, lang)?;

        Ok(descriptor)
    }

    fn extract_script_region(&self, element: Element) -> (SfcScriptRegion, bool) {
        let mut is_setup = false;
        let mut attrs = Vec::with_capacity(element.attributes.len());

        for attr in element.attributes.into_iter() {
            if attr.name.eq("setup") {
                is_setup = true;
            }

            attrs.push(SfcAttribute {
                name: attr.name,
                value: attr.value,
            });
        }

        let start = element.span.lo.0 - 1;
        let end = element.span.hi.0 - 1;

        // `<script>` has a single text child unless it is empty
        let (content_start, content_end) = match element.children.first() {
            Some(Child::Text(text)) => (text.span.lo.0 - 1, text.span.hi.0 - 1),
            _ => (end, end),
        };

        let content = self
            .input
            .get(content_start as usize..content_end as usize)
            .unwrap_or_default()
            .to_string();

        (
            SfcScriptRegion {
                span: RegionSpan {
                    start,
                    end,
                    content_start,
                    content_end,
                },
                content,
                attrs,
                lang: ScriptLang::default(),
                found: true,
                program: downlevel_core::empty_module(),
            },
            is_setup,
        )
    }

    fn extract_template_region(&self, element: Element) -> Option<SfcTemplateRegion> {
        let lang = element
            .attributes
            .iter()
            .find_map(|attr| {
                if attr.name.eq("lang") {
                    attr.value.clone()
                } else {
                    None
                }
            })
            .unwrap_or_else(|| downlevel_atom!("html"));

        let start = element.span.lo.0 - 1;
        let end = element.span.hi.0 - 1;

        // <template> content technically lives in a separate fragment
        let children = element
            .content
            .as_ref()
            .map(|c| &c.children)
            .unwrap_or(&element.children);

        let (content_start, content_end) = match (children.first(), children.last()) {
            (Some(first), Some(last)) => (child_span(first).lo.0 - 1, child_span(last).hi.0 - 1),
            _ => (end, end),
        };

        let content = self
            .input
            .get(content_start as usize..content_end as usize)?
            .to_string();

        Some(SfcTemplateRegion {
            lang,
            content,
            span: RegionSpan {
                start,
                end,
                content_start,
                content_end,
            },
        })
    }

    fn parse_script_program(
        &self,
        region: &mut SfcScriptRegion,
        lang: ScriptLang,
    ) -> Result<(), ParseError> {
        region.lang = lang;

        let span = Span::new(
            BytePos(region.span.content_start + 1),
            BytePos(region.span.content_end + 1),
        );

        region.program = parse_module(&region.content, syntax_for_lang(lang), span)?;

        Ok(())
    }
}

/// Adapted from `swc_html_parser`
pub fn parse_html_document_fragment(input: &str) -> Result<DocumentFragment, SwcHtmlParserError> {
    let lexer = Lexer::new(StringInput::new(
        input,
        BytePos(1),
        BytePos(input.len() as u32 + 1),
    ));

    let parser_config = ParserConfig {
        scripting_enabled: false,
        iframe_srcdoc: false,
        ..Default::default()
    };
    let mut parser = Parser::new(lexer, parser_config);

    let ctx_element = Element {
        span: DUMMY_SP,
        tag_name: downlevel_atom!("div"),
        namespace: Namespace::HTML,
        attributes: vec![],
        children: vec![],
        content: None,
        is_self_closing: false,
    };

    parser.parse_document_fragment(ctx_element, DocumentMode::NoQuirks, None)
}

fn child_span(child: &Child) -> Span {
    match child {
        Child::DocumentType(d) => d.span,
        Child::Element(e) => e.span,
        Child::Text(t) => t.span,
        Child::Comment(c) => c.span,
    }
}

fn region_swc_span(region: &RegionSpan) -> Span {
    Span::new(BytePos(region.start + 1), BytePos(region.end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<SfcDescriptor, ParseError> {
        SfcParser::new(input, Some("test.vue")).parse_sfc()
    }

    #[test]
    fn it_locates_regions() {
        let input = "<template><div>{{ a }}</div></template>\n<script setup>const a = 1\n</script>";
        let sfc = parse(input).expect("Should parse");

        let template = sfc.template.expect("Should have template");
        assert_eq!("<div>{{ a }}</div>", template.content);
        assert_eq!(
            template.content,
            &input[template.span.content_start as usize..template.span.content_end as usize]
        );

        assert!(sfc.script_setup.found);
        assert!(!sfc.script.found);
        assert_eq!("const a = 1\n", sfc.script_setup.content);
        assert_eq!(
            "<script setup>",
            &input[sfc.script_setup.span.start as usize
                ..sfc.script_setup.span.content_start as usize]
        );
        assert!(input[..sfc.script_setup.span.end as usize].ends_with("</script>"));
        assert_eq!(1, sfc.script_setup.program.body.len());
    }

    #[test]
    fn it_tolerates_commented_out_tags() {
        let input = "<script setup>\n// </script>\nconst a = 1\n</script>";
        let sfc = parse(input).expect("Should parse");

        assert!(sfc.script_setup.found);
        assert!(sfc.script_setup.content.contains("const a = 1"));
    }

    #[test]
    fn it_reports_language_mismatch() {
        let err = parse("<script setup>const a = 1</script><script lang=\"ts\">export default {}</script>")
            .expect_err("Should fail");
        assert!(matches!(err.kind, ParseErrorKind::LangMismatch));
    }

    #[test]
    fn it_reports_unsupported_languages() {
        let err =
            parse("<script setup lang=\"coffee\">a = 1</script>").expect_err("Should fail");
        assert!(matches!(err.kind, ParseErrorKind::UnsupportedLang(_)));
    }

    #[test]
    fn it_parses_typescript_when_declared() {
        let sfc = parse("<script setup lang=\"ts\">const a: number = 1</script>")
            .expect("Should parse");
        assert_eq!(ScriptLang::Typescript, sfc.script_setup.lang);
        assert_eq!(1, sfc.script_setup.program.body.len());
    }

    #[test]
    fn it_handles_missing_regions() {
        let sfc = parse("<style>.a { color: red }</style>").expect("Should parse");
        assert!(sfc.template.is_none());
        assert!(!sfc.script.found);
        assert!(!sfc.script_setup.found);
        assert_eq!(RegionSpan::default(), sfc.script.span);
        assert!(sfc.script.program.body.is_empty());
    }

    #[test]
    fn it_keeps_template_lang() {
        let sfc = parse("<template lang=\"pug\">div hello</template>").expect("Should parse");
        let template = sfc.template.expect("Should have template");
        assert_eq!("pug", &template.lang);
        assert_eq!("div hello", template.content);
    }

    #[test]
    fn it_reports_duplicate_setup_regions() {
        let err = parse("<script setup>const a = 1</script><script setup>const b = 2</script>")
            .expect_err("Should fail");
        assert!(matches!(err.kind, ParseErrorKind::DuplicateScriptSetup));
    }
}
