//! The template analyzer: walks the parsed template markup and collects
//! which component tags, custom directives and free identifiers the
//! template references.

use std::borrow::Cow;

use downlevel_core::{
    camelize, is_builtin_directive, is_native_tag, pascalize, DownlevelAtom, ScriptLang,
    SfcTemplateRegion, TemplatePreprocessor, TemplateReferences,
};
use downlevel_parser::{
    parse_html_document_fragment, parse_module, syntax_for_lang, ParseError, ParseErrorKind,
};
use swc_core::common::{BytePos, Span};
use swc_html_ast::{Attribute, Child, Element, Text};

use crate::script::identifiers::{collect_module_item_usages, IdentSet};

/// Analyzes the template region. A missing template, a non-HTML dialect
/// without a preprocessor, or a failing preprocessor all yield an empty
/// reference set; a malformed binding expression fails the transform.
pub fn analyze_template(
    template: Option<&SfcTemplateRegion>,
    id: Option<&str>,
    preprocessor: Option<&TemplatePreprocessor>,
) -> Result<TemplateReferences, ParseError> {
    let Some(template) = template else {
        return Ok(TemplateReferences::default());
    };

    let markup: Cow<'_, str> = if template.lang.eq("html") {
        Cow::Borrowed(template.content.as_str())
    } else {
        match preprocessor {
            Some(preprocess) => match preprocess(&template.content, id) {
                Ok(compiled) => Cow::Owned(compiled),
                // A broken template dialect must not fail the transform
                Err(_) => return Ok(TemplateReferences::default()),
            },
            None => return Ok(TemplateReferences::default()),
        }
    };

    let wrapped = format!("<template>\n{}\n</template>", markup);

    let fragment = parse_html_document_fragment(&wrapped).map_err(|e| {
        let kind = e.into_inner().1;

        ParseError {
            kind: ParseErrorKind::InvalidHtml(Box::new(kind)),
            span: Span::new(BytePos(1), BytePos(wrapped.len() as u32 + 1)),
        }
    })?;

    let mut analyzer = TemplateAnalyzer {
        src: &wrapped,
        refs: TemplateReferences::default(),
    };

    for child in fragment.children.iter() {
        let Child::Element(root) = child else {
            continue;
        };

        if root.tag_name.eq("template") {
            analyzer.visit_element_children(root)?;
            break;
        }
    }

    Ok(analyzer.refs)
}

struct TemplateAnalyzer<'s> {
    /// The wrapped markup, used to recover original tag-name casing
    /// (the HTML parser lowercases names)
    src: &'s str,
    refs: TemplateReferences,
}

impl TemplateAnalyzer<'_> {
    fn visit_element_children(&mut self, element: &Element) -> Result<(), ParseError> {
        // <template> content technically lives in a separate fragment
        let children = element
            .content
            .as_ref()
            .map(|c| &c.children)
            .unwrap_or(&element.children);

        for child in children {
            match child {
                Child::Element(child_element) => self.visit_element(child_element)?,
                Child::Text(text) => self.visit_text(text)?,
                Child::Comment(_) | Child::DocumentType(_) => {}
            }
        }

        Ok(())
    }

    fn visit_element(&mut self, element: &Element) -> Result<(), ParseError> {
        let tag = self.raw_tag_name(element);

        if !is_native_tag(tag) {
            // Register both spellings so the merger can match either way
            let pascal_atom = DownlevelAtom::from(pascalize(tag));
            let raw_atom = DownlevelAtom::from(tag);
            self.refs.components.insert(pascal_atom);
            self.refs.components.insert(raw_atom);
        }

        for attr in element.attributes.iter() {
            self.visit_attribute(attr)?;
        }

        self.visit_element_children(element)
    }

    fn visit_attribute(&mut self, attr: &Attribute) -> Result<(), ParseError> {
        let raw_name: &str = attr.raw_name.as_deref().unwrap_or(&attr.name);

        let Some(directive) = split_directive(raw_name) else {
            // A literal `ref` attribute names a setup binding
            if attr.name.eq("ref") {
                if let Some(value) = &attr.value {
                    let value = value.trim();
                    if !value.is_empty() {
                        self.refs.identifiers.insert(DownlevelAtom::from(value));
                    }
                }
            }

            return Ok(());
        };

        if !is_builtin_directive(directive.name) {
            self.refs
                .directives
                .insert(DownlevelAtom::from(camelize(directive.name)));
        }

        // A dynamic `[argument]` is an expression
        if let Some(dynamic_arg) = directive.dynamic_arg {
            self.collect_expression(dynamic_arg, attr.span)?;
        }

        let Some(value) = &attr.value else {
            return Ok(());
        };

        if value.trim().is_empty() {
            return Ok(());
        }

        match directive.name {
            // Loop variables are bindings; only the iterable is analyzed
            "for" => {
                let source = iterable_source(value).unwrap_or(value);
                self.collect_expression(source, attr.span)?;
            }
            // A slot value is a binding pattern, not a usage.
            // Known limitation: names bound here are not subtracted from
            // descendant usage, so the identifier set over-approximates.
            "slot" => {}
            _ => self.collect_expression(value, attr.span)?,
        }

        Ok(())
    }

    /// Splits text into interpolations and analyzes each expression
    fn visit_text(&mut self, text: &Text) -> Result<(), ParseError> {
        let raw: &str = &text.data;
        let mut search_from = 0;

        while let Some(start_rel) = raw[search_from..].find("{{") {
            let expr_start = search_from + start_rel + 2;

            let Some(end_rel) = raw[expr_start..].find("}}") else {
                break;
            };
            let expr_end = expr_start + end_rel;

            let interpolation = &raw[expr_start..expr_end];
            let offset = text.span.lo.0 + expr_start as u32;
            let span = Span::new(BytePos(offset), BytePos(offset + interpolation.len() as u32));

            self.collect_expression(interpolation, span)?;

            search_from = expr_end + 2;
        }

        Ok(())
    }

    fn collect_expression(&mut self, raw: &str, span: Span) -> Result<(), ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        // Brace-first expressions would parse as blocks
        let wrapped;
        let to_parse: &str = if trimmed.starts_with('{') {
            wrapped = format!("({})", trimmed);
            &wrapped
        } else {
            trimmed
        };

        let module = parse_module(to_parse, syntax_for_lang(ScriptLang::Typescript), span)?;

        let mut usages = IdentSet::default();
        for item in module.body.iter() {
            collect_module_item_usages(item, &mut usages);
        }

        self.refs.identifiers.extend(usages);

        Ok(())
    }

    fn raw_tag_name<'a>(&'a self, element: &'a Element) -> &'a str {
        let fallback: &str = &element.tag_name;

        let Some(start) = (element.span.lo.0 as usize).checked_sub(1) else {
            return fallback;
        };
        let Some(rest) = self.src.get(start..) else {
            return fallback;
        };
        let Some(rest) = rest.strip_prefix('<') else {
            return fallback;
        };

        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
            .unwrap_or(rest.len());

        if end == 0 {
            fallback
        } else {
            &rest[..end]
        }
    }
}

struct SplitDirective<'n> {
    name: &'n str,
    dynamic_arg: Option<&'n str>,
}

/// Recognizes directive attributes: `@`, `:`, `.`, `#` shorthands and
/// the `v-name[:argument][.modifiers]` form.
fn split_directive(raw_name: &str) -> Option<SplitDirective<'_>> {
    let (name, arg_part): (&str, &str) = if let Some(rest) = raw_name.strip_prefix("v-") {
        if rest.is_empty() {
            return None;
        }

        match rest.find(|c: char| c == ':' || c == '.') {
            Some(0) => return None,
            Some(idx) if rest.as_bytes()[idx] == b':' => (&rest[..idx], &rest[idx + 1..]),
            // Modifiers directly after the name
            Some(idx) => (&rest[..idx], ""),
            None => (rest, ""),
        }
    } else if let Some(rest) = raw_name.strip_prefix('@') {
        ("on", rest)
    } else if let Some(rest) = raw_name.strip_prefix(':') {
        ("bind", rest)
    } else if let Some(rest) = raw_name.strip_prefix('.') {
        ("bind", rest)
    } else if let Some(rest) = raw_name.strip_prefix('#') {
        ("slot", rest)
    } else {
        return None;
    };

    let dynamic_arg = match arg_part.strip_prefix('[') {
        Some(stripped) => stripped.find(']').map(|end| &stripped[..end]),
        None => None,
    };

    Some(SplitDirective { name, dynamic_arg })
}

/// The text after the last top-level ` in `/` of ` separator of a
/// `v-for` expression. `None` when the expression has no separator.
fn iterable_source(raw: &str) -> Option<&str> {
    let idx = match (raw.rfind(" in "), raw.rfind(" of ")) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };

    let source = raw[idx + " in ".len()..].trim();
    if source.is_empty() {
        None
    } else {
        Some(source)
    }
}
