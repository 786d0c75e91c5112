//! The region splicer: replaces the script regions of the original text
//! with the merged block, leaving every byte outside the touched spans
//! untouched, and produces a source map for the result.

use downlevel_core::{SfcAttribute, SfcDescriptor};
use downlevel_sourcemap::{ByteOffset, SourceMap, SourceMapBuilder};

pub struct SplicedOutput {
    pub code: String,
    pub map: SourceMap,
}

/// Deletes the plain-script region, overwrites the setup region with the
/// new `<script>` block (or prepends the block when no setup region
/// exists) and maps all untouched spans 1:1.
pub fn splice_script_regions(
    original: &str,
    descriptor: &SfcDescriptor,
    generated_code: &str,
) -> SplicedOutput {
    let attrs = merged_attributes(descriptor);
    let attr_text = attributes_text(&attrs);

    let block = if attr_text.is_empty() {
        format!("<script>\n{}\n</script>", generated_code)
    } else {
        format!("<script {}>\n{}\n</script>", attr_text, generated_code)
    };

    // Edits over the original text, ordered by start offset
    let mut edits: Vec<(u32, u32, &str)> = Vec::with_capacity(2);

    if descriptor.script.found {
        edits.push((descriptor.script.span.start, descriptor.script.span.end, ""));
    }

    let prepended;
    if descriptor.script_setup.found {
        edits.push((
            descriptor.script_setup.span.start,
            descriptor.script_setup.span.end,
            &block,
        ));
    } else {
        prepended = format!("{}\n", block);
        edits.push((0, 0, &prepended));
    }

    edits.sort_by_key(|(start, _, _)| *start);

    let mut out = String::with_capacity(original.len() + block.len());
    let mut builder = SourceMapBuilder::new();
    let mut cursor: u32 = 0;

    for (start, end, replacement) in edits {
        let untouched = &original[cursor as usize..start as usize];
        builder.add_source(ByteOffset::from(cursor), untouched);
        out.push_str(untouched);

        if !replacement.is_empty() {
            builder.add_generated(replacement);
            out.push_str(replacement);
        }

        cursor = end;
    }

    let rest = &original[cursor as usize..];
    builder.add_source(ByteOffset::from(cursor), rest);
    out.push_str(rest);

    SplicedOutput {
        code: out,
        map: builder.build(),
    }
}

/// Union of both regions' attributes: plain-script attributes first,
/// setup-region values overriding them, the setup marker removed.
fn merged_attributes(descriptor: &SfcDescriptor) -> Vec<SfcAttribute> {
    let mut merged: Vec<SfcAttribute> = vec![];

    let attrs = descriptor
        .script
        .attrs
        .iter()
        .chain(descriptor.script_setup.attrs.iter());

    for attr in attrs {
        if attr.name.eq("setup") {
            continue;
        }

        match merged.iter_mut().find(|existing| existing.name == attr.name) {
            Some(existing) => existing.value = attr.value.clone(),
            None => merged.push(attr.clone()),
        }
    }

    merged
}

fn attributes_text(attrs: &[SfcAttribute]) -> String {
    attrs
        .iter()
        .map(|attr| match &attr.value {
            Some(value) if !value.is_empty() => format!("{}=\"{}\"", attr.name, value),
            _ => attr.name.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
