use text_size::TextSize;

use crate::{ByteOffset, Span};

/// A single mapping from a generated span to an original span.
/// Both spans have the same length: only verbatim copies are mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub generated: Span,
    pub original: Span,
}

/// Maps positions in generated output back to the original source.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    /// Sorted by generated position
    mappings: Vec<Mapping>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SourceMapBuilder {
        SourceMapBuilder::new()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn mappings(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.iter()
    }

    /// Finds the original position of a generated position.
    /// `None` when the position falls into synthesized text.
    pub fn original_position(&self, generated: ByteOffset) -> Option<ByteOffset> {
        let mapping = self.find_mapping_for_generated(generated)?;
        let offset_in_span = u32::from(generated) - u32::from(mapping.generated.start);

        Some(mapping.original.start + TextSize::from(offset_in_span))
    }

    /// Finds the generated position of an original position.
    /// `None` when the original position was overwritten or deleted.
    pub fn generated_position(&self, original: ByteOffset) -> Option<ByteOffset> {
        for mapping in &self.mappings {
            if mapping.original.contains(original) {
                let offset_in_span = u32::from(original) - u32::from(mapping.original.start);
                return Some(mapping.generated.start + TextSize::from(offset_in_span));
            }
        }
        None
    }

    fn find_mapping_for_generated(&self, generated: ByteOffset) -> Option<&Mapping> {
        let idx = match self
            .mappings
            .binary_search_by(|m| m.generated.start.cmp(&generated))
        {
            Ok(idx) => idx,
            Err(idx) => idx.checked_sub(1)?,
        };

        self.mappings
            .get(idx)
            .filter(|m| m.generated.contains(generated))
    }
}

/// Builds a [`SourceMap`] while generated output is assembled
/// front to back.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    mappings: Vec<Mapping>,
    /// Current position in the generated output
    generated_offset: ByteOffset,
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn generated_offset(&self) -> ByteOffset {
        self.generated_offset
    }

    /// Records a verbatim copy of `text` taken from `original_start`.
    pub fn add_source(&mut self, original_start: ByteOffset, text: &str) {
        let len = text.len() as u32;
        if len == 0 {
            return;
        }

        let generated_start = self.generated_offset;
        let generated_end = generated_start + TextSize::from(len);

        self.mappings.push(Mapping {
            generated: Span::new(generated_start, generated_end),
            original: Span::new(original_start, original_start + TextSize::from(len)),
        });

        self.generated_offset = generated_end;
    }

    /// Records synthesized text without an original position.
    pub fn add_generated(&mut self, text: &str) {
        self.generated_offset += TextSize::from(text.len() as u32);
    }

    pub fn build(mut self) -> SourceMap {
        self.mappings.sort_by_key(|m| m.generated.start);
        SourceMap {
            mappings: self.mappings,
        }
    }
}
