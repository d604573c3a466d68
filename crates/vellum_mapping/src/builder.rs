//! Mapping builder: segment stream to generated text plus mapped ranges.

use crate::{MappedRange, MappedSegment, Mapper, Segment};

/// Result of consuming a segment stream.
#[derive(Debug, Clone, Default)]
pub struct BuiltCode {
    /// Concatenated generated text
    pub text: String,
    /// Mapper over the emitted ranges
    pub mapper: Mapper,
    /// Bytes of generated text with no source correspondence
    pub unmapped_len: u32,
}

/// Accumulates segments into generated text and mapped ranges.
///
/// Ranges are emitted in stream order, so `generated_start` is
/// non-decreasing by construction.
#[derive(Debug, Default)]
pub struct MappingBuilder {
    text: String,
    ranges: Vec<MappedRange>,
    cursor: u32,
    unmapped_len: u32,
}

impl MappingBuilder {
    /// Create an empty builder.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with pre-allocated text capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            ranges: Vec::with_capacity(capacity / 16),
            ..Default::default()
        }
    }

    /// Current generated offset.
    #[inline]
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Append one segment.
    pub fn push(&mut self, segment: &Segment<'_>) {
        let text = segment.as_str();
        let len = text.len() as u32;

        match segment {
            Segment::Mapped(MappedSegment {
                source: Some(source),
                source_key,
                features,
                ..
            }) => {
                let mut range = MappedRange::new(self.cursor, *source, len, *features);
                range.source_key = source_key.clone();
                self.ranges.push(range);
            }
            _ => {
                self.unmapped_len += len;
            }
        }

        self.text.push_str(text);
        self.cursor += len;
    }

    /// Append every segment of a stream.
    pub fn extend<'s, 'a: 's>(&mut self, segments: impl IntoIterator<Item = &'s Segment<'a>>) {
        for segment in segments {
            self.push(segment);
        }
    }

    /// Finish building.
    pub fn finish(self) -> BuiltCode {
        BuiltCode {
            text: self.text,
            mapper: Mapper::new(self.ranges),
            unmapped_len: self.unmapped_len,
        }
    }
}

/// Build generated text and a mapper from a segment stream.
pub fn build_mappings<'s, 'a: 's>(segments: impl IntoIterator<Item = &'s Segment<'a>>) -> BuiltCode {
    let mut builder = MappingBuilder::new();
    builder.extend(segments);
    builder.finish()
}
