//! Segments: the unit of generated output.
//!
//! Code generators never write text directly; they append segments, and the
//! [`MappingBuilder`](crate::MappingBuilder) turns the stream into text plus
//! mapped ranges in a single pass.

use std::borrow::Cow;

use vellum_carton::CompactString;

use crate::CodeFeatures;

/// One piece of generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text with no source correspondence.
    Text(Cow<'a, str>),
    /// Text optionally tied to a source offset.
    Mapped(MappedSegment<'a>),
}

/// Text tied to a source offset with a capability set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedSegment<'a> {
    /// Generated text
    pub text: Cow<'a, str>,
    /// Offset of the first byte of `text` in the source, `None` for purely
    /// synthetic text
    pub source: Option<u32>,
    /// Name of the source the offset refers to (e.g. `template`, `style_0`)
    pub source_key: Option<CompactString>,
    /// Features enabled on the resulting range
    pub features: CodeFeatures,
}

impl<'a> Segment<'a> {
    /// Literal text.
    #[inline]
    pub fn text(text: impl Into<Cow<'a, str>>) -> Self {
        Segment::Text(text.into())
    }

    /// Text mapped to `source` with the given features.
    #[inline]
    pub fn mapped(text: impl Into<Cow<'a, str>>, source: u32, features: CodeFeatures) -> Self {
        Segment::Mapped(MappedSegment {
            text: text.into(),
            source: Some(source),
            source_key: None,
            features,
        })
    }

    /// Text that carries features but has no source offset.
    #[inline]
    pub fn synthetic(text: impl Into<Cow<'a, str>>, features: CodeFeatures) -> Self {
        Segment::Mapped(MappedSegment {
            text: text.into(),
            source: None,
            source_key: None,
            features,
        })
    }

    /// Attach a source key. No-op on literal text.
    pub fn with_source_key(mut self, key: impl Into<CompactString>) -> Self {
        if let Segment::Mapped(ref mut mapped) = self {
            mapped.source_key = Some(key.into());
        }
        self
    }

    /// Generated text of this segment.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Mapped(mapped) => &mapped.text,
        }
    }

    /// Byte length of the generated text.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Source offset, if any.
    #[inline]
    pub fn source(&self) -> Option<u32> {
        match self {
            Segment::Text(_) => None,
            Segment::Mapped(mapped) => mapped.source,
        }
    }

    /// Convert borrowed text into an owned segment.
    pub fn into_owned(self) -> Segment<'static> {
        match self {
            Segment::Text(text) => Segment::Text(Cow::Owned(text.into_owned())),
            Segment::Mapped(mapped) => Segment::Mapped(MappedSegment {
                text: Cow::Owned(mapped.text.into_owned()),
                source: mapped.source,
                source_key: mapped.source_key,
                features: mapped.features,
            }),
        }
    }
}

impl<'a> From<&'a str> for Segment<'a> {
    #[inline]
    fn from(text: &'a str) -> Self {
        Segment::Text(Cow::Borrowed(text))
    }
}

impl From<String> for Segment<'_> {
    #[inline]
    fn from(text: String) -> Self {
        Segment::Text(Cow::Owned(text))
    }
}

/// Concatenate the text of a segment stream.
pub fn segments_to_string<'s, 'a: 's>(segments: impl IntoIterator<Item = &'s Segment<'a>>) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push_str(segment.as_str());
    }
    out
}
