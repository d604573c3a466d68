//! Bidirectional range index between generated and source offsets.
//!
//! Maps positions between the original document and generated virtual code.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use vellum_carton::CompactString;

use crate::CodeFeatures;

/// A single mapped range.
///
/// Both sides are half-open `[start, end)`, but containment checks accept
/// the end boundary as well so that an offset sitting exactly at the end of a
/// range (a section end, a cursor after the last character) still resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedRange {
    /// Start offset in generated text
    pub generated_start: u32,
    /// End offset in generated text
    pub generated_end: u32,
    /// Start offset in the source
    pub source_start: u32,
    /// End offset in the source
    pub source_end: u32,
    /// Features enabled for this range
    pub features: CodeFeatures,
    /// Source the offsets refer to, if named
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_key: Option<CompactString>,
}

impl MappedRange {
    /// Create a range of equal length on both sides.
    #[inline]
    pub fn new(generated_start: u32, source_start: u32, len: u32, features: CodeFeatures) -> Self {
        Self {
            generated_start,
            generated_end: generated_start + len,
            source_start,
            source_end: source_start + len,
            features,
            source_key: None,
        }
    }

    /// Create a range whose two sides have different lengths.
    #[inline]
    pub fn with_lengths(
        generated_start: u32,
        generated_len: u32,
        source_start: u32,
        source_len: u32,
        features: CodeFeatures,
    ) -> Self {
        Self {
            generated_start,
            generated_end: generated_start + generated_len,
            source_start,
            source_end: source_start + source_len,
            features,
            source_key: None,
        }
    }

    /// Attach a source key.
    pub fn with_source_key(mut self, key: impl Into<CompactString>) -> Self {
        self.source_key = Some(key.into());
        self
    }

    #[inline]
    pub fn generated_len(&self) -> u32 {
        self.generated_end - self.generated_start
    }

    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_end - self.source_start
    }

    /// Check if the generated side contains the offset.
    #[inline]
    pub fn contains_generated(&self, offset: u32) -> bool {
        offset >= self.generated_start && offset <= self.generated_end
    }

    /// Check if the source side contains the offset.
    #[inline]
    pub fn contains_source(&self, offset: u32) -> bool {
        offset >= self.source_start && offset <= self.source_end
    }

    /// Map a generated offset to a source offset.
    ///
    /// The relative position is clamped to the source length.
    #[inline]
    pub fn generated_to_source(&self, offset: u32) -> Option<u32> {
        if !self.contains_generated(offset) {
            return None;
        }
        let relative = (offset - self.generated_start).min(self.source_len());
        Some(self.source_start + relative)
    }

    /// Map a source offset to a generated offset.
    ///
    /// The relative position is clamped to the generated length.
    #[inline]
    pub fn source_to_generated(&self, offset: u32) -> Option<u32> {
        if !self.contains_source(offset) {
            return None;
        }
        let relative = (offset - self.source_start).min(self.generated_len());
        Some(self.generated_start + relative)
    }
}

/// Candidate offsets returned by a lookup, each with the range that produced it.
pub type Candidates<'m> = SmallVec<[(u32, &'m MappedRange); 2]>;

/// Queryable index over mapped ranges.
///
/// Ranges are kept in non-decreasing `generated_start` order. A second index
/// orders them by `source_start`. Each index carries a running maximum of the
/// range ends so a lookup can stop scanning backwards as soon as no earlier
/// range can reach the offset.
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    /// Ranges sorted by generated start
    ranges: Vec<MappedRange>,
    /// Running max of `generated_end` along `ranges`
    generated_reach: Vec<u32>,
    /// Indices into `ranges` sorted by source start
    by_source: Vec<u32>,
    /// Running max of `source_end` along `by_source`
    source_reach: Vec<u32>,
}

impl Mapper {
    /// Create a mapper from ranges.
    ///
    /// The sort is stable, so ranges sharing a `generated_start` keep their
    /// emission order.
    pub fn new(mut ranges: Vec<MappedRange>) -> Self {
        ranges.sort_by_key(|r| r.generated_start);

        let mut generated_reach = Vec::with_capacity(ranges.len());
        let mut reach = 0;
        for range in &ranges {
            reach = reach.max(range.generated_end);
            generated_reach.push(reach);
        }

        let mut by_source: Vec<u32> = (0..ranges.len() as u32).collect();
        by_source.sort_by_key(|&i| ranges[i as usize].source_start);

        let mut source_reach = Vec::with_capacity(by_source.len());
        let mut reach = 0;
        for &i in &by_source {
            reach = reach.max(ranges[i as usize].source_end);
            source_reach.push(reach);
        }

        Self {
            ranges,
            generated_reach,
            by_source,
            source_reach,
        }
    }

    /// All ranges in generated order.
    #[inline]
    pub fn ranges(&self) -> &[MappedRange] {
        &self.ranges
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Source candidates for a generated offset, in generated order.
    pub fn to_source(&self, offset: u32) -> Candidates<'_> {
        self.to_source_for(offset, |_| true)
    }

    /// Generated candidates for a source offset, in generated order.
    pub fn to_generated(&self, offset: u32) -> Candidates<'_> {
        self.to_generated_for(offset, |_| true)
    }

    /// Source candidates restricted to ranges whose features pass `filter`.
    pub fn to_source_for(
        &self,
        offset: u32,
        filter: impl Fn(CodeFeatures) -> bool,
    ) -> Candidates<'_> {
        let upper = self
            .ranges
            .partition_point(|r| r.generated_start <= offset);

        let mut hits: Candidates<'_> = SmallVec::new();
        let mut i = upper;
        while i > 0 {
            i -= 1;
            if self.generated_reach[i] < offset {
                break;
            }
            let range = &self.ranges[i];
            if !filter(range.features) {
                continue;
            }
            if let Some(source) = range.generated_to_source(offset) {
                hits.push((source, range));
            }
        }
        hits.reverse();
        hits
    }

    /// Generated candidates restricted to ranges whose features pass `filter`.
    pub fn to_generated_for(
        &self,
        offset: u32,
        filter: impl Fn(CodeFeatures) -> bool,
    ) -> Candidates<'_> {
        let upper = self
            .by_source
            .partition_point(|&i| self.ranges[i as usize].source_start <= offset);

        let mut indices: SmallVec<[u32; 4]> = SmallVec::new();
        let mut k = upper;
        while k > 0 {
            k -= 1;
            if self.source_reach[k] < offset {
                break;
            }
            let index = self.by_source[k];
            let range = &self.ranges[index as usize];
            if filter(range.features) && range.contains_source(offset) {
                indices.push(index);
            }
        }
        indices.sort_unstable();

        indices
            .into_iter()
            .filter_map(|i| {
                let range = &self.ranges[i as usize];
                range.source_to_generated(offset).map(|g| (g, range))
            })
            .collect()
    }

    /// First source candidate for a generated offset.
    #[inline]
    pub fn first_source(&self, offset: u32) -> Option<u32> {
        self.to_source(offset).first().map(|(o, _)| *o)
    }

    /// First generated candidate for a source offset.
    #[inline]
    pub fn first_generated(&self, offset: u32) -> Option<u32> {
        self.to_generated(offset).first().map(|(o, _)| *o)
    }

    /// Map a generated range `[start, end)` to a source range.
    ///
    /// Both ends must resolve through ranges passing `filter`.
    pub fn generated_range_to_source(
        &self,
        start: u32,
        end: u32,
        filter: impl Fn(CodeFeatures) -> bool,
    ) -> Option<(u32, u32)> {
        let source_start = self.to_source_for(start, &filter).first()?.0;
        let source_end = self.to_source_for(end, &filter).first()?.0;
        (source_start <= source_end).then_some((source_start, source_end))
    }

    /// Map a source range `[start, end)` to a generated range.
    pub fn source_range_to_generated(
        &self,
        start: u32,
        end: u32,
        filter: impl Fn(CodeFeatures) -> bool,
    ) -> Option<(u32, u32)> {
        let generated_start = self.to_generated_for(start, &filter).first()?.0;
        let generated_end = self.to_generated_for(end, &filter).first()?.0;
        (generated_start <= generated_end).then_some((generated_start, generated_end))
    }
}
