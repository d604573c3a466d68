//! Composition of mappers across transformation stages.
//!
//! A section that passes through a secondary compiler (pug into HTML, HTML
//! into host text) produces one mapper per stage. The composer chains them:
//! stage 0 translates the final generated space into its own source space,
//! every later stage translates the previous stage's source space further,
//! and the last stage lands in the original document.

use smallvec::SmallVec;

use crate::Mapper;

/// Sentinel returned by [`MappingComposer::resolve_or_sentinel`] when an
/// offset has no mapping.
pub const NO_MAPPING: i64 = -1;

type Offsets = SmallVec<[u32; 4]>;

/// Chain of mappers resolved end to end.
#[derive(Debug, Clone, Default)]
pub struct MappingComposer<'m> {
    stages: SmallVec<[&'m Mapper; 2]>,
}

impl<'m> MappingComposer<'m> {
    /// Create a composer from stages, outermost (final generated space) first.
    pub fn new(stages: impl IntoIterator<Item = &'m Mapper>) -> Self {
        Self {
            stages: stages.into_iter().collect(),
        }
    }

    /// Append a stage closer to the original document.
    pub fn then(mut self, mapper: &'m Mapper) -> Self {
        self.stages.push(mapper);
        self
    }

    #[inline]
    pub fn stages(&self) -> usize {
        self.stages.len()
    }

    /// Every original offset reachable from a final generated offset.
    ///
    /// The result is sorted and free of duplicates. If any stage yields no
    /// candidate the result is empty.
    pub fn candidates(&self, offset: u32) -> Offsets {
        let mut current: Offsets = SmallVec::from_slice(&[offset]);
        for mapper in &self.stages {
            let mut next: Offsets = SmallVec::new();
            for &o in &current {
                next.extend(mapper.to_source(o).into_iter().map(|(s, _)| s));
            }
            if next.is_empty() {
                return next;
            }
            next.sort_unstable();
            next.dedup();
            current = next;
        }
        current
    }

    /// Resolve a final generated offset to one original offset.
    ///
    /// When several candidates survive, the largest offset wins.
    pub fn resolve(&self, offset: u32) -> Option<u32> {
        self.candidates(offset).last().copied()
    }

    /// Like [`resolve`](Self::resolve), returning [`NO_MAPPING`] when
    /// there is no mapping.
    pub fn resolve_or_sentinel(&self, offset: u32) -> i64 {
        self.resolve(offset).map_or(NO_MAPPING, i64::from)
    }

    /// Every final generated offset reachable from an original offset.
    pub fn generated_candidates(&self, offset: u32) -> Offsets {
        let mut current: Offsets = SmallVec::from_slice(&[offset]);
        for mapper in self.stages.iter().rev() {
            let mut next: Offsets = SmallVec::new();
            for &o in &current {
                next.extend(mapper.to_generated(o).into_iter().map(|(g, _)| g));
            }
            if next.is_empty() {
                return next;
            }
            next.sort_unstable();
            next.dedup();
            current = next;
        }
        current
    }

    /// Resolve an original offset to the smallest final generated offset.
    pub fn resolve_generated(&self, offset: u32) -> Option<u32> {
        self.generated_candidates(offset).first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodeFeatures, MappedRange};

    #[test]
    fn test_single_stage() {
        let mapper = Mapper::new(vec![MappedRange::new(10, 0, 5, CodeFeatures::ALL)]);
        let composer = MappingComposer::new([&mapper]);
        assert_eq!(composer.resolve(12), Some(2));
        assert_eq!(composer.resolve(4), None);
        assert_eq!(composer.resolve_or_sentinel(4), NO_MAPPING);
    }

    #[test]
    fn test_two_stages() {
        // final -> intermediate
        let outer = Mapper::new(vec![MappedRange::new(100, 20, 10, CodeFeatures::ALL)]);
        // intermediate -> original
        let inner = Mapper::new(vec![MappedRange::new(20, 3, 10, CodeFeatures::ALL)]);
        let composer = MappingComposer::new([&outer]).then(&inner);
        assert_eq!(composer.stages(), 2);
        assert_eq!(composer.resolve(104), Some(7));
        assert_eq!(composer.resolve_generated(7), Some(104));
    }

    #[test]
    fn test_gap_in_middle_stage() {
        let outer = Mapper::new(vec![MappedRange::new(0, 50, 5, CodeFeatures::ALL)]);
        let inner = Mapper::new(vec![MappedRange::new(0, 0, 10, CodeFeatures::ALL)]);
        let composer = MappingComposer::new([&outer, &inner]);
        assert!(composer.candidates(2).is_empty());
        assert_eq!(composer.resolve_or_sentinel(2), -1);
    }

    #[test]
    fn test_max_candidate_wins() {
        let mapper = Mapper::new(vec![
            MappedRange::new(0, 40, 4, CodeFeatures::ALL),
            MappedRange::new(0, 10, 4, CodeFeatures::ALL),
        ]);
        let composer = MappingComposer::new([&mapper]);
        assert_eq!(composer.candidates(1).as_slice(), &[11, 41]);
        assert_eq!(composer.resolve(1), Some(41));
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let composer = MappingComposer::default();
        assert_eq!(composer.resolve(7), Some(7));
    }
}
