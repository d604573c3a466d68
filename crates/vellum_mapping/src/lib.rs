//! # vellum_mapping
//!
//! Offset mapping between generated virtual code and the document it was
//! generated from.
//!
//! ## Architecture
//!
//! ```text
//! Segment stream ──► MappingBuilder ──► (generated text, Mapper)
//!                                              │
//!                     Mapper (pug html) ─┐     │
//!                     Mapper (pug code) ─┼─► MappingComposer ──► original offset
//!                                        ┘
//! ```
//!
//! - [`Segment`]: one piece of generated output, optionally tied to a source
//!   offset and a [`CodeFeatures`] set.
//! - [`MappingBuilder`]: accumulates segments into text and [`MappedRange`]s.
//! - [`Mapper`]: bidirectional range index.
//! - [`MappingComposer`]: resolves offsets through a chain of mappers.

mod builder;
mod composer;
mod features;
mod mapper;
mod segment;

pub use builder::{build_mappings, BuiltCode, MappingBuilder};
pub use composer::{MappingComposer, NO_MAPPING};
pub use features::CodeFeatures;
pub use mapper::{MappedRange, Mapper};
pub use segment::{segments_to_string, MappedSegment, Segment};
