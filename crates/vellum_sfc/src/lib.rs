//! SFC - Section parsing for component documents.
//!
//! Splits a document into its template, script, style and custom sections.
//! Markdown pages go through [`normalize`] first so that only real embedded
//! elements become sections.

pub mod normalize;
pub mod parse;
pub mod script_ranges;
pub mod style;
pub mod types;

pub use normalize::{mask_markdown, parse_markdown};
pub use parse::parse_sfc;
pub use script_ranges::{
    parse_script_ranges, parse_script_setup_ranges, ExportDefault, ScriptRanges,
    ScriptSetupRanges, TextRange,
};
pub use style::{parse_class_names, parse_style_bindings};
pub use types::*;
