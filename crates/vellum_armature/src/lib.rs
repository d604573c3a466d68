//! Armature - The structural template parser for Vellum.
//!
//! Parses tag-delimited templates into an index-arena AST that keeps the
//! byte offsets of every tag, attribute, directive and interpolation.

pub mod ast;
pub mod errors;
pub mod parser;

pub use ast::*;
pub use errors::{CompileError, ErrorCode};
pub use parser::{parse_template, ParseResult};
