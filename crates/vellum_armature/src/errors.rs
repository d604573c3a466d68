//! Template compile errors.

use serde::Serialize;
use thiserror::Error;

use crate::ast::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
pub enum ErrorCode {
    #[error("Duplicate attribute.")]
    DuplicateAttribute,
    #[error("Element is missing end tag.")]
    MissingEndTag,
    #[error("Invalid end tag.")]
    InvalidEndTag,
    #[error("Interpolation end sign was not found.")]
    MissingInterpolationEnd,
    #[error("Unexpected EOF in tag.")]
    EofInTag,
    #[error("Unexpected EOF in comment.")]
    EofInComment,
    #[error("Attribute value was expected.")]
    MissingAttributeValue,
    #[error("v-else/v-else-if has no adjacent v-if or v-else-if.")]
    VElseNoAdjacentIf,
}

/// A compile error with its location in the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[error("{code}")]
pub struct CompileError {
    pub code: ErrorCode,
    pub loc: SourceSpan,
}

impl CompileError {
    #[inline]
    pub fn new(code: ErrorCode, loc: SourceSpan) -> Self {
        Self { code, loc }
    }
}
