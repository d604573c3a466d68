//! Parsed templates as seen by the template code generator.

use std::cell::RefCell;

use vellum_armature::{parse_template, CompileError, ParseResult, TemplateAst};
use vellum_carton::FxHashMap;
use vellum_mapping::{Mapper, MappingComposer};

/// A parsed template plus the way back from its offsets to the document.
pub trait TemplateSource {
    fn ast(&self) -> &TemplateAst;

    /// Compile errors, in AST coordinates.
    fn errors(&self) -> &[CompileError];

    /// Document offset of an AST offset, if it has one.
    fn resolve_offset(&self, offset: u32) -> Option<u32>;

    /// An error translated to document coordinates. Errors whose start
    /// cannot be resolved are dropped; an unresolvable end collapses onto
    /// the start.
    fn document_error(&self, error: &CompileError) -> Option<CompileError> {
        let start = self.resolve_offset(error.loc.start)?;
        let end = self
            .resolve_offset(error.loc.end)
            .unwrap_or(start)
            .max(start);
        let mut error = *error;
        error.loc.start = start;
        error.loc.end = end;
        Some(error)
    }

    /// Every compile error in document coordinates.
    fn document_errors(&self) -> Vec<CompileError> {
        self.errors()
            .iter()
            .filter_map(|error| self.document_error(error))
            .collect()
    }
}

/// Template written directly as HTML. Offsets shift by the section start.
#[derive(Debug, Clone)]
pub struct HtmlTemplate {
    parsed: ParseResult,
    base: u32,
}

impl HtmlTemplate {
    pub fn new(content: &str, base: u32) -> Self {
        Self {
            parsed: parse_template(content),
            base,
        }
    }
}

impl TemplateSource for HtmlTemplate {
    #[inline]
    fn ast(&self) -> &TemplateAst {
        &self.parsed.ast
    }

    #[inline]
    fn errors(&self) -> &[CompileError] {
        &self.parsed.errors
    }

    #[inline]
    fn resolve_offset(&self, offset: u32) -> Option<u32> {
        (offset as usize <= self.parsed.ast.source.len()).then(|| self.base + offset)
    }
}

/// Template produced by a secondary compiler.
///
/// Offsets are resolved through `[html → intermediate, intermediate →
/// document]`, taking the largest candidate. Lookups are cached per
/// instance.
#[derive(Debug)]
pub struct RemappedTemplate {
    parsed: ParseResult,
    html_map: Mapper,
    embedded_map: Mapper,
    cache: RefCell<FxHashMap<u32, Option<u32>>>,
}

impl RemappedTemplate {
    pub fn new(parsed: ParseResult, html_map: Mapper, embedded_map: Mapper) -> Self {
        Self {
            parsed,
            html_map,
            embedded_map,
            cache: RefCell::new(FxHashMap::default()),
        }
    }
}

impl TemplateSource for RemappedTemplate {
    #[inline]
    fn ast(&self) -> &TemplateAst {
        &self.parsed.ast
    }

    #[inline]
    fn errors(&self) -> &[CompileError] {
        &self.parsed.errors
    }

    fn resolve_offset(&self, offset: u32) -> Option<u32> {
        if let Some(cached) = self.cache.borrow().get(&offset) {
            return *cached;
        }
        let resolved =
            MappingComposer::new([&self.html_map, &self.embedded_map]).resolve(offset);
        self.cache.borrow_mut().insert(offset, resolved);
        resolved
    }
}
