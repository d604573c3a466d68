//! Pug templates.
//!
//! The embedded `template` code is the pug text itself. For type checking,
//! the pug is expanded to HTML and parsed; offsets in that HTML resolve
//! back through the expansion mapper and the embedded code mapper.

mod compiler;

pub use compiler::{compile_pug, min_indent, PugOutput};

use once_cell::sync::Lazy;
use regex::Regex;
use vellum_armature::{parse_template, ErrorCode};
use vellum_carton::blank;
use vellum_mapping::{build_mappings, BuiltCode, CodeFeatures, Segment};
use vellum_sfc::{Sections, TemplateSection};

use super::{EmbeddedCodeId, LanguagePlugin};
use crate::error::PugError;
use crate::template::{RemappedTemplate, TemplateSource};
use crate::VirtualCode;

const WRAPPER_LINE: &str = "template\n";
const WRAPPER_OPEN: &str = "<template>";
const WRAPPER_CLOSE: &str = "</template>";

static CLASS_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^class\s*=").expect("class attribute pattern is valid"));

#[derive(Debug, Clone, Copy, Default)]
pub struct PugPlugin;

impl PugPlugin {
    /// `template\n` (when the content is indented) plus the content.
    fn embedded_template(section: &TemplateSection<'_>) -> BuiltCode {
        let mut segments = Vec::with_capacity(2);
        if min_indent(&section.content) != Some(0) {
            segments.push(Segment::text(WRAPPER_LINE));
        }
        segments.push(
            Segment::mapped(section.content.as_ref(), section.loc.start, CodeFeatures::ALL)
                .with_source_key(section.name.as_str()),
        );
        build_mappings(&segments)
    }

    /// Expand and parse a pug template.
    pub fn compile(section: &TemplateSection<'_>) -> Result<RemappedTemplate, PugError> {
        let embedded = Self::embedded_template(section);
        let wrapped = min_indent(&section.content) != Some(0);
        let PugOutput { mut html, mapper } = compile_pug(&embedded.text)?;

        if wrapped && html.starts_with(WRAPPER_OPEN) && html.ends_with(WRAPPER_CLOSE) {
            html.replace_range(..WRAPPER_OPEN.len(), &blank(WRAPPER_OPEN.len()));
            let close = html.len() - WRAPPER_CLOSE.len();
            html.replace_range(close.., &blank(WRAPPER_CLOSE.len()));
        }

        let mut parsed = parse_template(&html);
        // Shorthand classes next to a `class` attribute expand to two
        // `class` attributes
        parsed.errors.retain(|error| {
            error.code != ErrorCode::DuplicateAttribute
                || !html
                    .get(error.loc.start as usize..)
                    .is_some_and(|rest| CLASS_ATTRIBUTE.is_match(rest))
        });

        Ok(RemappedTemplate::new(parsed, mapper, embedded.mapper))
    }
}

impl LanguagePlugin for PugPlugin {
    fn identify_embedded(&self, _file_name: &str, sections: &Sections<'_>) -> Vec<EmbeddedCodeId> {
        match &sections.template {
            Some(template) if template.lang() == "pug" => {
                vec![EmbeddedCodeId::new("template", "pug")]
            }
            _ => Vec::new(),
        }
    }

    fn resolve_embedded(
        &self,
        _file_name: &str,
        sections: &Sections<'_>,
        id: &str,
    ) -> Option<VirtualCode> {
        let template = sections.template.as_ref().filter(|t| t.lang() == "pug")?;
        if id != "template" {
            return None;
        }
        Some(VirtualCode::new(id, "jade", Self::embedded_template(template)))
    }

    fn compile_template(
        &self,
        lang: &str,
        section: &TemplateSection<'_>,
    ) -> Option<Result<Box<dyn TemplateSource>, PugError>> {
        if lang != "pug" {
            return None;
        }
        Some(Self::compile(section).map(|template| Box::new(template) as Box<dyn TemplateSource>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_sfc::parse_sfc;

    #[test]
    fn test_embedded_code_adds_wrapper_line() {
        let source = "<template lang=\"pug\">\n  div\n</template>";
        let sections = parse_sfc(source);
        let code = PugPlugin
            .resolve_embedded("App.vue", &sections, "template")
            .unwrap();
        assert_eq!(code.text, "template\n\n  div\n");
        assert_eq!(code.to_document_offset(0), None);
        assert_eq!(code.to_document_offset(9), Some(21));
    }

    #[test]
    fn test_unindented_content_has_no_wrapper() {
        let sections = parse_sfc("<template lang=\"pug\">div</template>");
        let code = PugPlugin
            .resolve_embedded("App.vue", &sections, "template")
            .unwrap();
        assert_eq!(code.text, "div");
    }

    #[test]
    fn test_html_templates_are_ignored() {
        let sections = parse_sfc("<template><div/></template>");
        assert!(PugPlugin.identify_embedded("App.vue", &sections).is_empty());
        assert!(PugPlugin.resolve_embedded("App.vue", &sections, "template").is_none());
    }

    #[test]
    fn test_offsets_resolve_to_document() {
        let source = "<template lang=\"pug\">\n  p(:title=\"title\") {{ msg }}\n</template>";
        let sections = parse_sfc(source);
        let template = PugPlugin::compile(sections.template.as_ref().unwrap()).unwrap();
        let html = &template.ast().source;

        assert!(html.starts_with("          "));
        let title = html.find("\"title\"").unwrap() as u32 + 1;
        let resolved = template.resolve_offset(title).unwrap() as usize;
        assert_eq!(&source[resolved..resolved + 5], "title");

        let msg = html.find("msg").unwrap() as u32;
        let resolved = template.resolve_offset(msg).unwrap() as usize;
        assert_eq!(&source[resolved..resolved + 3], "msg");
    }

    #[test]
    fn test_shorthand_class_duplicate_is_suppressed() {
        let sections = parse_sfc("<template lang=\"pug\">\n  div.a(class=\"b\" id=\"x\" id=\"y\")\n</template>");
        let template = PugPlugin::compile(sections.template.as_ref().unwrap()).unwrap();
        let codes: Vec<ErrorCode> = template.errors().iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::DuplicateAttribute]);
        let error = template.errors()[0];
        assert!(template.ast().source[error.loc.start as usize..].starts_with("id=\"y\""));
    }

    #[test]
    fn test_compile_failure_is_reported() {
        let sections = parse_sfc("<template lang=\"pug\">\n  div(a=\"1\"\n</template>");
        let result = PugPlugin.compile_template("pug", sections.template.as_ref().unwrap());
        assert!(matches!(result, Some(Err(PugError::UnterminatedAttributes { .. } | PugError::UnterminatedString { .. }))));
    }
}
