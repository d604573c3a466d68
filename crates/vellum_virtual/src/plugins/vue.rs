//! Component documents and petite-vue HTML pages.

use std::borrow::Cow;

use vellum_carton::CompactString;
use vellum_sfc::{parse_sfc, BlockLocation, Sections, TemplateSection};

use super::{EmbeddedCodeId, LanguagePlugin};
use crate::error::PugError;
use crate::template::{HtmlTemplate, TemplateSource};
use crate::{CompilerOptions, VirtualCode};

#[derive(Debug, Clone, Default)]
pub struct VuePlugin {
    options: CompilerOptions,
}

impl VuePlugin {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }
}

/// A petite-vue page is one big template.
fn petite_sections(content: &str) -> Sections<'_> {
    Sections {
        template: Some(TemplateSection {
            name: CompactString::new("template"),
            content: Cow::Borrowed(content),
            loc: BlockLocation::new(0, content.len() as u32),
            lang: None,
            attrs: Default::default(),
        }),
        ..Default::default()
    }
}

impl LanguagePlugin for VuePlugin {
    fn language_id(&self, file_name: &str) -> Option<&'static str> {
        if self.options.is_component_file(file_name) {
            Some("vue")
        } else if self.options.is_petite_vue_file(file_name) {
            Some("html")
        } else {
            None
        }
    }

    fn is_valid_file(&self, file_name: &str, lang: &str) -> bool {
        match lang {
            "vue" => true,
            "html" => self.options.is_petite_vue_file(file_name),
            _ => false,
        }
    }

    fn parse_sections<'a>(
        &self,
        file_name: &str,
        lang: &str,
        content: &'a str,
    ) -> Option<Sections<'a>> {
        match lang {
            "vue" => Some(parse_sfc(content)),
            "html" if self.options.is_petite_vue_file(file_name) => Some(petite_sections(content)),
            _ => None,
        }
    }

    fn identify_embedded(&self, _file_name: &str, sections: &Sections<'_>) -> Vec<EmbeddedCodeId> {
        let mut ids = Vec::with_capacity(1 + sections.styles.len() + sections.custom_blocks.len());
        if let Some(template) = sections.template.as_ref().filter(|t| t.lang() == "html") {
            ids.push(EmbeddedCodeId::new(template.name.clone(), "html"));
        }
        for style in &sections.styles {
            ids.push(EmbeddedCodeId::new(style.name.clone(), style.lang()));
        }
        for block in &sections.custom_blocks {
            ids.push(EmbeddedCodeId::new(block.name.clone(), block.lang()));
        }
        ids
    }

    fn resolve_embedded(
        &self,
        _file_name: &str,
        sections: &Sections<'_>,
        id: &str,
    ) -> Option<VirtualCode> {
        if id == "template" {
            let template = sections.template.as_ref().filter(|t| t.lang() == "html")?;
            return Some(VirtualCode::from_section(
                id,
                "html",
                &template.content,
                template.loc,
                &template.name,
            ));
        }
        let section = sections.get(id)?;
        if section.kind == vellum_sfc::SectionKind::Script {
            return None;
        }
        Some(VirtualCode::from_section(
            id,
            section.lang,
            section.content,
            section.loc,
            section.name,
        ))
    }

    fn compile_template(
        &self,
        lang: &str,
        section: &TemplateSection<'_>,
    ) -> Option<Result<Box<dyn TemplateSource>, PugError>> {
        if lang != "html" {
            return None;
        }
        let template = HtmlTemplate::new(&section.content, section.loc.start);
        Some(Ok(Box::new(template)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin() -> VuePlugin {
        VuePlugin::new(CompilerOptions::default())
    }

    #[test]
    fn test_language_ids() {
        assert_eq!(plugin().language_id("App.vue"), Some("vue"));
        assert_eq!(plugin().language_id("index.html"), Some("html"));
        assert_eq!(plugin().language_id("README.md"), None);
        assert!(plugin().is_valid_file("index.html", "html"));
        assert!(!plugin().is_valid_file("index.htm", "html"));
    }

    #[test]
    fn test_petite_page_is_a_template() {
        let content = "<div v-scope>{{ count }}</div>";
        let sections = plugin().parse_sections("index.html", "html", content).unwrap();
        let template = sections.template.unwrap();
        assert_eq!(template.content, content);
        assert_eq!((template.loc.start, template.loc.end), (0, content.len() as u32));
    }

    #[test]
    fn test_resolve_style() {
        let source = "<template></template>\n<style scoped>.a { color: red }</style>";
        let sections = parse_sfc(source);
        let code = plugin().resolve_embedded("App.vue", &sections, "style_0").unwrap();
        assert_eq!(code.language_id, "css");
        assert_eq!(code.text, ".a { color: red }");
        let start = source.find(".a").unwrap() as u32;
        assert_eq!(code.to_document_offset(0), Some(start));
    }

    #[test]
    fn test_scripts_are_not_embedded() {
        let sections = parse_sfc("<script setup>const a = 1</script>");
        assert!(plugin().identify_embedded("App.vue", &sections).is_empty());
        assert!(plugin().resolve_embedded("App.vue", &sections, "scriptSetup").is_none());
    }

    #[test]
    fn test_html_template_offsets() {
        let source = "<template><p>{{ a }}</p></template>";
        let sections = parse_sfc(source);
        let template = plugin()
            .compile_template("html", sections.template.as_ref().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(template.resolve_offset(0), Some(10));
        assert!(plugin().compile_template("pug", sections.template.as_ref().unwrap()).is_none());
    }
}
