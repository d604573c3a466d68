//! VitePress markdown pages.

use vellum_sfc::{parse_markdown, Sections};

use super::LanguagePlugin;
use crate::CompilerOptions;

#[derive(Debug, Clone, Default)]
pub struct MarkdownPlugin {
    options: CompilerOptions,
}

impl MarkdownPlugin {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }
}

impl LanguagePlugin for MarkdownPlugin {
    fn language_id(&self, file_name: &str) -> Option<&'static str> {
        self.options
            .is_markdown_file(file_name)
            .then_some("markdown")
    }

    fn is_valid_file(&self, _file_name: &str, lang: &str) -> bool {
        lang == "markdown"
    }

    fn parse_sections<'a>(
        &self,
        _file_name: &str,
        lang: &str,
        content: &'a str,
    ) -> Option<Sections<'a>> {
        (lang == "markdown").then(|| parse_markdown(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_sections() {
        let plugin = MarkdownPlugin::new(CompilerOptions::default());
        assert_eq!(plugin.language_id("guide/index.md"), Some("markdown"));
        assert_eq!(plugin.language_id("App.vue"), None);

        let content = "# Title\n\n<script setup>\nconst a = 1\n</script>\n\n{{ a }}\n";
        let sections = plugin.parse_sections("index.md", "markdown", content).unwrap();
        let setup = sections.script_setup.unwrap();
        assert_eq!(setup.content, "\nconst a = 1\n");
        assert_eq!(&content[setup.loc.start as usize..setup.loc.end as usize], "\nconst a = 1\n");
        assert!(sections.template.unwrap().content.contains("{{ a }}"));
        assert!(plugin.parse_sections("index.md", "vue", content).is_none());
    }
}
