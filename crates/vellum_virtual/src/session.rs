//! Language session: turns a document into its virtual code tree.

use vellum_armature::CompileError;
use vellum_sfc::Sections;

use crate::plugins::{self, LanguagePlugin, Plugin};
use crate::script::{generate_script, ScriptCodegenOptions};
use crate::template::{generate_template, TemplateCodegenOptions, TemplateSource};
use crate::{CompilerOptions, VirtualCode};

/// Id of the generated TypeScript code.
pub const SCRIPT_CODE_ID: &str = "script_ts";

/// Compiler options plus the plugins that act on them.
#[derive(Debug, Clone)]
pub struct LanguageSession {
    options: CompilerOptions,
    plugins: Vec<Plugin>,
}

impl LanguageSession {
    pub fn new(options: CompilerOptions) -> Self {
        let plugins = Plugin::defaults(&options);
        Self { options, plugins }
    }

    pub fn with_plugins(options: CompilerOptions, plugins: Vec<Plugin>) -> Self {
        Self { options, plugins }
    }

    #[inline]
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    #[inline]
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Document language of `file_name`, from the first plugin that knows it.
    pub fn language_id(&self, file_name: &str) -> Option<&'static str> {
        self.plugins
            .iter()
            .find_map(|plugin| plugin.language_id(file_name))
    }

    /// Split a document with the first plugin that accepts it.
    pub fn parse_sections<'a>(&self, file_name: &str, content: &'a str) -> Option<Sections<'a>> {
        let lang = self.language_id(file_name)?;
        self.plugins
            .iter()
            .filter(|plugin| plugin.is_valid_file(file_name, lang))
            .find_map(|plugin| plugin.parse_sections(file_name, lang, content))
    }

    /// Build the virtual code tree of a document.
    ///
    /// The root maps the document onto itself. Its children are the
    /// generated TypeScript followed by every embedded code claimed by a
    /// plugin. `None` when no plugin handles the file.
    pub fn create_virtual_code(&self, file_name: &str, content: &str) -> Option<VirtualCode> {
        let lang = self.language_id(file_name)?;
        let sections = self.parse_sections(file_name, content)?;

        let mut root = VirtualCode::root(lang, content);
        let (script, template_errors) = self.generate_script_code(file_name, &sections);
        root.embedded.push(script);

        for mut code in plugins::resolve_embedded(&self.plugins, file_name, &sections) {
            if code.id == "template" {
                code.diagnostics = template_errors.clone();
            }
            root.embedded.push(code);
        }

        tracing::debug!(
            file_name,
            sections = sections.iter().count(),
            embedded = root.embedded.len(),
            "created virtual code"
        );
        Some(root)
    }

    /// Document offset of `offset` in the embedded code `id`.
    pub fn to_document_offset(&self, root: &VirtualCode, id: &str, offset: u32) -> Option<u32> {
        root.find(id)?.to_document_offset(offset)
    }

    /// Offset in the embedded code `id` of a document offset.
    pub fn to_generated_offset(&self, root: &VirtualCode, id: &str, offset: u32) -> Option<u32> {
        root.find(id)?.to_generated_offset(offset)
    }

    fn compile_template(
        &self,
        file_name: &str,
        sections: &Sections<'_>,
    ) -> Option<Box<dyn TemplateSource>> {
        let section = sections.template.as_ref()?;
        let lang = section.lang();
        let result = self
            .plugins
            .iter()
            .find_map(|plugin| plugin.compile_template(lang, section))?;

        match result {
            Ok(template) => Some(template),
            Err(error) => {
                tracing::warn!(
                    "template of {} ({}) could not be compiled: {}",
                    file_name,
                    lang,
                    error
                );
                None
            }
        }
    }

    fn generate_script_code(
        &self,
        file_name: &str,
        sections: &Sections<'_>,
    ) -> (VirtualCode, Vec<CompileError>) {
        let compiled = self.compile_template(file_name, sections);
        let mut options = ScriptCodegenOptions::new(file_name, sections, &self.options, None);

        let template_options = TemplateCodegenOptions {
            has_define_slots: options.has_define_slots(),
        };
        let template = compiled
            .as_deref()
            .map(|source| generate_template(source, template_options));
        let errors = template
            .as_ref()
            .map(|template| template.errors.clone())
            .unwrap_or_default();
        options.template = template;

        let codes = generate_script(&options);
        let built = codes.finish();
        tracing::debug!(
            file_name,
            segments = codes.len(),
            ranges = built.mapper.len(),
            "generated script"
        );

        (VirtualCode::new(SCRIPT_CODE_ID, "typescript", built), errors)
    }
}

impl Default for LanguageSession {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}
