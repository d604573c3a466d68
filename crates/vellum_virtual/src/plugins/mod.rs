//! Language plugins.
//!
//! A plugin recognizes documents, splits them into sections and decides
//! which sections become embedded codes. The session asks every plugin in
//! order; for embedded codes the first plugin to claim an id wins.

mod markdown;
pub mod pug;
mod vue;

pub use markdown::MarkdownPlugin;
pub use pug::PugPlugin;
pub use vue::VuePlugin;

use serde::Serialize;
use vellum_carton::CompactString;
use vellum_sfc::{Sections, TemplateSection};

use crate::error::PugError;
use crate::template::TemplateSource;
use crate::{CompilerOptions, VirtualCode};

/// An embedded code a plugin can produce for a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EmbeddedCodeId {
    pub id: CompactString,
    pub lang: CompactString,
}

impl EmbeddedCodeId {
    #[inline]
    pub fn new(id: impl Into<CompactString>, lang: impl Into<CompactString>) -> Self {
        Self {
            id: id.into(),
            lang: lang.into(),
        }
    }
}

/// Capabilities of a language plugin. Every hook is optional.
pub trait LanguagePlugin {
    /// Document language of `file_name`, if this plugin owns it.
    fn language_id(&self, _file_name: &str) -> Option<&'static str> {
        None
    }

    fn is_valid_file(&self, _file_name: &str, _lang: &str) -> bool {
        false
    }

    fn parse_sections<'a>(
        &self,
        _file_name: &str,
        _lang: &str,
        _content: &'a str,
    ) -> Option<Sections<'a>> {
        None
    }

    fn identify_embedded(&self, _file_name: &str, _sections: &Sections<'_>) -> Vec<EmbeddedCodeId> {
        Vec::new()
    }

    fn resolve_embedded(
        &self,
        _file_name: &str,
        _sections: &Sections<'_>,
        _id: &str,
    ) -> Option<VirtualCode> {
        None
    }

    /// Parse a template written in `lang`. `None` when the plugin does not
    /// handle that language.
    fn compile_template(
        &self,
        _lang: &str,
        _section: &TemplateSection<'_>,
    ) -> Option<Result<Box<dyn TemplateSource>, PugError>> {
        None
    }
}

/// The plugins a session can load.
#[derive(Debug, Clone)]
pub enum Plugin {
    Vue(VuePlugin),
    Markdown(MarkdownPlugin),
    Pug(PugPlugin),
}

impl Plugin {
    /// The default plugin set for `options`.
    pub fn defaults(options: &CompilerOptions) -> Vec<Plugin> {
        vec![
            Plugin::Vue(VuePlugin::new(options.clone())),
            Plugin::Markdown(MarkdownPlugin::new(options.clone())),
            Plugin::Pug(PugPlugin),
        ]
    }

    #[inline]
    fn inner(&self) -> &dyn LanguagePlugin {
        match self {
            Plugin::Vue(plugin) => plugin,
            Plugin::Markdown(plugin) => plugin,
            Plugin::Pug(plugin) => plugin,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Plugin::Vue(_) => "vue",
            Plugin::Markdown(_) => "markdown",
            Plugin::Pug(_) => "pug",
        }
    }
}

impl LanguagePlugin for Plugin {
    fn language_id(&self, file_name: &str) -> Option<&'static str> {
        self.inner().language_id(file_name)
    }

    fn is_valid_file(&self, file_name: &str, lang: &str) -> bool {
        self.inner().is_valid_file(file_name, lang)
    }

    fn parse_sections<'a>(
        &self,
        file_name: &str,
        lang: &str,
        content: &'a str,
    ) -> Option<Sections<'a>> {
        self.inner().parse_sections(file_name, lang, content)
    }

    fn identify_embedded(&self, file_name: &str, sections: &Sections<'_>) -> Vec<EmbeddedCodeId> {
        self.inner().identify_embedded(file_name, sections)
    }

    fn resolve_embedded(
        &self,
        file_name: &str,
        sections: &Sections<'_>,
        id: &str,
    ) -> Option<VirtualCode> {
        self.inner().resolve_embedded(file_name, sections, id)
    }

    fn compile_template(
        &self,
        lang: &str,
        section: &TemplateSection<'_>,
    ) -> Option<Result<Box<dyn TemplateSource>, PugError>> {
        self.inner().compile_template(lang, section)
    }
}

/// Embedded codes claimed by `plugins`, first claim per id wins.
pub fn identify_embedded(
    plugins: &[Plugin],
    file_name: &str,
    sections: &Sections<'_>,
) -> Vec<(usize, EmbeddedCodeId)> {
    let mut claimed: Vec<(usize, EmbeddedCodeId)> = Vec::new();
    for (index, plugin) in plugins.iter().enumerate() {
        for embedded in plugin.identify_embedded(file_name, sections) {
            if claimed.iter().all(|(_, seen)| seen.id != embedded.id) {
                claimed.push((index, embedded));
            }
        }
    }
    claimed
}

/// Resolve every embedded code claimed by `plugins`, in claim order.
pub fn resolve_embedded(plugins: &[Plugin], file_name: &str, sections: &Sections<'_>) -> Vec<VirtualCode> {
    identify_embedded(plugins, file_name, sections)
        .into_iter()
        .filter_map(|(index, embedded)| {
            plugins[index].resolve_embedded(file_name, sections, &embedded.id)
        })
        .collect()
}
