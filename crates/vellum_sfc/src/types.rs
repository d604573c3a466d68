//! Section type definitions.
//!
//! Content is borrowed from the parsed text wherever possible.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;
use vellum_carton::{CompactString, FxHashMap};

/// Attributes of a section's opening tag.
pub type SectionAttrs<'a> = FxHashMap<Cow<'a, str>, Cow<'a, str>>;

/// Parsed document: every top-level section plus recovery diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sections<'a> {
    /// Template section
    #[serde(borrow)]
    pub template: Option<TemplateSection<'a>>,

    /// Plain `<script>` section
    #[serde(borrow)]
    pub script: Option<ScriptSection<'a>>,

    /// `<script setup>` section
    #[serde(borrow)]
    pub script_setup: Option<ScriptSection<'a>>,

    /// Style sections in document order
    #[serde(borrow)]
    pub styles: Vec<StyleSection<'a>>,

    /// Any other top-level element
    #[serde(borrow)]
    pub custom_blocks: Vec<CustomSection<'a>>,

    /// Problems recovered from while parsing
    pub diagnostics: Vec<SectionDiagnostic>,
}

impl<'a> Sections<'a> {
    /// Every section in a fixed order: template, script, script setup,
    /// styles, custom blocks.
    pub fn iter(&self) -> impl Iterator<Item = SectionView<'_>> {
        let template = self.template.iter().map(|t| SectionView {
            kind: SectionKind::Template,
            name: &t.name,
            lang: t.lang(),
            content: &t.content,
            loc: t.loc,
        });
        let scripts = self
            .script
            .iter()
            .chain(self.script_setup.iter())
            .map(|s| SectionView {
                kind: SectionKind::Script,
                name: &s.name,
                lang: s.lang(),
                content: &s.content,
                loc: s.loc,
            });
        let styles = self.styles.iter().map(|s| SectionView {
            kind: SectionKind::Style,
            name: &s.name,
            lang: s.lang(),
            content: &s.content,
            loc: s.loc,
        });
        let customs = self.custom_blocks.iter().map(|c| SectionView {
            kind: SectionKind::Custom,
            name: &c.name,
            lang: c.lang(),
            content: &c.content,
            loc: c.loc,
        });
        template.chain(scripts).chain(styles).chain(customs)
    }

    /// Look a section up by its source key.
    pub fn get(&self, name: &str) -> Option<SectionView<'_>> {
        self.iter().find(|s| s.name == name)
    }

    /// Convert to owned version
    pub fn into_owned(self) -> Sections<'static> {
        Sections {
            template: self.template.map(TemplateSection::into_owned),
            script: self.script.map(ScriptSection::into_owned),
            script_setup: self.script_setup.map(ScriptSection::into_owned),
            styles: self
                .styles
                .into_iter()
                .map(StyleSection::into_owned)
                .collect(),
            custom_blocks: self
                .custom_blocks
                .into_iter()
                .map(CustomSection::into_owned)
                .collect(),
            diagnostics: self.diagnostics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Template,
    Script,
    Style,
    Custom,
}

/// Uniform read-only view of any section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionView<'s> {
    pub kind: SectionKind,
    /// Source key (`template`, `script`, `scriptSetup`, `style_0`, ...)
    pub name: &'s str,
    pub lang: &'s str,
    pub content: &'s str,
    pub loc: BlockLocation,
}

/// Template section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSection<'a> {
    pub name: CompactString,

    #[serde(borrow)]
    pub content: Cow<'a, str>,

    pub loc: BlockLocation,

    /// Template language (default: html)
    #[serde(default, borrow)]
    pub lang: Option<Cow<'a, str>>,

    #[serde(default)]
    pub attrs: SectionAttrs<'a>,
}

impl<'a> TemplateSection<'a> {
    #[inline]
    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or("html")
    }

    pub fn into_owned(self) -> TemplateSection<'static> {
        TemplateSection {
            name: self.name,
            content: Cow::Owned(self.content.into_owned()),
            loc: self.loc,
            lang: self.lang.map(|s| Cow::Owned(s.into_owned())),
            attrs: owned_attrs(self.attrs),
        }
    }
}

/// Script section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSection<'a> {
    pub name: CompactString,

    #[serde(borrow)]
    pub content: Cow<'a, str>,

    pub loc: BlockLocation,

    /// Script language (default: js)
    #[serde(default, borrow)]
    pub lang: Option<Cow<'a, str>>,

    /// Whether this is `<script setup>`
    #[serde(default)]
    pub setup: bool,

    #[serde(default)]
    pub attrs: SectionAttrs<'a>,
}

impl<'a> ScriptSection<'a> {
    #[inline]
    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or("js")
    }

    pub fn into_owned(self) -> ScriptSection<'static> {
        ScriptSection {
            name: self.name,
            content: Cow::Owned(self.content.into_owned()),
            loc: self.loc,
            lang: self.lang.map(|s| Cow::Owned(s.into_owned())),
            setup: self.setup,
            attrs: owned_attrs(self.attrs),
        }
    }
}

/// Style section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSection<'a> {
    pub name: CompactString,

    #[serde(borrow)]
    pub content: Cow<'a, str>,

    pub loc: BlockLocation,

    /// Style language (default: css)
    #[serde(default, borrow)]
    pub lang: Option<Cow<'a, str>>,

    #[serde(default)]
    pub scoped: bool,

    /// CSS module name; a bare `module` attribute means `$style`
    #[serde(default, borrow)]
    pub module: Option<Cow<'a, str>>,

    /// `v-bind()` expressions, offsets relative to `content`
    #[serde(default)]
    pub bindings: Vec<StyleBinding>,

    /// Class selectors, offsets relative to `content`
    #[serde(default)]
    pub class_names: Vec<StyleClassName>,

    #[serde(default)]
    pub attrs: SectionAttrs<'a>,
}

impl<'a> StyleSection<'a> {
    #[inline]
    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or("css")
    }

    pub fn into_owned(self) -> StyleSection<'static> {
        StyleSection {
            name: self.name,
            content: Cow::Owned(self.content.into_owned()),
            loc: self.loc,
            lang: self.lang.map(|s| Cow::Owned(s.into_owned())),
            scoped: self.scoped,
            module: self.module.map(|s| Cow::Owned(s.into_owned())),
            bindings: self.bindings,
            class_names: self.class_names,
            attrs: owned_attrs(self.attrs),
        }
    }
}

/// Custom section (e.g. `<i18n>`, `<docs>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSection<'a> {
    pub name: CompactString,

    /// Tag name
    #[serde(rename = "type", borrow)]
    pub block_type: Cow<'a, str>,

    #[serde(borrow)]
    pub content: Cow<'a, str>,

    pub loc: BlockLocation,

    #[serde(default, borrow)]
    pub lang: Option<Cow<'a, str>>,

    #[serde(default)]
    pub attrs: SectionAttrs<'a>,
}

impl<'a> CustomSection<'a> {
    #[inline]
    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or("txt")
    }

    pub fn into_owned(self) -> CustomSection<'static> {
        CustomSection {
            name: self.name,
            block_type: Cow::Owned(self.block_type.into_owned()),
            content: Cow::Owned(self.content.into_owned()),
            loc: self.loc,
            lang: self.lang.map(|s| Cow::Owned(s.into_owned())),
            attrs: owned_attrs(self.attrs),
        }
    }
}

fn owned_attrs(attrs: SectionAttrs<'_>) -> SectionAttrs<'static> {
    attrs
        .into_iter()
        .map(|(k, v)| (Cow::Owned(k.into_owned()), Cow::Owned(v.into_owned())))
        .collect()
}

/// Content range of a section in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockLocation {
    /// Start offset of the content
    pub start: u32,
    /// End offset of the content
    pub end: u32,
}

impl BlockLocation {
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A `v-bind()` expression inside a style section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleBinding {
    /// Expression text without quotes
    pub text: CompactString,
    /// Offset of `text` within the style content
    pub offset: u32,
}

/// A class selector inside a style section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleClassName {
    /// Class name including the leading `.`
    pub text: CompactString,
    /// Offset of `text` within the style content
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    DuplicateTemplate,
    DuplicateScript,
    DuplicateScriptSetup,
    UnterminatedSection,
}

/// Non-fatal section parse problem.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct SectionDiagnostic {
    pub message: String,
    pub code: DiagnosticCode,
    /// Offending range in the document
    pub loc: BlockLocation,
}
