//! Script code generation.
//!
//! Produces the TypeScript for one document: both scripts, the template
//! scaffolding and the compiled template, in a fixed order.

mod style;
mod template;

pub use style::{generate_style_modules, generate_style_scoped_classes};

use vellum_mapping::CodeFeatures;
use vellum_sfc::{
    parse_script_ranges, parse_script_setup_ranges, ScriptRanges, ScriptSection,
    ScriptSetupRanges, Sections, TextRange,
};

use crate::codes::{Codes, END_OF_LINE};
use crate::template::TemplateCodegen;
use crate::CompilerOptions;

/// Inputs of [`generate_script`].
#[derive(Debug, Clone)]
pub struct ScriptCodegenOptions<'a> {
    pub file_name: &'a str,
    pub sections: &'a Sections<'a>,
    pub compiler_options: &'a CompilerOptions,
    pub script_ranges: Option<ScriptRanges>,
    pub script_setup_ranges: Option<ScriptSetupRanges>,
    /// Compiled template; stand-in declarations are emitted without it
    pub template: Option<TemplateCodegen<'a>>,
}

impl<'a> ScriptCodegenOptions<'a> {
    /// Scan both scripts of `sections`.
    pub fn new(
        file_name: &'a str,
        sections: &'a Sections<'a>,
        compiler_options: &'a CompilerOptions,
        template: Option<TemplateCodegen<'a>>,
    ) -> Self {
        Self {
            file_name,
            sections,
            compiler_options,
            script_ranges: sections
                .script
                .as_ref()
                .map(|script| parse_script_ranges(&script.content)),
            script_setup_ranges: sections
                .script_setup
                .as_ref()
                .map(|script| parse_script_setup_ranges(&script.content)),
            template,
        }
    }

    #[inline]
    pub fn has_define_slots(&self) -> bool {
        self.script_setup_ranges
            .as_ref()
            .is_some_and(|ranges| ranges.define_slots.is_some())
    }

    /// `components` and `directives` option values of the default export.
    fn component_option_ranges(&self) -> (Option<TextRange>, Option<TextRange>) {
        match self
            .script_ranges
            .as_ref()
            .and_then(|ranges| ranges.export_default.as_ref())
        {
            Some(export) => (export.components_option, export.directives_option),
            None => (None, None),
        }
    }
}

/// Generate the script virtual code of a document.
pub fn generate_script<'a>(options: &ScriptCodegenOptions<'a>) -> Codes<'a> {
    let mut codes = Codes::new();
    let sections = options.sections;

    if let Some(path) = &options.compiler_options.global_types_path {
        codes.text(format!("/// <reference types=\"{path}\" />\n"));
    }

    match &sections.script {
        Some(script) => generate_script_section(&mut codes, script, options.script_ranges.as_ref()),
        None => generate_self_fallback(&mut codes),
    }

    if let Some(setup) = &sections.script_setup {
        generate_section_content(&mut codes, setup);
    }

    template::generate_template(&mut codes, options);

    codes.text("export default {} as typeof __VLS_self");
    codes.text(END_OF_LINE);
    codes
}

fn generate_script_section<'a>(
    codes: &mut Codes<'a>,
    script: &'a ScriptSection<'a>,
    ranges: Option<&ScriptRanges>,
) {
    let Some(export) = ranges.and_then(|ranges| ranges.export_default.as_ref()) else {
        generate_section_content(codes, script);
        generate_self_fallback(codes);
        return;
    };

    let content: &'a str = &script.content;
    let key = script.name.as_str();
    let base = script.loc.start;
    let len = content.len() as u32;

    codes.section_slice(content, key, base, 0, export.statement.start, CodeFeatures::ALL);
    codes.text("const __VLS_self = __VLS_defineComponent(");
    codes.section_slice(
        content,
        key,
        base,
        export.expression.start,
        export.expression.end,
        CodeFeatures::ALL,
    );
    codes.text(")");
    codes.text(END_OF_LINE);
    codes.section_slice(content, key, base, export.statement.end, len, CodeFeatures::ALL);
    if !content.ends_with('\n') && export.statement.end < len {
        codes.text("\n");
    }
}

/// Section content copied as is, newline terminated.
fn generate_section_content<'a>(codes: &mut Codes<'a>, script: &'a ScriptSection<'a>) {
    let content: &'a str = &script.content;
    codes.section_slice(
        content,
        &script.name,
        script.loc.start,
        0,
        content.len() as u32,
        CodeFeatures::ALL,
    );
    if !content.is_empty() && !content.ends_with('\n') {
        codes.text("\n");
    }
}

fn generate_self_fallback(codes: &mut Codes<'_>) {
    codes.text("const __VLS_self = __VLS_defineComponent({})");
    codes.text(END_OF_LINE);
}
