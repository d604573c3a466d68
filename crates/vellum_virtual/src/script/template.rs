//! Template-facing scaffolding inside the script: the context object, the
//! element, component and directive registries, and the template body.

use std::borrow::Cow;

use vellum_mapping::CodeFeatures;

use super::style::{generate_style_modules, generate_style_scoped_classes};
use super::ScriptCodegenOptions;
use crate::codes::{generate_spread_merge, Codes, END_OF_LINE, NEW_LINE};
use crate::template::{generate_interpolation, ClassReference, TemplateCodegenContext};

pub fn generate_template<'a>(codes: &mut Codes<'a>, options: &ScriptCodegenOptions<'a>) {
    generate_template_ctx(codes, options);
    generate_template_elements(codes);
    generate_template_components(codes, options);
    generate_template_directives(codes, options);
    generate_template_body(codes, options);
}

fn generate_template_ctx<'a>(codes: &mut Codes<'a>, options: &ScriptCodegenOptions<'a>) {
    let mut exps: Vec<Cow<'a, str>> =
        vec![Cow::Borrowed("{} as InstanceType<__VLS_PickNotAny<typeof __VLS_self, new () => {}>>")];

    if options.compiler_options.is_petite_vue_file(options.file_name) {
        exps.push(Cow::Borrowed("globalThis"));
    }
    if options.sections.styles.iter().any(|style| style.module.is_some()) {
        exps.push(Cow::Borrowed("{} as __VLS_StyleModules"));
    }

    codes.text("const __VLS_ctx = ");
    generate_spread_merge(codes, &exps);
    codes.text(END_OF_LINE);
}

fn generate_template_elements(codes: &mut Codes<'_>) {
    codes.text("let __VLS_elements!: __VLS_IntrinsicElements");
    codes.text(END_OF_LINE);
}

fn generate_template_components<'a>(codes: &mut Codes<'a>, options: &ScriptCodegenOptions<'a>) {
    let mut types = vec!["typeof __VLS_ctx"];

    let sections = options.sections;
    if let (Some(script), Some(option)) = (&sections.script, options.component_option_ranges().0) {
        codes.text("const __VLS_componentsOption = ");
        codes.section_slice(
            &script.content,
            &script.name,
            script.loc.start,
            option.start,
            option.end,
            CodeFeatures::NAVIGATION,
        );
        codes.text(END_OF_LINE);
        types.push("typeof __VLS_componentsOption");
    }

    codes.text(format!("type __VLS_LocalComponents = {}", types.join(" & ")));
    codes.text(END_OF_LINE);
    codes.text("let __VLS_components!: __VLS_LocalComponents & __VLS_GlobalComponents");
    codes.text(END_OF_LINE);
}

fn generate_template_directives<'a>(codes: &mut Codes<'a>, options: &ScriptCodegenOptions<'a>) {
    let mut types = vec!["typeof __VLS_ctx"];

    let sections = options.sections;
    if let (Some(script), Some(option)) = (&sections.script, options.component_option_ranges().1) {
        codes.text("const __VLS_directivesOption = ");
        codes.section_slice(
            &script.content,
            &script.name,
            script.loc.start,
            option.start,
            option.end,
            CodeFeatures::NAVIGATION,
        );
        codes.text(END_OF_LINE);
        types.push("__VLS_ResolveDirectives<typeof __VLS_directivesOption>");
    }

    codes.text(format!("type __VLS_LocalDirectives = {}", types.join(" & ")));
    codes.text(END_OF_LINE);
    codes.text("let __VLS_directives!: __VLS_LocalDirectives & __VLS_GlobalDirectives");
    codes.text(END_OF_LINE);
}

fn generate_template_body<'a>(codes: &mut Codes<'a>, options: &ScriptCodegenOptions<'a>) {
    let sections = options.sections;
    let styles = &sections.styles;
    generate_style_scoped_classes(codes, styles);
    if let Some(template) = &options.template {
        generate_style_scoped_class_references(codes, &template.class_references);
    }
    generate_style_modules(codes, styles);
    generate_css_vars(codes, options);

    match &options.template {
        Some(template) => codes.append(template.codes.clone()),
        None => {
            if !options.has_define_slots() {
                codes.text("type __VLS_Slots = {}");
                codes.text(END_OF_LINE);
            }
            codes.text("type __VLS_InheritedAttrs = {}");
            codes.text(END_OF_LINE);
            codes.text("type __VLS_TemplateRefs = {}");
            codes.text(END_OF_LINE);
            codes.text("type __VLS_RootEl = any");
            codes.text(END_OF_LINE);
        }
    }
}

fn generate_style_scoped_class_references<'a>(codes: &mut Codes<'a>, classes: &[ClassReference]) {
    for class in classes {
        codes.text("({} as __VLS_StyleScopedClasses[");
        codes.quoted(&class.name, "template", class.offset, CodeFeatures::NAVIGATION);
        codes.text("])");
        codes.text(END_OF_LINE);
    }
}

fn generate_css_vars<'a>(codes: &mut Codes<'a>, options: &ScriptCodegenOptions<'a>) {
    let sections = options.sections;
    let styles = &sections.styles;
    if styles.is_empty() {
        return;
    }
    let ctx = TemplateCodegenContext::new();
    codes.text("// CSS variable injection ");
    codes.text(NEW_LINE);
    for style in styles.iter() {
        for binding in &style.bindings {
            generate_interpolation(
                codes,
                &ctx,
                &style.name,
                CodeFeatures::ALL,
                binding.text.as_str(),
                Some(style.loc.start + binding.offset),
            );
            codes.text(END_OF_LINE);
        }
    }
    codes.text("// CSS variable injection end ");
    codes.text(NEW_LINE);
}
