//! Style-derived declarations: scoped classes and CSS modules.

use vellum_mapping::CodeFeatures;
use vellum_sfc::StyleSection;

use crate::codes::{quoted_key, Codes, END_OF_LINE};

/// `type __VLS_StyleScopedClasses = {} & { 'foo': boolean } & ...;`
pub fn generate_style_scoped_classes<'a>(codes: &mut Codes<'a>, styles: &'a [StyleSection<'a>]) {
    codes.text("type __VLS_StyleScopedClasses = {}");
    for style in styles.iter().filter(|style| style.scoped) {
        for class in &style.class_names {
            let Some(name) = class.text.strip_prefix('.') else {
                continue;
            };
            codes.text(" & { '");
            codes.mapped(
                name,
                &style.name,
                style.loc.start + class.offset + 1,
                CodeFeatures::NAVIGATION,
            );
            codes.text("': boolean }");
        }
    }
    codes.text(END_OF_LINE);
}

/// `type __VLS_StyleModules = { '$style': Record<string, string> & {...} };`
pub fn generate_style_modules<'a>(codes: &mut Codes<'a>, styles: &'a [StyleSection<'a>]) {
    if !styles.iter().any(|style| style.module.is_some()) {
        return;
    }
    codes.text("type __VLS_StyleModules = {\n");
    for style in styles {
        let Some(module) = &style.module else {
            continue;
        };
        codes.text(quoted_key(module).to_string());
        codes.text(": Record<string, string> & {\n");
        for class in &style.class_names {
            let Some(name) = class.text.strip_prefix('.') else {
                continue;
            };
            codes.text("'");
            codes.mapped(
                name,
                &style.name,
                style.loc.start + class.offset + 1,
                CodeFeatures::NAVIGATION,
            );
            codes.text("': string");
            codes.text(END_OF_LINE);
        }
        codes.text("}");
        codes.text(END_OF_LINE);
    }
    codes.text("}");
    codes.text(END_OF_LINE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_sfc::parse_sfc;

    #[test]
    fn test_scoped_classes_map_to_selectors() {
        let source = "<style scoped>\n.foo { color: red }\n.bar:hover {}\n</style>\n<style>.global {}</style>";
        let sections = parse_sfc(source);
        let mut codes = Codes::new();
        generate_style_scoped_classes(&mut codes, &sections.styles);
        let built = codes.finish();
        assert_eq!(
            built.text,
            "type __VLS_StyleScopedClasses = {} & { 'foo': boolean } & { 'bar': boolean };\n"
        );
        let foo = built.text.find("foo").unwrap() as u32;
        let source_offset = built.mapper.first_source(foo).unwrap() as usize;
        assert_eq!(&source[source_offset..source_offset + 3], "foo");
    }

    #[test]
    fn test_style_modules() {
        let sections = parse_sfc("<style module>.a {}</style><style module=\"theme\">.b {}</style>");
        let mut codes = Codes::new();
        generate_style_modules(&mut codes, &sections.styles);
        insta::assert_snapshot!(codes.to_text(), @r"
        type __VLS_StyleModules = {
        '$style': Record<string, string> & {
        'a': string;
        };
        'theme': Record<string, string> & {
        'b': string;
        };
        };
        ");
    }

    #[test]
    fn test_no_modules_emits_nothing() {
        let sections = parse_sfc("<style scoped>.a {}</style>");
        let mut codes = Codes::new();
        generate_style_modules(&mut codes, &sections.styles);
        assert!(codes.is_empty());
    }
}
