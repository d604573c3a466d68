//! Properties of the generated script code.

use vellum_mapping::CodeFeatures;
use vellum_sfc::parse_sfc;
use vellum_virtual::{
    generate_script, generate_template, CompilerOptions, HtmlTemplate, LanguageSession,
    ScriptCodegenOptions, TemplateCodegenOptions, VirtualCode, SCRIPT_CODE_ID,
};

const COMPONENT: &str = r#"<template>
  <div class="box" :class="{ active }" @click="toggle">
    <Child v-for="item in items" :key="item.id" :item="item" />
    <p v-if="active">{{ message }}</p>
    <p v-else>idle</p>
  </div>
</template>

<script setup lang="ts">
const active = ref(false)
const items = []
const message = 'hi'
function toggle() {}
</script>

<style scoped>
.box { color: v-bind(color) }
</style>
"#;

fn script_code(file_name: &str, source: &str) -> VirtualCode {
    let root = LanguageSession::default()
        .create_virtual_code(file_name, source)
        .unwrap();
    root.find(SCRIPT_CODE_ID).unwrap().clone()
}

#[test]
fn lengths_are_conserved() {
    let sections = parse_sfc(COMPONENT);
    let compiler_options = CompilerOptions::default();
    let template = sections.template.as_ref().unwrap();
    let html = HtmlTemplate::new(&template.content, template.loc.start);
    let mut options = ScriptCodegenOptions::new("App.vue", &sections, &compiler_options, None);
    options.template = Some(generate_template(&html, TemplateCodegenOptions::default()));

    let codes = generate_script(&options);
    let built = codes.finish();
    let mapped: u32 = built.mapper.ranges().iter().map(|r| r.generated_len()).sum();
    assert_eq!(mapped + built.unmapped_len, built.text.len() as u32);
}

#[test]
fn ranges_are_ordered() {
    let code = script_code("App.vue", COMPONENT);
    let starts: Vec<u32> = code.mapper.ranges().iter().map(|r| r.generated_start).collect();
    assert!(starts.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn generation_is_idempotent() {
    let first = script_code("App.vue", COMPONENT);
    let second = script_code("App.vue", COMPONENT);
    assert_eq!(first.text, second.text);
    assert_eq!(first.mapper.ranges(), second.mapper.ranges());
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn documents_without_template_get_stand_ins() {
    let code = script_code("App.vue", "<script setup lang=\"ts\">\nconst a = 1\n</script>\n");
    for declaration in [
        "type __VLS_Slots = {};\n",
        "type __VLS_InheritedAttrs = {};\n",
        "type __VLS_TemplateRefs = {};\n",
        "type __VLS_RootEl = any;\n",
    ] {
        assert!(code.text.contains(declaration), "missing {declaration}");
    }
    assert_eq!(code.text.matches('{').count(), code.text.matches('}').count());
}

#[test]
fn define_slots_suppresses_slot_stand_in() {
    let code = script_code(
        "App.vue",
        "<script setup lang=\"ts\">\nconst slots = defineSlots<{ default(): any }>()\n</script>\n",
    );
    assert!(!code.text.contains("type __VLS_Slots"));
    assert!(code.text.contains("type __VLS_RootEl = any;"));
}

#[test]
fn css_variable_binding_maps_back_to_style() {
    let head = "<template></template>\n<style>\n.a {\n";
    let padding = " ".repeat(120 - head.len());
    let source = format!("{head}{padding}color: v-bind(myColor);\n}}\n</style>\n");
    assert_eq!(source.find("color: v-bind"), Some(120));

    let code = script_code("App.vue", &source);
    let range = code
        .mapper
        .ranges()
        .iter()
        .find(|r| r.source_start == 134)
        .unwrap();
    assert_eq!(range.source_end, 134 + "myColor".len() as u32);
    assert_eq!(
        &code.text[range.generated_start as usize..range.generated_end as usize],
        "myColor"
    );
    assert!(range
        .features
        .contains(CodeFeatures::VERIFICATION | CodeFeatures::NAVIGATION));
    assert_eq!(range.source_key.as_deref(), Some("style_0"));
    assert!(code.text.contains("__VLS_ctx.myColor;\n"));
}

#[test]
fn template_expressions_map_to_document() {
    let code = script_code("App.vue", COMPONENT);
    for name in ["toggle", "message", "items"] {
        let generated = code.text.find(&format!("__VLS_ctx.{name}")).unwrap() as u32 + 10;
        let document = code.to_document_offset(generated).unwrap() as usize;
        assert_eq!(&COMPONENT[document..document + name.len()], name);
    }
}

#[test]
fn petite_vue_pages_merge_global_this() {
    let code = script_code("index.html", "<div v-scope>{{ count }}</div>");
    assert!(code.text.contains("...globalThis,"));
    let generated = code.text.find("__VLS_ctx.count").unwrap() as u32 + 10;
    assert_eq!(code.to_document_offset(generated), Some(16));
}

#[test]
fn quoted_names_stay_valid_typescript() {
    let source = "<template><div ref=\"a'b\" class=\"x'y\"></div><slot name=\"s'1\"/></template>\n<style scoped>.z {}</style>\n";
    let code = script_code("App.vue", source);

    assert!(code.text.contains("({} as __VLS_StyleScopedClasses['x\\'y']);\n"));
    assert!(code.text.contains("'a\\'b': HTMLElementTagNameMap['div'];\n"));
    assert!(code.text.contains("'s\\'1'?: (props: any) => any;\n"));
    assert!(!code.text.contains("'x'y'"));

    let generated = code.text.find("['x").unwrap() as u32 + 2;
    assert_eq!(
        code.to_document_offset(generated),
        Some(source.find("x'y").unwrap() as u32)
    );
}
