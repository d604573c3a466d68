//! Virtual code trees for each supported document kind.

use vellum_virtual::{CompilerOptions, LanguageSession, SCRIPT_CODE_ID};

fn ids(root: &vellum_virtual::VirtualCode) -> Vec<&str> {
    root.embedded.iter().map(|code| code.id.as_str()).collect()
}

#[test]
fn component_document() {
    let source = "<template><p>{{ a }}</p></template>\n<script>export default {}</script>\n<style module>.x {}</style>\n<docs>hello</docs>\n";
    let root = LanguageSession::default()
        .create_virtual_code("Comp.vue", source)
        .unwrap();

    assert_eq!(root.language_id, "vue");
    assert_eq!(ids(&root), vec![SCRIPT_CODE_ID, "template", "style_0", "customBlock_0"]);

    let docs = root.find("customBlock_0").unwrap();
    assert_eq!(docs.text, "hello");
    assert_eq!(docs.to_document_offset(0), Some(source.find("hello").unwrap() as u32));

    let script = root.find(SCRIPT_CODE_ID).unwrap();
    assert_eq!(script.language_id, "typescript");
    assert!(script.text.contains("{} as __VLS_StyleModules"));
    assert!(script.text.contains("type __VLS_StyleModules"));
}

#[test]
fn markdown_page() {
    let source = "---\ntitle: Hi\n---\n\n# {{ title }}\n\n```vue\n<script>bad</script>\n```\n\n<script setup>\nconst title = 'x'\n</script>\n";
    let root = LanguageSession::default()
        .create_virtual_code("index.md", source)
        .unwrap();
    assert_eq!(root.language_id, "markdown");
    assert_eq!(ids(&root), vec![SCRIPT_CODE_ID, "template"]);

    let script = root.find(SCRIPT_CODE_ID).unwrap();
    assert!(!script.text.contains("bad"));
    let generated = script.text.find("const title").unwrap() as u32;
    assert_eq!(
        script.to_document_offset(generated),
        Some(source.find("const title").unwrap() as u32)
    );

    let generated = script.text.find("__VLS_ctx.title").unwrap() as u32 + 10;
    assert_eq!(
        script.to_document_offset(generated),
        Some(source.find("{{ title }}").unwrap() as u32 + 3)
    );
}

#[test]
fn petite_vue_page() {
    let source = "<div v-scope=\"{ n: 0 }\"><button @click=\"n++\">{{ n }}</button></div>";
    let root = LanguageSession::default()
        .create_virtual_code("index.html", source)
        .unwrap();
    assert_eq!(root.language_id, "html");
    assert_eq!(ids(&root), vec![SCRIPT_CODE_ID, "template"]);
    assert_eq!(root.find("template").unwrap().text, source);
}

#[test]
fn configured_extensions() {
    let options = CompilerOptions::from_json(r#"{ "extensions": [".vue", ".ce"], "vitepressExtensions": [] }"#)
        .unwrap();
    let session = LanguageSession::new(options);
    assert_eq!(session.language_id("widget.ce"), Some("vue"));
    assert_eq!(session.language_id("index.md"), None);
    assert!(session.create_virtual_code("index.md", "# hi").is_none());
}

#[test]
fn global_types_reference() {
    let options = CompilerOptions::from_json(r#"{ "globalTypesPath": "./vellum-global.d.ts" }"#).unwrap();
    let root = LanguageSession::new(options)
        .create_virtual_code("App.vue", "<template></template>")
        .unwrap();
    let script = root.find(SCRIPT_CODE_ID).unwrap();
    assert!(script
        .text
        .starts_with("/// <reference types=\"./vellum-global.d.ts\" />\n"));
}
