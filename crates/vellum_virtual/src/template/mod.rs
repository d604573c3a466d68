//! Template code generation.
//!
//! Walks a parsed template and emits TypeScript statements that reference
//! every expression, component, directive and slot in it, mapped back to
//! the document.

mod context;
mod interpolation;
mod view;

pub use context::{ClassReference, SlotOutlet, TemplateCodegenContext, TemplateRef};
pub use interpolation::{collect_binding_names, generate_interpolation};
pub use view::{HtmlTemplate, RemappedTemplate, TemplateSource};

use vellum_armature::{
    CompileError, DirectiveNode, ElementNode, ElementType, ErrorCode, Node, NodeId, PropNode,
    SourceSpan, TemplateAst,
};
use vellum_carton::dom_tag_config::{is_html_tag, is_native_tag, is_svg_tag};
use vellum_carton::general::{is_simple_identifier, pascalize};
use vellum_carton::js::{tokenize, TokenKind};
use vellum_carton::{format_compact, CompactString};
use vellum_mapping::CodeFeatures;

use crate::codes::{Codes, END_OF_LINE};

const SOURCE_KEY: &str = "template";

const BUILT_IN_DIRECTIVES: &[&str] = &[
    "bind", "on", "model", "show", "html", "text", "memo", "once", "pre", "cloak", "for", "if",
    "else-if", "else", "slot", "is",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateCodegenOptions {
    /// The setup script declares slots itself
    pub has_define_slots: bool,
}

/// Output of [`generate_template`].
#[derive(Debug, Clone, Default)]
pub struct TemplateCodegen<'a> {
    pub codes: Codes<'a>,
    /// Static class names, for scoped class references
    pub class_references: Vec<ClassReference>,
    /// Compile errors in document coordinates
    pub errors: Vec<CompileError>,
}

/// Generate the statements for a parsed template.
pub fn generate_template<'a, T>(source: &'a T, options: TemplateCodegenOptions) -> TemplateCodegen<'a>
where
    T: TemplateSource + ?Sized,
{
    let mut generator = Generator {
        source,
        ast: source.ast(),
        ctx: TemplateCodegenContext::new(),
        codes: Codes::new(),
    };
    generator.generate_children(None);
    generator.generate_declarations(options);

    let Generator { ctx, codes, .. } = generator;
    let mut errors = source.document_errors();
    errors.extend(ctx.errors.iter().filter_map(|error| source.document_error(error)));

    TemplateCodegen {
        codes,
        class_references: ctx.class_references,
        errors,
    }
}

struct Generator<'a, T: ?Sized> {
    source: &'a T,
    ast: &'a TemplateAst,
    ctx: TemplateCodegenContext,
    codes: Codes<'a>,
}

impl<'a, T: TemplateSource + ?Sized> Generator<'a, T> {
    #[inline]
    fn doc(&self, offset: u32) -> Option<u32> {
        self.source.resolve_offset(offset)
    }

    #[inline]
    fn text(&self, span: SourceSpan) -> &'a str {
        self.ast.text(span)
    }

    /// Emit `span` as an expression against the component context.
    fn interpolation(&mut self, span: SourceSpan) {
        let code = self.text(span);
        let offset = self.doc(span.start);
        generate_interpolation(
            &mut self.codes,
            &self.ctx,
            SOURCE_KEY,
            CodeFeatures::ALL,
            code,
            offset,
        );
    }

    /// `(<expr>);`
    fn expression_statement(&mut self, span: SourceSpan) {
        if self.text(span).trim().is_empty() {
            return;
        }
        self.codes.text("(");
        self.interpolation(span);
        self.codes.text(")");
        self.codes.text(END_OF_LINE);
    }

    fn mapped_name(&mut self, text: &'a str, offset: u32, features: CodeFeatures) {
        let doc = self.doc(offset);
        self.codes.maybe_mapped(text, SOURCE_KEY, doc, features);
    }

    fn generate_children(&mut self, parent: Option<NodeId>) {
        let ast = self.ast;
        let mut in_if_chain = false;

        for &id in ast.children_of(parent) {
            let node = ast.node(id);
            match node {
                Node::Element(el) => {
                    in_if_chain = self.generate_conditional(id, el, in_if_chain);
                }
                Node::Interpolation(interp) => {
                    self.expression_statement(interp.content);
                    in_if_chain = false;
                }
                Node::Text(_) | Node::Comment(_) => {
                    if !node.is_blank(ast) {
                        in_if_chain = false;
                    }
                }
            }
        }
    }

    /// Emit an element with its `v-if` / `v-else-if` / `v-else` branch.
    /// Returns whether a following sibling may continue the chain.
    fn generate_conditional(&mut self, id: NodeId, el: &'a ElementNode, in_if_chain: bool) -> bool {
        if let Some(dir) = el.directive("if") {
            self.condition_open("if (", dir);
            self.generate_element(id, el);
            self.codes.text("}\n");
            return true;
        }
        if let Some(dir) = el.directive("else-if") {
            if in_if_chain {
                self.condition_open("else if (", dir);
            } else {
                self.ctx.error(ErrorCode::VElseNoAdjacentIf, dir.loc);
                self.condition_open("if (", dir);
            }
            self.generate_element(id, el);
            self.codes.text("}\n");
            return true;
        }
        if let Some(dir) = el.directive("else") {
            if in_if_chain {
                self.codes.text("else {\n");
            } else {
                self.ctx.error(ErrorCode::VElseNoAdjacentIf, dir.loc);
                self.codes.text("{\n");
            }
            self.generate_element(id, el);
            self.codes.text("}\n");
            return false;
        }
        self.generate_element(id, el);
        false
    }

    fn condition_open(&mut self, keyword: &'static str, dir: &DirectiveNode) {
        self.codes.text(keyword);
        match dir.exp {
            Some(exp) if !self.text(exp).trim().is_empty() => self.interpolation(exp),
            _ => self.codes.text("undefined"),
        }
        self.codes.text(") {\n");
    }

    fn generate_element(&mut self, id: NodeId, el: &'a ElementNode) {
        let for_locals = match el.directive("for") {
            Some(dir) => self.v_for_open(dir),
            None => None,
        };

        match el.tag_type {
            ElementType::Component => self.component_reference(el),
            ElementType::Element if is_native_tag(&el.tag) => self.element_reference(el),
            ElementType::Slot => self.slot_outlet(el),
            _ => {}
        }

        for prop in &el.props {
            match prop {
                PropNode::Attribute(attr) => {
                    let Some(value) = attr.value else { continue };
                    match attr.name.as_str() {
                        "class" => self.collect_classes(value),
                        "ref" => self.collect_ref(el, value),
                        _ => {}
                    }
                }
                PropNode::Directive(dir) => self.generate_directive(dir),
            }
        }

        let slot_locals = match el.directive("slot") {
            Some(dir) => Some(self.slot_scope_open(dir)),
            None => None,
        };

        self.generate_children(Some(id));

        if let Some(locals) = slot_locals {
            self.ctx.remove_locals(&locals);
            self.codes.text("}\n");
        }
        if let Some(locals) = for_locals {
            self.ctx.remove_locals(&locals);
            self.codes.text("}\n");
        }
    }

    fn component_reference(&mut self, el: &'a ElementNode) {
        let tag = self.text(el.tag_loc);
        self.codes.text("__VLS_components");
        self.member_access(tag, el.tag_loc.start);
        self.codes.text(END_OF_LINE);
    }

    fn element_reference(&mut self, el: &'a ElementNode) {
        let tag = self.text(el.tag_loc);
        self.codes.text("__VLS_elements");
        self.member_access(tag, el.tag_loc.start);
        self.codes.text(END_OF_LINE);
    }

    /// `.name` or `['name']`, with the name mapped for navigation.
    fn member_access(&mut self, name: &'a str, offset: u32) {
        if is_simple_identifier(name) {
            self.codes.text(".");
            self.mapped_name(name, offset, CodeFeatures::NAVIGATION);
        } else {
            let doc = self.doc(offset);
            self.codes.text("[");
            self.codes.quoted(name, SOURCE_KEY, doc, CodeFeatures::NAVIGATION);
            self.codes.text("]");
        }
    }

    fn slot_outlet(&mut self, el: &ElementNode) {
        match el.attribute("name") {
            Some(attr) => {
                if let Some(value) = attr.value {
                    let name = CompactString::new(self.text(value));
                    let offset = self.doc(value.start);
                    self.ctx.add_slot(name, offset);
                }
            }
            None => {
                let dynamic = el
                    .directives()
                    .any(|d| d.name == "bind" && d.arg.as_ref().is_some_and(|a| self.text(a.loc) == "name"));
                if !dynamic {
                    self.ctx.add_slot(CompactString::new("default"), None);
                }
            }
        }
    }

    fn collect_classes(&mut self, value: SourceSpan) {
        let text = self.text(value);
        let mut start = None;
        for (i, b) in text.bytes().chain(std::iter::once(b' ')).enumerate() {
            if b.is_ascii_whitespace() {
                if let Some(s) = start.take() {
                    let offset = self.doc(value.start + s as u32);
                    self.ctx.class_references.push(ClassReference {
                        name: CompactString::new(&text[s..i]),
                        offset,
                    });
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
    }

    fn collect_ref(&mut self, el: &ElementNode, value: SourceSpan) {
        let name = self.text(value).trim();
        if name.is_empty() {
            return;
        }
        let type_text = element_type_text(el);
        let offset = self.doc(value.start);
        self.ctx.refs.push(TemplateRef {
            name: CompactString::new(name),
            offset,
            type_text,
        });
    }

    fn generate_directive(&mut self, dir: &'a DirectiveNode) {
        let name = dir.name.as_str();
        if matches!(name, "for" | "if" | "else-if" | "else" | "slot") {
            return;
        }

        if let Some(arg) = &dir.arg {
            if !arg.is_static {
                self.expression_statement(arg.loc);
            }
        }

        match name {
            "bind" => match (dir.exp, &dir.arg) {
                (Some(exp), _) => self.expression_statement(exp),
                // `:foo` binds `foo` of the same name
                (None, Some(arg)) if arg.is_static => {
                    let key = self.text(arg.loc);
                    if is_simple_identifier(key) {
                        self.expression_statement(arg.loc);
                    }
                }
                _ => {}
            },
            "on" => {
                if let Some(exp) = dir.exp {
                    self.event_handler(exp);
                }
            }
            _ if BUILT_IN_DIRECTIVES.contains(&name) => {
                if let Some(exp) = dir.exp {
                    self.expression_statement(exp);
                }
            }
            _ => {
                self.codes.text("__VLS_directives.");
                let camel = format_compact!("v{}", pascalize(name));
                let doc = self.doc(dir.name_loc.start);
                self.codes
                    .maybe_mapped(camel.to_string(), SOURCE_KEY, doc, CodeFeatures::NAVIGATION);
                self.codes.text(END_OF_LINE);
                if let Some(exp) = dir.exp {
                    self.expression_statement(exp);
                }
            }
        }
    }

    fn event_handler(&mut self, exp: SourceSpan) {
        let code = self.text(exp);
        if code.trim().is_empty() {
            return;
        }
        if is_member_path(code) {
            self.expression_statement(exp);
            return;
        }
        self.codes.text("(($event: any) => {\n");
        self.interpolation(exp);
        self.codes.text("\n})");
        self.codes.text(END_OF_LINE);
    }

    /// `for (const [<lhs>] of __VLS_getVForSourceType(<rhs>)) {`
    fn v_for_open(&mut self, dir: &DirectiveNode) -> Option<Vec<CompactString>> {
        let exp = dir.exp?;
        let code = self.text(exp);
        let Some((alias, source)) = split_v_for(code) else {
            self.expression_statement(exp);
            return None;
        };

        let (alias_start, alias_end) = alias;
        let (source_start, source_end) = source;
        let alias_span = SourceSpan::new(
            exp.start as usize + alias_start,
            exp.start as usize + alias_end,
        );
        let source_span = SourceSpan::new(
            exp.start as usize + source_start,
            exp.start as usize + source_end,
        );

        self.codes.text("for (const [");
        let alias_text = self.text(alias_span);
        let alias_doc = self.doc(alias_span.start);
        self.codes
            .maybe_mapped(alias_text, SOURCE_KEY, alias_doc, CodeFeatures::ALL);
        self.codes.text("] of __VLS_getVForSourceType(");
        self.interpolation(source_span);
        self.codes.text(")) {\n");

        let locals = collect_binding_names(alias_text);
        self.ctx.add_locals(locals.iter().cloned());
        Some(locals)
    }

    /// Open a block scoping the slot props of `v-slot` / `#name`.
    fn slot_scope_open(&mut self, dir: &DirectiveNode) -> Vec<CompactString> {
        self.codes.text("{\n");
        let Some(exp) = dir.exp else {
            return Vec::new();
        };
        let pattern = self.text(exp);
        if pattern.trim().is_empty() {
            return Vec::new();
        }
        self.codes.text("const ");
        let doc = self.doc(exp.start);
        self.codes
            .maybe_mapped(pattern, SOURCE_KEY, doc, CodeFeatures::ALL);
        self.codes.text(" = {} as any");
        self.codes.text(END_OF_LINE);

        let locals = collect_binding_names(pattern);
        self.ctx.add_locals(locals.iter().cloned());
        locals
    }

    fn generate_declarations(&mut self, options: TemplateCodegenOptions) {
        if !options.has_define_slots {
            let slots = std::mem::take(&mut self.ctx.slots);
            self.codes.text("type __VLS_Slots = {");
            if !slots.is_empty() {
                self.codes.text("\n");
            }
            for slot in &slots {
                self.quoted_member(&slot.name, slot.offset);
                self.codes.text("?: (props: any) => any");
                self.codes.text(END_OF_LINE);
            }
            self.codes.text("}");
            self.codes.text(END_OF_LINE);
            self.ctx.slots = slots;
        }

        self.codes.text("type __VLS_InheritedAttrs = {}");
        self.codes.text(END_OF_LINE);

        let refs = std::mem::take(&mut self.ctx.refs);
        self.codes.text("type __VLS_TemplateRefs = {");
        if !refs.is_empty() {
            self.codes.text("\n");
        }
        for template_ref in &refs {
            self.quoted_member(&template_ref.name, template_ref.offset);
            self.codes.text(format!(": {}", template_ref.type_text));
            self.codes.text(END_OF_LINE);
        }
        self.codes.text("}");
        self.codes.text(END_OF_LINE);
        self.ctx.refs = refs;

        let root = self.root_element_type();
        self.codes.text(format!("type __VLS_RootEl = {root}"));
        self.codes.text(END_OF_LINE);
    }

    fn quoted_member(&mut self, name: &str, offset: Option<u32>) {
        self.codes
            .quoted(name, SOURCE_KEY, offset, CodeFeatures::NAVIGATION);
    }

    /// Type of the single root element, `any` for fragments and components.
    fn root_element_type(&self) -> CompactString {
        let ast = self.ast;
        let mut roots = ast
            .children
            .iter()
            .map(|&id| ast.node(id))
            .filter(|node| !node.is_blank(ast));
        match (roots.next(), roots.next()) {
            (Some(Node::Element(el)), None) if el.tag_type == ElementType::Element => {
                element_type_text(el)
            }
            _ => CompactString::new("any"),
        }
    }
}

fn element_type_text(el: &ElementNode) -> CompactString {
    if el.tag_type == ElementType::Element && is_html_tag(&el.tag) {
        format_compact!("HTMLElementTagNameMap['{}']", el.tag)
    } else if el.tag_type == ElementType::Element && is_svg_tag(&el.tag) {
        format_compact!("SVGElementTagNameMap['{}']", el.tag)
    } else {
        CompactString::new("any")
    }
}

/// `foo`, `foo.bar`, `foo?.bar`: handlers passed by reference.
fn is_member_path(code: &str) -> bool {
    let tokens = tokenize(code);
    !tokens.is_empty()
        && tokens.iter().enumerate().all(|(i, token)| {
            if i % 2 == 0 {
                token.kind == TokenKind::Ident
            } else {
                token.is_punct(code, ".") || token.is_punct(code, "?.")
            }
        })
        && tokens.len() % 2 == 1
}

/// Split `alias in source` into trimmed alias (without wrapping parens) and
/// source byte ranges.
fn split_v_for(code: &str) -> Option<((usize, usize), (usize, usize))> {
    let tokens = tokenize(code);
    let mut depth = 0i32;
    let separator = tokens.iter().find(|token| {
        match token.kind {
            TokenKind::Punct => match token.text(code) {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth -= 1,
                _ => {}
            },
            TokenKind::Ident => {
                return depth == 0 && matches!(token.text(code), "in" | "of");
            }
            _ => {}
        }
        false
    })?;

    let mut alias = trim_range(code, 0, separator.start as usize);
    let alias_text = &code[alias.0..alias.1];
    if alias_text.starts_with('(') && alias_text.ends_with(')') && alias_text.len() >= 2 {
        alias = trim_range(code, alias.0 + 1, alias.1 - 1);
    }
    let source = trim_range(code, separator.end as usize, code.len());
    if source.0 == source.1 {
        return None;
    }
    Some((alias, source))
}

fn trim_range(code: &str, start: usize, end: usize) -> (usize, usize) {
    let slice = &code[start..end];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim().len();
    (start + leading, start + leading + trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(template: &str) -> String {
        let source = HtmlTemplate::new(template, 0);
        generate_template(&source, TemplateCodegenOptions::default())
            .codes
            .to_text()
    }

    #[test]
    fn test_interpolation_and_bindings() {
        let output = generate(r#"<div :title="title" @click="count++">{{ msg }}</div>"#);
        insta::assert_snapshot!(output, @r"
        __VLS_elements.div;
        (__VLS_ctx.title);
        (($event: any) => {
        __VLS_ctx.count++
        });
        (__VLS_ctx.msg);
        type __VLS_Slots = {};
        type __VLS_InheritedAttrs = {};
        type __VLS_TemplateRefs = {};
        type __VLS_RootEl = HTMLElementTagNameMap['div'];
        ");
    }

    #[test]
    fn test_if_chain_and_for() {
        let output = generate(
            r#"<ul><li v-for="(item, i) in items" v-if="show">{{ item + i }}</li><li v-else>none</li></ul>"#,
        );
        insta::assert_snapshot!(output, @r"
        __VLS_elements.ul;
        if (__VLS_ctx.show) {
        for (const [item, i] of __VLS_getVForSourceType(__VLS_ctx.items)) {
        __VLS_elements.li;
        (item + i);
        }
        }
        else {
        __VLS_elements.li;
        }
        type __VLS_Slots = {};
        type __VLS_InheritedAttrs = {};
        type __VLS_TemplateRefs = {};
        type __VLS_RootEl = HTMLElementTagNameMap['ul'];
        ");
    }

    #[test]
    fn test_components_slots_and_directives() {
        let output = generate(
            r#"<MyList v-focus="opts"><template #item="{ row }">{{ row.id }}</template></MyList><slot name="footer" /><div ref="box" />"#,
        );
        insta::assert_snapshot!(output, @r"
        __VLS_components.MyList;
        __VLS_directives.vFocus;
        (__VLS_ctx.opts);
        {
        const { row } = {} as any;
        (row.id);
        }
        __VLS_elements.div;
        type __VLS_Slots = {
        'footer'?: (props: any) => any;
        };
        type __VLS_InheritedAttrs = {};
        type __VLS_TemplateRefs = {
        'box': HTMLElementTagNameMap['div'];
        };
        type __VLS_RootEl = any;
        ");
    }

    #[test]
    fn test_quoted_names_are_escaped() {
        let template = r#"<div ref="a'b"></div><slot name="s'1"/>"#;
        let source = HtmlTemplate::new(template, 0);
        let built = generate_template(&source, TemplateCodegenOptions::default())
            .codes
            .finish();
        assert!(built.text.contains("'s\\'1'?: (props: any) => any;\n"));
        assert!(built.text.contains("'a\\'b': HTMLElementTagNameMap['div'];\n"));

        let generated = built.text.find("'b'").unwrap() as u32;
        assert_eq!(built.mapper.first_source(generated), Some(template.find("'b").unwrap() as u32));
    }

    #[test]
    fn test_define_slots_skips_slot_type() {
        let source = HtmlTemplate::new("<slot />", 0);
        let output = generate_template(&source, TemplateCodegenOptions { has_define_slots: true })
            .codes
            .to_text();
        assert!(!output.contains("__VLS_Slots"));
    }

    #[test]
    fn test_class_references() {
        let source = HtmlTemplate::new(r#"<p class="a  b-c"></p>"#, 100);
        let codegen = generate_template(&source, TemplateCodegenOptions::default());
        let refs: Vec<(&str, Option<u32>)> = codegen
            .class_references
            .iter()
            .map(|c| (c.name.as_str(), c.offset))
            .collect();
        assert_eq!(refs, vec![("a", Some(110)), ("b-c", Some(113))]);
    }

    #[test]
    fn test_else_without_if() {
        let source = HtmlTemplate::new(r#"<p></p><i v-else></i>"#, 20);
        let codegen = generate_template(&source, TemplateCodegenOptions::default());
        assert_eq!(codegen.errors.len(), 1);
        assert_eq!(codegen.errors[0].code, ErrorCode::VElseNoAdjacentIf);
        assert_eq!(codegen.errors[0].loc.start, 30);
    }

    #[test]
    fn test_expression_mapping_is_document_absolute() {
        let source = HtmlTemplate::new("<p>{{ value }}</p>", 200);
        let built = generate_template(&source, TemplateCodegenOptions::default())
            .codes
            .finish();
        let generated = built.text.find("value").unwrap() as u32;
        assert_eq!(built.mapper.first_source(generated), Some(206));
    }

    #[test]
    fn test_split_v_for() {
        let code = "( item , index ) of list.items";
        let ((a0, a1), (s0, s1)) = split_v_for(code).unwrap();
        assert_eq!(&code[a0..a1], "item , index");
        assert_eq!(&code[s0..s1], "list.items");
        assert!(split_v_for("items").is_none());
    }

    #[test]
    fn test_is_member_path() {
        assert!(is_member_path("submit"));
        assert!(is_member_path("form.submit"));
        assert!(!is_member_path("submit()"));
        assert!(!is_member_path("a = 1"));
    }
}
