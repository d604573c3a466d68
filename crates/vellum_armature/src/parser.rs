//! Template parser.
//!
//! Single forward scan that builds the node arena directly. Malformed input
//! is recovered from and reported through [`CompileError`]s.

use memchr::{memchr, memmem};
use vellum_carton::dom_tag_config::{is_component_tag, is_void_tag};
use vellum_carton::CompactString;

use crate::ast::*;
use crate::errors::{CompileError, ErrorCode};

const INTERPOLATION_OPEN: &[u8] = b"{{";
const INTERPOLATION_CLOSE: &[u8] = b"}}";

/// Parsed template plus the errors recovered from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    pub ast: TemplateAst,
    pub errors: Vec<CompileError>,
}

/// Parse template source.
pub fn parse_template(source: &str) -> ParseResult {
    let mut parser = Parser::new(source);
    parser.parse();
    parser.finish()
}

struct Parser<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    nodes: Vec<Node>,
    root: Vec<NodeId>,
    /// Open elements, innermost last
    stack: Vec<NodeId>,
    errors: Vec<CompileError>,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            nodes: Vec::new(),
            root: Vec::new(),
            stack: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn finish(mut self) -> ParseResult {
        self.handle_unclosed_elements();
        ParseResult {
            ast: TemplateAst {
                source: self.source.to_owned(),
                nodes: self.nodes,
                children: self.root,
            },
            errors: self.errors,
        }
    }

    fn parse(&mut self) {
        let len = self.bytes.len();
        while self.pos < len {
            let rest = &self.bytes[self.pos..];
            if rest.starts_with(INTERPOLATION_OPEN) {
                self.parse_interpolation();
            } else if rest.starts_with(b"<!--") {
                self.parse_comment();
            } else if rest.starts_with(b"</") && rest.get(2).is_some_and(u8::is_ascii_alphabetic) {
                self.parse_close_tag();
            } else if rest.starts_with(b"<!") || rest.starts_with(b"<?") {
                self.skip_bogus_comment();
            } else if rest[0] == b'<' && rest.get(1).is_some_and(u8::is_ascii_alphabetic) {
                if !self.parse_open_tag() {
                    return;
                }
            } else {
                self.parse_text();
            }
        }
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        match self.stack.last() {
            Some(&parent) => {
                if let Node::Element(el) = &mut self.nodes[parent.0 as usize] {
                    el.children.push(id);
                }
            }
            None => self.root.push(id),
        }
        id
    }

    fn error(&mut self, code: ErrorCode, start: usize, end: usize) {
        self.errors.push(CompileError::new(code, SourceSpan::new(start, end)));
    }

    fn parse_text(&mut self) {
        let start = self.pos;
        let mut end = start + 1;
        while end < self.bytes.len() {
            let b = self.bytes[end];
            if b == b'<' || (b == b'{' && self.bytes.get(end + 1) == Some(&b'{')) {
                break;
            }
            end += 1;
        }
        self.push_text(start, end);
        self.pos = end;
    }

    fn push_text(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        // Merge with a preceding text sibling
        let last = match self.stack.last() {
            Some(&parent) => self.element_children(parent).last().copied(),
            None => self.root.last().copied(),
        };
        if let Some(last) = last {
            if let Node::Text(text) = &mut self.nodes[last.0 as usize] {
                if text.loc.end as usize == start {
                    text.loc.end = end as u32;
                    return;
                }
            }
        }
        self.push_node(Node::Text(TextNode {
            loc: SourceSpan::new(start, end),
        }));
    }

    fn element_children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id.0 as usize] {
            Node::Element(el) => &el.children,
            _ => &[],
        }
    }

    fn parse_interpolation(&mut self) {
        let start = self.pos;
        let inner_start = start + INTERPOLATION_OPEN.len();
        let Some(close) = memmem::find(&self.bytes[inner_start..], INTERPOLATION_CLOSE) else {
            self.error(ErrorCode::MissingInterpolationEnd, start, self.bytes.len());
            self.push_text(start, self.bytes.len());
            self.pos = self.bytes.len();
            return;
        };
        let inner_end = inner_start + close;
        let end = inner_end + INTERPOLATION_CLOSE.len();

        let raw = &self.source[inner_start..inner_end];
        let leading = raw.len() - raw.trim_start().len();
        let content_start = inner_start + leading;
        let content_end = content_start + raw.trim().len();

        self.push_node(Node::Interpolation(InterpolationNode {
            content: SourceSpan::new(content_start, content_end),
            loc: SourceSpan::new(start, end),
        }));
        self.pos = end;
    }

    fn parse_comment(&mut self) {
        let start = self.pos;
        let body = start + 4;
        let end = match memmem::find(&self.bytes[body..], b"-->") {
            Some(close) => body + close + 3,
            None => {
                self.error(ErrorCode::EofInComment, start, self.bytes.len());
                self.bytes.len()
            }
        };
        self.push_node(Node::Comment(CommentNode {
            loc: SourceSpan::new(start, end),
        }));
        self.pos = end;
    }

    fn skip_bogus_comment(&mut self) {
        self.pos = match memchr(b'>', &self.bytes[self.pos..]) {
            Some(gt) => self.pos + gt + 1,
            None => self.bytes.len(),
        };
    }

    /// Returns `false` when input ended inside the tag.
    fn parse_open_tag(&mut self) -> bool {
        let len = self.bytes.len();
        let tag_start = self.pos;
        let name_start = tag_start + 1;
        let mut pos = name_start;
        while pos < len && !is_tag_name_end(self.bytes[pos]) {
            pos += 1;
        }
        let name_end = pos;
        let tag = CompactString::new(&self.source[name_start..name_end]);

        let mut props: Vec<PropNode> = Vec::new();
        let mut self_closing = false;

        loop {
            while pos < len && is_whitespace(self.bytes[pos]) {
                pos += 1;
            }
            if pos >= len {
                self.error(ErrorCode::EofInTag, tag_start, len);
                self.pos = len;
                return false;
            }
            match self.bytes[pos] {
                b'>' => {
                    pos += 1;
                    break;
                }
                b'/' if self.bytes.get(pos + 1) == Some(&b'>') => {
                    self_closing = true;
                    pos += 2;
                    break;
                }
                b'/' => {
                    pos += 1;
                    continue;
                }
                _ => {}
            }
            match self.parse_prop(pos) {
                Some((prop, next)) => {
                    self.check_duplicate(&props, &prop);
                    props.push(prop);
                    pos = next;
                }
                None => {
                    self.error(ErrorCode::EofInTag, tag_start, len);
                    self.pos = len;
                    return false;
                }
            }
        }

        let tag_type = element_type(&tag, &props);
        let void = is_void_tag(&tag);
        let id = self.push_node(Node::Element(ElementNode {
            tag_loc: SourceSpan::new(name_start, name_end),
            end_tag_loc: None,
            loc: SourceSpan::new(tag_start, pos),
            tag,
            tag_type,
            props,
            children: Vec::new(),
            is_self_closing: self_closing,
        }));
        self.pos = pos;

        if !self_closing && !void {
            let raw_text = match &self.nodes[id.0 as usize] {
                Node::Element(el) => matches!(el.tag.as_str(), "script" | "style" | "textarea"),
                _ => false,
            };
            self.stack.push(id);
            if raw_text {
                self.parse_raw_text(id);
            }
        }
        true
    }

    /// Content of raw text elements runs to the matching close tag.
    fn parse_raw_text(&mut self, id: NodeId) {
        let tag = match &self.nodes[id.0 as usize] {
            Node::Element(el) => el.tag.clone(),
            _ => return,
        };
        let mut closing = Vec::with_capacity(tag.len() + 2);
        closing.extend_from_slice(b"</");
        closing.extend_from_slice(tag.as_bytes());
        let start = self.pos;
        let end = memmem::find(&self.bytes[start..], &closing).map_or(self.bytes.len(), |c| start + c);
        self.push_text(start, end);
        self.pos = end;
    }

    fn check_duplicate(&mut self, props: &[PropNode], prop: &PropNode) {
        let PropNode::Attribute(attr) = prop else {
            return;
        };
        let duplicate = props.iter().any(|p| {
            matches!(p, PropNode::Attribute(other) if other.name.eq_ignore_ascii_case(&attr.name))
        });
        if duplicate {
            self.error(
                ErrorCode::DuplicateAttribute,
                attr.loc.start as usize,
                attr.loc.end as usize,
            );
        }
    }

    /// Parse one attribute or directive at `start`; returns it and the
    /// position after it, or `None` on EOF inside a quoted value.
    fn parse_prop(&mut self, start: usize) -> Option<(PropNode, usize)> {
        let len = self.bytes.len();
        let mut pos = start;

        // `:[key]` may contain characters that otherwise end a name
        let mut bracket = 0usize;
        while pos < len {
            let b = self.bytes[pos];
            if b == b'[' {
                bracket += 1;
            } else if b == b']' {
                bracket = bracket.saturating_sub(1);
            } else if bracket == 0 && (is_whitespace(b) || matches!(b, b'=' | b'>')) {
                break;
            } else if bracket == 0 && b == b'/' && self.bytes.get(pos + 1) == Some(&b'>') {
                break;
            }
            pos += 1;
        }
        if pos == start {
            pos += 1;
        }
        let name_end = pos;

        let mut value = None;
        let mut after = pos;
        while after < len && is_whitespace(self.bytes[after]) {
            after += 1;
        }
        if after < len && self.bytes[after] == b'=' {
            pos = after + 1;
            while pos < len && is_whitespace(self.bytes[pos]) {
                pos += 1;
            }
            if pos < len && (self.bytes[pos] == b'"' || self.bytes[pos] == b'\'') {
                let quote = self.bytes[pos];
                let value_start = pos + 1;
                let close = memchr(quote, &self.bytes[value_start..])?;
                value = Some(SourceSpan::new(value_start, value_start + close));
                pos = value_start + close + 1;
            } else {
                let value_start = pos;
                while pos < len && !is_whitespace(self.bytes[pos]) && self.bytes[pos] != b'>' {
                    pos += 1;
                }
                if pos == value_start {
                    self.error(ErrorCode::MissingAttributeValue, start, pos);
                }
                value = Some(SourceSpan::new(value_start, pos));
            }
        }

        let loc = SourceSpan::new(start, pos);
        let name_loc = SourceSpan::new(start, name_end);
        let raw_name = &self.source[start..name_end];
        let prop = match parse_directive(raw_name, start) {
            Some(parsed) => PropNode::Directive(DirectiveNode {
                name: parsed.name,
                raw_name: CompactString::new(raw_name),
                name_loc,
                arg: parsed.arg,
                modifiers: parsed.modifiers,
                exp: value,
                loc,
            }),
            None => PropNode::Attribute(AttributeNode {
                name: CompactString::new(raw_name),
                name_loc,
                value,
                loc,
            }),
        };
        Some((prop, pos))
    }

    fn parse_close_tag(&mut self) {
        let start = self.pos;
        let name_start = start + 2;
        let mut name_end = name_start;
        while name_end < self.bytes.len() && !is_tag_name_end(self.bytes[name_end]) {
            name_end += 1;
        }
        let end = match memchr(b'>', &self.bytes[name_end..]) {
            Some(gt) => name_end + gt + 1,
            None => self.bytes.len(),
        };
        self.pos = end;

        let tag = &self.source[name_start..name_end];
        let open = self.stack.iter().rposition(|&id| {
            matches!(&self.nodes[id.0 as usize], Node::Element(el) if el.tag.eq_ignore_ascii_case(tag))
        });

        let Some(index) = open else {
            self.error(ErrorCode::InvalidEndTag, start, end);
            return;
        };

        // Elements opened after the match are implicitly closed here
        while self.stack.len() > index + 1 {
            if let Some(id) = self.stack.pop() {
                let loc = self.nodes[id.0 as usize].loc();
                self.set_end(id, start, None);
                self.error(ErrorCode::MissingEndTag, loc.start as usize, loc.end as usize);
            }
        }
        if let Some(id) = self.stack.pop() {
            self.set_end(id, end, Some(SourceSpan::new(name_start, name_end)));
        }
    }

    fn set_end(&mut self, id: NodeId, end: usize, end_tag_loc: Option<SourceSpan>) {
        if let Node::Element(el) = &mut self.nodes[id.0 as usize] {
            el.loc.end = end as u32;
            el.end_tag_loc = end_tag_loc;
        }
    }

    fn handle_unclosed_elements(&mut self) {
        let len = self.bytes.len();
        while let Some(id) = self.stack.pop() {
            let loc = self.nodes[id.0 as usize].loc();
            self.set_end(id, len, None);
            self.error(ErrorCode::MissingEndTag, loc.start as usize, loc.end as usize);
        }
    }
}

struct ParsedDirective {
    name: CompactString,
    arg: Option<DirectiveArg>,
    modifiers: Vec<SourceSpan>,
}

/// Split a directive attribute name into name, argument and modifiers.
/// Returns `None` for plain attributes.
fn parse_directive(raw: &str, offset: usize) -> Option<ParsedDirective> {
    let (name, rest_start) = if let Some(rest) = raw.strip_prefix("v-") {
        let name_len = rest.find([':', '.']).unwrap_or(rest.len());
        if name_len == 0 {
            return None;
        }
        let after = 2 + name_len;
        let rest_start = if raw.as_bytes().get(after) == Some(&b':') {
            after + 1
        } else {
            after
        };
        (&rest[..name_len], rest_start)
    } else {
        match raw.as_bytes().first()? {
            b':' | b'.' => ("bind", 1),
            b'@' => ("on", 1),
            b'#' => ("slot", 1),
            _ => return None,
        }
    };

    let bytes = raw.as_bytes();
    let mut arg = None;
    let mut pos = rest_start;

    let has_arg = rest_start < bytes.len() && (rest_start == 1 || bytes[rest_start - 1] == b':');
    if has_arg {
        if bytes[pos] == b'[' {
            let close = raw[pos..].find(']').map_or(bytes.len(), |c| pos + c);
            arg = Some(DirectiveArg {
                loc: SourceSpan::new(offset + pos + 1, offset + close),
                is_static: false,
            });
            pos = (close + 1).min(bytes.len());
        } else {
            let end = raw[pos..].find('.').map_or(bytes.len(), |d| pos + d);
            if end > pos {
                arg = Some(DirectiveArg {
                    loc: SourceSpan::new(offset + pos, offset + end),
                    is_static: true,
                });
            }
            pos = end;
        }
    }

    let mut modifiers = Vec::new();
    while pos < bytes.len() && bytes[pos] == b'.' {
        let start = pos + 1;
        let end = raw[start..].find('.').map_or(bytes.len(), |d| start + d);
        if end > start {
            modifiers.push(SourceSpan::new(offset + start, offset + end));
        }
        pos = end;
    }

    Some(ParsedDirective {
        name: CompactString::new(name),
        arg,
        modifiers,
    })
}

fn element_type(tag: &str, props: &[PropNode]) -> ElementType {
    if tag == "slot" {
        return ElementType::Slot;
    }
    if tag == "template" {
        let structural = props.iter().any(|p| {
            matches!(p, PropNode::Directive(d)
                if matches!(d.name.as_str(), "if" | "else-if" | "else" | "for" | "slot"))
        });
        return if structural {
            ElementType::Template
        } else {
            ElementType::Element
        };
    }
    if is_component_tag(tag) {
        ElementType::Component
    } else {
        ElementType::Element
    }
}

#[inline(always)]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

#[inline(always)]
fn is_tag_name_end(b: u8) -> bool {
    is_whitespace(b) || b == b'/' || b == b'>'
}
