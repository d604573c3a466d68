//! Pug to HTML expansion with source mappings.
//!
//! Covers the markup subset templates use: tags with class and id
//! shorthands, attribute lists (possibly spanning lines), inline and piped
//! text, block text, block expansion, buffered code and comments. Every
//! piece of copied text is mapped back to the pug source.

use memchr::memchr;
use vellum_carton::dom_tag_config::is_void_tag;
use vellum_mapping::{build_mappings, CodeFeatures, Mapper, Segment};

use crate::error::PugError;

/// HTML produced from pug, with a mapper from HTML offsets to pug offsets.
#[derive(Debug, Clone, Default)]
pub struct PugOutput {
    pub html: String,
    pub mapper: Mapper,
}

pub fn compile_pug(source: &str) -> Result<PugOutput, PugError> {
    let mut compiler = PugCompiler::new(source);
    compiler.compile()?;
    let built = build_mappings(&compiler.segments);
    Ok(PugOutput {
        html: built.text,
        mapper: built.mapper,
    })
}

/// Smallest indentation of any non-blank line, `None` when every line is
/// blank.
pub fn min_indent(source: &str) -> Option<usize> {
    source
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
}

#[derive(Debug)]
enum OpenKind<'s> {
    Element(&'s str),
    TextBlock,
    Comment,
    SilentComment,
}

#[derive(Debug)]
struct OpenBlock<'s> {
    indent: usize,
    child_indent: Option<usize>,
    kind: OpenKind<'s>,
}

#[derive(Debug)]
struct PugAttr<'s> {
    name: &'s str,
    name_start: usize,
    value: Option<(&'s str, usize)>,
}

struct PugCompiler<'s> {
    source: &'s str,
    bytes: &'s [u8],
    segments: Vec<Segment<'s>>,
    stack: Vec<OpenBlock<'s>>,
    root_indent: Option<usize>,
}

impl<'s> PugCompiler<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            segments: Vec::new(),
            stack: Vec::new(),
            root_indent: None,
        }
    }

    #[inline]
    fn text(&mut self, text: &'static str) {
        self.segments.push(Segment::text(text));
    }

    #[inline]
    fn mapped(&mut self, start: usize, end: usize) {
        if start < end {
            self.segments.push(Segment::mapped(
                &self.source[start..end],
                start as u32,
                CodeFeatures::ALL,
            ));
        }
    }

    fn line_end(&self, from: usize) -> usize {
        let end = memchr(b'\n', &self.bytes[from..]).map_or(self.bytes.len(), |i| from + i);
        if end > from && self.bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        }
    }

    fn next_line(&self, from: usize) -> usize {
        memchr(b'\n', &self.bytes[from..]).map_or(self.bytes.len(), |i| from + i + 1)
    }

    fn compile(&mut self) -> Result<(), PugError> {
        let mut pos = 0;
        let mut line_no = 1u32;

        while pos < self.bytes.len() {
            let line_end = self.line_end(pos);
            let indent = self.bytes[pos..line_end]
                .iter()
                .take_while(|b| matches!(b, b' ' | b'\t'))
                .count();
            let content_start = pos + indent;

            if self.source[content_start..line_end].trim().is_empty() {
                pos = self.next_line(pos);
                line_no += 1;
                continue;
            }

            while self.stack.last().is_some_and(|top| top.indent >= indent) {
                self.close_top();
            }

            let (raw_text, silent) = match self.stack.last().map(|top| &top.kind) {
                Some(OpenKind::TextBlock | OpenKind::Comment) => (true, false),
                Some(OpenKind::SilentComment) => (false, true),
                _ => (false, false),
            };
            if raw_text || silent {
                if raw_text {
                    self.mapped(content_start, line_end);
                    self.text("\n");
                }
                pos = self.next_line(pos);
                line_no += 1;
                continue;
            }

            let expected = match self.stack.last_mut() {
                Some(top) => &mut top.child_indent,
                None => &mut self.root_indent,
            };
            match expected {
                Some(column) if *column != indent => {
                    return Err(PugError::InconsistentIndentation { line: line_no });
                }
                Some(_) => {}
                None => *expected = Some(indent),
            }

            let consumed = self.parse_line(content_start, line_end, indent)?;
            let next = self.next_line(consumed.max(pos));
            line_no += self.source[pos..next].matches('\n').count() as u32;
            pos = next;
        }

        while !self.stack.is_empty() {
            self.close_top();
        }
        Ok(())
    }

    fn close_top(&mut self) {
        let Some(block) = self.stack.pop() else {
            return;
        };
        match block.kind {
            OpenKind::Element(tag) => {
                self.text("</");
                self.segments.push(Segment::text(tag));
                self.text(">");
            }
            OpenKind::Comment => self.text("-->"),
            OpenKind::TextBlock | OpenKind::SilentComment => {}
        }
    }

    fn push_block(&mut self, indent: usize, kind: OpenKind<'s>) {
        self.stack.push(OpenBlock {
            indent,
            child_indent: None,
            kind,
        });
    }

    /// Parse one logical line starting at `start`. Returns the position the
    /// line was consumed to, which may lie past `line_end` when an attribute
    /// list spans lines.
    fn parse_line(&mut self, start: usize, line_end: usize, indent: usize) -> Result<usize, PugError> {
        let rest = &self.source[start..line_end];

        if rest.starts_with("//-") {
            self.push_block(indent, OpenKind::SilentComment);
            return Ok(line_end);
        }
        if rest.starts_with("//") {
            self.text("<!--");
            self.mapped(start + 2, line_end);
            self.push_block(indent, OpenKind::Comment);
            return Ok(line_end);
        }
        if rest.starts_with('|') {
            let text_start = if rest.as_bytes().get(1) == Some(&b' ') {
                start + 2
            } else {
                start + 1
            };
            self.mapped(text_start, line_end);
            self.text("\n");
            return Ok(line_end);
        }
        if rest.starts_with('<') {
            self.mapped(start, line_end);
            self.text("\n");
            return Ok(line_end);
        }

        self.parse_tag(start, line_end, indent)
    }

    fn parse_tag(&mut self, start: usize, line_end: usize, indent: usize) -> Result<usize, PugError> {
        let bytes = self.bytes;
        let mut i = start;

        let implicit_div = matches!(bytes.get(i), Some(b'.') | Some(b'#'));
        let name_start = i;
        if !implicit_div {
            while i < line_end && is_tag_char(bytes[i]) {
                i += 1;
            }
            if i == name_start {
                // Not a tag; keep the line as text
                self.mapped(start, line_end);
                self.text("\n");
                return Ok(line_end);
            }
        }
        let tag: &'s str = if implicit_div {
            "div"
        } else {
            &self.source[name_start..i]
        };

        let mut classes: Vec<(usize, usize)> = Vec::new();
        let mut id: Option<(usize, usize)> = None;
        let mut attrs: Vec<PugAttr<'s>> = Vec::new();
        let mut block_text = false;
        let mut line_end = line_end;

        loop {
            match bytes.get(i) {
                Some(b'.') if i < line_end && bytes.get(i + 1).is_some_and(|&b| is_class_start(b)) => {
                    let class_start = i + 1;
                    i = class_start;
                    while i < line_end && is_name_char(bytes[i]) {
                        i += 1;
                    }
                    classes.push((class_start, i));
                }
                Some(b'.') if i < line_end => {
                    block_text = true;
                    i += 1;
                    break;
                }
                Some(b'#') if i < line_end && bytes.get(i + 1).is_some_and(|&b| is_class_start(b)) => {
                    let id_start = i + 1;
                    i = id_start;
                    while i < line_end && is_name_char(bytes[i]) {
                        i += 1;
                    }
                    id = Some((id_start, i));
                }
                Some(b'(') if i < line_end => {
                    let (parsed, next) = self.parse_attrs(i)?;
                    attrs.extend(parsed);
                    i = next;
                    if i > line_end {
                        line_end = self.line_end(i);
                    }
                }
                _ => break,
            }
        }

        let self_closing = i < line_end && bytes[i] == b'/';
        if self_closing {
            i += 1;
        }

        self.emit_open_tag(tag, (!implicit_div).then_some(name_start), &classes, id, &attrs, self_closing);

        let void = self_closing || is_void_tag(tag);
        if !void {
            self.push_block(indent, OpenKind::Element(tag));
        }

        if block_text {
            self.push_block(indent, OpenKind::TextBlock);
            return Ok(line_end);
        }

        match bytes.get(i) {
            Some(b':') if i < line_end => {
                let mut nested = i + 1;
                while nested < line_end && bytes[nested] == b' ' {
                    nested += 1;
                }
                if nested < line_end {
                    return self.parse_tag(nested, line_end, indent);
                }
            }
            Some(b'=') if i < line_end => {
                let code_start = i + 1;
                let code = &self.source[code_start..line_end];
                let leading = code.len() - code.trim_start().len();
                let trimmed = code.trim().len();
                if trimmed > 0 {
                    self.text("{{ ");
                    self.mapped(code_start + leading, code_start + leading + trimmed);
                    self.text(" }}");
                }
            }
            Some(b' ') if i < line_end => {
                self.mapped(i + 1, line_end);
            }
            _ => {}
        }
        Ok(line_end)
    }

    fn emit_open_tag(
        &mut self,
        tag: &'s str,
        tag_start: Option<usize>,
        classes: &[(usize, usize)],
        id: Option<(usize, usize)>,
        attrs: &[PugAttr<'s>],
        self_closing: bool,
    ) {
        self.text("<");
        match tag_start {
            Some(start) => self.mapped(start, start + tag.len()),
            None => self.segments.push(Segment::text(tag)),
        }

        if !classes.is_empty() {
            self.text(" class=\"");
            for (i, &(start, end)) in classes.iter().enumerate() {
                if i > 0 {
                    self.text(" ");
                }
                self.mapped(start, end);
            }
            self.text("\"");
        }
        if let Some((start, end)) = id {
            self.text(" id=\"");
            self.mapped(start, end);
            self.text("\"");
        }
        for attr in attrs {
            self.text(" ");
            self.mapped(attr.name_start, attr.name_start + attr.name.len());
            if let Some((value, value_start)) = attr.value {
                let quote = if value.contains('"') && !value.contains('\'') {
                    "'"
                } else {
                    "\""
                };
                self.text("=");
                self.text(quote);
                self.mapped(value_start, value_start + value.len());
                self.text(quote);
            }
        }

        self.text(if self_closing { " />" } else { ">" });
    }

    /// Parse `( ... )` starting at the `(`. Returns the attributes and the
    /// position after the closing `)`.
    fn parse_attrs(&self, open: usize) -> Result<(Vec<PugAttr<'s>>, usize), PugError> {
        let bytes = self.bytes;
        let len = bytes.len();
        let mut attrs = Vec::new();
        let mut i = open + 1;

        loop {
            while i < len && (bytes[i].is_ascii_whitespace() || bytes[i] == b',') {
                i += 1;
            }
            if i >= len {
                return Err(PugError::UnterminatedAttributes { offset: open as u32 });
            }
            if bytes[i] == b')' {
                return Ok((attrs, i + 1));
            }

            let name_start = i;
            let mut brackets = 0usize;
            while i < len {
                match bytes[i] {
                    b'[' => brackets += 1,
                    b']' => brackets = brackets.saturating_sub(1),
                    b'=' | b',' | b')' if brackets == 0 => break,
                    b if b.is_ascii_whitespace() && brackets == 0 => break,
                    _ => {}
                }
                i += 1;
            }
            let mut name_end = i;
            // `name!=` marks an unescaped value
            if name_end > name_start && bytes[name_end - 1] == b'!' && bytes.get(i) == Some(&b'=') {
                name_end -= 1;
            }
            if name_end == name_start {
                i += 1;
                continue;
            }
            let name = &self.source[name_start..name_end];

            let mut lookahead = i;
            while lookahead < len && matches!(bytes[lookahead], b' ' | b'\t') {
                lookahead += 1;
            }
            let mut value = None;
            if bytes.get(lookahead) == Some(&b'=') {
                i = lookahead + 1;
                while i < len && matches!(bytes[i], b' ' | b'\t') {
                    i += 1;
                }
                let (value_start, value_end, next) = self.parse_attr_value(i)?;
                value = Some((&self.source[value_start..value_end], value_start));
                i = next;
            }

            attrs.push(PugAttr {
                name,
                name_start,
                value,
            });
        }
    }

    /// Returns the value range (without quotes) and the position after it.
    fn parse_attr_value(&self, start: usize) -> Result<(usize, usize, usize), PugError> {
        let bytes = self.bytes;
        let len = bytes.len();

        if let Some(quote) = bytes.get(start).copied().filter(|b| matches!(*b, b'"' | b'\'' | b'`')) {
            let mut i = start + 1;
            while i < len {
                match bytes[i] {
                    b'\\' => i += 2,
                    b if b == quote => return Ok((start + 1, i, i + 1)),
                    _ => i += 1,
                }
            }
            return Err(PugError::UnterminatedString { offset: start as u32 });
        }

        // Unquoted JavaScript expression
        let mut depth = 0usize;
        let mut i = start;
        while i < len {
            match bytes[i] {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' if depth > 0 => depth -= 1,
                b')' => break,
                b',' if depth == 0 => break,
                b if b.is_ascii_whitespace() && depth == 0 => break,
                q @ (b'"' | b'\'' | b'`') => {
                    i += 1;
                    while i < len && bytes[i] != q {
                        if bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        let end = i.min(len);
        Ok((start, end, end))
    }
}

#[inline]
fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':')
}

#[inline]
fn is_class_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'_' | b'-')
}

#[inline]
fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(source: &str) -> String {
        compile_pug(source).unwrap().html
    }

    #[test]
    fn test_nesting_and_shorthands() {
        let output = html("div.card#main\n  p.title Hello\n  img(src=\"a.png\")\n  span");
        insta::assert_snapshot!(output, @r#"<div class="card" id="main"><p class="title">Hello</p><img src="a.png"><span></span></div>"#);
    }

    #[test]
    fn test_attribute_lists() {
        let output = html("button(\n  type=\"button\",\n  :disabled='busy || form[\"x\"]'\n  @click=save\n) Save");
        assert_eq!(
            output,
            r#"<button type="button" :disabled='busy || form["x"]' @click="save">Save</button>"#
        );
    }

    #[test]
    fn test_text_forms() {
        let output = html("p.\n  line one\n  line two\nul\n  li: a(href=\"#\") link\n  | piped\nspan= message\n//- hidden\n  still hidden\n// shown");
        assert_eq!(
            output,
            "<p>line one\nline two\n</p><ul><li><a href=\"#\">link</a></li>piped\n</ul><span>{{ message }}</span><!-- shown-->"
        );
    }

    #[test]
    fn test_mappings_point_into_pug() {
        let source = "template\n  div(v-if=\"ok\") {{ msg }}";
        let output = compile_pug(source).unwrap();
        assert!(output.html.starts_with("<template>"));
        assert!(output.html.ends_with("</template>"));

        let ok = output.html.find("ok").unwrap() as u32;
        assert_eq!(output.mapper.first_source(ok), Some(source.find("ok").unwrap() as u32));
        let msg = output.html.find("msg").unwrap() as u32;
        assert_eq!(output.mapper.first_source(msg), Some(source.find("msg").unwrap() as u32));
    }

    #[test]
    fn test_unterminated_attributes() {
        let err = compile_pug("div(class=\"a\"\n  span").unwrap_err();
        assert!(matches!(err, PugError::UnterminatedString { .. } | PugError::UnterminatedAttributes { .. }));
        let err = compile_pug("div(a=1").unwrap_err();
        assert_eq!(err, PugError::UnterminatedAttributes { offset: 3 });
    }

    #[test]
    fn test_inconsistent_indentation() {
        let err = compile_pug("div\n    p\n  span").unwrap_err();
        assert_eq!(err, PugError::InconsistentIndentation { line: 3 });
    }

    #[test]
    fn test_min_indent() {
        assert_eq!(min_indent("\n  div\n    p\n"), Some(2));
        assert_eq!(min_indent("div\n  p"), Some(0));
        assert_eq!(min_indent("\n   \n"), None);
    }
}
