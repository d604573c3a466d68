//! Section parsing.
//!
//! Byte-level scan over the document. The parser never fails: malformed
//! input is recovered from and recorded as a [`SectionDiagnostic`].

use crate::style::{parse_class_names, parse_style_bindings};
use crate::types::*;
use memchr::{memchr, memmem};
use std::borrow::Cow;
use tracing::debug;
use vellum_carton::{CompactString, FxHashMap};

const COMMENT_OPEN: &[u8] = b"<!--";
const COMMENT_CLOSE: &[u8] = b"-->";

const TAG_TEMPLATE: &str = "template";
const TAG_SCRIPT: &str = "script";
const TAG_STYLE: &str = "style";

/// Parse a document into sections.
pub fn parse_sfc(source: &str) -> Sections<'_> {
    let mut sections = Sections::default();
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut pos = 0;

    while pos < len {
        let Some(lt) = memchr(b'<', &bytes[pos..]) else {
            break;
        };
        pos += lt;

        if bytes[pos..].starts_with(COMMENT_OPEN) {
            pos = skip_comment(bytes, pos);
            continue;
        }

        let tag = match parse_open_tag(bytes, source, pos) {
            OpenTag::NotATag => {
                pos += 1;
                continue;
            }
            OpenTag::Unterminated => {
                sections.diagnostics.push(SectionDiagnostic {
                    message: "Unterminated opening tag".into(),
                    code: DiagnosticCode::UnterminatedSection,
                    loc: BlockLocation::new(pos as u32, len as u32),
                });
                break;
            }
            OpenTag::Tag(tag) => tag,
        };

        let content_start = tag.end;
        let (content_end, end_pos) = if tag.self_closing {
            (content_start, content_start)
        } else {
            match find_close_tag(bytes, source, tag.name, content_start) {
                Some(close) => close,
                None => {
                    sections.diagnostics.push(SectionDiagnostic {
                        message: format!("Element <{}> is missing end tag", tag.name),
                        code: DiagnosticCode::UnterminatedSection,
                        loc: BlockLocation::new(content_start as u32, len as u32),
                    });
                    (len, len)
                }
            }
        };

        let content = Cow::Borrowed(&source[content_start..content_end]);
        let loc = BlockLocation::new(content_start as u32, content_end as u32);
        push_section(&mut sections, tag, content, loc);

        pos = end_pos;
    }

    debug!(
        template = sections.template.is_some(),
        script = sections.script.is_some(),
        script_setup = sections.script_setup.is_some(),
        styles = sections.styles.len(),
        custom_blocks = sections.custom_blocks.len(),
        diagnostics = sections.diagnostics.len(),
        "parsed sections"
    );

    sections
}

fn push_section<'a>(
    sections: &mut Sections<'a>,
    tag: Tag<'a>,
    content: Cow<'a, str>,
    loc: BlockLocation,
) {
    let Tag { name, mut attrs, .. } = tag;
    let lang = attrs.get("lang").cloned();

    if name.eq_ignore_ascii_case(TAG_TEMPLATE) {
        if sections.template.is_some() {
            sections.diagnostics.push(duplicate(
                "Document can only contain one <template> section",
                DiagnosticCode::DuplicateTemplate,
                loc,
            ));
            return;
        }
        sections.template = Some(TemplateSection {
            name: CompactString::new("template"),
            content,
            loc,
            lang,
            attrs,
        });
    } else if name.eq_ignore_ascii_case(TAG_SCRIPT) {
        let setup = attrs.contains_key("setup");
        let (slot, key, message, code) = if setup {
            (
                &mut sections.script_setup,
                "scriptSetup",
                "Document can only contain one <script setup> section",
                DiagnosticCode::DuplicateScriptSetup,
            )
        } else {
            (
                &mut sections.script,
                "script",
                "Document can only contain one <script> section",
                DiagnosticCode::DuplicateScript,
            )
        };
        if slot.is_some() {
            sections.diagnostics.push(duplicate(message, code, loc));
            return;
        }
        *slot = Some(ScriptSection {
            name: CompactString::new(key),
            content,
            loc,
            lang,
            setup,
            attrs,
        });
    } else if name.eq_ignore_ascii_case(TAG_STYLE) {
        let scoped = attrs.contains_key("scoped");
        let module = attrs.remove("module").map(|value| {
            if value.is_empty() {
                Cow::Borrowed("$style")
            } else {
                value
            }
        });
        if let Some(module) = &module {
            attrs.insert(Cow::Borrowed("module"), module.clone());
        }
        let bindings = parse_style_bindings(&content);
        let class_names = parse_class_names(&content);
        sections.styles.push(StyleSection {
            name: vellum_carton::format_compact!("style_{}", sections.styles.len()),
            content,
            loc,
            lang,
            scoped,
            module,
            bindings,
            class_names,
            attrs,
        });
    } else {
        sections.custom_blocks.push(CustomSection {
            name: vellum_carton::format_compact!("customBlock_{}", sections.custom_blocks.len()),
            block_type: Cow::Borrowed(name),
            content,
            loc,
            lang,
            attrs,
        });
    }
}

fn duplicate(message: &str, code: DiagnosticCode, loc: BlockLocation) -> SectionDiagnostic {
    SectionDiagnostic {
        message: message.into(),
        code,
        loc,
    }
}

/// Position after the comment starting at `start`, or the end of input.
#[inline]
fn skip_comment(bytes: &[u8], start: usize) -> usize {
    let body = start + COMMENT_OPEN.len();
    match memmem::find(&bytes[body..], COMMENT_CLOSE) {
        Some(end) => body + end + COMMENT_CLOSE.len(),
        None => bytes.len(),
    }
}

struct Tag<'a> {
    name: &'a str,
    attrs: SectionAttrs<'a>,
    /// Position after `>`
    end: usize,
    self_closing: bool,
}

enum OpenTag<'a> {
    Tag(Tag<'a>),
    /// `<` not followed by a tag name
    NotATag,
    /// Input ended inside the tag
    Unterminated,
}

/// Parse an opening tag starting at the `<` at `start`.
fn parse_open_tag<'a>(bytes: &[u8], source: &'a str, start: usize) -> OpenTag<'a> {
    let len = bytes.len();
    let mut pos = start + 1;

    if pos >= len || !bytes[pos].is_ascii_alphabetic() {
        return OpenTag::NotATag;
    }
    let name_start = pos;
    while pos < len && is_tag_name_char(bytes[pos]) {
        pos += 1;
    }
    if pos < len && !is_whitespace(bytes[pos]) && bytes[pos] != b'>' && bytes[pos] != b'/' {
        return OpenTag::NotATag;
    }
    let name = &source[name_start..pos];

    let mut attrs: SectionAttrs<'a> = FxHashMap::default();

    loop {
        while pos < len && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= len {
            return OpenTag::Unterminated;
        }

        match bytes[pos] {
            b'>' => {
                return OpenTag::Tag(Tag {
                    name,
                    attrs,
                    end: pos + 1,
                    self_closing: false,
                });
            }
            b'/' if bytes.get(pos + 1) == Some(&b'>') => {
                return OpenTag::Tag(Tag {
                    name,
                    attrs,
                    end: pos + 2,
                    self_closing: true,
                });
            }
            b'/' => {
                pos += 1;
                continue;
            }
            _ => {}
        }

        // Attribute name
        let attr_start = pos;
        while pos < len && !is_attr_name_end(bytes[pos]) {
            pos += 1;
        }
        if pos == attr_start {
            pos += 1;
            continue;
        }
        let attr_name = &source[attr_start..pos];

        while pos < len && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        let value: Cow<'a, str> = if pos < len && bytes[pos] == b'=' {
            pos += 1;
            while pos < len && is_whitespace(bytes[pos]) {
                pos += 1;
            }
            if pos < len && (bytes[pos] == b'"' || bytes[pos] == b'\'') {
                let quote = bytes[pos];
                pos += 1;
                let value_start = pos;
                match memchr(quote, &bytes[pos..]) {
                    Some(offset) => {
                        pos += offset;
                        let value = Cow::Borrowed(&source[value_start..pos]);
                        pos += 1;
                        value
                    }
                    None => return OpenTag::Unterminated,
                }
            } else {
                // Unquoted value
                let value_start = pos;
                while pos < len && !is_whitespace(bytes[pos]) && bytes[pos] != b'>' {
                    pos += 1;
                }
                Cow::Borrowed(&source[value_start..pos])
            }
        } else {
            // Boolean attribute
            Cow::Borrowed("")
        };

        attrs.entry(Cow::Borrowed(attr_name)).or_insert(value);
    }
}

/// Find the closing tag for `name`, returning the content end and the
/// position after the closing tag.
fn find_close_tag(bytes: &[u8], source: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let nested = name.eq_ignore_ascii_case(TAG_TEMPLATE);
    let raw_text = name.eq_ignore_ascii_case(TAG_SCRIPT) || name.eq_ignore_ascii_case(TAG_STYLE);
    let len = bytes.len();
    let mut depth = 1usize;
    let mut pos = from;

    while pos < len {
        let lt = memchr(b'<', &bytes[pos..])?;
        pos += lt;

        if !raw_text && bytes[pos..].starts_with(COMMENT_OPEN) {
            pos = skip_comment(bytes, pos);
            continue;
        }

        if let Some(end) = match_close_tag(bytes, pos, name) {
            depth -= 1;
            if depth == 0 {
                return Some((pos, end));
            }
            pos = end;
            continue;
        }

        if nested && starts_with_tag(bytes, pos + 1, name) {
            if let OpenTag::Tag(tag) = parse_open_tag(bytes, source, pos) {
                if !tag.self_closing {
                    depth += 1;
                }
                pos = tag.end;
                continue;
            }
        }

        pos += 1;
    }

    None
}

/// Match `</name\s*>` at `pos`, returning the position after `>`.
fn match_close_tag(bytes: &[u8], pos: usize, name: &str) -> Option<usize> {
    if bytes.get(pos + 1) != Some(&b'/') || !starts_with_tag(bytes, pos + 2, name) {
        return None;
    }
    let mut end = pos + 2 + name.len();
    while end < bytes.len() && is_whitespace(bytes[end]) {
        end += 1;
    }
    (bytes.get(end) == Some(&b'>')).then_some(end + 1)
}

/// Check that `name` starts at `pos` and is not a prefix of a longer name.
#[inline]
fn starts_with_tag(bytes: &[u8], pos: usize, name: &str) -> bool {
    let end = pos + name.len();
    end <= bytes.len()
        && bytes[pos..end].eq_ignore_ascii_case(name.as_bytes())
        && bytes.get(end).map_or(true, |&b| !is_tag_name_char(b))
}

#[inline(always)]
fn is_tag_name_char(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b':')
}

#[inline(always)]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

#[inline(always)]
fn is_attr_name_end(b: u8) -> bool {
    is_whitespace(b) || matches!(b, b'=' | b'>' | b'/')
}
