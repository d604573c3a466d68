//! Segment stream builder shared by every producer.

use std::borrow::Cow;

use vellum_carton::CompactString;
use vellum_mapping::{build_mappings, segments_to_string, BuiltCode, CodeFeatures, Segment};

pub const END_OF_LINE: &str = ";\n";
pub const NEW_LINE: &str = "\n";

/// Ordered output of one generation pass.
///
/// Producers append into it in a fixed order; nothing is reordered
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Codes<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> Codes<'a> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unmapped text.
    #[inline]
    pub fn text(&mut self, text: impl Into<Cow<'a, str>>) {
        let text = text.into();
        if !text.is_empty() {
            self.segments.push(Segment::Text(text));
        }
    }

    /// Append text that maps back to `offset` in the document.
    #[inline]
    pub fn mapped(
        &mut self,
        text: impl Into<Cow<'a, str>>,
        source_key: &str,
        offset: u32,
        features: CodeFeatures,
    ) {
        self.segments
            .push(Segment::mapped(text, offset, features).with_source_key(source_key));
    }

    /// Append text mapped when an offset is known, plain otherwise.
    #[inline]
    pub fn maybe_mapped(
        &mut self,
        text: impl Into<Cow<'a, str>>,
        source_key: &str,
        offset: Option<u32>,
        features: CodeFeatures,
    ) {
        match offset {
            Some(offset) => self.mapped(text, source_key, offset, features),
            None => self.text(text),
        }
    }

    /// Append `content[start..end]` of a section whose content begins at
    /// `base` in the document.
    pub fn section_slice(
        &mut self,
        content: &'a str,
        source_key: &str,
        base: u32,
        start: u32,
        end: u32,
        features: CodeFeatures,
    ) {
        if start >= end {
            return;
        }
        if let Some(text) = content.get(start as usize..end as usize) {
            self.mapped(text, source_key, base + start, features);
        }
    }

    /// Append `name` as a single-quoted string literal. Escapes are
    /// unmapped; every character of `name` stays mapped to its own offset.
    pub fn quoted(
        &mut self,
        name: &str,
        source_key: &str,
        offset: Option<u32>,
        features: CodeFeatures,
    ) {
        let Some(offset) = offset else {
            self.text(quoted_key(name).to_string());
            return;
        };
        self.text("'");
        let mut run = 0;
        for (i, c) in name.char_indices() {
            if c == '\'' || c == '\\' {
                if run < i {
                    self.mapped(name[run..i].to_owned(), source_key, offset + run as u32, features);
                }
                self.text("\\");
                run = i;
            }
        }
        if run < name.len() {
            self.mapped(name[run..].to_owned(), source_key, offset + run as u32, features);
        }
        self.text("'");
    }

    #[inline]
    pub fn push(&mut self, segment: Segment<'a>) {
        self.segments.push(segment);
    }

    #[inline]
    pub fn append(&mut self, other: Codes<'a>) {
        self.segments.extend(other.segments);
    }

    #[inline]
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenated text without building mappings.
    pub fn to_text(&self) -> String {
        segments_to_string(&self.segments)
    }

    pub fn finish(&self) -> BuiltCode {
        build_mappings(&self.segments)
    }
}

/// Merge expressions with object spread. A single expression is emitted as
/// is.
pub fn generate_spread_merge<'a>(codes: &mut Codes<'a>, exps: &[Cow<'a, str>]) {
    match exps {
        [] => codes.text("{}"),
        [single] => codes.text(single.clone()),
        _ => {
            codes.text("{\n");
            for exp in exps {
                codes.text("...");
                codes.text(exp.clone());
                codes.text(",\n");
            }
            codes.text("}");
        }
    }
}

/// Quote `name` as a TypeScript string literal key.
pub fn quoted_key(name: &str) -> CompactString {
    let mut out = CompactString::with_capacity(name.len() + 2);
    out.push('\'');
    for c in name.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_merge() {
        let mut single = Codes::new();
        generate_spread_merge(&mut single, &[Cow::Borrowed("globalThis")]);
        assert_eq!(single.to_text(), "globalThis");

        let mut many = Codes::new();
        generate_spread_merge(&mut many, &[Cow::Borrowed("a"), Cow::Borrowed("b")]);
        assert_eq!(many.to_text(), "{\n...a,\n...b,\n}");
    }

    #[test]
    fn test_section_slice_is_document_absolute() {
        let content = "export default {}";
        let mut codes = Codes::new();
        codes.section_slice(content, "script", 100, 15, 17, CodeFeatures::NAVIGATION);
        let built = codes.finish();
        assert_eq!(built.text, "{}");
        let range = &built.mapper.ranges()[0];
        assert_eq!(range.source_start, 115);
        assert_eq!(range.source_key.as_deref(), Some("script"));
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut codes = Codes::new();
        codes.text("");
        codes.text(String::new());
        assert!(codes.is_empty());
    }

    #[test]
    fn test_quoted_escapes_but_keeps_name_mapped() {
        let mut codes = Codes::new();
        codes.quoted("a'b\\c", "template", Some(40), CodeFeatures::NAVIGATION);
        let built = codes.finish();
        assert_eq!(built.text, "'a\\'b\\\\c'");

        let sources: Vec<(u32, u32)> = built
            .mapper
            .ranges()
            .iter()
            .map(|r| (r.source_start, r.source_end))
            .collect();
        assert_eq!(sources, vec![(40, 41), (41, 43), (43, 45)]);
        let mapped: u32 = built.mapper.ranges().iter().map(|r| r.generated_len()).sum();
        assert_eq!(mapped, 5);
    }

    #[test]
    fn test_quoted_without_offset() {
        let mut codes = Codes::new();
        codes.quoted("it's", "template", None, CodeFeatures::NAVIGATION);
        assert_eq!(codes.to_text(), "'it\\'s'");
        assert!(codes.finish().mapper.is_empty());
    }

    #[test]
    fn test_quoted_key() {
        assert_eq!(quoted_key("foo"), "'foo'");
        assert_eq!(quoted_key("it's"), "'it\\'s'");
    }
}
