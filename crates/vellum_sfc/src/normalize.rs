//! Markdown document normalization.
//!
//! Markdown pages embed `<script>` and `<style>` elements anywhere in the
//! text. Syntax that could be mistaken for tags (code, math, links) is masked
//! with spaces, the embedded elements are moved to the front, and the rest of
//! the page becomes the template. Masking never changes text length, and
//! every section range is translated back to document coordinates.

use std::borrow::Cow;
use std::ops::Range;

use memchr::memmem;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use vellum_carton::blank;
use vellum_mapping::{build_mappings, CodeFeatures, Mapper, Segment};

use crate::parse::parse_sfc;
use crate::types::{BlockLocation, Sections};

static FRONTMATTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A---[\s\S]*?\n---(?:\r?\n|\z)").expect("frontmatter pattern is valid"));
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^\n`]+?`").expect("inline code pattern is valid"));
static ESCAPED_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\<[\s\S]+?>\n?").expect("escaped tag pattern is valid"));
static SNIPPET_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*<<<\s*.+").expect("snippet import pattern is valid"));
static ANGLE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\S*:\S*>").expect("angle link pattern is valid"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[\s\S]*?\]\([\s\S]*?\)").expect("link pattern is valid"));

const TEMPLATE_OPEN: &str = "<template>\n";
const TEMPLATE_CLOSE: &str = "\n</template>";

/// Mask markdown syntax that must not be read as markup.
pub fn mask_markdown(content: &str) -> String {
    let mut text = content.to_owned();

    blank_matches(&mut text, &FRONTMATTER, |m| m);
    blank_fenced(&mut text, b'`', 3);
    blank_matches(&mut text, &INLINE_CODE, |m| m.start + 1..m.end - 1);
    blank_fenced(&mut text, b'$', 2);
    blank_matches(&mut text, &ESCAPED_TAG, |m| m);
    blank_matches(&mut text, &SNIPPET_IMPORT, |m| m);
    blank_matches(&mut text, &ANGLE_LINK, |m| m);
    blank_matches(&mut text, &LINK, |m| m);

    text
}

/// Parse a markdown page into sections with document-relative ranges.
pub fn parse_markdown(content: &str) -> Sections<'static> {
    let masked = mask_markdown(content);
    let blocks = find_embedded_blocks(&masked);

    let mut body = masked.clone();
    let mut codes: Vec<Segment<'_>> = Vec::with_capacity(blocks.len() * 2 + 3);
    for block in &blocks {
        codes.push(Segment::mapped(
            &masked[block.clone()],
            block.start as u32,
            CodeFeatures::empty(),
        ));
        codes.push(Segment::text("\n\n"));
        body.replace_range(block.clone(), &blank(block.len()));
    }
    codes.push(Segment::text(TEMPLATE_OPEN));
    codes.push(Segment::mapped(body.as_str(), 0, CodeFeatures::empty()));
    codes.push(Segment::text(TEMPLATE_CLOSE));

    let built = build_mappings(&codes);
    let mut sections = parse_sfc(&built.text).into_owned();

    if let Some(template) = &mut sections.template {
        template.loc = to_document(&built.mapper, template.loc);
        template.content = Cow::Owned(slice(&body, template.loc));
    }
    for script in sections.script.iter_mut().chain(sections.script_setup.iter_mut()) {
        script.loc = to_document(&built.mapper, script.loc);
        script.content = Cow::Owned(slice(&masked, script.loc));
    }
    for style in &mut sections.styles {
        style.loc = to_document(&built.mapper, style.loc);
        style.content = Cow::Owned(slice(&masked, style.loc));
    }
    for custom in &mut sections.custom_blocks {
        custom.loc = to_document(&built.mapper, custom.loc);
        custom.content = Cow::Owned(slice(&masked, custom.loc));
    }
    for diagnostic in &mut sections.diagnostics {
        diagnostic.loc = to_document(&built.mapper, diagnostic.loc);
    }

    debug!(
        blocks = blocks.len(),
        ranges = built.mapper.len(),
        "normalized markdown page"
    );

    sections
}

/// Translate a range in the rearranged text back to the document.
///
/// Each boundary takes its first candidate. A boundary that falls on
/// synthetic text moves inward to the nearest mapped range; if nothing inside
/// the range maps, it collapses onto the other boundary.
fn to_document(mapper: &Mapper, loc: BlockLocation) -> BlockLocation {
    let inside = |r: &&vellum_mapping::MappedRange| {
        r.generated_start >= loc.start && r.generated_end <= loc.end
    };
    let start = mapper.first_source(loc.start).or_else(|| {
        mapper
            .ranges()
            .iter()
            .find(inside)
            .map(|r| r.source_start)
    });
    let end = mapper.first_source(loc.end).or_else(|| {
        mapper
            .ranges()
            .iter()
            .rev()
            .find(inside)
            .map(|r| r.source_end)
    });

    match (start, end) {
        (Some(start), Some(end)) if start <= end => BlockLocation::new(start, end),
        (Some(start), _) => BlockLocation::new(start, start),
        (None, Some(end)) => BlockLocation::new(end, end),
        (None, None) => BlockLocation::default(),
    }
}

#[inline]
fn slice(text: &str, loc: BlockLocation) -> String {
    text.get(loc.start as usize..loc.end as usize)
        .unwrap_or_default()
        .to_owned()
}

fn blank_matches(text: &mut String, re: &Regex, span: impl Fn(Range<usize>) -> Range<usize>) {
    let spans: Vec<Range<usize>> = re.find_iter(text.as_str()).map(|m| span(m.range())).collect();
    for range in spans {
        text.replace_range(range.clone(), &blank(range.len()));
    }
}

/// Blank the inside of fenced runs such as ```` ```code``` ```` or `$$x$$`.
///
/// A fence of `n >= min` markers closes at the next run of the same `n`
/// markers; longer opening runs are tried first.
fn blank_fenced(text: &mut String, marker: u8, min: usize) {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < len {
        if bytes[pos] != marker {
            pos += 1;
            continue;
        }
        let run = bytes[pos..].iter().take_while(|&&b| b == marker).count();
        if run < min {
            pos += run;
            continue;
        }

        let mut found = None;
        for n in (min..=run).rev() {
            let search = pos + n + 1;
            if search > len {
                continue;
            }
            let fence = &bytes[pos..pos + n];
            if let Some(offset) = memmem::find(&bytes[search..], fence) {
                found = Some((n, search + offset));
                break;
            }
        }

        match found {
            Some((n, close)) => {
                spans.push(pos + n..close);
                pos = close + n;
            }
            None => pos += 1,
        }
    }

    for range in spans {
        text.replace_range(range.clone(), &blank(range.len()));
    }
}

/// Top-level `<script>` / `<style>` elements, in document order.
fn find_embedded_blocks(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(lt) = memchr::memchr(b'<', &bytes[pos..]) {
        let start = pos + lt;
        let rest = &bytes[start + 1..];
        let name: &[u8] = if rest.starts_with(b"script") {
            b"script"
        } else if rest.starts_with(b"style") {
            b"style"
        } else {
            pos = start + 1;
            continue;
        };

        let after_name = start + 1 + name.len();
        let boundary = bytes
            .get(after_name)
            .map_or(true, |&b| !(b.is_ascii_alphanumeric() || b == b'_'));
        let open_end = boundary
            .then(|| memchr::memchr(b'>', &bytes[after_name..]))
            .flatten()
            .map(|gt| after_name + gt + 1);

        let close = open_end.and_then(|open_end| {
            let mut closing = Vec::with_capacity(name.len() + 3);
            closing.extend_from_slice(b"</");
            closing.extend_from_slice(name);
            closing.push(b'>');
            memmem::find(&bytes[open_end..], &closing).map(|c| open_end + c + closing.len())
        });

        match close {
            Some(end) => {
                blocks.push(start..end);
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_preserves_length() {
        let content = "---\ntitle: Hi\n---\n# Title `<b>` and [link](http://x.y) <https://a.b>\n";
        let masked = mask_markdown(content);
        assert_eq!(masked.len(), content.len());
        assert!(!masked.contains("title"));
        assert!(!masked.contains("<b>"));
        assert!(!masked.contains("http"));
        assert!(masked.contains("# Title `   ` and"));
    }

    #[test]
    fn test_mask_fenced_code_keeps_fences() {
        let content = "before\n```vue\n<script setup>\nconst a = 1\n</script>\n```\nafter";
        let masked = mask_markdown(content);
        assert_eq!(masked.len(), content.len());
        assert!(!masked.contains("<script"));
        assert!(masked.starts_with("before\n```"));
        assert!(masked.ends_with("```\nafter"));
    }

    #[test]
    fn test_mask_longer_fence() {
        let content = "````md\n```js\nx\n```\n````\n";
        let masked = mask_markdown(content);
        insta::assert_snapshot!(masked.trim_end().replace(' ', "."), @"````...............````");
    }

    #[test]
    fn test_mask_math_escaped_tags_and_snippets() {
        let content = "$$\n<x>\n$$\n\\<script setup>\n<<< @/snippets/a.js\ntext";
        let masked = mask_markdown(content);
        assert_eq!(masked.len(), content.len());
        assert!(!masked.contains("<x>"));
        assert!(!masked.contains("script"));
        assert!(!masked.contains("<<<"));
        assert!(masked.ends_with("text"));
    }

    #[test]
    fn test_parse_markdown_sections() {
        let content = "# Hello {{ msg }}\n\n<script setup>\nconst msg = 'hi'\n</script>\n\nBody\n\n<style scoped>\n.a {}\n</style>\n";
        let sections = parse_markdown(content);

        let script = sections.script_setup.as_ref().unwrap();
        let start = script.loc.start as usize;
        let end = script.loc.end as usize;
        assert_eq!(&content[start..end], "\nconst msg = 'hi'\n");
        assert_eq!(script.content, "\nconst msg = 'hi'\n");

        let style = &sections.styles[0];
        assert!(style.scoped);
        assert_eq!(
            &content[style.loc.start as usize..style.loc.end as usize],
            "\n.a {}\n"
        );
        assert_eq!(style.class_names[0].text, ".a");

        let template = sections.template.as_ref().unwrap();
        assert_eq!(template.loc, BlockLocation::new(0, content.len() as u32));
        assert_eq!(template.content.len(), content.len());
        assert!(template.content.starts_with("# Hello {{ msg }}"));
        assert!(!template.content.contains("<script"));
    }

    #[test]
    fn test_code_blocks_do_not_become_sections() {
        let content = "```html\n<script>alert(1)</script>\n```\n";
        let sections = parse_markdown(content);
        assert!(sections.script.is_none());
        assert!(sections.template.is_some());
    }

    #[test]
    fn test_empty_page() {
        let sections = parse_markdown("");
        let template = sections.template.unwrap();
        assert_eq!(template.loc, BlockLocation::new(0, 0));
        assert_eq!(template.content, "");
    }
}
