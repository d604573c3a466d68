//! Style section scans: `v-bind()` expressions and class selectors.

use once_cell::sync::Lazy;
use regex::Regex;
use vellum_carton::CompactString;

use crate::types::{StyleBinding, StyleClassName};

static V_BIND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bv-bind\(\s*(?:'([^']+)'|"([^"]+)"|([a-z_]\w*))\s*\)"#)
        .expect("v-bind pattern is valid")
});

/// Collect `v-bind()` expressions, with offsets relative to `css`.
pub fn parse_style_bindings(css: &str) -> Vec<StyleBinding> {
    let css = blank_comments(css);
    V_BIND
        .captures_iter(&css)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| StyleBinding {
            text: CompactString::new(m.as_str()),
            offset: m.start() as u32,
        })
        .collect()
}

/// Collect class selectors (`.name`), with offsets relative to `css`.
///
/// Declarations are blanked first so numeric values such as `.5em` are not
/// mistaken for classes.
pub fn parse_class_names(css: &str) -> Vec<StyleClassName> {
    let css = blank_declarations(&blank_comments(css));
    let bytes = css.as_bytes();
    let mut names = Vec::new();

    for (dot, _) in css.match_indices('.') {
        let start = dot + 1;
        match bytes.get(start) {
            Some(&b) if b.is_ascii_alphabetic() || b == b'_' => {}
            _ => continue,
        }
        let mut end = start + 1;
        while end < bytes.len()
            && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'-' || bytes[end] == b'_')
        {
            end += 1;
        }
        let followed = bytes.get(end).is_some_and(|&b| {
            b.is_ascii_whitespace()
                || matches!(b, b'.' | b',' | b'+' | b'~' | b'>' | b':' | b'#' | b')' | b'[' | b'{')
        });
        if followed {
            names.push(StyleClassName {
                text: CompactString::new(&css[dot..end]),
                offset: dot as u32,
            });
        }
    }

    names
}

/// Replace the inside of `/* */` and `//` comments with spaces.
fn blank_comments(css: &str) -> String {
    let mut out = css.as_bytes().to_vec();
    let len = out.len();
    let mut pos = 0;

    while pos + 1 < len {
        if out[pos] == b'/' && out[pos + 1] == b'*' {
            let start = pos + 2;
            let end = find(&out[start..], b"*/").map_or(len, |e| start + e);
            blank(&mut out[start..end]);
            pos = end + 2;
        } else if out[pos] == b'/' && out[pos + 1] == b'/' {
            let start = pos + 2;
            let end = out[start..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(len, |e| start + e);
            blank(&mut out[start..end]);
            pos = end;
        } else {
            pos += 1;
        }
    }

    into_string(out, css)
}

/// Blank declaration runs: from each `{` up to the last unescaped `;` before
/// the next `{`.
fn blank_declarations(css: &str) -> String {
    let mut out = css.as_bytes().to_vec();
    let len = out.len();
    let mut pos = 0;

    while pos < len {
        if out[pos] != b'{' {
            pos += 1;
            continue;
        }
        let start = pos + 1;
        let run_end = out[start..]
            .iter()
            .position(|&b| b == b'{')
            .map_or(len, |e| start + e);
        let last_semi = (start..run_end)
            .rev()
            .find(|&i| out[i] == b';' && (i == 0 || out[i - 1] != b'\\'));
        if let Some(semi) = last_semi {
            blank(&mut out[start..semi]);
        }
        pos = run_end;
    }

    into_string(out, css)
}

#[inline]
fn blank(bytes: &mut [u8]) {
    bytes.fill(b' ');
}

#[inline]
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    memchr::memmem::find(haystack, needle)
}

/// Blanked spans always sit between ASCII delimiters, so the bytes stay
/// valid UTF-8.
#[inline]
fn into_string(bytes: Vec<u8>, original: &str) -> String {
    String::from_utf8(bytes).unwrap_or_else(|_| original.to_owned())
}
