//! Naming and identifier helpers.

use compact_str::CompactString;
use phf::phf_set;

static JS_GLOBALS: phf::Set<&'static str> = phf_set! {
    "Infinity", "undefined", "NaN", "isFinite", "isNaN", "parseFloat", "parseInt",
    "decodeURI", "decodeURIComponent", "encodeURI", "encodeURIComponent", "Math",
    "Number", "Date", "Array", "Object", "Boolean", "String", "RegExp", "Map", "Set",
    "JSON", "Intl", "BigInt", "console", "Error", "Symbol", "globalThis", "Promise",
    "require", "arguments", "window", "document",
};

static JS_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "export", "extends", "false", "finally", "for",
    "function", "if", "import", "in", "instanceof", "let", "new", "null", "of",
    "return", "super", "switch", "this", "throw", "true", "try", "typeof", "var",
    "void", "while", "with", "yield", "as", "satisfies", "async",
};

/// Identifiers that resolve without the component context.
#[inline]
pub fn is_js_global(name: &str) -> bool {
    JS_GLOBALS.contains(name)
}

#[inline]
pub fn is_js_keyword(name: &str) -> bool {
    JS_KEYWORDS.contains(name)
}

#[inline]
pub fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

#[inline]
pub fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

/// Check that `name` is a plain identifier.
pub fn is_simple_identifier(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.first() {
        Some(&b) if is_ident_start(b) => bytes[1..].iter().all(|&b| is_ident_char(b)),
        _ => false,
    }
}

/// `foo-bar` -> `fooBar`
pub fn camelize(s: &str) -> CompactString {
    let mut out = CompactString::with_capacity(s.len());
    let mut upper = false;
    for c in s.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `fooBar` -> `FooBar`
pub fn capitalize(s: &str) -> CompactString {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut out = CompactString::with_capacity(s.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => CompactString::default(),
    }
}

/// `foo-bar` -> `FooBar`
#[inline]
pub fn pascalize(s: &str) -> CompactString {
    capitalize(&camelize(s))
}
