//! Lightweight JavaScript token scanner.
//!
//! Splits script text into identifiers, literals and punctuation, skipping
//! comments. It does not build a syntax tree; callers look at neighbouring
//! tokens to classify identifiers. Template literal interpolations are
//! scanned as ordinary tokens.

use smallvec::SmallVec;

use crate::general::{is_ident_char, is_ident_start, is_js_keyword};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    /// Single or double quoted string
    String,
    /// Static chunk of a template literal, including its delimiters
    Template,
    Regex,
    Punct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: u32,
    pub end: u32,
}

impl Token {
    #[inline]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start as usize..self.end as usize]
    }

    #[inline]
    pub fn is_punct(&self, source: &str, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text(source) == punct
    }

    #[inline]
    pub fn is_ident(&self, source: &str, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text(source) == name
    }
}

/// Iterator over the tokens of a script.
pub struct JsScanner<'a> {
    source: &'a str,
    pos: usize,
    /// One entry per open `{`; `true` when it opened a template interpolation
    braces: SmallVec<[bool; 8]>,
    prev: Option<Token>,
}

impl<'a> JsScanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            braces: SmallVec::new(),
            prev: None,
        }
    }

    #[inline]
    fn bytes(&self) -> &'a [u8] {
        self.source.as_bytes()
    }

    fn skip_trivia(&mut self) {
        let bytes = self.bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                b'/' if bytes.get(self.pos + 1) == Some(&b'/') => {
                    while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                b'/' if bytes.get(self.pos + 1) == Some(&b'*') => {
                    self.pos += 2;
                    while self.pos < bytes.len()
                        && !(bytes[self.pos] == b'*' && bytes.get(self.pos + 1) == Some(&b'/'))
                    {
                        self.pos += 1;
                    }
                    self.pos = (self.pos + 2).min(bytes.len());
                }
                _ => break,
            }
        }
    }

    fn scan_quoted(&mut self, quote: u8) {
        let bytes = self.bytes();
        self.pos += 1;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'\n' => break,
                b if b == quote => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(bytes.len());
    }

    /// Scan a template chunk starting after its opening delimiter.
    fn scan_template_chunk(&mut self) {
        let bytes = self.bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'`' => {
                    self.pos += 1;
                    return;
                }
                b'$' if bytes.get(self.pos + 1) == Some(&b'{') => {
                    self.pos += 2;
                    self.braces.push(true);
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(bytes.len());
    }

    fn regex_allowed(&self) -> bool {
        match self.prev {
            None => true,
            Some(token) => match token.kind {
                TokenKind::Punct => !matches!(token.text(self.source), ")" | "]" | "}"),
                TokenKind::Ident => is_js_keyword(token.text(self.source)),
                _ => false,
            },
        }
    }

    /// Try to scan a regex literal; leaves `pos` untouched on failure.
    fn scan_regex(&mut self) -> bool {
        let bytes = self.bytes();
        let mut pos = self.pos + 1;
        let mut in_class = false;
        while pos < bytes.len() {
            match bytes[pos] {
                b'\\' => pos += 2,
                b'\n' => return false,
                b'[' => {
                    in_class = true;
                    pos += 1;
                }
                b']' => {
                    in_class = false;
                    pos += 1;
                }
                b'/' if !in_class => {
                    pos += 1;
                    while pos < bytes.len() && is_ident_char(bytes[pos]) {
                        pos += 1;
                    }
                    self.pos = pos;
                    return true;
                }
                _ => pos += 1,
            }
        }
        false
    }

    fn scan_punct(&mut self) {
        let rest = &self.bytes()[self.pos..];
        let len = if rest.starts_with(b"...") {
            3
        } else if rest.starts_with(b"?.") && !rest.get(2).is_some_and(u8::is_ascii_digit) {
            2
        } else if rest.starts_with(b"=>") {
            2
        } else {
            // keep multi-byte characters whole
            self.source[self.pos..]
                .chars()
                .next()
                .map_or(1, char::len_utf8)
        };
        self.pos += len;
    }
}

impl Iterator for JsScanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.skip_trivia();
        let bytes = self.bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        let start = self.pos;
        let b = bytes[start];
        let kind = if is_ident_start(b) {
            while self.pos < bytes.len() && is_ident_char(bytes[self.pos]) {
                self.pos += 1;
            }
            TokenKind::Ident
        } else if b.is_ascii_digit()
            || (b == b'.' && bytes.get(start + 1).is_some_and(u8::is_ascii_digit))
        {
            self.pos += 1;
            while self.pos < bytes.len()
                && (is_ident_char(bytes[self.pos]) || bytes[self.pos] == b'.')
            {
                self.pos += 1;
            }
            TokenKind::Number
        } else if b == b'"' || b == b'\'' {
            self.scan_quoted(b);
            TokenKind::String
        } else if b == b'`' {
            self.pos += 1;
            self.scan_template_chunk();
            TokenKind::Template
        } else if b == b'}' && self.braces.last() == Some(&true) {
            self.braces.pop();
            self.pos += 1;
            self.scan_template_chunk();
            TokenKind::Template
        } else if b == b'/' && self.regex_allowed() && self.scan_regex() {
            TokenKind::Regex
        } else {
            match b {
                b'{' => self.braces.push(false),
                b'}' => {
                    self.braces.pop();
                }
                _ => {}
            }
            self.scan_punct();
            TokenKind::Punct
        };

        let token = Token {
            kind,
            start: start as u32,
            end: self.pos as u32,
        };
        self.prev = Some(token);
        Some(token)
    }
}

/// Tokenize a whole script.
pub fn tokenize(source: &str) -> Vec<Token> {
    JsScanner::new(source).collect()
}

/// Find the token closing the bracket opened at `tokens[open]`.
pub fn matching_close(source: &str, tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.kind != TokenKind::Punct {
            continue;
        }
        match token.text(source) {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<&str> {
        tokenize(source).iter().map(|t| t.text(source)).collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            texts("foo.bar(1, 'x') // tail"),
            vec!["foo", ".", "bar", "(", "1", ",", "'x'", ")"]
        );
    }

    #[test]
    fn test_template_literal_interpolation() {
        let tokens = tokenize("`a${b + c}d`");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Template,
                TokenKind::Ident,
                TokenKind::Punct,
                TokenKind::Ident,
                TokenKind::Template,
            ]
        );
    }

    #[test]
    fn test_regex_vs_division() {
        assert_eq!(texts("a / b"), vec!["a", "/", "b"]);
        let tokens = tokenize("x = /ab+c/g.test(y)");
        assert_eq!(tokens[2].kind, TokenKind::Regex);
    }

    #[test]
    fn test_optional_chaining_and_spread() {
        assert_eq!(texts("a?.b"), vec!["a", "?.", "b"]);
        assert_eq!(texts("[...xs]"), vec!["[", "...", "xs", "]"]);
        assert_eq!(texts("c ?.5 : 1"), vec!["c", "?", ".5", ":", "1"]);
    }

    #[test]
    fn test_matching_close() {
        let source = "f({ a: [1, 2] }, b)";
        let tokens = tokenize(source);
        let close = matching_close(source, &tokens, 1).unwrap();
        assert_eq!(tokens[close].text(source), ")");
        assert_eq!(close, tokens.len() - 1);
    }
}
