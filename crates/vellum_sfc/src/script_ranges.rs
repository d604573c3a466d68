//! Ranges of interest inside script sections.
//!
//! Token-level scans, no syntax tree. All ranges are relative to the script
//! content.

use serde::Serialize;
use vellum_carton::js::{matching_close, tokenize, Token, TokenKind};

/// Half-open byte range within a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextRange {
    pub start: u32,
    pub end: u32,
}

impl TextRange {
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start as usize..self.end as usize]
    }
}

/// `export default` in a plain script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDefault {
    /// From `export` through the end of the expression, including a
    /// trailing `;`
    pub statement: TextRange,
    /// The exported expression
    pub expression: TextRange,
    /// Options object literal, either the expression itself or the first
    /// argument of a wrapping call
    pub options: Option<TextRange>,
    /// Value of the `components` option
    pub components_option: Option<TextRange>,
    /// Value of the `directives` option
    pub directives_option: Option<TextRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRanges {
    pub export_default: Option<ExportDefault>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSetupRanges {
    /// The whole `defineSlots(...)` call
    pub define_slots: Option<TextRange>,
}

/// Scan a plain `<script>` section.
pub fn parse_script_ranges(source: &str) -> ScriptRanges {
    let tokens = tokenize(source);
    let mut depth = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Punct {
            match token.text(source) {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                _ => {}
            }
            continue;
        }
        if depth == 0
            && token.is_ident(source, "export")
            && tokens.get(i + 1).is_some_and(|t| t.is_ident(source, "default"))
        {
            return ScriptRanges {
                export_default: export_default(source, &tokens, i),
            };
        }
    }

    ScriptRanges::default()
}

fn export_default(source: &str, tokens: &[Token], export: usize) -> Option<ExportDefault> {
    let first = export + 2;
    let last = expression_end(source, tokens, first)?;

    let mut statement_end = tokens[last].end;
    if let Some(semi) = tokens.get(last + 1).filter(|t| t.is_punct(source, ";")) {
        statement_end = semi.end;
    }

    let options = options_object(source, tokens, first, last);
    let (components_option, directives_option) = match options {
        Some((open, close)) => (
            option_value(source, tokens, open, close, "components"),
            option_value(source, tokens, open, close, "directives"),
        ),
        None => (None, None),
    };

    Some(ExportDefault {
        statement: TextRange::new(tokens[export].start, statement_end),
        expression: TextRange::new(tokens[first].start, tokens[last].end),
        options: options.map(|(open, close)| TextRange::new(tokens[open].start, tokens[close].end)),
        components_option,
        directives_option,
    })
}

/// Index of the last token of the expression starting at `first`, or
/// `None` when the statement ends before any expression token.
fn expression_end(source: &str, tokens: &[Token], first: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut last = None;

    for (i, token) in tokens.iter().enumerate().skip(first) {
        if token.kind == TokenKind::Punct {
            match token.text(source) {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                ";" if depth == 0 => break,
                _ => {}
            }
        } else if depth == 0 && i > first && starts_statement(source, tokens, i) {
            break;
        }
        last = Some(i);
    }

    last
}

/// A token on a new line that cannot continue the previous expression.
fn starts_statement(source: &str, tokens: &[Token], i: usize) -> bool {
    let prev = tokens[i - 1];
    let gap = &source[prev.end as usize..tokens[i].start as usize];
    if !gap.contains('\n') {
        return false;
    }
    let continues = prev.kind == TokenKind::Punct
        && !matches!(prev.text(source), ")" | "]" | "}");
    !continues
}

/// Token indices of the options object braces.
fn options_object(
    source: &str,
    tokens: &[Token],
    first: usize,
    last: usize,
) -> Option<(usize, usize)> {
    if tokens[first].is_punct(source, "{") {
        let close = matching_close(source, tokens, first)?;
        return (close <= last).then_some((first, close));
    }
    // defineComponent({ ... })
    if tokens[first].kind == TokenKind::Ident
        && tokens.get(first + 1)?.is_punct(source, "(")
        && tokens.get(first + 2)?.is_punct(source, "{")
    {
        let close = matching_close(source, tokens, first + 2)?;
        return (close <= last).then_some((first + 2, close));
    }
    None
}

/// Value range of a top-level property of the object `open..=close`.
fn option_value(
    source: &str,
    tokens: &[Token],
    open: usize,
    close: usize,
    key: &str,
) -> Option<TextRange> {
    let mut depth = 0usize;
    let mut i = open + 1;

    while i < close {
        let token = tokens[i];
        if token.kind == TokenKind::Punct {
            match token.text(source) {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                _ => {}
            }
            i += 1;
            continue;
        }

        let at_key_position = depth == 0
            && (tokens[i - 1].is_punct(source, "{") || tokens[i - 1].is_punct(source, ","));
        let key_text = match token.kind {
            TokenKind::Ident => token.text(source),
            TokenKind::String => token.text(source).trim_matches(|c| c == '"' || c == '\''),
            _ => "",
        };

        if at_key_position && key_text == key {
            let next = tokens.get(i + 1)?;
            if next.is_punct(source, ":") {
                let value_first = i + 2;
                if value_first >= close {
                    return None;
                }
                let value_last = value_end(source, tokens, value_first, close);
                return Some(TextRange::new(tokens[value_first].start, tokens[value_last].end));
            }
            if token.kind == TokenKind::Ident && (next.is_punct(source, ",") || i + 1 == close) {
                return Some(TextRange::new(token.start, token.end));
            }
        }
        i += 1;
    }

    None
}

/// Last token index of a property value ending before `,` or `close`.
fn value_end(source: &str, tokens: &[Token], first: usize, close: usize) -> usize {
    let mut depth = 0usize;
    let mut last = first;
    for (i, token) in tokens.iter().enumerate().take(close).skip(first) {
        if token.kind == TokenKind::Punct {
            match token.text(source) {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                "," if depth == 0 => break,
                _ => {}
            }
        }
        last = i;
    }
    last
}

/// Scan a `<script setup>` section.
pub fn parse_script_setup_ranges(source: &str) -> ScriptSetupRanges {
    let tokens = tokenize(source);
    let mut ranges = ScriptSetupRanges::default();

    for (i, token) in tokens.iter().enumerate() {
        if !token.is_ident(source, "defineSlots") {
            continue;
        }
        if i > 0 && (tokens[i - 1].is_punct(source, ".") || tokens[i - 1].is_punct(source, "?.")) {
            continue;
        }
        let mut open = i + 1;
        if tokens.get(open).is_some_and(|t| t.is_punct(source, "<")) {
            let mut angle = 0usize;
            while let Some(t) = tokens.get(open) {
                if t.is_punct(source, "<") {
                    angle += 1;
                } else if t.is_punct(source, ">") {
                    angle -= 1;
                    if angle == 0 {
                        break;
                    }
                }
                open += 1;
            }
            open += 1;
        }
        if !tokens.get(open).is_some_and(|t| t.is_punct(source, "(")) {
            continue;
        }
        let end = matching_close(source, &tokens, open).map_or(source.len() as u32, |c| tokens[c].end);
        ranges.define_slots = Some(TextRange::new(token.start, end));
        break;
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_default_object() {
        let source = "import Foo from './Foo.vue'\nexport default {\n  components: { Foo },\n  directives: dirs,\n  data() { return {} },\n};\n";
        let ranges = parse_script_ranges(source);
        let export = ranges.export_default.unwrap();
        assert_eq!(
            export.expression.slice(source),
            "{\n  components: { Foo },\n  directives: dirs,\n  data() { return {} },\n}"
        );
        assert!(export.statement.slice(source).starts_with("export default {"));
        assert!(export.statement.slice(source).ends_with("};"));
        assert_eq!(export.components_option.unwrap().slice(source), "{ Foo }");
        assert_eq!(export.directives_option.unwrap().slice(source), "dirs");
    }

    #[test]
    fn test_export_default_define_component() {
        let source = "export default defineComponent({ components })\nconst later = 1";
        let export = parse_script_ranges(source).export_default.unwrap();
        assert_eq!(export.expression.slice(source), "defineComponent({ components })");
        assert_eq!(export.options.unwrap().slice(source), "{ components }");
        assert_eq!(export.components_option.unwrap().slice(source), "components");
        assert!(export.directives_option.is_none());
    }

    #[test]
    fn test_export_default_identifier() {
        let source = "const comp = {}\nexport default comp\n";
        let export = parse_script_ranges(source).export_default.unwrap();
        assert_eq!(export.expression.slice(source), "comp");
        assert!(export.options.is_none());
    }

    #[test]
    fn test_export_default_without_expression() {
        assert!(parse_script_ranges("export default;\n").export_default.is_none());
        assert!(parse_script_ranges("export default\n").export_default.is_none());
        let source = "const a = 1\nexport default;\nconst b = 2\n";
        assert!(parse_script_ranges(source).export_default.is_none());
    }

    #[test]
    fn test_nested_export_is_ignored() {
        let source = "function f() { return `export default x` }\nconst y = { export: 1 }";
        assert!(parse_script_ranges(source).export_default.is_none());
    }

    #[test]
    fn test_define_slots() {
        let source = "const slots = defineSlots<{ default(): any }>()\n";
        let ranges = parse_script_setup_ranges(source);
        assert_eq!(
            ranges.define_slots.unwrap().slice(source),
            "defineSlots<{ default(): any }>()"
        );
        assert!(parse_script_setup_ranges("obj.defineSlots()").define_slots.is_none());
        assert!(parse_script_setup_ranges("// defineSlots()").define_slots.is_none());
    }
}
